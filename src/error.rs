/// Error types for the relabeling pipeline
///
/// Each enum belongs to one unit of failure:
/// - `RegistryLoadError` and `ConfigError` abort the whole run
/// - `NormalizeError` drops a single registry row from the index
/// - `DecomposeError`, `RawError` and `RenameError` skip a single file

use std::path::PathBuf;
use thiserror::Error;

/// The registry spreadsheet (or name table) could not be read
#[derive(Debug, Error)]
pub enum RegistryLoadError {
    #[error("failed to open spreadsheet {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("spreadsheet {0} has no worksheet")]
    NoWorksheet(PathBuf),

    #[error("required column '{0}' is missing from the header row")]
    MissingColumn(String),
}

/// A registry value did not match any known enumeration entry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("unknown label '{0}'")]
    UnknownLabel(String),

    #[error("unknown size '{0}'")]
    UnknownSize(String),

    #[error("missing value for {0}")]
    MissingField(&'static str),
}

/// A filename could not be reduced to a canonical key
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecomposeError {
    #[error("hidden file")]
    Hidden,

    #[error("file name is not valid UTF-8")]
    NotUtf8,

    #[error("file name has no extension")]
    NoExtension,

    #[error("file name has no '{0}' separator")]
    MissingSeparator(char),

    #[error("expected at least {expected} space-separated tokens, found {found}")]
    TooFewTokens { expected: usize, found: usize },

    #[error("unknown instrument code '{0}'")]
    UnknownInstrument(String),

    #[error("unknown layer token '{0}'")]
    UnknownLayer(String),

    #[error("no layer label found in '{0}'")]
    NoLayerLabel(String),

    #[error("unknown size tag in '{0}'")]
    UnknownSizeTag(String),

    #[error("size folder '{0}' is not of the form <mm>_<scans>")]
    BadSizeFolder(String),

    #[error("missing {0} folder above the file")]
    MissingDirectory(&'static str),

    #[error("study folder '{0}' is too short to hyphenate")]
    ShortStudyFolder(String),

    #[error("no participant named '{0}' in the name table")]
    UnknownParticipant(String),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}

impl DecomposeError {
    /// The name parsed, but a code in it is not in any label table
    pub fn is_unknown_token(&self) -> bool {
        matches!(
            self,
            DecomposeError::UnknownInstrument(_)
                | DecomposeError::UnknownLayer(_)
                | DecomposeError::UnknownSizeTag(_)
        )
    }
}

/// Raw buffer conversion failures
#[derive(Debug, Error)]
pub enum RawError {
    #[error("cannot infer geometry from '{0}' (stem must end in 3 or 6)")]
    UnsupportedGeometry(String),

    #[error("malformed raw buffer: expected {expected} bytes, found {actual}")]
    MalformedBuffer { expected: usize, actual: usize },

    #[error("output {0} already exists")]
    OutputExists(PathBuf),

    #[error("pixel count does not match {width}x{height}")]
    Dimensions { width: u32, height: u32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image encoding error: {0}")]
    Image(#[from] image::ImageError),
}

/// A rename could not be performed
#[derive(Debug, Error)]
pub enum RenameError {
    #[error("target {0} already exists")]
    Collision(PathBuf),

    #[error("{0} has no file name")]
    NoFileName(PathBuf),

    #[error("'{0}' is not a plain file name")]
    InvalidName(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The JSON configuration file could not be used
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
