/// Filename decomposition
///
/// Each instrument writes its exports under its own ad hoc naming grammar.
/// A `Decomposer` reduces both a file path and a registry row to the same
/// `CanonicalKey` shape so the two can be matched.
///
/// - angiovue.rs: `{pid}_{I}{L}{S}` names with positional letters
/// - generic.rs: the shared `{pid}_{tag}` form used by Revo and Spectralis
/// - revo.rs: raw export trees `<study>/<mm>_<scans>/<leaf>`
/// - spectralis.rs: display-named exports resolved through the name table

pub mod angiovue;
pub mod generic;
pub mod revo;
pub mod spectralis;

use std::path::Path;

use crate::error::{DecomposeError, NormalizeError};
use crate::key::{CanonicalKey, Instrument};
use crate::registry::RegistryRow;

pub use angiovue::AngiovueDecomposer;
pub use revo::RevoDecomposer;
pub use spectralis::{NameDirectory, SpectralisDecomposer};

/// Per-instrument strategy: "file -> key" and "registry row -> key"
pub trait Decomposer {
    fn instrument(&self) -> Instrument;

    /// Key of a file already in the instrument's matchable form
    fn decompose(&self, path: &Path) -> Result<CanonicalKey, DecomposeError>;

    /// Key of a registry row, or why the row cannot be indexed
    fn registry_key(&self, row: &RegistryRow) -> Result<CanonicalKey, NormalizeError>;
}

/// File name of `path` as UTF-8, rejecting hidden files
pub(crate) fn visible_file_name(path: &Path) -> Result<&str, DecomposeError> {
    let name = path
        .file_name()
        .ok_or(DecomposeError::NoExtension)?
        .to_str()
        .ok_or(DecomposeError::NotUtf8)?;

    if name.starts_with('.') {
        return Err(DecomposeError::Hidden);
    }
    Ok(name)
}

/// Split `name` at its last dot into (stem, extension)
pub(crate) fn split_extension(name: &str) -> Result<(&str, &str), DecomposeError> {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Ok((stem, ext)),
        _ => Err(DecomposeError::NoExtension),
    }
}

/// Name of the directory `levels` steps above `path` (1 = parent)
pub(crate) fn ancestor_name<'a>(
    path: &'a Path,
    levels: usize,
    role: &'static str,
) -> Result<&'a str, DecomposeError> {
    let mut current = path;
    for _ in 0..levels {
        current = current.parent().ok_or(DecomposeError::MissingDirectory(role))?;
    }
    current
        .file_name()
        .ok_or(DecomposeError::MissingDirectory(role))?
        .to_str()
        .ok_or(DecomposeError::NotUtf8)
}

/// Required registry text field
pub(crate) fn required<'a>(
    value: &'a Option<String>,
    field: &'static str,
) -> Result<&'a str, NormalizeError> {
    value.as_deref().ok_or(NormalizeError::MissingField(field))
}
