/// Row records read from the registry spreadsheets
///
/// These structs are the data model that flows between the spreadsheet
/// loader and the key normalizer.

use std::fmt;

/// Study-assigned image identifier, the final filename stem
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImageId {
    /// Rendered zero-padded to four digits
    Numeric(i64),
    /// Passed through as written in the registry
    Text(String),
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageId::Numeric(id) => write!(f, "{id:04}"),
            ImageId::Text(text) => f.write_str(text),
        }
    }
}

/// One record of the main registry sheet
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RegistryRow {
    pub participant_id: Option<String>,
    pub instrument: Option<String>,
    pub layer: Option<String>,
    pub size_mm: Option<String>,
    /// Only read for Revo / Spectralis runs
    pub size_scans: Option<String>,
    /// `None` when the cell is blank
    pub image_id: Option<ImageId>,
}

/// One record of the Spectralis name table.
///
/// Spectralis names its exports after the patient, so this is the only
/// bridge from display name to participant ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameRow {
    pub given_name: String,
    pub surname: String,
    pub participant_id: String,
}

impl NameRow {
    /// Display name as it appears at the start of a Spectralis export
    pub fn display_name(&self) -> String {
        format!("{} {}", self.surname, self.given_name)
            .trim()
            .to_string()
    }
}
