/// Run configuration
///
/// Every field has a default matching the conventional working-directory
/// layout, so a config file only needs the fields it changes. Command-line
/// flags are applied on top by the binary.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::key::Instrument;
use crate::pipeline::angiovue::AngiovueOptions;
use crate::raw::OutputFormat;
use crate::registry::RegistryColumns;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelabelConfig {
    /// Flat folder of Angiovue exports
    pub angiovue_root: PathBuf,
    /// Root of the Revo `<study>/<size>/<file>` tree
    pub revo_root: PathBuf,
    /// Flat folder of Spectralis exports
    pub spectralis_root: PathBuf,
    /// Registry workbook
    pub registry: PathBuf,
    /// Spectralis name table workbook
    pub names: PathBuf,
    pub columns: RegistryColumns,
    pub output_format: OutputFormat,
    pub convert_raw: bool,
    pub delete_previews: bool,
}

impl Default for RelabelConfig {
    fn default() -> Self {
        Self {
            angiovue_root: PathBuf::from("./AVANTI"),
            revo_root: PathBuf::from("./REVO"),
            spectralis_root: PathBuf::from("./Spectralis"),
            registry: PathBuf::from("./2025_OCTA_HARMONISATION_LABELS.xlsx"),
            names: PathBuf::from("./2024_PartialData.xlsx"),
            columns: RegistryColumns::default(),
            output_format: OutputFormat::Tiff,
            convert_raw: true,
            delete_previews: true,
        }
    }
}

impl RelabelConfig {
    /// Load from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export folder for an instrument
    pub fn root_for(&self, instrument: Instrument) -> &Path {
        match instrument {
            Instrument::Angiovue => &self.angiovue_root,
            Instrument::Revo => &self.revo_root,
            Instrument::Spectralis => &self.spectralis_root,
        }
    }

    pub fn set_root(&mut self, instrument: Instrument, root: PathBuf) {
        match instrument {
            Instrument::Angiovue => self.angiovue_root = root,
            Instrument::Revo => self.revo_root = root,
            Instrument::Spectralis => self.spectralis_root = root,
        }
    }

    pub fn angiovue_options(&self) -> AngiovueOptions {
        AngiovueOptions {
            convert_raw: self.convert_raw,
            delete_previews: self.delete_previews,
            format: self.output_format,
        }
    }
}
