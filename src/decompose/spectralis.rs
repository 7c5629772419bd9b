/// Spectralis exports
///
/// Files are named after the patient: `Surname Givenname ... {layer} ...`
/// with space-separated tokens. The third-from-last token carries the layer
/// label, and the first two tokens are resolved to a participant ID through
/// the name table before the file can be put in generic form.

use log::warn;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::Path;

use super::generic::{decompose_generic, format_generic_name, octa_registry_key};
use super::{split_extension, visible_file_name, Decomposer};
use crate::error::{DecomposeError, NormalizeError};
use crate::key::normalize::{SizeBucket, OCTA_LAYERS};
use crate::key::{CanonicalKey, Instrument};
use crate::registry::{NameRow, RegistryRow};

/// Position of the layer token counted from the end
const LAYER_TOKEN_FROM_END: usize = 3;

/// Spectralis is always exported as a 3.3 mm scan
const SPECTRALIS_SIZE: SizeBucket = SizeBucket::Standard3;

/// Display name (`"{surname} {givenname}"`) -> participant ID
#[derive(Debug, Clone, Default)]
pub struct NameDirectory {
    by_display_name: HashMap<String, String>,
}

impl NameDirectory {
    /// Build from the name table; the first row for a display name wins
    pub fn new(rows: &[NameRow]) -> Self {
        let mut by_display_name: HashMap<String, String> = HashMap::new();

        for row in rows {
            match by_display_name.entry(row.display_name()) {
                Entry::Occupied(existing) => {
                    if existing.get() != &row.participant_id {
                        warn!(
                            "Name '{}' maps to both {} and {}; keeping {}",
                            existing.key(),
                            existing.get(),
                            row.participant_id,
                            existing.get()
                        );
                    }
                }
                Entry::Vacant(slot) => {
                    slot.insert(row.participant_id.clone());
                }
            }
        }

        Self { by_display_name }
    }

    pub fn lookup(&self, display_name: &str) -> Option<&str> {
        self.by_display_name.get(display_name.trim()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_display_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_display_name.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SpectralisDecomposer;

impl SpectralisDecomposer {
    /// Whether `path` still carries the display-name export (contains a space)
    pub fn is_raw_export(path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .map(|name| name.contains(' '))
            .unwrap_or(false)
    }

    /// Generic file name for a display-named export, e.g.
    /// `Smith John OCTA SVC 3x3 OD.tif` -> `1001_SSVC3.tif`
    pub fn normalize_display_name(
        &self,
        path: &Path,
        names: &NameDirectory,
    ) -> Result<String, DecomposeError> {
        let name = visible_file_name(path)?;
        let (_, extension) = split_extension(name)?;
        if !name.contains(' ') {
            return Err(DecomposeError::MissingSeparator(' '));
        }

        let tokens: Vec<&str> = name.split(' ').collect();
        if tokens.len() < LAYER_TOKEN_FROM_END {
            return Err(DecomposeError::TooFewTokens {
                expected: LAYER_TOKEN_FROM_END,
                found: tokens.len(),
            });
        }

        let layer_token = tokens[tokens.len() - LAYER_TOKEN_FROM_END];
        let layer = OCTA_LAYERS
            .find_in(layer_token)
            .ok_or_else(|| DecomposeError::NoLayerLabel(layer_token.to_string()))?;

        let display_name = format!("{} {}", tokens[0], tokens[1]);
        let participant_id = names
            .lookup(&display_name)
            .ok_or_else(|| DecomposeError::UnknownParticipant(display_name.trim().to_string()))?;

        format_generic_name(
            participant_id,
            Instrument::Spectralis,
            layer,
            SPECTRALIS_SIZE,
            extension,
        )
    }
}

impl Decomposer for SpectralisDecomposer {
    fn instrument(&self) -> Instrument {
        Instrument::Spectralis
    }

    fn decompose(&self, path: &Path) -> Result<CanonicalKey, DecomposeError> {
        decompose_generic(path)
    }

    fn registry_key(&self, row: &RegistryRow) -> Result<CanonicalKey, NormalizeError> {
        octa_registry_key(row)
    }
}
