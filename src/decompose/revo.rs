/// Revo exports
///
/// The instrument writes `<root>/<studyFolder>/<sizeFolder>/<leaf>` where the
/// leaf is a free-text name containing a space and a layer label, e.g.
/// `OCTA001/3_400/John Smith_Superficial.img`. Decomposition is two-pass:
/// `normalize_raw_name` turns the leaf into the generic form using the
/// directory context, then `decompose` reads the generic form.

use std::path::Path;

use super::generic::{decompose_generic, format_generic_name, octa_registry_key};
use super::{ancestor_name, split_extension, visible_file_name, Decomposer};
use crate::error::{DecomposeError, NormalizeError};
use crate::key::normalize::{SizeBucket, OCTA_LAYERS};
use crate::key::{CanonicalKey, Instrument};
use crate::registry::RegistryRow;

/// Characters kept before the hyphen in a participant ID
const STUDY_PREFIX_LEN: usize = 4;

#[derive(Debug, Clone, Copy, Default)]
pub struct RevoDecomposer;

impl RevoDecomposer {
    /// Whether `path` still carries the raw export name (contains a space)
    pub fn is_raw_export(path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .map(|name| name.contains(' '))
            .unwrap_or(false)
    }

    /// Generic file name for a raw export leaf, e.g.
    /// `OCTA001/3_400/John Smith_Superficial.img` -> `OCTA-001_RS3H.img`
    pub fn normalize_raw_name(&self, path: &Path) -> Result<String, DecomposeError> {
        let name = visible_file_name(path)?;
        let (stem, extension) = split_extension(name)?;
        if !name.contains(' ') {
            return Err(DecomposeError::MissingSeparator(' '));
        }

        // Only the text after the first underscore is searched, never the patient name
        let (_, layer_text) = stem
            .split_once('_')
            .ok_or(DecomposeError::MissingSeparator('_'))?;
        let layer = OCTA_LAYERS
            .find_in(layer_text)
            .ok_or_else(|| DecomposeError::NoLayerLabel(layer_text.to_string()))?;

        let size_folder = ancestor_name(path, 1, "size")?;
        let size = SizeBucket::from_size_folder(size_folder)?;

        let study_folder = ancestor_name(path, 2, "study")?;
        let participant_id = hyphenate_study_folder(study_folder)?;

        format_generic_name(&participant_id, Instrument::Revo, layer, size, extension)
    }
}

impl Decomposer for RevoDecomposer {
    fn instrument(&self) -> Instrument {
        Instrument::Revo
    }

    fn decompose(&self, path: &Path) -> Result<CanonicalKey, DecomposeError> {
        decompose_generic(path)
    }

    fn registry_key(&self, row: &RegistryRow) -> Result<CanonicalKey, NormalizeError> {
        octa_registry_key(row)
    }
}

/// `OCTA001` -> `OCTA-001`
pub fn hyphenate_study_folder(folder: &str) -> Result<String, DecomposeError> {
    match folder.char_indices().nth(STUDY_PREFIX_LEN) {
        Some((split, _)) => Ok(format!("{}-{}", &folder[..split], &folder[split..])),
        None => Err(DecomposeError::ShortStudyFolder(folder.to_string())),
    }
}
