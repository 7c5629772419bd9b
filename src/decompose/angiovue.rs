/// Angiovue exports
///
/// Names look like `0001_AS3.raw`: participant ID, then instrument letter,
/// layer letter and size digit by position. Trailing characters after the
/// size digit are ignored. Keys carry no scan count.

use std::path::Path;

use super::{required, split_extension, visible_file_name, Decomposer};
use crate::error::{DecomposeError, NormalizeError};
use crate::key::normalize::{ANGIOVUE_INSTRUMENTS, ANGIOVUE_LAYERS, ANGIOVUE_SIZES};
use crate::key::{CanonicalKey, Instrument};
use crate::registry::RegistryRow;

#[derive(Debug, Clone, Copy, Default)]
pub struct AngiovueDecomposer;

impl Decomposer for AngiovueDecomposer {
    fn instrument(&self) -> Instrument {
        Instrument::Angiovue
    }

    fn decompose(&self, path: &Path) -> Result<CanonicalKey, DecomposeError> {
        let name = visible_file_name(path)?;
        let (stem, _) = split_extension(name)?;

        let mut parts = stem.split('_');
        let participant_id = parts.next().unwrap_or_default();
        let remainder = parts.next().ok_or(DecomposeError::MissingSeparator('_'))?;
        if participant_id.is_empty() {
            return Err(DecomposeError::MissingSeparator('_'));
        }

        // One character per field; a short remainder yields empty codes
        let mut codes = remainder.char_indices().map(|(i, c)| &remainder[i..i + c.len_utf8()]);
        let instrument_code = codes.next().unwrap_or_default();
        let layer_code = codes.next().unwrap_or_default();
        let size_code = codes.next().unwrap_or_default();

        let instrument = ANGIOVUE_INSTRUMENTS
            .from_code(instrument_code)
            .ok_or_else(|| DecomposeError::UnknownInstrument(instrument_code.to_string()))?;
        let layer = ANGIOVUE_LAYERS
            .from_code(layer_code)
            .ok_or_else(|| DecomposeError::UnknownLayer(layer_code.to_string()))?;
        let field_of_view = ANGIOVUE_SIZES
            .from_code(size_code)
            .ok_or_else(|| DecomposeError::UnknownSizeTag(remainder.to_string()))?;

        Ok(CanonicalKey {
            participant_id: participant_id.to_string(),
            instrument,
            layer,
            field_of_view: field_of_view.to_string(),
            scans: None,
        })
    }

    fn registry_key(&self, row: &RegistryRow) -> Result<CanonicalKey, NormalizeError> {
        let participant_id = required(&row.participant_id, "participant ID")?;
        let instrument =
            ANGIOVUE_INSTRUMENTS.to_canonical(required(&row.instrument, "instrument")?)?;
        let layer = ANGIOVUE_LAYERS.to_canonical(required(&row.layer, "retinal layer")?)?;
        let field_of_view =
            ANGIOVUE_SIZES.to_canonical(required(&row.size_mm, "image size [mm]")?)?;

        Ok(CanonicalKey {
            participant_id: participant_id.to_string(),
            instrument,
            layer,
            field_of_view: field_of_view.to_string(),
            scans: None,
        })
    }
}
