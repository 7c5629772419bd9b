/// Generic two-field names
///
/// Revo and Spectralis files end up as `{participantID}_{tag}.{ext}` where
/// the tag is the instrument code, a layer token and a size tag, e.g.
/// `OCTA-001_RS3H.img` or `1001_SSVC3.tif`.

use std::path::Path;

use super::{ancestor_name, required, split_extension, visible_file_name};
use crate::error::{DecomposeError, NormalizeError};
use crate::key::normalize::{SizeBucket, OCTA_INSTRUMENTS, OCTA_LAYERS};
use crate::key::{square, CanonicalKey, Instrument, Layer};
use crate::registry::RegistryRow;

/// Spectralis exports never vary field of view or scan grid at this stage
pub const SPECTRALIS_FIELD_OF_VIEW: &str = "3x3";
pub const SPECTRALIS_SCANS: &str = "512x512";

/// Parsed `{instrument}{layer}{size}` tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenericTag {
    pub instrument: Instrument,
    pub layer: Layer,
    pub size: SizeBucket,
}

/// Parts of a generic file name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenericName<'a> {
    pub participant_id: &'a str,
    pub tag: &'a str,
    pub extension: &'a str,
}

/// Split `{pid}_{tag}.{ext}`; anything after a second `_` is ignored
pub fn split_generic_name(name: &str) -> Result<GenericName<'_>, DecomposeError> {
    let (stem, extension) = split_extension(name)?;
    let (participant_id, rest) = stem
        .split_once('_')
        .ok_or(DecomposeError::MissingSeparator('_'))?;
    let tag = rest.split('_').next().unwrap_or(rest);

    if participant_id.is_empty() || tag.is_empty() {
        return Err(DecomposeError::MissingSeparator('_'));
    }

    Ok(GenericName {
        participant_id,
        tag,
        extension,
    })
}

/// Parse a tag such as `RS3H`, `SSVC3` or `RD10`
pub fn parse_generic_tag(tag: &str) -> Result<GenericTag, DecomposeError> {
    let first = tag
        .chars()
        .next()
        .ok_or_else(|| DecomposeError::UnknownInstrument(String::new()))?;
    let (code, rest) = tag.split_at(first.len_utf8());
    let instrument = OCTA_INSTRUMENTS
        .from_code(code)
        .ok_or_else(|| DecomposeError::UnknownInstrument(code.to_string()))?;

    let (layer_token, size) =
        SizeBucket::strip_tag(rest).ok_or_else(|| DecomposeError::UnknownSizeTag(tag.to_string()))?;
    let layer = OCTA_LAYERS
        .from_code(layer_token)
        .ok_or_else(|| DecomposeError::UnknownLayer(layer_token.to_string()))?;

    Ok(GenericTag {
        instrument,
        layer,
        size,
    })
}

/// Build the generic file name that pass 1 renames raw exports to
pub fn format_generic_name(
    participant_id: &str,
    instrument: Instrument,
    layer: Layer,
    size: SizeBucket,
    extension: &str,
) -> Result<String, DecomposeError> {
    let instrument_code = OCTA_INSTRUMENTS
        .code_of(instrument)
        .ok_or_else(|| DecomposeError::UnknownInstrument(instrument.to_string()))?;
    let layer_code = OCTA_LAYERS
        .code_of(layer)
        .ok_or_else(|| DecomposeError::UnknownLayer(layer.to_string()))?;

    Ok(format!(
        "{participant_id}_{instrument_code}{layer_code}{}.{extension}",
        size.tag()
    ))
}

/// Read `"<mm>_<scans>"` as (`"{mm}x{mm}"`, `"{scans}x{scans}"`)
pub fn size_folder_dimensions(folder: &str) -> Result<(String, String), DecomposeError> {
    match folder.split_once('_') {
        Some((mm, scans)) if !mm.is_empty() && !scans.is_empty() => Ok((square(mm), square(scans))),
        _ => Err(DecomposeError::BadSizeFolder(folder.to_string())),
    }
}

/// Key of a generic-form file.
///
/// Spectralis tags carry fixed dimensions; Revo tags take field of view and
/// scan grid from the enclosing size folder.
pub fn decompose_generic(path: &Path) -> Result<CanonicalKey, DecomposeError> {
    let name = visible_file_name(path)?;
    let parts = split_generic_name(name)?;
    let tag = parse_generic_tag(parts.tag)?;

    let (field_of_view, scans) = match tag.instrument {
        Instrument::Spectralis => (
            SPECTRALIS_FIELD_OF_VIEW.to_string(),
            SPECTRALIS_SCANS.to_string(),
        ),
        _ => size_folder_dimensions(ancestor_name(path, 1, "size")?)?,
    };

    Ok(CanonicalKey {
        participant_id: parts.participant_id.to_string(),
        instrument: tag.instrument,
        layer: tag.layer,
        field_of_view,
        scans: Some(scans),
    })
}

/// Key of a Revo / Spectralis registry row, compared as registry text
pub fn octa_registry_key(row: &RegistryRow) -> Result<CanonicalKey, NormalizeError> {
    let participant_id = required(&row.participant_id, "participant ID")?;
    let instrument = OCTA_INSTRUMENTS.to_canonical(required(&row.instrument, "instrument")?)?;
    let layer = OCTA_LAYERS.to_canonical(required(&row.layer, "retinal layer")?)?;
    let field_of_view = required(&row.size_mm, "image size [mm]")?;
    let scans = required(&row.size_scans, "image size [scans]")?;

    Ok(CanonicalKey {
        participant_id: participant_id.to_string(),
        instrument,
        layer,
        field_of_view: field_of_view.to_string(),
        scans: Some(scans.to_string()),
    })
}
