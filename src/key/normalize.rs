/// Label tables and size buckets
///
/// Registry cells hold free text ("Superficial", "Revo", "3x3") while
/// filenames hold short codes ("S", "R", "3"). Each instrument family has its
/// own tables mapping one to the other. Tables are plain data so a new
/// instrument only needs new entries.

use super::{Instrument, Layer};
use crate::error::NormalizeError;

/// One row of a label table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelEntry<T: 'static> {
    /// Short code used in filenames
    pub code: &'static str,
    /// Free text used in the registry
    pub label: &'static str,
    pub value: T,
}

/// Ordered code <-> label lookup table.
///
/// Order matters for `find_in`: the first entry whose label occurs in the
/// searched text wins.
#[derive(Debug, Clone, Copy)]
pub struct LabelTable<T: 'static> {
    entries: &'static [LabelEntry<T>],
}

impl<T: Copy + PartialEq> LabelTable<T> {
    pub const fn new(entries: &'static [LabelEntry<T>]) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &'static [LabelEntry<T>] {
        self.entries
    }

    /// Map registry free text to its value (exact match)
    pub fn to_canonical(&self, label: &str) -> Result<T, NormalizeError> {
        self.entries
            .iter()
            .find(|entry| entry.label == label)
            .map(|entry| entry.value)
            .ok_or_else(|| NormalizeError::UnknownLabel(label.to_string()))
    }

    /// Map a filename code to its value (exact match)
    pub fn from_code(&self, code: &str) -> Option<T> {
        self.entries
            .iter()
            .find(|entry| entry.code == code)
            .map(|entry| entry.value)
    }

    pub fn label_of(&self, value: T) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|entry| entry.value == value)
            .map(|entry| entry.label)
    }

    pub fn code_of(&self, value: T) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|entry| entry.value == value)
            .map(|entry| entry.code)
    }

    /// First entry whose label appears anywhere in `text`
    pub fn find_in(&self, text: &str) -> Option<T> {
        self.entries
            .iter()
            .find(|entry| text.contains(entry.label))
            .map(|entry| entry.value)
    }
}

const fn entry<T: 'static>(code: &'static str, label: &'static str, value: T) -> LabelEntry<T> {
    LabelEntry { code, label, value }
}

const ANGIOVUE_INSTRUMENT_ENTRIES: &[LabelEntry<Instrument>] =
    &[entry("A", "Angiovue", Instrument::Angiovue)];

const ANGIOVUE_LAYER_ENTRIES: &[LabelEntry<Layer>] = &[
    entry("S", "Superficial", Layer::Superficial),
    entry("D", "Deep", Layer::Deep),
    entry("R", "Retina", Layer::Retina),
];

const ANGIOVUE_SIZE_ENTRIES: &[LabelEntry<&'static str>] = &[
    entry("3", "3x3", "3x3"),
    entry("6", "6x6", "6x6"),
];

const OCTA_INSTRUMENT_ENTRIES: &[LabelEntry<Instrument>] = &[
    entry("R", "Revo", Instrument::Revo),
    entry("S", "Spectralis", Instrument::Spectralis),
];

// Priority order for substring search: "SVC" must be tried before "Deep" etc.
const OCTA_LAYER_ENTRIES: &[LabelEntry<Layer>] = &[
    entry("R", "Retina", Layer::Retina),
    entry("S", "Superficial", Layer::Superficial),
    entry("SVC", "SVC", Layer::Svc),
    entry("SVP", "SVP", Layer::Svp),
    entry("DVC", "DVC", Layer::Dvc),
    entry("DCP", "DCP", Layer::Dcp),
    entry("D", "Deep", Layer::Deep),
];

/// Angiovue instrument codes
pub static ANGIOVUE_INSTRUMENTS: LabelTable<Instrument> =
    LabelTable::new(ANGIOVUE_INSTRUMENT_ENTRIES);

/// Angiovue layer codes (single letters)
pub static ANGIOVUE_LAYERS: LabelTable<Layer> = LabelTable::new(ANGIOVUE_LAYER_ENTRIES);

/// Angiovue size digits to field-of-view text
pub static ANGIOVUE_SIZES: LabelTable<&'static str> = LabelTable::new(ANGIOVUE_SIZE_ENTRIES);

/// Revo / Spectralis instrument codes
pub static OCTA_INSTRUMENTS: LabelTable<Instrument> = LabelTable::new(OCTA_INSTRUMENT_ENTRIES);

/// Revo / Spectralis layer tokens
pub static OCTA_LAYERS: LabelTable<Layer> = LabelTable::new(OCTA_LAYER_ENTRIES);

/// Field-of-view bucket derived from a millimetre reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeBucket {
    /// 3.3, 3.5 or 3.6
    Standard3,
    /// 3.4
    HighDensity3,
    /// 6.4
    Six,
    /// 10.6
    TenBySix,
}

impl SizeBucket {
    /// Filename tags, longest first so suffix matching is unambiguous
    const BY_TAG_LENGTH: [SizeBucket; 4] = [
        SizeBucket::HighDensity3,
        SizeBucket::TenBySix,
        SizeBucket::Standard3,
        SizeBucket::Six,
    ];

    /// Tag written at the end of a generic filename tag
    pub fn tag(self) -> &'static str {
        match self {
            SizeBucket::Standard3 => "3",
            SizeBucket::HighDensity3 => "3H",
            SizeBucket::Six => "6",
            SizeBucket::TenBySix => "10",
        }
    }

    /// Field-of-view text
    pub fn label(self) -> &'static str {
        match self {
            SizeBucket::Standard3 | SizeBucket::HighDensity3 => "3x3",
            SizeBucket::Six => "6x6",
            SizeBucket::TenBySix => "10x6",
        }
    }

    /// Bucket a millimetre value, truncated to one decimal place
    pub fn from_millimetres(mm: f64) -> Result<Self, NormalizeError> {
        if !mm.is_finite() || mm < 0.0 {
            return Err(NormalizeError::UnknownSize(mm.to_string()));
        }

        // Small epsilon so 3.3 * 10.0 lands on 33, not 32
        let tenths = (mm * 10.0 + 1e-9).floor() as i64;
        match tenths {
            33 | 35 | 36 => Ok(SizeBucket::Standard3),
            34 => Ok(SizeBucket::HighDensity3),
            64 => Ok(SizeBucket::Six),
            106 => Ok(SizeBucket::TenBySix),
            _ => Err(NormalizeError::UnknownSize(mm.to_string())),
        }
    }

    /// Bucket a Revo size folder such as `"3_400"`, read as `3.400`
    pub fn from_size_folder(name: &str) -> Result<Self, NormalizeError> {
        let value: f64 = name
            .replace('_', ".")
            .parse()
            .map_err(|_| NormalizeError::UnknownSize(name.to_string()))?;
        Self::from_millimetres(value).map_err(|_| NormalizeError::UnknownSize(name.to_string()))
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::BY_TAG_LENGTH.into_iter().find(|bucket| bucket.tag() == tag)
    }

    /// Split a trailing size tag off `text`, returning the remainder
    pub fn strip_tag(text: &str) -> Option<(&str, Self)> {
        Self::BY_TAG_LENGTH
            .into_iter()
            .find_map(|bucket| text.strip_suffix(bucket.tag()).map(|rest| (rest, bucket)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_round_trip<T: Copy + PartialEq + std::fmt::Debug>(table: &LabelTable<T>) {
        for entry in table.entries() {
            let value = table.to_canonical(entry.label).unwrap();
            assert_eq!(table.label_of(value), Some(entry.label));
            assert_eq!(table.from_code(entry.code), Some(value));
            assert_eq!(table.code_of(value), Some(entry.code));
        }
    }

    #[test]
    fn test_tables_round_trip() {
        assert_round_trip(&ANGIOVUE_INSTRUMENTS);
        assert_round_trip(&ANGIOVUE_LAYERS);
        assert_round_trip(&ANGIOVUE_SIZES);
        assert_round_trip(&OCTA_INSTRUMENTS);
        assert_round_trip(&OCTA_LAYERS);
    }

    #[test]
    fn test_unknown_label() {
        assert_eq!(
            OCTA_LAYERS.to_canonical("superficial"),
            Err(NormalizeError::UnknownLabel("superficial".to_string()))
        );
        assert!(ANGIOVUE_INSTRUMENTS.to_canonical("Revo").is_err());
    }

    #[test]
    fn test_find_in_priority() {
        assert_eq!(OCTA_LAYERS.find_in("Angio SVC Deep"), Some(Layer::Svc));
        assert_eq!(OCTA_LAYERS.find_in("Superficial"), Some(Layer::Superficial));
        assert_eq!(OCTA_LAYERS.find_in("Deep"), Some(Layer::Deep));
        assert_eq!(OCTA_LAYERS.find_in("Choroid"), None);
    }

    #[test]
    fn test_size_buckets() {
        assert_eq!(SizeBucket::from_millimetres(3.3), Ok(SizeBucket::Standard3));
        assert_eq!(SizeBucket::from_millimetres(3.5), Ok(SizeBucket::Standard3));
        assert_eq!(SizeBucket::from_millimetres(3.6), Ok(SizeBucket::Standard3));
        assert_eq!(SizeBucket::from_millimetres(3.4), Ok(SizeBucket::HighDensity3));
        assert_eq!(SizeBucket::from_millimetres(6.4), Ok(SizeBucket::Six));
        assert_eq!(SizeBucket::from_millimetres(10.6), Ok(SizeBucket::TenBySix));
        assert!(SizeBucket::from_millimetres(4.0).is_err());
        assert!(SizeBucket::from_millimetres(f64::NAN).is_err());
    }

    #[test]
    fn test_size_folder() {
        assert_eq!(SizeBucket::from_size_folder("3_400"), Ok(SizeBucket::HighDensity3));
        assert_eq!(SizeBucket::from_size_folder("3_300"), Ok(SizeBucket::Standard3));
        assert_eq!(SizeBucket::from_size_folder("3_512"), Ok(SizeBucket::Standard3));
        assert_eq!(SizeBucket::from_size_folder("6_400"), Ok(SizeBucket::Six));
        assert_eq!(SizeBucket::from_size_folder("10_600"), Ok(SizeBucket::TenBySix));
        assert!(SizeBucket::from_size_folder("wide").is_err());
    }

    #[test]
    fn test_strip_tag_prefers_longest() {
        assert_eq!(SizeBucket::strip_tag("S3H"), Some(("S", SizeBucket::HighDensity3)));
        assert_eq!(SizeBucket::strip_tag("D10"), Some(("D", SizeBucket::TenBySix)));
        assert_eq!(SizeBucket::strip_tag("SVC3"), Some(("SVC", SizeBucket::Standard3)));
        assert_eq!(SizeBucket::strip_tag("SVC"), None);
        assert_eq!(SizeBucket::from_tag("3H"), Some(SizeBucket::HighDensity3));
    }
}
