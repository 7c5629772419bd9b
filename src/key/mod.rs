/// Canonical image keys
///
/// A key is the normalized identity of one registry-described image.
/// Registry rows and on-disk filenames are both reduced to this shape
/// before they are compared.

pub mod normalize;

use std::fmt;

/// Imaging instrument that produced an export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Instrument {
    Angiovue,
    Revo,
    Spectralis,
}

impl Instrument {
    /// Name as written in the registry's Instrument column
    pub fn name(self) -> &'static str {
        match self {
            Instrument::Angiovue => "Angiovue",
            Instrument::Revo => "Revo",
            Instrument::Spectralis => "Spectralis",
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Retinal depth slice isolated by a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    Superficial,
    Deep,
    Retina,
    Svc,
    Svp,
    Dvc,
    Dcp,
}

impl Layer {
    /// Name as written in the registry's Retinal Layer column
    pub fn name(self) -> &'static str {
        match self {
            Layer::Superficial => "Superficial",
            Layer::Deep => "Deep",
            Layer::Retina => "Retina",
            Layer::Svc => "SVC",
            Layer::Svp => "SVP",
            Layer::Dvc => "DVC",
            Layer::Dcp => "DCP",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Normalized tuple identifying one image in the study registry.
///
/// Equality is exact and case-sensitive on every field. Angiovue keys have no
/// scan count; Revo and Spectralis keys always carry one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalKey {
    pub participant_id: String,
    pub instrument: Instrument,
    pub layer: Layer,
    /// Field of view as registry text, e.g. "3x3"
    pub field_of_view: String,
    /// Scan grid as registry text, e.g. "400x400"
    pub scans: Option<String>,
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}, {}, {})",
            self.participant_id,
            self.instrument,
            self.layer,
            self.field_of_view,
            self.scans.as_deref().unwrap_or("-")
        )
    }
}

/// Build a square dimension string, `"3"` -> `"3x3"`
pub fn square(side: &str) -> String {
    format!("{side}x{side}")
}
