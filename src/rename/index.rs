/// Rename index
///
/// Built once per run from the registry rows that normalize under the
/// instrument's decomposer, then used read-only.

use log::{debug, info, warn};
use std::collections::HashMap;

use crate::decompose::Decomposer;
use crate::key::CanonicalKey;
use crate::registry::{ImageId, RegistryRow};

/// Two registry rows produced the same key with different image IDs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyConflict {
    pub key: CanonicalKey,
    pub previous: ImageId,
    pub replacement: ImageId,
    /// Spreadsheet row number of the replacing row (header is row 1)
    pub row: usize,
}

/// Canonical key -> image ID
#[derive(Debug, Default)]
pub struct RenameIndex {
    entries: HashMap<CanonicalKey, ImageId>,
    conflicts: Vec<KeyConflict>,
    dropped: usize,
    other_instruments: usize,
}

impl RenameIndex {
    /// Index every row the decomposer can normalize.
    ///
    /// Rows naming another instrument are passed over, rows that do not
    /// normalize are dropped. On duplicate keys the later row wins and the
    /// clash is recorded as a `KeyConflict`.
    pub fn build(rows: &[RegistryRow], decomposer: &dyn Decomposer) -> Self {
        let mut index = RenameIndex::default();

        for (position, row) in rows.iter().enumerate() {
            let row_number = position + 2;
            let instrument = decomposer.instrument();

            if let Some(label) = row.instrument.as_deref() {
                if label != instrument.name() {
                    index.other_instruments += 1;
                    continue;
                }
            }

            let key = match decomposer.registry_key(row) {
                Ok(key) => key,
                Err(e) => {
                    debug!("Registry row {}: not indexed for {} ({})", row_number, instrument, e);
                    index.dropped += 1;
                    continue;
                }
            };
            if key.instrument != instrument {
                index.other_instruments += 1;
                continue;
            }

            let Some(image_id) = row.image_id.clone() else {
                warn!(
                    "Registry row {}: key {} has a blank Image ID, not indexed",
                    row_number, key
                );
                index.dropped += 1;
                continue;
            };

            if let Some(previous) = index.entries.insert(key.clone(), image_id.clone()) {
                if previous != image_id {
                    warn!(
                        "Registry row {}: CONFLICT for key {}: Image ID {} replaces {}",
                        row_number, key, image_id, previous
                    );
                    index.conflicts.push(KeyConflict {
                        key,
                        previous,
                        replacement: image_id,
                        row: row_number,
                    });
                } else {
                    debug!("Registry row {}: duplicate of key {}", row_number, key);
                }
            }
        }

        info!(
            "Rename index for {}: {} keys, {} other-instrument rows, {} not indexed, {} conflicts",
            decomposer.instrument(),
            index.entries.len(),
            index.other_instruments,
            index.dropped,
            index.conflicts.len()
        );

        index
    }

    pub fn lookup(&self, key: &CanonicalKey) -> Option<&ImageId> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn conflicts(&self) -> &[KeyConflict] {
        &self.conflicts
    }

    /// Rows for this instrument left out of the index
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Rows that belong to a different instrument
    pub fn other_instruments(&self) -> usize {
        self.other_instruments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decompose::{AngiovueDecomposer, RevoDecomposer, SpectralisDecomposer};
    use crate::key::{Instrument, Layer};

    fn revo_row(pid: &str, layer: &str, image_id: Option<ImageId>) -> RegistryRow {
        RegistryRow {
            participant_id: Some(pid.to_string()),
            instrument: Some("Revo".to_string()),
            layer: Some(layer.to_string()),
            size_mm: Some("3x3".to_string()),
            size_scans: Some("400x400".to_string()),
            image_id,
        }
    }

    fn revo_key(pid: &str, layer: Layer) -> CanonicalKey {
        CanonicalKey {
            participant_id: pid.to_string(),
            instrument: Instrument::Revo,
            layer,
            field_of_view: "3x3".to_string(),
            scans: Some("400x400".to_string()),
        }
    }

    #[test]
    fn test_build_and_lookup() {
        let rows = vec![
            revo_row("OCTA-001", "Superficial", Some(ImageId::Numeric(42))),
            revo_row("OCTA-001", "Deep", Some(ImageId::Numeric(43))),
            revo_row("OCTA-001", "Choroid", Some(ImageId::Numeric(44))),
        ];

        let index = RenameIndex::build(&rows, &RevoDecomposer);
        assert_eq!(index.len(), 2);
        assert_eq!(index.dropped(), 1);
        assert_eq!(
            index.lookup(&revo_key("OCTA-001", Layer::Superficial)),
            Some(&ImageId::Numeric(42))
        );
        assert_eq!(index.lookup(&revo_key("OCTA-002", Layer::Superficial)), None);
    }

    #[test]
    fn test_conflicting_rows_are_reported() {
        let rows = vec![
            revo_row("OCTA-001", "Superficial", Some(ImageId::Numeric(42))),
            revo_row("OCTA-001", "Superficial", Some(ImageId::Numeric(77))),
        ];

        let index = RenameIndex::build(&rows, &RevoDecomposer);
        assert_eq!(index.len(), 1);
        assert_eq!(index.conflicts().len(), 1);

        let conflict = &index.conflicts()[0];
        assert_eq!(conflict.previous, ImageId::Numeric(42));
        assert_eq!(conflict.replacement, ImageId::Numeric(77));
        assert_eq!(conflict.row, 3);

        // Last write wins
        assert_eq!(
            index.lookup(&revo_key("OCTA-001", Layer::Superficial)),
            Some(&ImageId::Numeric(77))
        );
    }

    #[test]
    fn test_identical_duplicates_are_not_conflicts() {
        let rows = vec![
            revo_row("OCTA-001", "Deep", Some(ImageId::Numeric(5))),
            revo_row("OCTA-001", "Deep", Some(ImageId::Numeric(5))),
        ];
        let index = RenameIndex::build(&rows, &RevoDecomposer);
        assert_eq!(index.len(), 1);
        assert!(index.conflicts().is_empty());
    }

    #[test]
    fn test_blank_image_id_is_dropped() {
        let rows = vec![revo_row("OCTA-001", "Deep", None)];
        let index = RenameIndex::build(&rows, &RevoDecomposer);
        assert!(index.is_empty());
        assert_eq!(index.dropped(), 1);
    }

    #[test]
    fn test_other_instrument_rows_are_passed_over() {
        let rows = vec![revo_row("OCTA-001", "Deep", Some(ImageId::Numeric(5)))];
        let index = RenameIndex::build(&rows, &AngiovueDecomposer);
        assert!(index.is_empty());
        assert_eq!(index.dropped(), 0);
        assert_eq!(index.other_instruments(), 1);
    }

    #[test]
    fn test_revo_and_spectralis_rows_stay_apart() {
        let spectralis = RegistryRow {
            instrument: Some("Spectralis".to_string()),
            ..revo_row("OCTA-001", "Deep", Some(ImageId::Numeric(6)))
        };
        let rows = vec![
            revo_row("OCTA-001", "Deep", Some(ImageId::Numeric(5))),
            spectralis,
            revo_row("OCTA-001", "Choroid", Some(ImageId::Numeric(7))),
        ];

        let index = RenameIndex::build(&rows, &RevoDecomposer);
        assert_eq!(index.len(), 1);
        assert_eq!(index.other_instruments(), 1);
        assert_eq!(index.dropped(), 1);

        let index = RenameIndex::build(&rows, &SpectralisDecomposer);
        assert_eq!(index.len(), 1);
        assert_eq!(index.other_instruments(), 2);
        assert_eq!(index.dropped(), 0);
    }
}
