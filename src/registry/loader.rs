/// Spreadsheet loader
///
/// Reads the first worksheet of a registry workbook with calamine and
/// extracts the configured columns into `RegistryRow`s, or the first three
/// positional columns into `NameRow`s. Sheet order is preserved.

use calamine::{open_workbook_auto, Data, Range, Reader};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::data::{ImageId, NameRow, RegistryRow};
use crate::error::RegistryLoadError;

/// Header names of the registry columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryColumns {
    pub participant_id: String,
    pub instrument: String,
    pub layer: String,
    pub size_mm: String,
    pub size_scans: String,
    pub image_id: String,
}

impl Default for RegistryColumns {
    fn default() -> Self {
        Self {
            participant_id: "Study participant ID".to_string(),
            instrument: "Instrument".to_string(),
            layer: "Retinal Layer".to_string(),
            size_mm: "Image size [mm]".to_string(),
            size_scans: "Image size [scans]".to_string(),
            image_id: "Image ID".to_string(),
        }
    }
}

/// First worksheet of a workbook; the first row is the header
pub struct RegistryTable {
    range: Range<Data>,
}

impl RegistryTable {
    /// Open a workbook (xlsx, xlsm, xls, ods) and take its first worksheet
    pub fn open(path: &Path) -> Result<Self, RegistryLoadError> {
        let mut workbook = open_workbook_auto(path).map_err(|source| RegistryLoadError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| RegistryLoadError::NoWorksheet(path.to_path_buf()))?
            .map_err(|source| RegistryLoadError::Open {
                path: path.to_path_buf(),
                source,
            })?;

        info!(
            "Loaded {} ({} rows x {} columns)",
            path.display(),
            range.height(),
            range.width()
        );

        Ok(Self { range })
    }

    /// Wrap an already loaded range
    pub fn from_range(range: Range<Data>) -> Self {
        Self { range }
    }

    /// Index of the header cell named exactly `name`
    pub fn column_index(&self, name: &str) -> Result<usize, RegistryLoadError> {
        self.range
            .rows()
            .next()
            .and_then(|header| {
                header
                    .iter()
                    .position(|cell| cell_text(cell).as_deref() == Some(name))
            })
            .ok_or_else(|| RegistryLoadError::MissingColumn(name.to_string()))
    }

    /// Data rows, header excluded
    pub fn data_rows(&self) -> impl Iterator<Item = &[Data]> {
        self.range.rows().skip(1)
    }
}

/// Render a cell as registry text; blank cells are `None`.
///
/// Integral floats drop their fractional part so a participant ID typed as a
/// number reads back as "1001", not "1001.0".
pub fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(text) if text.is_empty() => None,
        Data::String(text) => Some(text.clone()),
        Data::Int(value) => Some(value.to_string()),
        Data::Float(value) if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 => {
            Some(format!("{}", *value as i64))
        }
        other => Some(other.to_string()),
    }
}

/// Interpret an Image ID cell.
///
/// Anything that converts to an integer is numeric (floats truncate);
/// anything else non-blank is passed through as text.
pub fn image_id(cell: &Data) -> Option<ImageId> {
    match cell {
        Data::Int(value) => Some(ImageId::Numeric(*value)),
        Data::Float(value) if value.is_finite() => Some(ImageId::Numeric(value.trunc() as i64)),
        Data::String(text) => match text.trim().parse::<i64>() {
            Ok(value) => Some(ImageId::Numeric(value)),
            Err(_) if text.trim().is_empty() => None,
            Err(_) => Some(ImageId::Text(text.clone())),
        },
        other => cell_text(other).map(ImageId::Text),
    }
}

fn cell_at(row: &[Data], index: usize) -> Option<&Data> {
    row.get(index)
}

/// Extract registry rows.
///
/// `with_scans` requires the scans column as well (Revo / Spectralis runs).
pub fn load_registry(
    table: &RegistryTable,
    columns: &RegistryColumns,
    with_scans: bool,
) -> Result<Vec<RegistryRow>, RegistryLoadError> {
    let participant_col = table.column_index(&columns.participant_id)?;
    let instrument_col = table.column_index(&columns.instrument)?;
    let layer_col = table.column_index(&columns.layer)?;
    let size_mm_col = table.column_index(&columns.size_mm)?;
    let scans_col = if with_scans {
        Some(table.column_index(&columns.size_scans)?)
    } else {
        None
    };
    let image_id_col = table.column_index(&columns.image_id)?;

    let text = |row: &[Data], index: usize| cell_at(row, index).and_then(cell_text);

    let rows: Vec<RegistryRow> = table
        .data_rows()
        .map(|row| RegistryRow {
            participant_id: text(row, participant_col),
            instrument: text(row, instrument_col),
            layer: text(row, layer_col),
            size_mm: text(row, size_mm_col),
            size_scans: scans_col.and_then(|col| text(row, col)),
            image_id: cell_at(row, image_id_col).and_then(image_id),
        })
        .collect();

    info!("Read {} registry rows", rows.len());
    Ok(rows)
}

/// Extract the Spectralis name table: given name, surname, participant ID
/// by position. Incomplete rows are skipped.
pub fn load_names(table: &RegistryTable) -> Vec<NameRow> {
    let mut names = Vec::new();

    for (index, row) in table.data_rows().enumerate() {
        let given = cell_at(row, 0).and_then(cell_text);
        let surname = cell_at(row, 1).and_then(cell_text);
        let participant = cell_at(row, 2).and_then(cell_text);

        match (given, surname, participant) {
            (Some(given_name), Some(surname), Some(participant_id)) => names.push(NameRow {
                given_name,
                surname,
                participant_id,
            }),
            _ => debug!("Name table row {} is incomplete, skipping", index + 2),
        }
    }

    info!("Read {} name table rows", names.len());
    names
}

/// Open and read the registry workbook
pub fn load_registry_file(
    path: &Path,
    columns: &RegistryColumns,
    with_scans: bool,
) -> Result<Vec<RegistryRow>, RegistryLoadError> {
    let table = RegistryTable::open(path)?;
    load_registry(&table, columns, with_scans)
}

/// Open and read the name table workbook
pub fn load_names_file(path: &Path) -> Result<Vec<NameRow>, RegistryLoadError> {
    let table = RegistryTable::open(path)?;
    Ok(load_names(&table))
}
