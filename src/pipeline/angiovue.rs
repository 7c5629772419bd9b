/// Angiovue run
///
/// 1. previews: delete `.png` preview images
/// 2. convert: `.raw` float buffers -> 8-bit TIFF/BMP (optional)
/// 3. rename: match images against the registry

use log::{error, info, warn};
use std::fs;
use std::io;
use std::path::Path;

use super::{has_extension, list_files, match_stage, RunReport, StageReport};
use crate::decompose::AngiovueDecomposer;
use crate::error::RawError;
use crate::raw::{convert_raw_file, OutputFormat};
use crate::registry::RegistryRow;
use crate::rename::RenameIndex;

const PREVIEW_EXTENSIONS: &[&str] = &["png"];
const RAW_EXTENSIONS: &[&str] = &["raw"];
const IMAGE_EXTENSIONS: &[&str] = &["bmp", "tif", "tiff"];
const IMAGE_AND_RAW_EXTENSIONS: &[&str] = &["raw", "bmp", "tif", "tiff"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AngiovueOptions {
    /// Convert `.raw` buffers before renaming; otherwise rename them as-is
    pub convert_raw: bool,
    pub delete_previews: bool,
    pub format: OutputFormat,
}

impl Default for AngiovueOptions {
    fn default() -> Self {
        Self {
            convert_raw: true,
            delete_previews: true,
            format: OutputFormat::Tiff,
        }
    }
}

/// Run all Angiovue stages over the flat folder `folder`
pub fn run(
    folder: &Path,
    rows: &[RegistryRow],
    options: &AngiovueOptions,
) -> io::Result<RunReport> {
    info!("Relabeling Angiovue exports in {}", folder.display());
    let mut report = RunReport::default();

    if options.delete_previews {
        report.push(delete_previews(folder)?);
    }

    if options.convert_raw {
        report.push(convert_stage(folder, options.format)?);
    }

    let index = RenameIndex::build(rows, &AngiovueDecomposer);
    let extensions = if options.convert_raw {
        IMAGE_EXTENSIONS
    } else {
        IMAGE_AND_RAW_EXTENSIONS
    };
    let files: Vec<_> = list_files(folder)?
        .into_iter()
        .filter(|path| has_extension(path, extensions))
        .collect();
    report.push(match_stage("rename", &files, &index, &AngiovueDecomposer));

    Ok(report)
}

/// Remove every `.png` in the folder
pub fn delete_previews(folder: &Path) -> io::Result<StageReport> {
    let mut stage = StageReport::new("previews");

    for path in list_files(folder)? {
        if !has_extension(&path, PREVIEW_EXTENSIONS) {
            continue;
        }
        match fs::remove_file(&path) {
            Ok(()) => {
                info!("Deleted preview {}", path.display());
                stage.deleted += 1;
            }
            Err(e) => {
                error!("Cannot delete preview {}: {}", path.display(), e);
                stage.failed += 1;
            }
        }
    }

    Ok(stage)
}

/// Convert every `.raw` in the folder, keeping any buffer that fails
pub fn convert_stage(folder: &Path, format: OutputFormat) -> io::Result<StageReport> {
    let mut stage = StageReport::new("convert");

    for path in list_files(folder)? {
        if !has_extension(&path, RAW_EXTENSIONS) {
            continue;
        }
        match convert_raw_file(&path, format) {
            Ok(output) => {
                info!("Converted {} -> {}", path.display(), output.display());
                stage.converted += 1;
            }
            Err(RawError::UnsupportedGeometry(stem)) => {
                warn!(
                    "Unable to identify {}: '{}' does not end in 3 or 6, skipping",
                    path.display(),
                    stem
                );
                stage.skipped += 1;
            }
            Err(e) => {
                error!("Failed to convert {}: {} (source kept)", path.display(), e);
                stage.failed += 1;
            }
        }
    }

    Ok(stage)
}
