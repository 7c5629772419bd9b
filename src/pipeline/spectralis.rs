/// Spectralis run
///
/// 1. normalize: display-named exports -> generic `{pid}_S{layer}3` names,
///    resolving the patient name through the name table
/// 2. rename: generic names -> `{imageID}.{ext}`

use log::{error, info, warn};
use std::io;
use std::path::Path;

use super::{list_files, match_stage, RunReport, StageReport};
use crate::decompose::{NameDirectory, SpectralisDecomposer};
use crate::registry::{NameRow, RegistryRow};
use crate::rename::{rename_to, RenameIndex};

/// Run both Spectralis stages over the flat folder `folder`
pub fn run(folder: &Path, rows: &[RegistryRow], names: &[NameRow]) -> io::Result<RunReport> {
    info!("Relabeling Spectralis exports in {}", folder.display());
    let mut report = RunReport::default();

    let directory = NameDirectory::new(names);
    info!("Name table holds {} participants", directory.len());
    report.push(normalize_stage(folder, &directory)?);

    let index = RenameIndex::build(rows, &SpectralisDecomposer);
    let files: Vec<_> = list_files(folder)?
        .into_iter()
        .filter(|path| !SpectralisDecomposer::is_raw_export(path))
        .collect();
    report.push(match_stage("rename", &files, &index, &SpectralisDecomposer));

    Ok(report)
}

/// Rename display-named exports into the generic form
pub fn normalize_stage(folder: &Path, names: &NameDirectory) -> io::Result<StageReport> {
    let mut stage = StageReport::new("normalize");

    for path in list_files(folder)? {
        if !SpectralisDecomposer::is_raw_export(&path) {
            continue;
        }

        let new_name = match SpectralisDecomposer.normalize_display_name(&path, names) {
            Ok(name) => name,
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                stage.skipped += 1;
                continue;
            }
        };

        match rename_to(&path, &new_name) {
            Ok(target) => {
                info!("{} -> {}", path.display(), target.display());
                stage.renamed += 1;
            }
            Err(e) => {
                error!("Cannot rename {} to {}: {}", path.display(), new_name, e);
                stage.failed += 1;
            }
        }
    }

    Ok(stage)
}
