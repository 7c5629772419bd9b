/// Revo run
///
/// The export tree is `<root>/<studyFolder>/<sizeFolder>/<file>`.
/// 1. normalize: raw leaf names -> generic `{pid}_R{layer}{size}` names
/// 2. rename: generic names -> `{imageID}.{ext}`

use log::{error, info, warn};
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::{is_hidden, match_stage, RunReport, StageReport};
use crate::decompose::RevoDecomposer;
use crate::registry::RegistryRow;
use crate::rename::{rename_to, RenameIndex};

/// Depth of image files below the root
const LEAF_DEPTH: usize = 3;

/// Run both Revo stages over the tree at `root`
pub fn run(root: &Path, rows: &[RegistryRow]) -> io::Result<RunReport> {
    if !root.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("Revo export folder {} does not exist", root.display()),
        ));
    }

    info!("Relabeling Revo exports in {}", root.display());
    let mut report = RunReport::default();

    report.push(normalize_stage(root));

    let index = RenameIndex::build(rows, &RevoDecomposer);
    // Raw exports that survived pass 1 were already reported there
    let files: Vec<_> = leaf_files(root)
        .into_iter()
        .filter(|path| !RevoDecomposer::is_raw_export(path))
        .collect();
    report.push(match_stage("rename", &files, &index, &RevoDecomposer));

    Ok(report)
}

/// Rename raw exports (names with a space) into the generic form
pub fn normalize_stage(root: &Path) -> StageReport {
    let mut stage = StageReport::new("normalize");

    for path in leaf_files(root) {
        if !RevoDecomposer::is_raw_export(&path) {
            continue;
        }

        let new_name = match RevoDecomposer.normalize_raw_name(&path) {
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

    stage
}

/// Visible files exactly three levels below `root`, sorted
pub fn leaf_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .min_depth(LEAF_DEPTH)
        .max_depth(LEAF_DEPTH)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Cannot read part of {}: {}", root.display(), e);
                continue;
            }
        };

        if !entry.file_type().is_file() || is_hidden(entry.path()) {
            continue;
        }
        files.push(entry.into_path());
    }

    files
}
