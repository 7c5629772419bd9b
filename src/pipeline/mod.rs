/// Per-instrument relabeling runs
///
/// Each run is a short sequence of stages. A stage works on a fresh, sorted
/// listing of the directory so it sees what earlier stages left behind. The
/// unit of failure is always one file: a bad file is logged and counted,
/// never allowed to stop the batch.

pub mod angiovue;
pub mod revo;
pub mod spectralis;

use log::{debug, info, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::decompose::Decomposer;
use crate::rename::{relabel_file, Outcome, RenameIndex};

/// Tally of one stage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageReport {
    pub stage: &'static str,
    pub renamed: usize,
    pub converted: usize,
    pub deleted: usize,
    pub unmatched: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl StageReport {
    pub fn new(stage: &'static str) -> Self {
        Self {
            stage,
            ..Self::default()
        }
    }

    pub fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Renamed(_) => self.renamed += 1,
            Outcome::Unmatched(_) | Outcome::Unrecognized(_) => self.unmatched += 1,
            Outcome::Skipped(_) => self.skipped += 1,
            Outcome::Failed(_) => self.failed += 1,
        }
    }

    pub fn log_summary(&self) {
        info!(
            "[{}] renamed {}, converted {}, deleted {}, unmatched {}, skipped {}, failed {}",
            self.stage,
            self.renamed,
            self.converted,
            self.deleted,
            self.unmatched,
            self.skipped,
            self.failed
        );
    }
}

/// All stages of one run, in order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub stages: Vec<StageReport>,
}

impl RunReport {
    pub fn push(&mut self, stage: StageReport) {
        stage.log_summary();
        self.stages.push(stage);
    }

    pub fn stage(&self, name: &str) -> Option<&StageReport> {
        self.stages.iter().find(|s| s.stage == name)
    }

    /// Files that ended the run in an error state
    pub fn failures(&self) -> usize {
        self.stages.iter().map(|s| s.failed).sum()
    }
}

/// Regular, non-hidden files directly inside `dir`, sorted by name
pub fn list_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    // Only an unreadable directory is fatal; a bad entry is logged and left out
    for entry in fs::read_dir(dir)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Cannot read an entry of {}: {}", dir.display(), e);
                continue;
            }
        };
        let path = entry.path();
        match entry.file_type() {
            Ok(file_type) if file_type.is_file() => {}
            Ok(_) => continue,
            Err(e) => {
                warn!("Cannot stat {}: {}", path.display(), e);
                continue;
            }
        }
        if is_hidden(&path) {
            debug!("Ignoring hidden file {}", path.display());
            continue;
        }
        files.push(path);
    }

    files.sort();
    Ok(files)
}

pub(crate) fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

/// Case-insensitive extension check
pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .map(|ext| {
            let ext = ext.to_string_lossy().to_lowercase();
            extensions.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Relabel every file in `files` against `index`
pub fn match_stage(
    stage: &'static str,
    files: &[PathBuf],
    index: &RenameIndex,
    decomposer: &dyn Decomposer,
) -> StageReport {
    let mut report = StageReport::new(stage);
    for path in files {
        let outcome = relabel_file(path, index, decomposer);
        report.record(&outcome);
    }
    report
}
