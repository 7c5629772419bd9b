/// Match & rename
///
/// Renames are moves within the same directory. An existing target is never
/// replaced: the rename is refused and both files stay where they are.

use log::{error, info, warn};
use std::fs;
use std::path::{Component, Path, PathBuf};

use super::index::RenameIndex;
use crate::decompose::Decomposer;
use crate::error::{DecomposeError, RenameError};
use crate::key::CanonicalKey;

/// What happened to one file
#[derive(Debug)]
pub enum Outcome {
    /// Renamed to the contained path
    Renamed(PathBuf),
    /// Decomposed, but the key is not in the index
    Unmatched(CanonicalKey),
    /// Parsed, but carries an instrument, layer or size code no table knows
    Unrecognized(DecomposeError),
    /// Could not be decomposed
    Skipped(DecomposeError),
    /// Matched, but the rename itself failed
    Failed(RenameError),
}

/// Whether `name` is exactly one normal path component
fn is_plain_file_name(name: &str) -> bool {
    if name.contains(|c: char| c == '/' || c == '\\') {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Move `path` to `new_name` in the same directory without overwriting
pub fn rename_to(path: &Path, new_name: &str) -> Result<PathBuf, RenameError> {
    // Text Image IDs come straight from the registry
    if !is_plain_file_name(new_name) {
        return Err(RenameError::InvalidName(new_name.to_string()));
    }

    let parent = path
        .parent()
        .ok_or_else(|| RenameError::NoFileName(path.to_path_buf()))?;
    let target = parent.join(new_name);

    // symlink_metadata also catches dangling links at the target
    if fs::symlink_metadata(&target).is_ok() {
        return Err(RenameError::Collision(target));
    }

    fs::rename(path, &target)?;
    Ok(target)
}

/// Rename to `{new_stem}.{original extension}`
pub fn rename_in_place(path: &Path, new_stem: &str) -> Result<PathBuf, RenameError> {
    let new_name = match path.extension() {
        Some(ext) => format!("{}.{}", new_stem, ext.to_string_lossy()),
        None => new_stem.to_string(),
    };
    rename_to(path, &new_name)
}

/// Decompose, look up and rename a single file, logging the outcome
pub fn relabel_file(path: &Path, index: &RenameIndex, decomposer: &dyn Decomposer) -> Outcome {
    let key = match decomposer.decompose(path) {
        Ok(key) => key,
        Err(e) if e.is_unknown_token() => {
            warn!("No registry match for {}: {}; leaving it untouched", path.display(), e);
            return Outcome::Unrecognized(e);
        }
        Err(e) => {
            warn!("Skipping {}: {}", path.display(), e);
            return Outcome::Skipped(e);
        }
    };

    let Some(image_id) = index.lookup(&key) else {
        warn!("No registry match for {} (key {}); leaving it untouched", path.display(), key);
        return Outcome::Unmatched(key);
    };

    match rename_in_place(path, &image_id.to_string()) {
        Ok(target) => {
            info!("{} -> {}", path.display(), target.display());
            Outcome::Renamed(target)
        }
        Err(e) => {
            error!("Cannot rename {} to Image ID {}: {}", path.display(), image_id, e);
            Outcome::Failed(e)
        }
    }
}
