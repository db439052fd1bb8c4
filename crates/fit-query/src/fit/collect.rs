//! Recursive discovery of activity files

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{FitQueryError, Result};

/// File extensions treated as activity files (compared case-insensitively)
pub const ACTIVITY_EXTENSIONS: &[&str] = &["fit"];

/// Collect every regular file under `root`, recursing into subdirectories.
///
/// Paths are absolute and sorted so repeated runs see the same order.
pub fn collect_files(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.exists() {
        return Err(FitQueryError::NotFound(format!(
            "Directory does not exist: {}",
            root.display()
        )));
    }
    if !root.is_dir() {
        return Err(FitQueryError::NotFound(format!(
            "Not a directory: {}",
            root.display()
        )));
    }

    let root = root.canonicalize()?;
    let mut files = Vec::new();

    for entry in WalkDir::new(&root).follow_links(false) {
        let entry = entry.map_err(std::io::Error::from)?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }

    files.sort();
    tracing::debug!(root = %root.display(), count = files.len(), "collected files");
    Ok(files)
}

/// Whether `path` has one of the [`ACTIVITY_EXTENSIONS`]
pub fn is_activity_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            ACTIVITY_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
        .unwrap_or(false)
}

/// Collect files under `root` and keep only activity files
pub fn collect_activity_files(root: &Path) -> Result<Vec<PathBuf>> {
    let files: Vec<PathBuf> = collect_files(root)?
        .into_iter()
        .filter(|p| is_activity_file(p))
        .collect();
    Ok(files)
}
