//! Deduplicating import of activity files
//!
//! - Collect `.fit` files under a directory
//! - Drop files whose fingerprint is already known to the store
//! - Decode the rest lazily, one record per `next()`, in path order
//!
//! The first file that fails to decode ends the import. Records saved before
//! the failure are kept.

mod progress;

pub use progress::{ConsoleProgress, ImportEvent, ImportProgress};

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::fit;
use crate::models::ActivityRecord;
use crate::storage::ActivityStore;

/// Lazy sequence of decoded activities not yet in the store
pub struct Importer<P: ImportProgress> {
    pending: std::vec::IntoIter<PathBuf>,
    total: usize,
    index: usize,
    failed: bool,
    progress: P,
}

impl<P: ImportProgress> Importer<P> {
    /// Plan an import of `root`, skipping files whose fingerprint is in `known_hashes`.
    ///
    /// Identical files inside `root` are imported once, under the first path.
    pub fn new(root: &Path, known_hashes: &HashSet<String>, mut progress: P) -> Result<Self> {
        let candidates = fit::collect_activity_files(root)?;
        let mut seen = HashSet::new();
        let mut pending = Vec::new();

        for path in candidates {
            let hash = fit::fingerprint_file(&path)?;
            if known_hashes.contains(&hash) {
                tracing::debug!(path = %path.display(), "already imported");
                continue;
            }
            if !seen.insert(hash) {
                tracing::debug!(path = %path.display(), "duplicate content in this batch");
                continue;
            }
            pending.push(path);
        }

        let total = pending.len();
        tracing::info!(root = %root.display(), total, "planned import");
        if total == 0 {
            progress.on_event(&ImportEvent::NothingToImport);
        }

        Ok(Self {
            pending: pending.into_iter(),
            total,
            index: 0,
            failed: false,
            progress,
        })
    }

    /// Number of files that will be decoded, fixed before decoding starts
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn progress_mut(&mut self) -> &mut P {
        &mut self.progress
    }

    pub fn into_progress(self) -> P {
        self.progress
    }
}

impl<P: ImportProgress> Iterator for Importer<P> {
    type Item = Result<ActivityRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let path = self.pending.next()?;

        match fit::decode_file(&path) {
            Ok(record) => {
                self.index += 1;
                self.progress.on_event(&ImportEvent::Parsed {
                    index: self.index,
                    total: self.total,
                    path,
                });
                Some(Ok(record))
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "decode failed, stopping import");
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

/// Outcome of [`import_directory`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportReport {
    /// Files left to import after dedup
    pub total: usize,
    /// Records written to the store
    pub saved: usize,
}

/// Import every new activity file under `root` into `store`.
///
/// Each record is saved as soon as it is decoded.
pub fn import_directory<P: ImportProgress>(
    store: &ActivityStore,
    root: &Path,
    progress: P,
) -> Result<ImportReport> {
    let known = store.all_hashes()?;
    let mut importer = Importer::new(root, &known, progress)?;
    let total = importer.total();
    let mut saved = 0;

    while let Some(record) = importer.next() {
        let record = record?;
        store.save(&record)?;
        saved += 1;
        importer.progress_mut().on_event(&ImportEvent::Saved {
            index: saved,
            total,
            filename: record.filename,
        });
    }

    tracing::info!(total, saved, "import finished");
    Ok(ImportReport { total, saved })
}
