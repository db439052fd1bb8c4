//! Import command for fit-query

use std::path::Path;

use crate::error::Result;
use crate::import::{import_directory, ConsoleProgress};
use crate::storage::ActivityStore;

/// Import every new activity file under `workout_dir`
pub fn run(store: &ActivityStore, workout_dir: &Path) -> Result<()> {
    let report = import_directory(store, workout_dir, ConsoleProgress)?;

    if report.saved > 0 {
        tracing::info!(
            saved = report.saved,
            stored = store.count()?,
            "activities imported"
        );
    }

    Ok(())
}
