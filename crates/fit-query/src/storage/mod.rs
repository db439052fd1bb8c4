//! Storage layer for imported activities
//!
//! A single SQLite file holds the `activities` table. The handle is opened
//! once per command and passed explicitly to the import and query code.
//!
//! ## Storage Layout
//!
//! ```text
//! ~/.fit-query/
//! └── fit-query.db                 # activities table, unique on content_hash and filename
//! ```
//!
//! Start times are stored as UTC text (`2022-06-07 08:30:00+00:00`), so range
//! filters compare lexicographically and SQLite's `strftime` can extract the
//! year and month.

mod activity_db;
pub mod filter;

pub use activity_db::ActivityStore;
pub use filter::{build_filter, Clause, Filter, FilterCriteria};

use std::path::Path;

use crate::config;
use crate::error::Result;

/// Open the store at `path`, creating its directory on first use
pub fn open_store(path: &Path) -> Result<ActivityStore> {
    config::ensure_parent_dir(path)?;
    tracing::debug!(path = %path.display(), "opening activity store");
    ActivityStore::open(path)
}
