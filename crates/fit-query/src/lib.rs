pub mod cli;
pub mod config;
pub mod error;
pub mod fit;
pub mod import;
pub mod models;
pub mod query;
pub mod storage;

pub use error::{FitQueryError, Result};
pub use models::ActivityRecord;
pub use storage::ActivityStore;
