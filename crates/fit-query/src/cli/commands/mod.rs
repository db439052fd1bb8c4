pub mod import;
pub mod query;

pub use import::run as import_files;
pub use query::{parse_date, run as query};
