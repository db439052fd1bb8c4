use std::path::{Path, PathBuf};

use thiserror::Error;

/// Main error type for fit-query
#[derive(Error, Debug)]
pub enum FitQueryError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Malformed activity file {}: {reason}", path.display())]
    MalformedFile { path: PathBuf, reason: String },

    #[error("Duplicate activity: {0}")]
    DuplicateRecord(String),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Invalid date format: {0}. Expected YYYY-MM-DD")]
    InvalidDateFormat(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, FitQueryError>;

impl FitQueryError {
    /// Create a malformed file error for the given path
    pub fn malformed(path: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        Self::MalformedFile {
            path: path.as_ref().to_path_buf(),
            reason: reason.into(),
        }
    }

    /// Create an invalid filter error from a message
    pub fn invalid_filter(msg: impl Into<String>) -> Self {
        Self::InvalidFilter(msg.into())
    }

    /// Create a configuration error from a message
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Render an error for the terminal, adding a hint where one helps
pub fn format_user_error(err: &FitQueryError) -> String {
    match err {
        FitQueryError::MalformedFile { .. } => format!(
            "{}\nActivities saved before this file were kept; fix or remove it and re-run the import.",
            err
        ),
        FitQueryError::DuplicateRecord(_) => format!(
            "{}\nThe database already holds this activity under another fingerprint or file name.",
            err
        ),
        _ => err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FitQueryError::NotFound("/tmp/missing".to_string());
        assert_eq!(err.to_string(), "Not found: /tmp/missing");
    }

    #[test]
    fn test_malformed_file_carries_path() {
        let err = FitQueryError::malformed("/data/run.fit", "no session record");
        assert_eq!(
            err.to_string(),
            "Malformed activity file /data/run.fit: no session record"
        );
    }

    #[test]
    fn test_invalid_date_format_error() {
        let err = FitQueryError::InvalidDateFormat("not-a-date".to_string());
        assert!(err.to_string().contains("not-a-date"));
        assert!(err.to_string().contains("YYYY-MM-DD"));
    }

    #[test]
    fn test_error_constructors() {
        let filter_err = FitQueryError::invalid_filter("month must be 1-12");
        assert!(matches!(filter_err, FitQueryError::InvalidFilter(_)));

        let config_err = FitQueryError::config("no home");
        assert!(matches!(config_err, FitQueryError::Config(_)));
    }

    #[test]
    fn test_format_user_error_adds_hint() {
        let err = FitQueryError::malformed("a.fit", "truncated");
        let msg = format_user_error(&err);
        assert!(msg.starts_with("Malformed activity file a.fit"));
        assert!(msg.contains("re-run the import"));

        let err = FitQueryError::NotFound("x".to_string());
        assert_eq!(format_user_error(&err), "Not found: x");
    }
}
