use crate::error::{FitQueryError, Result};
use std::path::{Path, PathBuf};

/// Directory under the user's home holding the database
const CONFIG_DIR_NAME: &str = ".fit-query";

/// Database file name inside the config directory
const DB_FILE_NAME: &str = "fit-query.db";

/// Environment variable kept for compatibility with older installs
pub const LEGACY_DB_ENV: &str = "DB_PATH";

/// Get the configuration directory path (~/.fit-query)
pub fn config_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|p| p.join(CONFIG_DIR_NAME))
        .ok_or_else(|| FitQueryError::config("Could not determine home directory"))
}

/// Default database location (~/.fit-query/fit-query.db)
pub fn default_db_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(DB_FILE_NAME))
}

/// Resolve the database path.
///
/// Precedence: explicit override (`--db` or `FIT_QUERY_DB`), then `DB_PATH`,
/// then the default under the home directory.
pub fn resolve_db_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
    let legacy = std::env::var_os(LEGACY_DB_ENV).map(PathBuf::from);
    pick_db_path(explicit, legacy, default_db_path)
}

fn pick_db_path(
    explicit: Option<PathBuf>,
    legacy: Option<PathBuf>,
    default: impl FnOnce() -> Result<PathBuf>,
) -> Result<PathBuf> {
    match explicit.or(legacy) {
        Some(path) if path.as_os_str().is_empty() => {
            Err(FitQueryError::config("Database path must not be empty"))
        }
        Some(path) => Ok(path),
        None => default(),
    }
}

/// Ensure the directory holding `path` exists, creating it if necessary
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fallback() -> Result<PathBuf> {
        Ok(PathBuf::from("/home/test/.fit-query/fit-query.db"))
    }

    #[test]
    fn test_default_db_path() {
        let path = default_db_path().unwrap();
        assert!(path.ends_with(".fit-query/fit-query.db"));
    }

    #[test]
    fn test_explicit_path_wins() {
        let path = pick_db_path(
            Some(PathBuf::from("/tmp/a.db")),
            Some(PathBuf::from("/tmp/b.db")),
            fallback,
        )
        .unwrap();
        assert_eq!(path, PathBuf::from("/tmp/a.db"));
    }

    #[test]
    fn test_legacy_env_before_default() {
        let path = pick_db_path(None, Some(PathBuf::from("/tmp/b.db")), fallback).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/b.db"));

        let path = pick_db_path(None, None, fallback).unwrap();
        assert!(path.ends_with("fit-query.db"));
    }

    #[test]
    fn test_empty_path_rejected() {
        let err = pick_db_path(Some(PathBuf::new()), None, fallback).unwrap_err();
        assert!(matches!(err, FitQueryError::Config(_)));
    }

    #[test]
    fn test_ensure_parent_dir_creates_missing() {
        let temp = TempDir::new().unwrap();
        let db = temp.path().join("nested").join("dir").join("fit-query.db");

        ensure_parent_dir(&db).unwrap();
        assert!(db.parent().unwrap().is_dir());

        // Second call is a no-op
        ensure_parent_dir(&db).unwrap();
    }
}
