//! SQLite-backed activity store
//!
//! One `activities` table keyed by content hash. Every statement is logged at
//! debug level so `--show-sql` can surface it.

use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use rusqlite::types::Type;
use rusqlite::{params, params_from_iter, Connection, ErrorCode, Row};

use super::filter::Filter;
use crate::error::{FitQueryError, Result};
use crate::models::{ActivityRecord, GeoPosition};

/// Timestamps are stored as UTC text so they sort lexicographically
pub(crate) const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S+00:00";

const SELECT_COLUMNS: &str = "id, content_hash, filename, start_time, sport, total_distance,
    avg_heart_rate, max_heart_rate, enhanced_avg_speed, enhanced_max_speed, total_calories,
    total_timer_time, total_elapsed_time, total_ascent, total_descent, enhanced_max_altitude,
    enhanced_min_altitude, total_training_effect, feeling, start_position_lat,
    start_position_long, created_at";

/// SQLite database holding imported activities
pub struct ActivityStore {
    conn: Connection,
}

impl ActivityStore {
    /// Open or create the activity database
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())
            .map_err(|e| FitQueryError::Database(format!("Failed to open database: {}", e)))?;

        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| {
            FitQueryError::Database(format!("Failed to open in-memory database: {}", e))
        })?;

        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Run migrations
    fn migrate(&self) -> Result<()> {
        let sql = r#"
            CREATE TABLE IF NOT EXISTS activities (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                content_hash TEXT NOT NULL UNIQUE,
                filename TEXT NOT NULL UNIQUE,
                start_time TEXT NOT NULL,
                sport TEXT NOT NULL,
                total_distance REAL,
                avg_heart_rate INTEGER,
                max_heart_rate INTEGER,
                enhanced_avg_speed REAL,
                enhanced_max_speed REAL,
                total_calories INTEGER,
                total_timer_time REAL,
                total_elapsed_time REAL,
                total_ascent INTEGER,
                total_descent INTEGER,
                enhanced_max_altitude REAL,
                enhanced_min_altitude REAL,
                total_training_effect REAL,
                feeling INTEGER,
                start_position_lat REAL,
                start_position_long REAL,
                created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%S+00:00', 'now'))
            );

            CREATE INDEX IF NOT EXISTS idx_activities_start_time
            ON activities(start_time);
            "#;
        tracing::debug!(sql = sql.trim(), "migrate");

        self.conn
            .execute_batch(sql)
            .map_err(|e| FitQueryError::Database(format!("Failed to run migrations: {}", e)))?;

        Ok(())
    }

    /// Fingerprints of every stored activity
    pub fn all_hashes(&self) -> Result<HashSet<String>> {
        let sql = "SELECT content_hash FROM activities";
        tracing::debug!(sql, "all_hashes");

        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| FitQueryError::Database(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| FitQueryError::Database(format!("Failed to query hashes: {}", e)))?;

        let mut hashes = HashSet::new();
        for row in rows {
            hashes.insert(row.map_err(|e| FitQueryError::Database(e.to_string()))?);
        }
        Ok(hashes)
    }

    /// Insert one activity and return its row id.
    ///
    /// A second record with the same content hash or file name is rejected
    /// with [`FitQueryError::DuplicateRecord`].
    pub fn save(&self, activity: &ActivityRecord) -> Result<i64> {
        let sql = "INSERT INTO activities (
                content_hash, filename, start_time, sport, total_distance,
                avg_heart_rate, max_heart_rate, enhanced_avg_speed, enhanced_max_speed,
                total_calories, total_timer_time, total_elapsed_time, total_ascent,
                total_descent, enhanced_max_altitude, enhanced_min_altitude,
                total_training_effect, feeling, start_position_lat, start_position_long
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";
        tracing::debug!(sql, filename = %activity.filename, "save");

        let (lat, long) = match activity.start_position {
            Some(p) => (Some(p.lat), Some(p.long)),
            None => (None, None),
        };

        self.conn
            .execute(
                sql,
                params![
                    activity.content_hash,
                    activity.filename,
                    format_timestamp(&activity.start_time),
                    activity.sport,
                    activity.total_distance,
                    activity.avg_heart_rate,
                    activity.max_heart_rate,
                    activity.enhanced_avg_speed,
                    activity.enhanced_max_speed,
                    activity.total_calories,
                    activity.total_timer_time,
                    activity.total_elapsed_time,
                    activity.total_ascent,
                    activity.total_descent,
                    activity.enhanced_max_altitude,
                    activity.enhanced_min_altitude,
                    activity.total_training_effect,
                    activity.feeling,
                    lat,
                    long,
                ],
            )
            .map_err(|e| match e {
                rusqlite::Error::SqliteFailure(ref err, ref msg)
                    if err.code == ErrorCode::ConstraintViolation =>
                {
                    FitQueryError::DuplicateRecord(format!(
                        "{} ({})",
                        activity.filename,
                        msg.as_deref().unwrap_or("constraint violation")
                    ))
                }
                other => FitQueryError::Database(format!("Failed to save activity: {}", other)),
            })?;

        Ok(self.conn.last_insert_rowid())
    }

    /// Activities matching `filter`, newest first
    pub fn find(&self, filter: &Filter) -> Result<Vec<ActivityRecord>> {
        let mut sql = format!(
            "SELECT {} FROM activities{} ORDER BY start_time DESC",
            SELECT_COLUMNS,
            filter.where_sql()
        );
        let mut values = filter.params();
        if let Some(limit) = filter.limit() {
            sql.push_str(" LIMIT ?");
            values.push(rusqlite::types::Value::Integer(i64::from(limit)));
        }
        tracing::debug!(sql = %sql, params = ?values, "find");

        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| FitQueryError::Database(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map(params_from_iter(values.iter()), row_to_activity)
            .map_err(|e| FitQueryError::Database(format!("Failed to query activities: {}", e)))?;

        let mut activities = Vec::new();
        for row in rows {
            activities.push(row.map_err(|e| FitQueryError::Database(e.to_string()))?);
        }
        Ok(activities)
    }

    /// Number of stored activities
    pub fn count(&self) -> Result<u32> {
        let sql = "SELECT COUNT(*) FROM activities";
        tracing::debug!(sql, "count");

        self.conn
            .query_row(sql, [], |row| row.get(0))
            .map_err(|e| FitQueryError::Database(format!("Failed to count activities: {}", e)))
    }
}

pub(crate) fn format_timestamp(t: &DateTime<Utc>) -> String {
    t.format(TIMESTAMP_FORMAT).to_string()
}

fn parse_timestamp(idx: usize, s: &str) -> rusqlite::Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .map(|naive| Utc.from_utc_datetime(&naive))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn row_to_activity(row: &Row<'_>) -> rusqlite::Result<ActivityRecord> {
    let start_time: String = row.get(3)?;
    let created_at: Option<String> = row.get(21)?;
    let lat: Option<f64> = row.get(19)?;
    let long: Option<f64> = row.get(20)?;

    Ok(ActivityRecord {
        id: Some(row.get(0)?),
        content_hash: row.get(1)?,
        filename: row.get(2)?,
        start_time: parse_timestamp(3, &start_time)?,
        sport: row.get(4)?,
        total_distance: row.get(5)?,
        avg_heart_rate: row.get(6)?,
        max_heart_rate: row.get(7)?,
        enhanced_avg_speed: row.get(8)?,
        enhanced_max_speed: row.get(9)?,
        total_calories: row.get(10)?,
        total_timer_time: row.get(11)?,
        total_elapsed_time: row.get(12)?,
        total_ascent: row.get(13)?,
        total_descent: row.get(14)?,
        enhanced_max_altitude: row.get(15)?,
        enhanced_min_altitude: row.get(16)?,
        total_training_effect: row.get(17)?,
        feeling: row.get(18)?,
        start_position: match (lat, long) {
            (Some(lat), Some(long)) => Some(GeoPosition { lat, long }),
            _ => None,
        },
        created_at: created_at
            .map(|s| parse_timestamp(21, &s))
            .transpose()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SessionSummary;
    use crate::storage::filter::{build_filter, FilterCriteria};

    fn activity(hash: &str, filename: &str, start: DateTime<Utc>, sport: &str) -> ActivityRecord {
        SessionSummary {
            start_time: Some(start),
            sport: Some(sport.to_string()),
            total_distance: Some(5000.0),
            ..Default::default()
        }
        .into_record(hash.to_string(), filename.to_string(), None)
        .unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    fn find_all(db: &ActivityStore, criteria: FilterCriteria) -> Vec<ActivityRecord> {
        db.find(&build_filter(&criteria).unwrap()).unwrap()
    }

    #[test]
    fn test_save_and_read_back() {
        let db = ActivityStore::open_in_memory().unwrap();
        let mut record = activity("h1", "a.fit", at(2022, 6, 7, 8, 0, 0), "running");
        record.avg_heart_rate = Some(150);
        record.start_position = Some(GeoPosition {
            lat: 52.5,
            long: 13.4,
        });

        let id = db.save(&record).unwrap();
        assert!(id > 0);

        let found = find_all(&db, FilterCriteria::default());
        assert_eq!(found.len(), 1);
        let stored = &found[0];
        assert_eq!(stored.id, Some(id));
        assert!(stored.created_at.is_some());
        assert_eq!(
            ActivityRecord {
                id: None,
                created_at: None,
                ..stored.clone()
            },
            record
        );
    }

    #[test]
    fn test_all_hashes() {
        let db = ActivityStore::open_in_memory().unwrap();
        assert!(db.all_hashes().unwrap().is_empty());

        db.save(&activity("h1", "a.fit", at(2022, 6, 7, 8, 0, 0), "running"))
            .unwrap();
        db.save(&activity("h2", "b.fit", at(2022, 6, 8, 8, 0, 0), "hiking"))
            .unwrap();

        let hashes = db.all_hashes().unwrap();
        assert_eq!(hashes.len(), 2);
        assert!(hashes.contains("h1"));
        assert!(hashes.contains("h2"));
        assert_eq!(db.count().unwrap(), 2);
    }

    #[test]
    fn test_duplicate_hash_rejected() {
        let db = ActivityStore::open_in_memory().unwrap();
        db.save(&activity("h1", "a.fit", at(2022, 6, 7, 8, 0, 0), "running"))
            .unwrap();

        let err = db
            .save(&activity("h1", "other.fit", at(2022, 6, 7, 8, 0, 0), "running"))
            .unwrap_err();
        assert!(matches!(err, FitQueryError::DuplicateRecord(_)));

        let err = db
            .save(&activity("h2", "a.fit", at(2022, 6, 7, 8, 0, 0), "running"))
            .unwrap_err();
        assert!(matches!(err, FitQueryError::DuplicateRecord(_)));

        assert_eq!(db.count().unwrap(), 1);
    }

    #[test]
    fn test_sport_filter_orders_newest_first() {
        let db = ActivityStore::open_in_memory().unwrap();
        db.save(&activity("h1", "1.fit", at(2022, 6, 7, 9, 0, 0), "running"))
            .unwrap();
        db.save(&activity("h2", "2.fit", at(2022, 6, 8, 9, 0, 0), "hiking"))
            .unwrap();
        db.save(&activity("h3", "3.fit", at(2022, 6, 9, 9, 0, 0), "running"))
            .unwrap();

        let found = find_all(
            &db,
            FilterCriteria {
                sport: Some("running".to_string()),
                ..Default::default()
            },
        );
        let names: Vec<&str> = found.iter().map(|a| a.filename.as_str()).collect();
        assert_eq!(names, vec!["3.fit", "1.fit"]);
    }

    #[test]
    fn test_until_includes_whole_day() {
        let db = ActivityStore::open_in_memory().unwrap();
        db.save(&activity("h1", "late.fit", at(2022, 6, 7, 23, 59, 59), "running"))
            .unwrap();
        db.save(&activity("h2", "next.fit", at(2022, 6, 8, 0, 0, 1), "running"))
            .unwrap();

        let found = find_all(
            &db,
            FilterCriteria {
                until: Some(at(2022, 6, 7, 0, 0, 0)),
                ..Default::default()
            },
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].filename, "late.fit");
    }

    #[test]
    fn test_since_is_inclusive() {
        let db = ActivityStore::open_in_memory().unwrap();
        db.save(&activity("h1", "before.fit", at(2022, 6, 6, 23, 59, 59), "running"))
            .unwrap();
        db.save(&activity("h2", "on.fit", at(2022, 6, 7, 0, 0, 0), "running"))
            .unwrap();

        let found = find_all(
            &db,
            FilterCriteria {
                since: Some(at(2022, 6, 7, 0, 0, 0)),
                ..Default::default()
            },
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].filename, "on.fit");
    }

    #[test]
    fn test_year_month_and_limit() {
        let db = ActivityStore::open_in_memory().unwrap();
        db.save(&activity("h1", "1.fit", at(2021, 6, 15, 9, 0, 0), "running"))
            .unwrap();
        db.save(&activity("h2", "2.fit", at(2022, 5, 31, 23, 0, 0), "running"))
            .unwrap();
        db.save(&activity("h3", "3.fit", at(2022, 6, 1, 6, 0, 0), "cycling"))
            .unwrap();
        db.save(&activity("h4", "4.fit", at(2022, 6, 20, 6, 0, 0), "running"))
            .unwrap();

        let found = find_all(
            &db,
            FilterCriteria {
                year: Some(2022),
                month: Some(6),
                ..Default::default()
            },
        );
        let names: Vec<&str> = found.iter().map(|a| a.filename.as_str()).collect();
        assert_eq!(names, vec!["4.fit", "3.fit"]);

        let found = find_all(
            &db,
            FilterCriteria {
                year: Some(2022),
                limit: Some(2),
                ..Default::default()
            },
        );
        let names: Vec<&str> = found.iter().map(|a| a.filename.as_str()).collect();
        assert_eq!(names, vec!["4.fit", "3.fit"]);

        let found = find_all(
            &db,
            FilterCriteria {
                month: Some(6),
                ..Default::default()
            },
        );
        assert_eq!(found.len(), 3);
    }

    #[test]
    fn test_open_file_database_persists() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("fit-query.db");

        {
            let db = ActivityStore::open(&path).unwrap();
            db.save(&activity("h1", "a.fit", at(2022, 6, 7, 8, 0, 0), "running"))
                .unwrap();
        }

        let db = ActivityStore::open(&path).unwrap();
        assert_eq!(db.count().unwrap(), 1);
        assert!(db.all_hashes().unwrap().contains("h1"));
    }
}
