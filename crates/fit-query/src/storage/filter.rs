//! Query filters over stored activities
//!
//! [`build_filter`] validates a [`FilterCriteria`] and turns it into a
//! [`Filter`]: a list of clauses joined with AND, rendered as a SQL `WHERE`
//! fragment with positional parameters.

use chrono::{DateTime, Duration, Utc};
use rusqlite::types::Value;

use super::activity_db::format_timestamp;
use crate::error::{FitQueryError, Result};

/// Criteria for a single query; every field is optional
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    /// Only activities starting at or after this instant
    pub since: Option<DateTime<Utc>>,
    /// Only activities starting on or before this day (the whole day is included)
    pub until: Option<DateTime<Utc>>,
    pub sport: Option<String>,
    pub year: Option<i32>,
    /// Calendar month, 1-12
    pub month: Option<u32>,
    /// Maximum number of rows; `None` means unbounded
    pub limit: Option<u32>,
    /// Show oldest first instead of newest first
    pub reverse: bool,
    /// Append a summary row
    pub summary: bool,
}

/// One condition on the activities table
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    StartedAtOrAfter(DateTime<Utc>),
    StartedAtOrBefore(DateTime<Utc>),
    Sport(String),
    Year(i32),
    Month(u32),
}

impl Clause {
    fn sql(&self) -> &'static str {
        match self {
            Clause::StartedAtOrAfter(_) => "start_time >= ?",
            Clause::StartedAtOrBefore(_) => "start_time <= ?",
            Clause::Sport(_) => "sport = ?",
            Clause::Year(_) => "CAST(strftime('%Y', start_time) AS INTEGER) = ?",
            Clause::Month(_) => "CAST(strftime('%m', start_time) AS INTEGER) = ?",
        }
    }

    fn param(&self) -> Value {
        match self {
            Clause::StartedAtOrAfter(t) | Clause::StartedAtOrBefore(t) => {
                Value::Text(format_timestamp(t))
            }
            Clause::Sport(s) => Value::Text(s.clone()),
            Clause::Year(y) => Value::Integer(i64::from(*y)),
            Clause::Month(m) => Value::Integer(i64::from(*m)),
        }
    }
}

/// A validated, composed predicate plus the row limit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<Clause>,
    limit: Option<u32>,
}

impl Filter {
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn limit(&self) -> Option<u32> {
        self.limit
    }

    /// `" WHERE a AND b"`, or an empty string when there are no clauses
    pub fn where_sql(&self) -> String {
        if self.clauses.is_empty() {
            return String::new();
        }
        let joined: Vec<&str> = self.clauses.iter().map(Clause::sql).collect();
        format!(" WHERE {}", joined.join(" AND "))
    }

    /// Parameters in the order their placeholders appear in [`Filter::where_sql`]
    pub fn params(&self) -> Vec<Value> {
        self.clauses.iter().map(Clause::param).collect()
    }
}

/// Offset added to `until` so the whole calendar day is included
fn end_of_day() -> Duration {
    Duration::hours(23) + Duration::minutes(59) + Duration::seconds(59)
}

/// Validate `criteria` and compose its clauses
pub fn build_filter(criteria: &FilterCriteria) -> Result<Filter> {
    if let Some(month) = criteria.month {
        if !(1..=12).contains(&month) {
            return Err(FitQueryError::invalid_filter(format!(
                "month must be between 1 and 12, got {}",
                month
            )));
        }
    }
    if let Some(year) = criteria.year {
        if !(1..=9999).contains(&year) {
            return Err(FitQueryError::invalid_filter(format!(
                "year must be between 1 and 9999, got {}",
                year
            )));
        }
    }
    if criteria.limit == Some(0) {
        return Err(FitQueryError::invalid_filter("limit must be positive"));
    }
    if let Some(sport) = &criteria.sport {
        if sport.trim().is_empty() {
            return Err(FitQueryError::invalid_filter("sport must not be empty"));
        }
    }

    let until_end = criteria.until.map(|until| until + end_of_day());
    if let (Some(since), Some(until)) = (criteria.since, until_end) {
        if since > until {
            return Err(FitQueryError::invalid_filter(format!(
                "since ({}) is after until ({})",
                since.format("%Y-%m-%d"),
                until.format("%Y-%m-%d")
            )));
        }
    }

    let mut clauses = Vec::new();
    if let Some(since) = criteria.since {
        clauses.push(Clause::StartedAtOrAfter(since));
    }
    if let Some(until) = until_end {
        clauses.push(Clause::StartedAtOrBefore(until));
    }
    if let Some(sport) = &criteria.sport {
        clauses.push(Clause::Sport(sport.clone()));
    }
    if let Some(year) = criteria.year {
        clauses.push(Clause::Year(year));
    }
    if let Some(month) = criteria.month {
        clauses.push(Clause::Month(month));
    }

    Ok(Filter {
        clauses,
        limit: criteria.limit,
    })
}
