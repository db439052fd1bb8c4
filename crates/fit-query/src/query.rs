//! Querying stored activities
//!
//! The store filters, orders newest first and limits. Reversal and the summary
//! row are applied here, on exactly the rows that will be shown.

use std::collections::HashSet;

use serde::Serialize;

use crate::error::Result;
use crate::models::ActivityRecord;
use crate::storage::{build_filter, ActivityStore, FilterCriteria};

/// Totals over the rows of one query result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuerySummary {
    pub activities: usize,
    pub sports: usize,
    pub total_distance_km: f64,
}

impl QuerySummary {
    pub fn from_rows(rows: &[ActivityRecord]) -> Self {
        let sports: HashSet<&str> = rows.iter().map(|a| a.sport.as_str()).collect();
        Self {
            activities: rows.len(),
            sports: sports.len(),
            total_distance_km: rows.iter().map(ActivityRecord::total_distance_km).sum(),
        }
    }
}

/// Rows to render plus the optional summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub activities: Vec<ActivityRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<QuerySummary>,
}

/// Apply caller-side reversal and summary to rows already ordered by the store
pub fn post_process(mut rows: Vec<ActivityRecord>, criteria: &FilterCriteria) -> QueryResult {
    if criteria.reverse {
        rows.reverse();
    }
    let summary = criteria.summary.then(|| QuerySummary::from_rows(&rows));
    QueryResult {
        activities: rows,
        summary,
    }
}

/// Validate `criteria`, query the store and post-process the rows
pub fn run_query(store: &ActivityStore, criteria: &FilterCriteria) -> Result<QueryResult> {
    let filter = build_filter(criteria)?;
    let rows = store.find(&filter)?;
    tracing::debug!(rows = rows.len(), "query returned");
    Ok(post_process(rows, criteria))
}
