//! Query command for fit-query

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::cli::OutputFormat;
use crate::error::{FitQueryError, Result};
use crate::query::{run_query, QueryResult};
use crate::storage::{ActivityStore, FilterCriteria};

const ROW_WIDTH: usize = 66;

/// Query stored activities and print them
pub fn run(store: &ActivityStore, criteria: &FilterCriteria, format: OutputFormat) -> Result<()> {
    let result = run_query(store, criteria)?;

    match format {
        OutputFormat::Table => print!("{}", render_table(&result)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Csv => print!("{}", render_csv(&result)),
    }

    Ok(())
}

/// Parse a `YYYY-MM-DD` date as midnight UTC
pub fn parse_date(s: &str) -> Result<DateTime<Utc>> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| Utc.from_utc_datetime(&dt))
        .ok_or_else(|| FitQueryError::InvalidDateFormat(s.to_string()))
}

fn render_table(result: &QueryResult) -> String {
    let mut out = String::new();

    if result.activities.is_empty() {
        out.push_str("No activities found.\n");
        return out;
    }

    out.push_str(&format!(
        "{:<19}  {:<15} {:>10} {:>10} {:>7}\n",
        "Start time", "Sport", "Dist. (km)", "Duration", "Avg HR"
    ));
    out.push_str(&format!("{}\n", "-".repeat(ROW_WIDTH)));

    for activity in &result.activities {
        let hr = activity
            .avg_heart_rate
            .map(|h| h.to_string())
            .unwrap_or_else(|| "-".to_string());

        out.push_str(&format!(
            "{:<19}  {:<15} {:>10.2} {:>10} {:>7}\n",
            activity.start_time_local(),
            truncate(&activity.sport, 15),
            activity.total_distance_km(),
            activity.duration_formatted(),
            hr
        ));
    }

    if let Some(summary) = &result.summary {
        out.push_str(&format!("{}\n", "-".repeat(ROW_WIDTH)));
        out.push_str(&format!(
            "{:<19}  {:<15} {:>10.2}\n",
            format!("{} activities", summary.activities),
            format!("{} sports", summary.sports),
            summary.total_distance_km
        ));
    }

    out
}

fn render_csv(result: &QueryResult) -> String {
    let mut out = String::from("start_time,sport,distance_km,duration_s,avg_heart_rate,filename\n");

    for activity in &result.activities {
        out.push_str(&format!(
            "{},{},{:.3},{},{},{}\n",
            activity.start_time.to_rfc3339(),
            csv_field(&activity.sport),
            activity.total_distance_km(),
            activity
                .total_timer_time
                .map(|t| t.to_string())
                .unwrap_or_default(),
            activity
                .avg_heart_rate
                .map(|h| h.to_string())
                .unwrap_or_default(),
            csv_field(&activity.filename),
        ));
    }

    out
}

fn csv_field(s: &str) -> String {
    if s.contains(|c: char| matches!(c, ',' | '"' | '\n')) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Truncate string to max length
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
