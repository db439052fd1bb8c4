//! Activity data models
//!
//! `ActivityRecord` is the unit persisted by the store. The session fields it
//! accepts from a FIT file are listed in [`SessionField`], kept next to the
//! struct so the two cannot drift apart.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::fit::FieldValue;

/// Starting position of an activity in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPosition {
    pub lat: f64,
    pub long: f64,
}

/// One imported activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// Row id, assigned by the store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// SHA-256 of the source file content
    pub content_hash: String,

    /// Base name of the source file
    pub filename: String,

    pub start_time: DateTime<Utc>,

    /// Sport label (e.g. "running", "cycling")
    pub sport: String,

    /// Distance in meters
    pub total_distance: Option<f64>,

    /// Average heart rate in bpm
    pub avg_heart_rate: Option<i32>,

    /// Maximum heart rate in bpm
    pub max_heart_rate: Option<i32>,

    /// Average speed in m/s
    pub enhanced_avg_speed: Option<f64>,

    /// Maximum speed in m/s
    pub enhanced_max_speed: Option<f64>,

    /// Calories burned (kcal)
    pub total_calories: Option<i32>,

    /// Timer duration in seconds (excluding pauses)
    pub total_timer_time: Option<f64>,

    /// Elapsed duration in seconds (including pauses)
    pub total_elapsed_time: Option<f64>,

    /// Total ascent in meters
    pub total_ascent: Option<i32>,

    /// Total descent in meters
    pub total_descent: Option<i32>,

    /// Maximum altitude in meters
    pub enhanced_max_altitude: Option<f64>,

    /// Minimum altitude in meters
    pub enhanced_min_altitude: Option<f64>,

    pub total_training_effect: Option<f64>,

    /// Subjective feeling rating
    pub feeling: Option<i32>,

    /// Position of the first waypoint carrying GPS data
    pub start_position: Option<GeoPosition>,

    /// Set by the store at insert time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl ActivityRecord {
    /// Distance in kilometers, treating a missing distance as zero
    pub fn total_distance_km(&self) -> f64 {
        self.total_distance.map(|d| d / 1000.0).unwrap_or(0.0)
    }

    /// Timer duration formatted as H:MM:SS or M:SS
    pub fn duration_formatted(&self) -> String {
        match self.total_timer_time.or(self.total_elapsed_time) {
            Some(secs) => {
                let total_secs = secs as u64;
                let hours = total_secs / 3600;
                let minutes = (total_secs % 3600) / 60;
                let seconds = total_secs % 60;
                if hours > 0 {
                    format!("{}:{:02}:{:02}", hours, minutes, seconds)
                } else {
                    format!("{}:{:02}", minutes, seconds)
                }
            }
            None => "-".to_string(),
        }
    }

    /// Start time rendered in the local time zone
    pub fn start_time_local(&self) -> String {
        self.start_time
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
    }
}

/// Session fields copied from a FIT file into an [`ActivityRecord`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionField {
    StartTime,
    Sport,
    TotalDistance,
    AvgHeartRate,
    MaxHeartRate,
    EnhancedAvgSpeed,
    EnhancedMaxSpeed,
    TotalCalories,
    TotalTimerTime,
    TotalElapsedTime,
    TotalAscent,
    TotalDescent,
    EnhancedMaxAltitude,
    EnhancedMinAltitude,
    TotalTrainingEffect,
    Feeling,
}

impl SessionField {
    pub const ALL: [SessionField; 16] = [
        SessionField::StartTime,
        SessionField::Sport,
        SessionField::TotalDistance,
        SessionField::AvgHeartRate,
        SessionField::MaxHeartRate,
        SessionField::EnhancedAvgSpeed,
        SessionField::EnhancedMaxSpeed,
        SessionField::TotalCalories,
        SessionField::TotalTimerTime,
        SessionField::TotalElapsedTime,
        SessionField::TotalAscent,
        SessionField::TotalDescent,
        SessionField::EnhancedMaxAltitude,
        SessionField::EnhancedMinAltitude,
        SessionField::TotalTrainingEffect,
        SessionField::Feeling,
    ];

    /// Field name as it appears in the FIT session message
    pub fn name(self) -> &'static str {
        match self {
            SessionField::StartTime => "start_time",
            SessionField::Sport => "sport",
            SessionField::TotalDistance => "total_distance",
            SessionField::AvgHeartRate => "avg_heart_rate",
            SessionField::MaxHeartRate => "max_heart_rate",
            SessionField::EnhancedAvgSpeed => "enhanced_avg_speed",
            SessionField::EnhancedMaxSpeed => "enhanced_max_speed",
            SessionField::TotalCalories => "total_calories",
            SessionField::TotalTimerTime => "total_timer_time",
            SessionField::TotalElapsedTime => "total_elapsed_time",
            SessionField::TotalAscent => "total_ascent",
            SessionField::TotalDescent => "total_descent",
            SessionField::EnhancedMaxAltitude => "enhanced_max_altitude",
            SessionField::EnhancedMinAltitude => "enhanced_min_altitude",
            SessionField::TotalTrainingEffect => "total_training_effect",
            SessionField::Feeling => "feeling",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.name() == name)
    }
}

/// Allow-listed session values collected before the record is complete
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSummary {
    pub start_time: Option<DateTime<Utc>>,
    pub sport: Option<String>,
    pub total_distance: Option<f64>,
    pub avg_heart_rate: Option<i32>,
    pub max_heart_rate: Option<i32>,
    pub enhanced_avg_speed: Option<f64>,
    pub enhanced_max_speed: Option<f64>,
    pub total_calories: Option<i32>,
    pub total_timer_time: Option<f64>,
    pub total_elapsed_time: Option<f64>,
    pub total_ascent: Option<i32>,
    pub total_descent: Option<i32>,
    pub enhanced_max_altitude: Option<f64>,
    pub enhanced_min_altitude: Option<f64>,
    pub total_training_effect: Option<f64>,
    pub feeling: Option<i32>,
}

impl SessionSummary {
    /// Store `value` under `field`. Values of the wrong shape leave the field unset.
    pub fn set(&mut self, field: SessionField, value: &FieldValue) {
        match field {
            SessionField::StartTime => self.start_time = value.as_utc(),
            SessionField::Sport => self.sport = value.as_text(),
            SessionField::TotalDistance => self.total_distance = value.as_f64(),
            SessionField::AvgHeartRate => self.avg_heart_rate = value.as_i32(),
            SessionField::MaxHeartRate => self.max_heart_rate = value.as_i32(),
            SessionField::EnhancedAvgSpeed => self.enhanced_avg_speed = value.as_f64(),
            SessionField::EnhancedMaxSpeed => self.enhanced_max_speed = value.as_f64(),
            SessionField::TotalCalories => self.total_calories = value.as_i32(),
            SessionField::TotalTimerTime => self.total_timer_time = value.as_f64(),
            SessionField::TotalElapsedTime => self.total_elapsed_time = value.as_f64(),
            SessionField::TotalAscent => self.total_ascent = value.as_i32(),
            SessionField::TotalDescent => self.total_descent = value.as_i32(),
            SessionField::EnhancedMaxAltitude => self.enhanced_max_altitude = value.as_f64(),
            SessionField::EnhancedMinAltitude => self.enhanced_min_altitude = value.as_f64(),
            SessionField::TotalTrainingEffect => self.total_training_effect = value.as_f64(),
            SessionField::Feeling => self.feeling = value.as_i32(),
        }
    }

    /// Complete the record with identity and position.
    ///
    /// Returns the name of the first missing required field on failure.
    pub fn into_record(
        self,
        content_hash: String,
        filename: String,
        start_position: Option<GeoPosition>,
    ) -> std::result::Result<ActivityRecord, &'static str> {
        let start_time = self.start_time.ok_or(SessionField::StartTime.name())?;
        let sport = self.sport.ok_or(SessionField::Sport.name())?;

        Ok(ActivityRecord {
            id: None,
            content_hash,
            filename,
            start_time,
            sport,
            total_distance: self.total_distance,
            avg_heart_rate: self.avg_heart_rate,
            max_heart_rate: self.max_heart_rate,
            enhanced_avg_speed: self.enhanced_avg_speed,
            enhanced_max_speed: self.enhanced_max_speed,
            total_calories: self.total_calories,
            total_timer_time: self.total_timer_time,
            total_elapsed_time: self.total_elapsed_time,
            total_ascent: self.total_ascent,
            total_descent: self.total_descent,
            enhanced_max_altitude: self.enhanced_max_altitude,
            enhanced_min_altitude: self.enhanced_min_altitude,
            total_training_effect: self.total_training_effect,
            feeling: self.feeling,
            start_position,
            created_at: None,
        })
    }
}
