//! Data models used throughout the application

pub mod activity;

pub use activity::{ActivityRecord, GeoPosition, SessionField, SessionSummary};
