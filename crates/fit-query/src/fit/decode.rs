//! Decoding FIT files into activity records
//!
//! `fitparser` does the binary work. Its records are adapted into [`Message`]
//! values so the extraction rules below can be exercised without a file.

use std::path::Path;

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use fitparser::profile::MesgNum;

use crate::error::{FitQueryError, Result};
use crate::fit::hash::fingerprint;
use crate::models::{ActivityRecord, GeoPosition, SessionField, SessionSummary};

/// Degrees per semicircle: 180 / 2^31
const SEMICIRCLE_TO_DEGREES: f64 = 180.0 / 2_147_483_648.0;

/// Message types the decoder cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// Summary of the whole activity
    Session,
    /// One time-series sample (position, heart rate, ...)
    Record,
    Other,
}

/// A decoded field value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(DateTime<FixedOffset>),
    /// Timestamp without zone information, read as UTC
    NaiveTimestamp(NaiveDateTime),
}

impl FieldValue {
    fn from_fit(value: &fitparser::Value) -> Option<Self> {
        use fitparser::Value;

        let converted = match value {
            Value::Timestamp(t) => FieldValue::Timestamp(DateTime::<FixedOffset>::from(*t)),
            Value::Byte(v) | Value::Enum(v) | Value::UInt8(v) | Value::UInt8z(v) => {
                FieldValue::Int(i64::from(*v))
            }
            Value::SInt8(v) => FieldValue::Int(i64::from(*v)),
            Value::SInt16(v) => FieldValue::Int(i64::from(*v)),
            Value::UInt16(v) | Value::UInt16z(v) => FieldValue::Int(i64::from(*v)),
            Value::SInt32(v) => FieldValue::Int(i64::from(*v)),
            Value::UInt32(v) | Value::UInt32z(v) => FieldValue::Int(i64::from(*v)),
            Value::SInt64(v) => FieldValue::Int(*v),
            Value::UInt64(v) | Value::UInt64z(v) => FieldValue::Int(i64::try_from(*v).ok()?),
            Value::Float32(v) => FieldValue::Float(f64::from(*v)),
            Value::Float64(v) => FieldValue::Float(*v),
            Value::String(s) => FieldValue::Text(s.clone()),
            _ => return None,
        };
        Some(converted)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Int(v) => Some(*v as f64),
            FieldValue::Float(v) if v.is_finite() => Some(*v),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            FieldValue::Int(v) => i32::try_from(*v).ok(),
            FieldValue::Float(v) if v.is_finite() => {
                let rounded = v.round();
                if rounded >= i32::MIN as f64 && rounded <= i32::MAX as f64 {
                    Some(rounded as i32)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<String> {
        match self {
            FieldValue::Text(s) if !s.is_empty() => Some(s.clone()),
            FieldValue::Int(v) => Some(v.to_string()),
            _ => None,
        }
    }

    /// Timestamp normalized to UTC
    pub fn as_utc(&self) -> Option<DateTime<Utc>> {
        match self {
            FieldValue::Timestamp(t) => Some(t.with_timezone(&Utc)),
            FieldValue::NaiveTimestamp(naive) => Some(Utc.from_utc_datetime(naive)),
            _ => None,
        }
    }

    /// Integer value within the signed 32-bit semicircle range
    pub fn as_semicircles(&self) -> Option<i32> {
        match self {
            FieldValue::Int(v) => i32::try_from(*v).ok(),
            _ => None,
        }
    }
}

/// One message of an activity file with its named fields
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub kind: MessageKind,
    pub fields: Vec<(String, FieldValue)>,
}

impl Message {
    pub fn new(kind: MessageKind) -> Self {
        Self {
            kind,
            fields: Vec::new(),
        }
    }

    /// Builder-style field insertion
    pub fn with(mut self, name: &str, value: FieldValue) -> Self {
        self.fields.push((name.to_string(), value));
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    fn from_fit(record: &fitparser::FitDataRecord) -> Self {
        let kind = match record.kind() {
            MesgNum::Session => MessageKind::Session,
            MesgNum::Record => MessageKind::Record,
            _ => MessageKind::Other,
        };

        let fields = record
            .fields()
            .iter()
            .filter_map(|field| {
                FieldValue::from_fit(field.value()).map(|value| (field.name().to_string(), value))
            })
            .collect();

        Self { kind, fields }
    }
}

/// Convert a FIT semicircle angle to decimal degrees
pub fn semicircles_to_degrees(semicircles: i32) -> f64 {
    f64::from(semicircles) * SEMICIRCLE_TO_DEGREES
}

/// Position of the first waypoint carrying both latitude and longitude
fn start_position(messages: &[Message]) -> Option<GeoPosition> {
    messages
        .iter()
        .filter(|m| m.kind == MessageKind::Record)
        .find_map(|m| {
            let lat = m.get("position_lat")?.as_semicircles()?;
            let long = m.get("position_long")?.as_semicircles()?;
            Some(GeoPosition {
                lat: semicircles_to_degrees(lat),
                long: semicircles_to_degrees(long),
            })
        })
}

/// Build an activity record from already decoded messages.
///
/// Only fields listed in [`SessionField`] are copied from the first session
/// message; everything else is ignored.
pub fn record_from_messages(
    path: &Path,
    messages: &[Message],
    content_hash: String,
) -> Result<ActivityRecord> {
    let session = messages
        .iter()
        .find(|m| m.kind == MessageKind::Session)
        .ok_or_else(|| FitQueryError::malformed(path, "no session record"))?;

    let mut summary = SessionSummary::default();
    for (name, value) in &session.fields {
        if let Some(field) = SessionField::from_name(name) {
            summary.set(field, value);
        }
    }

    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| FitQueryError::malformed(path, "path has no file name"))?;

    summary
        .into_record(content_hash, filename, start_position(messages))
        .map_err(|missing| {
            FitQueryError::malformed(path, format!("session record has no {}", missing))
        })
}

/// Decode the activity file at `path`
pub fn decode_file(path: &Path) -> Result<ActivityRecord> {
    let bytes = std::fs::read(path)?;
    let content_hash = fingerprint(&bytes);

    let messages: Vec<Message> = fitparser::from_bytes(&bytes)
        .map_err(|e| FitQueryError::malformed(path, format!("invalid FIT data: {}", e)))?
        .iter()
        .map(Message::from_fit)
        .collect();

    tracing::debug!(
        path = %path.display(),
        messages = messages.len(),
        "decoded activity file"
    );

    record_from_messages(path, &messages, content_hash)
}
