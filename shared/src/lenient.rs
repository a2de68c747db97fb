//! Forgiving field decoders for rows coming back from the table store.
//!
//! Rows are produced by other systems (the device agents write
//! `activity_logs`), so a single odd field must never fail the whole row.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Point in time carried by a row.
///
/// Timestamps with an offset are pinned to an instant. Timestamps without
/// one (`timestamp` columns without time zone) are wall-clock readings and
/// are taken as already being in local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordTime {
    Zoned(DateTime<Utc>),
    Floating(NaiveDateTime),
}

impl RecordTime {
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(RecordTime::Zoned(dt.with_timezone(&Utc)));
        }
        // Postgres renders timestamptz as "2025-01-02 10:00:00+00"
        for format in ["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"] {
            if let Ok(dt) = DateTime::parse_from_str(raw, format) {
                return Some(RecordTime::Zoned(dt.with_timezone(&Utc)));
            }
        }
        for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
                return Some(RecordTime::Floating(naive));
            }
        }
        None
    }
}

pub fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("invalid id: {}", other))),
    }
}

pub fn opt_id_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Text field that falls back to an empty string
pub fn label<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

/// Non-negative whole number; anything unusable is zero
pub fn seconds<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(number_from_value(&Value::deserialize(deserializer)?).unwrap_or(0))
}

pub fn opt_minutes<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(number_from_value(&Value::deserialize(deserializer)?)
        .map(|n| n.min(u64::from(u32::MAX)) as u32))
}

pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes" | "on"),
        _ => false,
    })
}

pub fn timestamp<'de, D>(deserializer: D) -> Result<Option<RecordTime>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => RecordTime::parse(&s),
        _ => None,
    })
}

fn number_from_value(value: &Value) -> Option<u64> {
    let float = match value {
        Value::Number(n) => {
            if let Some(whole) = n.as_u64() {
                return Some(whole);
            }
            n.as_f64()?
        }
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if float.is_finite() && float >= 0.0 {
        Some(float.round() as u64)
    } else {
        None
    }
}
