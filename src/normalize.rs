//! Date normalization for lead and activity records
//!
//! Close returns timestamps in a handful of shapes: RFC 3339, extended and
//! basic ISO-8601 (with or without an offset), bare dates, and the email-style `15 Mar 2021 10:00:00 +0000`
//! used on activity envelopes. Everything is rewritten to RFC 3339 with the
//! source offset preserved.

use std::borrow::Cow;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

use crate::error::{AppError, Result};

/// Offset-aware ISO-8601 shapes tried after RFC 3339, extended and basic.
/// `%z` takes `+hhmm` and `+hh:mm`.
const ISO_OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M%z",
    "%Y%m%dT%H%M%S%.f%z",
    "%Y%m%dT%H%M%z",
];

/// Naive ISO-8601 shapes, read as UTC
const ISO_NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y%m%dT%H%M%S%.f",
    "%Y%m%dT%H%M",
];

/// Bare ISO-8601 dates, read as midnight UTC
const ISO_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d"];

/// `D MMM YYYY HH:mm:ss Z`
const FALLBACK_FORMAT: &str = "%d %b %Y %H:%M:%S %z";

/// Parse a timestamp string, trying ISO-8601 first and then the fallback format
pub fn parse_timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();
    parse_iso8601(value).or_else(|| DateTime::parse_from_str(value, FALLBACK_FORMAT).ok())
}

fn parse_iso8601(value: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt);
    }

    let with_offset = expand_offset(value);
    for format in ISO_OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&with_offset, format) {
            return Some(dt);
        }
    }

    for format in ISO_NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(Utc.from_utc_datetime(&naive).fixed_offset());
        }
    }

    ISO_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive).fixed_offset())
}

/// Spell a trailing `Z` or hour-only `+hh` offset as `+hh:mm`
fn expand_offset(value: &str) -> Cow<'_, str> {
    if let Some(rest) = value.strip_suffix(['Z', 'z']) {
        return Cow::Owned(format!("{}+00:00", rest));
    }

    let bytes = value.as_bytes();
    let len = bytes.len();
    let hour_only = len > 3
        && matches!(bytes[len - 3], b'+' | b'-')
        && bytes[len - 2].is_ascii_digit()
        && bytes[len - 1].is_ascii_digit()
        && value[..len - 3].contains('T');
    if hour_only {
        Cow::Owned(format!("{}:00", value))
    } else {
        Cow::Borrowed(value)
    }
}

/// Normalize a single date string to RFC 3339
pub fn normalize_timestamp(value: &str) -> Result<String> {
    parse_timestamp(value)
        .map(|dt| dt.to_rfc3339())
        .ok_or_else(|| AppError::UnrecognizedDate(value.to_string()))
}

/// Normalize a JSON value in place. Non-string values (including `null`)
/// are left alone.
pub fn normalize_datetime(value: &mut Value) -> Result<()> {
    if let Value::String(raw) = value {
        *raw = normalize_timestamp(raw)?;
    }
    Ok(())
}

/// Normalize `record[key]` if the record is an object holding that key
fn normalize_field(record: &mut Value, key: &str) -> Result<()> {
    match record.get_mut(key) {
        Some(value) => normalize_datetime(value),
        None => Ok(()),
    }
}

/// Names of lead custom fields declared as `format: date-time` in the lead schema
pub fn date_time_custom_fields(lead_schema: &Value) -> Vec<String> {
    lead_schema
        .pointer("/properties/custom/properties")
        .and_then(Value::as_object)
        .map(|props| {
            props
                .iter()
                .filter(|(_, field)| {
                    field.get("format").and_then(Value::as_str) == Some("date-time")
                })
                .map(|(name, _)| name.clone())
                .collect()
        })
        .unwrap_or_default()
}

/// Rewrite the date fields of a lead: `date_won`, each task's `date` and
/// `due_date`, and every custom field the schema declares as date-time.
pub fn normalize_lead(lead: &mut Value, lead_schema: &Value) -> Result<()> {
    if let Some(tasks) = lead.get_mut("tasks").and_then(Value::as_array_mut) {
        for task in tasks {
            normalize_field(task, "date")?;
            normalize_field(task, "due_date")?;
        }
    }

    normalize_field(lead, "date_won")?;

    if let Some(custom) = lead.get_mut("custom") {
        for name in date_time_custom_fields(lead_schema) {
            normalize_field(custom, &name)?;
        }
    }

    Ok(())
}

/// Rewrite the date fields of an activity: `envelope.date`,
/// `date_scheduled`, and each send attempt's `date`.
pub fn normalize_activity(activity: &mut Value) -> Result<()> {
    if let Some(envelope) = activity.get_mut("envelope") {
        normalize_field(envelope, "date")?;
    }

    normalize_field(activity, "date_scheduled")?;

    if let Some(attempts) = activity
        .get_mut("send_attempts")
        .and_then(Value::as_array_mut)
    {
        for attempt in attempts {
            normalize_field(attempt, "date")?;
        }
    }

    Ok(())
}
