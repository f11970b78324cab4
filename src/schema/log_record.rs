//! pulse.health_log.v1 input record
//!
//! The shape the log backend returns for one health-log row:
//! `{ category, value, timestamp, memberId? }`, already scoped to one subject.
//! Fields are read leniently so that a bad row never rejects the whole document.

use crate::types::{Category, LogValue};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Current input schema version
pub const SCHEMA_VERSION: &str = "pulse.health_log.v1";

/// One health-log row as received from the backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    /// Category name (e.g. "steps", "heartRate", "blood_pressure")
    #[serde(default, deserialize_with = "lenient_string")]
    pub category: Option<String>,
    /// Number, numeric string, or "sys/dia" string for blood pressure
    #[serde(default)]
    pub value: serde_json::Value,
    /// ISO 8601 timestamp or plain date
    #[serde(default, deserialize_with = "lenient_string")]
    pub timestamp: Option<String>,
    /// Family member the row was logged for
    #[serde(
        default,
        alias = "member_id",
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub member_id: Option<String>,
}

impl LogRecord {
    /// Create a record
    pub fn new(category: &str, value: serde_json::Value, timestamp: &str) -> Self {
        Self {
            category: Some(category.to_string()),
            value,
            timestamp: Some(timestamp.to_string()),
            member_id: None,
        }
    }

    /// Tag the record with a family member
    pub fn with_member(mut self, member_id: impl Into<String>) -> Self {
        self.member_id = Some(member_id.into());
        self
    }

    /// Resolved category, if known
    pub fn parsed_category(&self) -> Option<Category> {
        self.category.as_deref().and_then(Category::parse)
    }

    /// Resolved timestamp, if parseable
    pub fn parsed_timestamp(&self) -> Option<DateTime<FixedOffset>> {
        self.timestamp.as_deref().and_then(parse_timestamp)
    }

    /// Raw value as kept on the entry
    pub fn log_value(&self) -> Option<LogValue> {
        LogValue::from_json(&self.value)
    }

    /// Check the record.
    ///
    /// Errors for which [`ValidationError::drops_record`] is true mean the row
    /// cannot be placed on a day and is skipped; the others mean the row is kept
    /// but its value will not count.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let name = self
            .category
            .as_deref()
            .ok_or(ValidationError::MissingCategory)?;
        let category =
            Category::parse(name).ok_or_else(|| ValidationError::UnknownCategory(name.to_string()))?;

        let timestamp = self
            .timestamp
            .as_deref()
            .ok_or(ValidationError::MissingTimestamp)?;
        if parse_timestamp(timestamp).is_none() {
            return Err(ValidationError::InvalidTimestamp(timestamp.to_string()));
        }

        let value = self.log_value().ok_or(ValidationError::MissingValue {
            category: category.as_str().to_string(),
        })?;

        let readable = match category {
            Category::BloodPressure => value.as_blood_pressure().is_some(),
            _ => value.as_f64().is_some(),
        };
        if !readable {
            return Err(ValidationError::UnparseableValue {
                category: category.as_str().to_string(),
                value: self.value.to_string(),
            });
        }

        Ok(())
    }
}

/// Validation errors for log records
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing category")]
    MissingCategory,

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Missing timestamp")]
    MissingTimestamp,

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Missing value for {category}")]
    MissingValue { category: String },

    #[error("Unparseable {category} value: {value}")]
    UnparseableValue { category: String, value: String },
}

impl ValidationError {
    /// Whether the record is skipped entirely
    pub fn drops_record(&self) -> bool {
        matches!(
            self,
            ValidationError::MissingCategory
                | ValidationError::UnknownCategory(_)
                | ValidationError::MissingTimestamp
                | ValidationError::InvalidTimestamp(_)
        )
    }
}

/// Parse an ISO 8601 timestamp, keeping its offset.
///
/// Seconds may be omitted. Timestamps without an offset are read as UTC; a
/// bare date is midnight UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts);
    }

    // minute precision with an offset, e.g. 2024-01-21T18:00Z or 18:00+05:30
    let with_offset = match raw.strip_suffix(&['Z', 'z'][..]) {
        Some(rest) => format!("{rest}+00:00"),
        None => raw.to_string(),
    };
    for format in ["%Y-%m-%dT%H:%M%:z", "%Y-%m-%dT%H:%M%z"] {
        if let Ok(ts) = DateTime::parse_from_str(&with_offset, format) {
            return Some(ts);
        }
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive).fixed_offset());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive).fixed_offset())
}

/// Accept any JSON for a string field, keeping only actual strings
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => Some(s),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_contract_shape() {
        let record: LogRecord = serde_json::from_value(json!({
            "category": "heartRate",
            "value": 72,
            "timestamp": "2024-01-15T08:00:00.000Z",
            "memberId": "member-1"
        }))
        .unwrap();

        assert_eq!(record.parsed_category(), Some(Category::HeartRate));
        assert_eq!(record.member_id.as_deref(), Some("member-1"));
        assert!(record.parsed_timestamp().is_some());
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_lenient_fields() {
        let record: LogRecord = serde_json::from_value(json!({
            "category": 7,
            "value": {"nested": true},
            "timestamp": null
        }))
        .unwrap();

        assert_eq!(record.category, None);
        assert_eq!(record.timestamp, None);
        assert_eq!(record.log_value(), None);
        assert_eq!(record.validate(), Err(ValidationError::MissingCategory));
    }

    #[test]
    fn test_timestamp_formats() {
        let with_offset = parse_timestamp("2024-01-15T23:30:00-05:00").unwrap();
        assert_eq!(with_offset.offset().local_minus_utc(), -5 * 3600);
        assert_eq!(
            with_offset.date_naive(),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );

        let naive = parse_timestamp("2024-01-15T08:00:00").unwrap();
        assert_eq!(naive.offset().local_minus_utc(), 0);

        let spaced = parse_timestamp("2024-01-15 08:00:00.250").unwrap();
        assert_eq!(spaced.date_naive(), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());

        let date_only = parse_timestamp("2024-01-15").unwrap();
        assert_eq!(date_only.date_naive(), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());

        let minutes_utc = parse_timestamp("2024-01-21T18:00Z").unwrap();
        assert_eq!(minutes_utc.offset().local_minus_utc(), 0);
        assert_eq!(minutes_utc.date_naive(), NaiveDate::from_ymd_opt(2024, 1, 21).unwrap());

        let minutes_offset = parse_timestamp("2024-01-21T23:45+05:30").unwrap();
        assert_eq!(minutes_offset.offset().local_minus_utc(), 5 * 3600 + 30 * 60);
        assert_eq!(minutes_offset.date_naive(), NaiveDate::from_ymd_opt(2024, 1, 21).unwrap());

        let compact_offset = parse_timestamp("2024-01-21T06:15-0800").unwrap();
        assert_eq!(compact_offset.offset().local_minus_utc(), -8 * 3600);

        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn test_validation_errors() {
        let unknown = LogRecord::new("mood", json!(3), "2024-01-15");
        assert_eq!(
            unknown.validate(),
            Err(ValidationError::UnknownCategory("mood".to_string()))
        );
        assert!(unknown.validate().unwrap_err().drops_record());

        let bad_ts = LogRecord::new("steps", json!(3), "15/01/2024");
        assert!(matches!(
            bad_ts.validate(),
            Err(ValidationError::InvalidTimestamp(_))
        ));

        let null_value = LogRecord::new("water", json!(null), "2024-01-15");
        let err = null_value.validate().unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingValue {
                category: "water".to_string()
            }
        );
        assert!(!err.drops_record());

        let bad_bp = LogRecord::new("bloodPressure", json!("120-80"), "2024-01-15");
        assert!(matches!(
            bad_bp.validate(),
            Err(ValidationError::UnparseableValue { .. })
        ));

        let good_bp = LogRecord::new("blood_pressure", json!("120/80"), "2024-01-15");
        assert!(good_bp.validate().is_ok());
    }

    #[test]
    fn test_serialize_skips_missing_member() {
        let record = LogRecord::new("steps", json!(1200), "2024-01-15T08:00:00Z");
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("memberId"));
        assert!(json.contains("\"category\":\"steps\""));
    }
}
