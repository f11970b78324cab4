//! Adapter for converting pulse.health_log.v1 records to health log entries
//!
//! This module is the boundary with the log ingestion layer: it parses the
//! fetched documents and stamps each usable row with the subject it belongs to.

use crate::error::ComputeError;
use crate::schema::log_record::*;
use crate::types::HealthLogEntry;
use tracing::debug;

/// Adapter for converting log records to entries
pub struct LogRecordAdapter;

impl LogRecordAdapter {
    /// Parse a JSON string containing an array of log records.
    ///
    /// Only a malformed document is an error; rows that are not objects are
    /// skipped.
    pub fn parse_array(json: &str) -> Result<Vec<LogRecord>, ComputeError> {
        let rows: Vec<serde_json::Value> = serde_json::from_str(json)?;
        Ok(rows
            .into_iter()
            .enumerate()
            .filter_map(|(index, row)| record_from_value(index, row))
            .collect())
    }

    /// Parse NDJSON (newline-delimited JSON) containing log records
    pub fn parse_ndjson(ndjson: &str) -> Result<Vec<LogRecord>, ComputeError> {
        let mut records = Vec::new();
        for (line_num, line) in ndjson.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let row = serde_json::from_str::<serde_json::Value>(trimmed).map_err(|e| {
                ComputeError::ParseError(format!("Failed to parse line {}: {}", line_num + 1, e))
            })?;
            records.extend(record_from_value(line_num, row));
        }
        Ok(records)
    }

    /// Convert records to entries for one subject.
    ///
    /// Rows with an unknown category or an unreadable timestamp cannot be placed
    /// on a day and are skipped. Rows with unreadable values are kept; the
    /// normalizer ignores their value.
    pub fn to_entries(records: &[LogRecord], subject_id: &str) -> Vec<HealthLogEntry> {
        let mut entries = Vec::with_capacity(records.len());

        for (index, record) in records.iter().enumerate() {
            let (Some(category), Some(timestamp)) =
                (record.parsed_category(), record.parsed_timestamp())
            else {
                debug!(
                    index,
                    category = ?record.category,
                    timestamp = ?record.timestamp,
                    "skipping log record that cannot be bucketed"
                );
                continue;
            };

            entries.push(HealthLogEntry {
                category,
                value: record.log_value(),
                timestamp,
                subject_id: subject_id.to_string(),
                member_id: record.member_id.clone(),
            });
        }

        entries
    }

    /// Keep only the entries logged for one family member
    pub fn for_member(entries: Vec<HealthLogEntry>, member_id: &str) -> Vec<HealthLogEntry> {
        entries
            .into_iter()
            .filter(|e| e.member_id.as_deref() == Some(member_id))
            .collect()
    }

    /// Validate a batch of records
    pub fn validate_records(records: &[LogRecord]) -> Vec<ValidationResult> {
        records
            .iter()
            .enumerate()
            .filter_map(|(index, record)| {
                record.validate().err().map(|error| ValidationResult {
                    index,
                    category: record.category.clone(),
                    error,
                })
            })
            .collect()
    }
}

/// Read one row as a record, skipping rows that are not objects
fn record_from_value(index: usize, row: serde_json::Value) -> Option<LogRecord> {
    if !row.is_object() {
        debug!(index, row = %row, "skipping log row that is not an object");
        return None;
    }
    match serde_json::from_value::<LogRecord>(row) {
        Ok(record) => Some(record),
        Err(e) => {
            debug!(index, error = %e, "skipping unreadable log row");
            None
        }
    }
}

/// Problem found in one record
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub index: usize,
    pub category: Option<String>,
    pub error: ValidationError,
}
