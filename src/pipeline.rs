//! Pipeline orchestration
//!
//! This module provides the public API for Pulse Score.
//! It runs the engine from fetched log entries (or raw backend JSON) to a
//! window summary or report.

use crate::config::ScoreConfig;
use crate::encoder::ReportEncoder;
use crate::error::ComputeError;
use crate::insights::InsightGenerator;
use crate::schema::LogRecordAdapter;
use crate::types::{HealthLogEntry, ScoreReport, WindowSummary};
use crate::window::{WindowScorer, WindowStats};
use chrono::NaiveDate;
use tracing::debug;

/// Compute the window summary for entries with the default goals.
///
/// Pure and infallible: malformed values are ignored and an empty slice yields
/// a zeroed summary.
///
/// # Example
/// ```ignore
/// let summary = compute_summary(&entries, NaiveDate::from_ymd_opt(2024, 1, 21).unwrap());
/// println!("{} ({:+})", summary.overall_score, summary.score_delta);
/// ```
pub fn compute_summary(entries: &[HealthLogEntry], reference_date: NaiveDate) -> WindowSummary {
    summarize(entries, reference_date, &ScoreConfig::default())
}

/// Convert a raw backend JSON array of log records into summary JSON.
///
/// # Arguments
/// * `records_json` - JSON array of `{category, value, timestamp, memberId?}` rows
/// * `reference_date` - Last day of the current window (YYYY-MM-DD)
///
/// # Returns
/// Summary JSON matching the presentation contract
pub fn summary_from_json(
    records_json: String,
    reference_date: String,
) -> Result<String, ComputeError> {
    let reference_date = parse_reference_date(&reference_date)?;
    let records = LogRecordAdapter::parse_array(&records_json)?;
    let entries = LogRecordAdapter::to_entries(&records, "");
    ReportEncoder::summary_to_json(&compute_summary(&entries, reference_date))
}

/// Parse a `YYYY-MM-DD` reference date
pub fn parse_reference_date(raw: &str) -> Result<NaiveDate, ComputeError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|e| ComputeError::DateParseError(format!("{raw}: {e}")))
}

/// Score both windows and derive insights.
///
/// Stages:
/// 1. DayIndex - Bucket entries by calendar date
/// 2. Normalizer - Reduce each day to totals and sub-scores
/// 3. DailyAggregator - Composite per day
/// 4. WindowScorer - Window means, delta and balance vector
/// 5. InsightGenerator - Rule-based statements
fn summarize(
    entries: &[HealthLogEntry],
    reference_date: NaiveDate,
    config: &ScoreConfig,
) -> WindowSummary {
    let stats = WindowScorer::evaluate(entries, reference_date, config);
    build_summary(&stats, config)
}

fn build_summary(stats: &WindowStats, config: &ScoreConfig) -> WindowSummary {
    let insights = InsightGenerator::generate(stats, config);

    WindowSummary {
        daily_scores: stats.daily_scores(),
        labels: stats.labels(),
        balance_vector: stats.balance_vector(),
        overall_score: stats.overall_score(),
        score_delta: stats.score_delta(),
        insights,
        latest_vitals: stats.latest_vitals.clone(),
    }
}

/// Engine with custom goals and a report encoder.
///
/// Holds no per-call state, so one engine can serve any number of subjects,
/// including from several threads.
#[derive(Debug, Clone, Default)]
pub struct ScoreEngine {
    config: ScoreConfig,
    encoder: ReportEncoder,
}

impl ScoreEngine {
    /// Create an engine with the default goals
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with custom goals
    pub fn with_config(config: ScoreConfig) -> Result<Self, ComputeError> {
        config.validate()?;
        Ok(Self {
            config,
            encoder: ReportEncoder::new(),
        })
    }

    /// Create an engine from a JSON goals document
    pub fn from_config_json(json: &str) -> Result<Self, ComputeError> {
        Self::with_config(ScoreConfig::from_json(json)?)
    }

    pub fn config(&self) -> &ScoreConfig {
        &self.config
    }

    /// Intermediate window statistics
    pub fn evaluate(&self, entries: &[HealthLogEntry], reference_date: NaiveDate) -> WindowStats {
        WindowScorer::evaluate(entries, reference_date, &self.config)
    }

    /// Window summary for all given entries
    pub fn summarize(&self, entries: &[HealthLogEntry], reference_date: NaiveDate) -> WindowSummary {
        summarize(entries, reference_date, &self.config)
    }

    /// Window summary for one family member, or for all entries when `None`
    pub fn summarize_member(
        &self,
        entries: &[HealthLogEntry],
        reference_date: NaiveDate,
        member_id: Option<&str>,
    ) -> WindowSummary {
        match member_id {
            Some(member) => {
                let scoped = LogRecordAdapter::for_member(entries.to_vec(), member);
                debug!(member, kept = scoped.len(), total = entries.len(), "scoped to member");
                self.summarize(&scoped, reference_date)
            }
            None => self.summarize(entries, reference_date),
        }
    }

    /// Summary wrapped in a report envelope
    pub fn report(
        &self,
        entries: &[HealthLogEntry],
        reference_date: NaiveDate,
        subject_id: &str,
        member_id: Option<&str>,
    ) -> ScoreReport {
        let summary = self.summarize_member(entries, reference_date, member_id);
        self.encoder
            .encode(summary, subject_id, member_id, reference_date)
    }

    /// Process a raw backend JSON array into report JSON
    pub fn process_json(
        &self,
        records_json: &str,
        reference_date: &str,
        subject_id: &str,
        member_id: Option<&str>,
    ) -> Result<String, ComputeError> {
        let reference_date = parse_reference_date(reference_date)?;
        let records = LogRecordAdapter::parse_array(records_json)?;
        let entries = LogRecordAdapter::to_entries(&records, subject_id);
        let report = self.report(&entries, reference_date, subject_id, member_id);
        ReportEncoder::report_to_json(&report)
    }
}
