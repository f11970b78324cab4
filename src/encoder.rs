//! Report encoding
//!
//! This module wraps a window summary in the report envelope handed to the
//! presentation layer. The envelope adds producer, subject and timing metadata;
//! the embedded summary is left untouched.

use crate::error::ComputeError;
use crate::types::{ReportProducer, ReportSubject, ScoreReport, WindowSummary};
use crate::{PRODUCER_NAME, SCORE_VERSION};
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

/// Current report envelope version
pub const REPORT_VERSION: &str = "1.0.0";

/// Encoder for producing report envelopes
#[derive(Debug, Clone)]
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    /// Wrap a summary into a report
    pub fn encode(
        &self,
        summary: WindowSummary,
        subject_id: &str,
        member_id: Option<&str>,
        reference_date: NaiveDate,
    ) -> ScoreReport {
        ScoreReport {
            report_version: REPORT_VERSION.to_string(),
            producer: ReportProducer {
                name: PRODUCER_NAME.to_string(),
                version: SCORE_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            subject: ReportSubject {
                subject_id: subject_id.to_string(),
                member_id: member_id.map(str::to_string),
            },
            reference_date,
            computed_at_utc: Utc::now().to_rfc3339(),
            summary,
        }
    }

    /// Encode a report to JSON
    pub fn report_to_json(report: &ScoreReport) -> Result<String, ComputeError> {
        serde_json::to_string_pretty(report).map_err(|e| ComputeError::EncodingError(e.to_string()))
    }

    /// Encode a bare summary to compact JSON
    pub fn summary_to_json(summary: &WindowSummary) -> Result<String, ComputeError> {
        serde_json::to_string(summary).map_err(|e| ComputeError::EncodingError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Directionality, Insight, InsightKind, LatestVitals};

    fn make_summary() -> WindowSummary {
        WindowSummary {
            daily_scores: [0.0, 0.5, 0.75, 1.0, 0.0, 0.25, 1.0],
            labels: ["15", "16", "17", "18", "19", "20", "21"].map(String::from),
            balance_vector: [0.8, 0.6, 0.9, 0.7, 0.5, 1.0],
            overall_score: 50,
            score_delta: -3,
            insights: vec![Insight {
                kind: InsightKind::StepGoalAchieved,
                title: "Step goal reached".to_string(),
                description: "You reached 8000 steps on 2 days this week.".to_string(),
                magnitude: 2,
                directionality: Directionality::Improved,
            }],
            latest_vitals: LatestVitals::default(),
        }
    }

    #[test]
    fn test_encode_report() {
        let encoder = ReportEncoder::with_instance_id("test-instance".to_string());
        let date = NaiveDate::from_ymd_opt(2024, 1, 21).unwrap();
        let report = encoder.encode(make_summary(), "subject-1", Some("kid"), date);

        assert_eq!(report.report_version, REPORT_VERSION);
        assert_eq!(report.producer.name, PRODUCER_NAME);
        assert_eq!(report.producer.version, SCORE_VERSION);
        assert_eq!(report.producer.instance_id, "test-instance");
        assert_eq!(report.subject.subject_id, "subject-1");
        assert_eq!(report.subject.member_id.as_deref(), Some("kid"));
        assert_eq!(report.reference_date, date);
        assert_eq!(report.summary, make_summary());
    }

    #[test]
    fn test_report_json_shape() {
        let encoder = ReportEncoder::new();
        let date = NaiveDate::from_ymd_opt(2024, 1, 21).unwrap();
        let report = encoder.encode(make_summary(), "subject-1", None, date);
        let json = ReportEncoder::report_to_json(&report).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["reportVersion"], REPORT_VERSION);
        assert_eq!(parsed["referenceDate"], "2024-01-21");
        assert!(parsed["subject"].get("memberId").is_none());
        assert!(parsed["producer"]["instanceId"].is_string());
        assert!(parsed["computedAtUtc"].is_string());
    }

    #[test]
    fn test_summary_json_matches_output_contract() {
        let json = ReportEncoder::summary_to_json(&make_summary()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed["dailyScores"].as_array().unwrap().len(), 7);
        assert_eq!(parsed["labels"][0], "15");
        assert_eq!(parsed["balanceVector"].as_array().unwrap().len(), 6);
        assert_eq!(parsed["overallScore"], 50);
        assert_eq!(parsed["scoreDelta"], -3);
        assert_eq!(parsed["insights"][0]["kind"], "stepGoalAchieved");
        assert_eq!(parsed["insights"][0]["directionality"], "improved");
        assert_eq!(parsed["insights"][0]["magnitude"], 2);
        // empty vitals are left out
        assert!(parsed.get("latestVitals").is_none());
    }
}
