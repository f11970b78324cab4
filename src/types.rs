//! Core types for the Pulse Score engine
//!
//! This module defines the data structures that flow through each stage of the
//! engine: log entries, daily totals, normalized sub-scores, and the window summary.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Number of days in one scoring window
pub const WINDOW_DAYS: usize = 7;

/// Number of axes in the balance vector
pub const BALANCE_AXES: usize = 6;

/// Health log category
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Steps,
    Water,
    Calories,
    Sleep,
    HeartRate,
    Weight,
    BloodPressure,
    Temperature,
    Sugar,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Steps,
        Category::Water,
        Category::Calories,
        Category::Sleep,
        Category::HeartRate,
        Category::Weight,
        Category::BloodPressure,
        Category::Temperature,
        Category::Sugar,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Steps => "steps",
            Category::Water => "water",
            Category::Calories => "calories",
            Category::Sleep => "sleep",
            Category::HeartRate => "heartRate",
            Category::Weight => "weight",
            Category::BloodPressure => "bloodPressure",
            Category::Temperature => "temperature",
            Category::Sugar => "sugar",
        }
    }

    /// Parse a category name as sent by the log backend.
    ///
    /// Accepts the camelCase names along with snake_case and kebab-case
    /// spellings, ignoring case.
    pub fn parse(name: &str) -> Option<Category> {
        let key: String = name
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-' && *c != ' ')
            .flat_map(char::to_lowercase)
            .collect();

        match key.as_str() {
            "steps" => Some(Category::Steps),
            "water" => Some(Category::Water),
            "calories" => Some(Category::Calories),
            "sleep" => Some(Category::Sleep),
            "heartrate" => Some(Category::HeartRate),
            "weight" => Some(Category::Weight),
            "bloodpressure" => Some(Category::BloodPressure),
            "temperature" => Some(Category::Temperature),
            "sugar" => Some(Category::Sugar),
            _ => None,
        }
    }
}

/// Raw logged value, kept as sent and interpreted lazily
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LogValue {
    Number(f64),
    Text(String),
}

impl LogValue {
    /// Build a value from arbitrary JSON, keeping only numbers and strings
    pub fn from_json(value: &serde_json::Value) -> Option<LogValue> {
        match value {
            serde_json::Value::Number(n) => n.as_f64().map(LogValue::Number),
            serde_json::Value::String(s) => Some(LogValue::Text(s.clone())),
            _ => None,
        }
    }

    /// Numeric reading, if the value is a finite number or a numeric string
    pub fn as_f64(&self) -> Option<f64> {
        let n = match self {
            LogValue::Number(n) => *n,
            LogValue::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        n.is_finite().then_some(n)
    }

    /// Systolic/diastolic pair from a `"sys/dia"` string
    pub fn as_blood_pressure(&self) -> Option<BloodPressure> {
        let LogValue::Text(s) = self else {
            return None;
        };
        let (sys, dia) = s.split_once('/')?;
        Some(BloodPressure {
            systolic: sys.trim().parse().ok()?,
            diastolic: dia.trim().parse().ok()?,
        })
    }
}

/// Blood pressure reading (mmHg)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BloodPressure {
    pub systolic: u32,
    pub diastolic: u32,
}

/// A single health log entry, already scoped to one subject
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthLogEntry {
    pub category: Category,
    /// Raw value; `None` when the backend sent null or a non-scalar
    pub value: Option<LogValue>,
    /// When the entry was logged, in the offset it was logged in
    pub timestamp: DateTime<FixedOffset>,
    pub subject_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_id: Option<String>,
}

impl HealthLogEntry {
    pub fn new(
        category: Category,
        value: Option<LogValue>,
        timestamp: DateTime<FixedOffset>,
        subject_id: impl Into<String>,
    ) -> Self {
        Self {
            category,
            value,
            timestamp,
            subject_id: subject_id.into(),
            member_id: None,
        }
    }

    pub fn with_member(mut self, member_id: impl Into<String>) -> Self {
        self.member_id = Some(member_id.into());
        self
    }

    /// Calendar date of the entry in its own offset
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    /// Numeric value for every category except blood pressure
    pub fn numeric_value(&self) -> Option<f64> {
        if self.category == Category::BloodPressure {
            return None;
        }
        self.value.as_ref().and_then(LogValue::as_f64)
    }

    /// Parsed blood pressure for blood pressure entries
    pub fn blood_pressure(&self) -> Option<BloodPressure> {
        if self.category != Category::BloodPressure {
            return None;
        }
        self.value.as_ref().and_then(LogValue::as_blood_pressure)
    }
}

/// Raw same-day reductions of the scored categories
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyTotals {
    /// Sum of step counts
    pub steps: Option<f64>,
    /// Sum of water intake (cups)
    pub water: Option<f64>,
    /// Sum of calories (kcal)
    pub calories: Option<f64>,
    /// Sum of sleep (hours)
    pub sleep: Option<f64>,
    /// Mean heart rate (bpm)
    pub heart_rate: Option<f64>,
}

/// Per-category sub-scores in [0,1] for one day.
///
/// Only categories logged that day are present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedDailyScore(BTreeMap<Category, f64>);

impl NormalizedDailyScore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, category: Category, score: f64) {
        self.0.insert(category, score);
    }

    pub fn get(&self, category: Category) -> Option<f64> {
        self.0.get(&category).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, f64)> + '_ {
        self.0.iter().map(|(c, s)| (*c, *s))
    }
}

/// Scored day: totals, sub-scores and composite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayScore {
    pub date: NaiveDate,
    pub totals: DailyTotals,
    pub normalized: NormalizedDailyScore,
    /// Composite score (0-1); 0 for a day with nothing logged
    pub composite: f64,
}

/// Fixed axes of the balance vector, in output order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BalanceAxis {
    Fitness,
    Nutrition,
    Sleep,
    Mental,
    Hydration,
    Vitals,
}

impl BalanceAxis {
    pub const ALL: [BalanceAxis; BALANCE_AXES] = [
        BalanceAxis::Fitness,
        BalanceAxis::Nutrition,
        BalanceAxis::Sleep,
        BalanceAxis::Mental,
        BalanceAxis::Hydration,
        BalanceAxis::Vitals,
    ];

    /// Log category backing the axis; Mental has none
    pub fn category(&self) -> Option<Category> {
        match self {
            BalanceAxis::Fitness => Some(Category::Steps),
            BalanceAxis::Nutrition => Some(Category::Calories),
            BalanceAxis::Sleep => Some(Category::Sleep),
            BalanceAxis::Mental => None,
            BalanceAxis::Hydration => Some(Category::Water),
            BalanceAxis::Vitals => Some(Category::HeartRate),
        }
    }
}

/// Kind of derived insight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InsightKind {
    StepGoalAchieved,
    HydrationTrend,
    CalorieGoalExceeded,
}

/// Direction an insight points in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Directionality {
    Improved,
    Declined,
}

/// Short derived statement about the current window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub kind: InsightKind,
    pub title: String,
    pub description: String,
    /// Day count or percentage points, depending on kind
    pub magnitude: u32,
    pub directionality: Directionality,
}

/// Most recent unscored vitals in the current window
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestVitals {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_pressure: Option<BloodPressure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sugar: Option<f64>,
}

impl LatestVitals {
    pub fn is_empty(&self) -> bool {
        self.weight.is_none()
            && self.blood_pressure.is_none()
            && self.temperature.is_none()
            && self.sugar.is_none()
    }
}

/// Output of one scoring run over the current and previous windows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowSummary {
    /// Current-window composites, oldest to newest (0-1)
    pub daily_scores: [f64; WINDOW_DAYS],
    /// Day-of-month labels matching `daily_scores`
    pub labels: [String; WINDOW_DAYS],
    /// Per-axis averages, ordered as [`BalanceAxis::ALL`]
    pub balance_vector: [f64; BALANCE_AXES],
    /// Current-window score (0-100)
    pub overall_score: i32,
    /// Change against the previous window (-100..100)
    pub score_delta: i32,
    pub insights: Vec<Insight>,
    #[serde(default, skip_serializing_if = "LatestVitals::is_empty")]
    pub latest_vitals: LatestVitals,
}

/// Producer metadata attached to encoded reports
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Whom the report was computed for
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSubject {
    pub subject_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_id: Option<String>,
}

/// Report envelope handed to the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreReport {
    pub report_version: String,
    pub producer: ReportProducer,
    pub subject: ReportSubject,
    pub reference_date: NaiveDate,
    pub computed_at_utc: String,
    pub summary: WindowSummary,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn ts(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    #[test]
    fn test_category_parse_aliases() {
        assert_eq!(Category::parse("heartRate"), Some(Category::HeartRate));
        assert_eq!(Category::parse("heart_rate"), Some(Category::HeartRate));
        assert_eq!(Category::parse("Blood-Pressure"), Some(Category::BloodPressure));
        assert_eq!(Category::parse(" STEPS "), Some(Category::Steps));
        assert_eq!(Category::parse("mood"), None);
    }

    #[test]
    fn test_category_names_round_trip_through_parse() {
        for category in Category::ALL {
            assert_eq!(Category::parse(category.as_str()), Some(category));
        }
    }

    #[test]
    fn test_numeric_value_parsing() {
        let entry = HealthLogEntry::new(
            Category::Water,
            Some(LogValue::Text(" 2.5 ".to_string())),
            ts("2024-01-15T08:00:00Z"),
            "subject",
        );
        assert_eq!(entry.numeric_value(), Some(2.5));

        let entry = HealthLogEntry::new(
            Category::Water,
            Some(LogValue::Text("two".to_string())),
            ts("2024-01-15T08:00:00Z"),
            "subject",
        );
        assert_eq!(entry.numeric_value(), None);

        let entry = HealthLogEntry::new(Category::Steps, None, ts("2024-01-15T08:00:00Z"), "s");
        assert_eq!(entry.numeric_value(), None);

        let entry = HealthLogEntry::new(
            Category::Steps,
            Some(LogValue::Text("NaN".to_string())),
            ts("2024-01-15T08:00:00Z"),
            "s",
        );
        assert_eq!(entry.numeric_value(), None);
    }

    #[test]
    fn test_blood_pressure_parsing() {
        let bp = |s: &str| {
            HealthLogEntry::new(
                Category::BloodPressure,
                Some(LogValue::Text(s.to_string())),
                ts("2024-01-15T08:00:00Z"),
                "s",
            )
        };

        assert_eq!(
            bp("120/80").blood_pressure(),
            Some(BloodPressure { systolic: 120, diastolic: 80 })
        );
        assert_eq!(
            bp(" 118 / 76 ").blood_pressure(),
            Some(BloodPressure { systolic: 118, diastolic: 76 })
        );
        assert_eq!(bp("120").blood_pressure(), None);
        assert_eq!(bp("120/abc").blood_pressure(), None);
        assert_eq!(bp("120.5/80").blood_pressure(), None);
        // never treated as a plain number
        assert_eq!(bp("120/80").numeric_value(), None);
    }

    #[test]
    fn test_entry_date_uses_own_offset() {
        let entry = HealthLogEntry::new(
            Category::Steps,
            Some(LogValue::Number(100.0)),
            ts("2024-01-15T23:30:00-05:00"),
            "s",
        );
        assert_eq!(entry.date(), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    }

    #[test]
    fn test_log_value_from_json() {
        assert_eq!(
            LogValue::from_json(&serde_json::json!(42)),
            Some(LogValue::Number(42.0))
        );
        assert_eq!(
            LogValue::from_json(&serde_json::json!("120/80")),
            Some(LogValue::Text("120/80".to_string()))
        );
        assert_eq!(LogValue::from_json(&serde_json::json!(null)), None);
        assert_eq!(LogValue::from_json(&serde_json::json!(true)), None);
    }
}
