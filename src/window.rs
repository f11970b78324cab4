//! Windowed scoring
//!
//! Scores the seven days ending on the reference date (current window) and the
//! seven days before that (previous window), then derives the overall score,
//! the trend delta and the balance vector.
//!
//! Entries outside the fourteen-day span are ignored.

use crate::aggregator::DailyAggregator;
use crate::bucket::DayIndex;
use crate::config::ScoreConfig;
use crate::stats::{mean, mean_present, round_score};
use crate::types::{
    BalanceAxis, Category, DayScore, HealthLogEntry, LatestVitals, BALANCE_AXES, WINDOW_DAYS,
};
use chrono::{Datelike, Days, NaiveDate};
use tracing::debug;

/// Score for the Mental axis; no log category backs it
pub const MENTAL_AXIS_SCORE: f64 = 0.7;

/// Which of the two windows to read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    Current,
    Previous,
}

/// Intermediate statistics for both windows
#[derive(Debug, Clone)]
pub struct WindowStats {
    pub reference_date: NaiveDate,
    /// Current window, oldest to newest, ending on the reference date
    pub current: [DayScore; WINDOW_DAYS],
    /// Previous window, oldest to newest
    pub previous: [DayScore; WINDOW_DAYS],
    /// Latest unscored vitals logged in the current window
    pub latest_vitals: LatestVitals,
}

/// Scorer for the current/previous window pair
pub struct WindowScorer;

impl WindowScorer {
    /// Dates of the current and previous windows, oldest first
    pub fn window_dates(
        reference_date: NaiveDate,
    ) -> ([NaiveDate; WINDOW_DAYS], [NaiveDate; WINDOW_DAYS]) {
        let n = WINDOW_DAYS as u64;
        let current = std::array::from_fn(|i| days_before(reference_date, n - 1 - i as u64));
        let previous = std::array::from_fn(|i| days_before(reference_date, 2 * n - 1 - i as u64));
        (current, previous)
    }

    /// Score every day of both windows
    pub fn evaluate(
        entries: &[HealthLogEntry],
        reference_date: NaiveDate,
        config: &ScoreConfig,
    ) -> WindowStats {
        let index = DayIndex::build(entries);
        let (current_dates, previous_dates) = Self::window_dates(reference_date);

        let score = |date: NaiveDate| DailyAggregator::score_day(&index.bucket(date), config);
        let current = current_dates.map(|date| score(date));
        let previous = previous_dates.map(|date| score(date));

        let latest_vitals = latest_vitals(entries, &current_dates);

        debug!(
            %reference_date,
            entries = entries.len(),
            logged_days = index.len(),
            "evaluated score windows"
        );

        WindowStats {
            reference_date,
            current,
            previous,
            latest_vitals,
        }
    }
}

impl WindowStats {
    pub fn days(&self, window: Window) -> &[DayScore; WINDOW_DAYS] {
        match window {
            Window::Current => &self.current,
            Window::Previous => &self.previous,
        }
    }

    /// Mean composite over the window, counting empty days as 0
    pub fn mean_composite(&self, window: Window) -> f64 {
        let composites: Vec<f64> = self.days(window).iter().map(|d| d.composite).collect();
        mean(&composites).unwrap_or(0.0)
    }

    /// Mean sub-score of a category over the days it was logged
    pub fn category_mean(&self, window: Window, category: Category) -> Option<f64> {
        mean_present(self.days(window).iter().map(|d| d.normalized.get(category)))
    }

    /// Current-window score (0-100)
    pub fn overall_score(&self) -> i32 {
        round_score(self.mean_composite(Window::Current) * 100.0).clamp(0, 100)
    }

    /// Current minus previous window, in score points (-100..100)
    pub fn score_delta(&self) -> i32 {
        let delta = self.mean_composite(Window::Current) - self.mean_composite(Window::Previous);
        round_score(delta * 100.0).clamp(-100, 100)
    }

    /// Current-window composites, oldest to newest
    pub fn daily_scores(&self) -> [f64; WINDOW_DAYS] {
        self.current.each_ref().map(|d| d.composite)
    }

    /// Day-of-month labels for the current window
    pub fn labels(&self) -> [String; WINDOW_DAYS] {
        self.current.each_ref().map(|d| d.date.day().to_string())
    }

    /// Per-axis averages over the current window
    pub fn balance_vector(&self) -> [f64; BALANCE_AXES] {
        BalanceAxis::ALL.map(|axis| match axis.category() {
            Some(category) => self.category_mean(Window::Current, category).unwrap_or(0.0),
            None => MENTAL_AXIS_SCORE,
        })
    }
}

fn days_before(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_sub_days(Days::new(days))
        .unwrap_or(NaiveDate::MIN)
}

/// Most recent readable weight, blood pressure, temperature and sugar
fn latest_vitals(entries: &[HealthLogEntry], window: &[NaiveDate; WINDOW_DAYS]) -> LatestVitals {
    let span = window[0]..=window[WINDOW_DAYS - 1];
    let in_window: Vec<&HealthLogEntry> = entries
        .iter()
        .filter(|e| span.contains(&e.date()))
        .collect();

    LatestVitals {
        weight: latest_of(&in_window, Category::Weight).and_then(HealthLogEntry::numeric_value),
        blood_pressure: latest_of(&in_window, Category::BloodPressure)
            .and_then(HealthLogEntry::blood_pressure),
        temperature: latest_of(&in_window, Category::Temperature)
            .and_then(HealthLogEntry::numeric_value),
        sugar: latest_of(&in_window, Category::Sugar).and_then(HealthLogEntry::numeric_value),
    }
}

/// Latest readable entry of a category; ties go to the later input entry
fn latest_of<'a>(entries: &[&'a HealthLogEntry], category: Category) -> Option<&'a HealthLogEntry> {
    let mut best: Option<&'a HealthLogEntry> = None;
    for entry in entries.iter().copied().filter(|e| e.category == category) {
        let readable = match category {
            Category::BloodPressure => entry.blood_pressure().is_some(),
            _ => entry.numeric_value().is_some(),
        };
        if readable && best.map_or(true, |b| entry.timestamp >= b.timestamp) {
            best = Some(entry);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BloodPressure, LogValue};
    use chrono::{TimeZone, Utc};

    fn reference() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 21).unwrap()
    }

    fn on(days_ago: u64, category: Category, value: f64) -> HealthLogEntry {
        let date = days_before(reference(), days_ago);
        let ts = Utc
            .from_utc_datetime(&date.and_hms_opt(12, 0, 0).unwrap())
            .fixed_offset();
        HealthLogEntry::new(category, Some(LogValue::Number(value)), ts, "subject")
    }

    #[test]
    fn test_window_dates() {
        let (current, previous) = WindowScorer::window_dates(reference());
        assert_eq!(current[0], NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(current[6], reference());
        assert_eq!(previous[0], NaiveDate::from_ymd_opt(2024, 1, 8).unwrap());
        assert_eq!(previous[6], NaiveDate::from_ymd_opt(2024, 1, 14).unwrap());
    }

    #[test]
    fn test_single_perfect_day() {
        let entries = vec![
            on(0, Category::Steps, 8500.0),
            on(0, Category::Water, 8.0),
        ];
        let stats = WindowScorer::evaluate(&entries, reference(), &ScoreConfig::default());

        assert_eq!(stats.daily_scores(), [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
        assert_eq!(stats.overall_score(), 14);
        assert_eq!(stats.score_delta(), 14);
    }

    #[test]
    fn test_empty_days_count_as_zero() {
        // two days at 0.5 each -> mean 1/7
        let entries = vec![on(0, Category::Steps, 4000.0), on(3, Category::Steps, 4000.0)];
        let stats = WindowScorer::evaluate(&entries, reference(), &ScoreConfig::default());
        assert!((stats.mean_composite(Window::Current) - 1.0 / 7.0).abs() < 1e-9);
        assert_eq!(stats.overall_score(), 14);
    }

    #[test]
    fn test_delta_against_previous_window() {
        let mut entries = Vec::new();
        for day in 0..7 {
            entries.push(on(day, Category::Steps, 8000.0));
            entries.push(on(day + 7, Category::Steps, 4000.0));
        }
        let stats = WindowScorer::evaluate(&entries, reference(), &ScoreConfig::default());
        assert_eq!(stats.overall_score(), 100);
        assert_eq!(stats.score_delta(), 50);
    }

    #[test]
    fn test_negative_delta() {
        let entries = vec![on(10, Category::Water, 8.0)];
        let stats = WindowScorer::evaluate(&entries, reference(), &ScoreConfig::default());
        assert_eq!(stats.overall_score(), 0);
        assert_eq!(stats.score_delta(), -14);
    }

    #[test]
    fn test_entries_outside_windows_are_ignored() {
        let entries = vec![on(14, Category::Steps, 8000.0), on(30, Category::Steps, 8000.0)];
        let stats = WindowScorer::evaluate(&entries, reference(), &ScoreConfig::default());
        assert_eq!(stats.overall_score(), 0);
        assert_eq!(stats.score_delta(), 0);

        // after the reference date
        let future = {
            let ts = Utc.with_ymd_and_hms(2024, 1, 22, 9, 0, 0).unwrap().fixed_offset();
            HealthLogEntry::new(Category::Steps, Some(LogValue::Number(8000.0)), ts, "s")
        };
        let stats = WindowScorer::evaluate(&[future], reference(), &ScoreConfig::default());
        assert_eq!(stats.overall_score(), 0);
    }

    #[test]
    fn test_balance_vector_averages_present_days() {
        let entries = vec![
            on(0, Category::Steps, 8000.0),
            on(1, Category::Steps, 4000.0),
            on(2, Category::HeartRate, 70.0),
        ];
        let stats = WindowScorer::evaluate(&entries, reference(), &ScoreConfig::default());
        let balance = stats.balance_vector();

        assert!((balance[0] - 0.75).abs() < 1e-9); // fitness
        assert_eq!(balance[1], 0.0); // nutrition absent
        assert_eq!(balance[2], 0.0); // sleep absent
        assert_eq!(balance[3], MENTAL_AXIS_SCORE);
        assert_eq!(balance[4], 0.0); // hydration absent
        assert_eq!(balance[5], 1.0); // vitals
    }

    #[test]
    fn test_balance_vector_ignores_previous_window() {
        let entries = vec![on(8, Category::Sleep, 7.0)];
        let stats = WindowScorer::evaluate(&entries, reference(), &ScoreConfig::default());
        assert_eq!(stats.balance_vector()[2], 0.0);
        assert_eq!(stats.category_mean(Window::Previous, Category::Sleep), Some(1.0));
    }

    #[test]
    fn test_labels_are_day_of_month() {
        let stats = WindowScorer::evaluate(&[], reference(), &ScoreConfig::default());
        assert_eq!(
            stats.labels(),
            ["15", "16", "17", "18", "19", "20", "21"].map(String::from)
        );

        let stats = WindowScorer::evaluate(
            &[],
            NaiveDate::from_ymd_opt(2024, 3, 3).unwrap(),
            &ScoreConfig::default(),
        );
        assert_eq!(
            stats.labels(),
            ["26", "27", "28", "29", "1", "2", "3"].map(String::from)
        );
    }

    #[test]
    fn test_latest_vitals() {
        let mut bp_old = on(3, Category::BloodPressure, 0.0);
        bp_old.value = Some(LogValue::Text("130/85".to_string()));
        let mut bp_new = on(1, Category::BloodPressure, 0.0);
        bp_new.value = Some(LogValue::Text("118/76".to_string()));
        let mut bp_bad = on(0, Category::BloodPressure, 0.0);
        bp_bad.value = Some(LogValue::Text("high".to_string()));

        let entries = vec![
            on(5, Category::Weight, 80.0),
            on(2, Category::Weight, 79.5),
            on(9, Category::Sugar, 110.0),
            bp_old,
            bp_new,
            bp_bad,
        ];
        let stats = WindowScorer::evaluate(&entries, reference(), &ScoreConfig::default());

        assert_eq!(stats.latest_vitals.weight, Some(79.5));
        assert_eq!(
            stats.latest_vitals.blood_pressure,
            Some(BloodPressure { systolic: 118, diastolic: 76 })
        );
        assert_eq!(stats.latest_vitals.temperature, None);
        // previous window only
        assert_eq!(stats.latest_vitals.sugar, None);
    }

    #[test]
    fn test_vitals_do_not_affect_scores() {
        let entries = vec![on(0, Category::Weight, 80.0), on(0, Category::Temperature, 37.0)];
        let stats = WindowScorer::evaluate(&entries, reference(), &ScoreConfig::default());
        assert_eq!(stats.daily_scores()[6], 0.0);
        assert_eq!(stats.overall_score(), 0);
    }
}
