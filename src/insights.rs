//! Insight generation
//!
//! Rule-based statements derived from the window statistics. Rules run in a
//! fixed order (step goal, hydration trend, calorie goal) and each emits at
//! most one insight; there is no ranking step.

use crate::config::ScoreConfig;
use crate::stats::round_score;
use crate::types::{Category, Directionality, Insight, InsightKind};
use crate::window::{Window, WindowStats};

/// Generator for window insights
pub struct InsightGenerator;

impl InsightGenerator {
    /// Run every rule against the window statistics
    pub fn generate(stats: &WindowStats, config: &ScoreConfig) -> Vec<Insight> {
        [
            step_goal_insight(stats, config),
            hydration_trend_insight(stats),
            calorie_goal_insight(stats, config),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Current-window days whose raw step total reached the goal
    pub fn step_goal_days(stats: &WindowStats, config: &ScoreConfig) -> u32 {
        stats
            .current
            .iter()
            .filter(|d| d.totals.steps.is_some_and(|s| s >= config.step_goal))
            .count() as u32
    }

    /// Current-window days whose raw calorie total went over the goal
    pub fn calorie_exceeded_days(stats: &WindowStats, config: &ScoreConfig) -> u32 {
        stats
            .current
            .iter()
            .filter(|d| d.totals.calories.is_some_and(|c| c > config.calorie_goal))
            .count() as u32
    }

    /// Change in mean hydration sub-score, in percentage points
    pub fn hydration_delta_pct(stats: &WindowStats) -> i32 {
        let current = stats
            .category_mean(Window::Current, Category::Water)
            .unwrap_or(0.0);
        let previous = stats
            .category_mean(Window::Previous, Category::Water)
            .unwrap_or(0.0);
        round_score((current - previous) * 100.0)
    }
}

fn step_goal_insight(stats: &WindowStats, config: &ScoreConfig) -> Option<Insight> {
    let days = InsightGenerator::step_goal_days(stats, config);
    if days == 0 {
        return None;
    }

    Some(Insight {
        kind: InsightKind::StepGoalAchieved,
        title: "Step goal reached".to_string(),
        description: format!(
            "You reached {} steps on {} this week.",
            config.step_goal.round(),
            plural_days(days)
        ),
        magnitude: days,
        directionality: Directionality::Improved,
    })
}

fn hydration_trend_insight(stats: &WindowStats) -> Option<Insight> {
    let delta = InsightGenerator::hydration_delta_pct(stats);
    if delta == 0 {
        return None;
    }

    let (title, direction, directionality) = if delta > 0 {
        ("Hydration improved", "up", Directionality::Improved)
    } else {
        ("Hydration declined", "down", Directionality::Declined)
    };

    Some(Insight {
        kind: InsightKind::HydrationTrend,
        title: title.to_string(),
        description: format!(
            "Water intake is {} {}% compared to last week.",
            direction,
            delta.unsigned_abs()
        ),
        magnitude: delta.unsigned_abs(),
        directionality,
    })
}

fn calorie_goal_insight(stats: &WindowStats, config: &ScoreConfig) -> Option<Insight> {
    let days = InsightGenerator::calorie_exceeded_days(stats, config);
    if days == 0 {
        return None;
    }

    Some(Insight {
        kind: InsightKind::CalorieGoalExceeded,
        title: "Calorie goal exceeded".to_string(),
        description: format!(
            "You went over {} kcal on {} this week.",
            config.calorie_goal.round(),
            plural_days(days)
        ),
        magnitude: days,
        directionality: Directionality::Declined,
    })
}

fn plural_days(days: u32) -> String {
    if days == 1 {
        "1 day".to_string()
    } else {
        format!("{days} days")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{HealthLogEntry, LogValue};
    use crate::window::WindowScorer;
    use chrono::{Days, NaiveDate, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn reference() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 21).unwrap()
    }

    fn on(days_ago: u64, category: Category, value: f64) -> HealthLogEntry {
        let date = reference().checked_sub_days(Days::new(days_ago)).unwrap();
        let ts = Utc
            .from_utc_datetime(&date.and_hms_opt(9, 0, 0).unwrap())
            .fixed_offset();
        HealthLogEntry::new(category, Some(LogValue::Number(value)), ts, "subject")
    }

    fn insights_for(entries: &[HealthLogEntry]) -> Vec<Insight> {
        let config = ScoreConfig::default();
        let stats = WindowScorer::evaluate(entries, reference(), &config);
        InsightGenerator::generate(&stats, &config)
    }

    #[test]
    fn test_no_entries_no_insights() {
        assert!(insights_for(&[]).is_empty());
    }

    #[test]
    fn test_step_goal_count() {
        let entries = vec![
            on(0, Category::Steps, 8000.0),
            on(1, Category::Steps, 12000.0),
            on(2, Category::Steps, 7999.0),
            // split across two entries on the same day
            on(3, Category::Steps, 5000.0),
            on(3, Category::Steps, 3000.0),
            // previous window does not count
            on(8, Category::Steps, 9000.0),
        ];
        let insights = insights_for(&entries);

        assert_eq!(insights.len(), 1);
        let insight = &insights[0];
        assert_eq!(insight.kind, InsightKind::StepGoalAchieved);
        assert_eq!(insight.magnitude, 3);
        assert_eq!(insight.directionality, Directionality::Improved);
        assert_eq!(insight.description, "You reached 8000 steps on 3 days this week.");
    }

    #[test]
    fn test_hydration_improved() {
        let entries = vec![on(0, Category::Water, 8.0), on(9, Category::Water, 4.0)];
        let insights = insights_for(&entries);

        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].kind, InsightKind::HydrationTrend);
        assert_eq!(insights[0].magnitude, 50);
        assert_eq!(insights[0].directionality, Directionality::Improved);
        assert_eq!(insights[0].title, "Hydration improved");
    }

    #[test]
    fn test_hydration_declined() {
        let entries = vec![on(0, Category::Water, 2.0), on(9, Category::Water, 8.0)];
        let insights = insights_for(&entries);

        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].magnitude, 75);
        assert_eq!(insights[0].directionality, Directionality::Declined);
        assert_eq!(
            insights[0].description,
            "Water intake is down 75% compared to last week."
        );
    }

    #[test]
    fn test_hydration_unchanged_emits_nothing() {
        let entries = vec![on(0, Category::Water, 6.0), on(7, Category::Water, 6.0)];
        assert!(insights_for(&entries).is_empty());
    }

    #[test]
    fn test_hydration_tiny_change_rounds_to_zero() {
        // 0.75 vs 0.7525 -> -0.25 points
        let entries = vec![on(0, Category::Water, 6.0), on(7, Category::Water, 6.02)];
        assert!(insights_for(&entries).is_empty());
    }

    #[test]
    fn test_calorie_exceeded_count() {
        let entries = vec![
            on(0, Category::Calories, 2500.0),
            on(1, Category::Calories, 2000.0),
            on(2, Category::Calories, 1200.0),
            on(2, Category::Calories, 900.0),
        ];
        let insights = insights_for(&entries);

        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].kind, InsightKind::CalorieGoalExceeded);
        assert_eq!(insights[0].magnitude, 2);
        assert_eq!(insights[0].directionality, Directionality::Declined);
    }

    #[test]
    fn test_emission_order() {
        let entries = vec![
            on(0, Category::Calories, 2600.0),
            on(0, Category::Water, 8.0),
            on(1, Category::Steps, 9000.0),
        ];
        let kinds: Vec<InsightKind> = insights_for(&entries).iter().map(|i| i.kind).collect();
        assert_eq!(
            kinds,
            vec![
                InsightKind::StepGoalAchieved,
                InsightKind::HydrationTrend,
                InsightKind::CalorieGoalExceeded,
            ]
        );
    }

    #[test]
    fn test_single_day_wording() {
        let insights = insights_for(&[on(0, Category::Calories, 3000.0)]);
        assert_eq!(
            insights[0].description,
            "You went over 2000 kcal on 1 day this week."
        );
    }
}
