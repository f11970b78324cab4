//! Daily normalization
//!
//! This module reduces one day's entries to raw totals and maps those totals
//! onto 0-1 sub-scores.
//! - Sums for steps, water, calories and sleep; mean for heart rate
//! - Goal-relative scores, clamped to 0-1
//! - Categories without a usable value are left out, never scored as 0

use crate::bucket::DailyBucket;
use crate::config::ScoreConfig;
use crate::types::{Category, DailyTotals, NormalizedDailyScore};
use tracing::debug;

/// Normalizer for turning a daily bucket into sub-scores
pub struct Normalizer;

impl Normalizer {
    /// Reduce a bucket's entries to raw per-category totals
    pub fn totals(bucket: &DailyBucket<'_>) -> DailyTotals {
        DailyTotals {
            steps: sum_of(bucket, Category::Steps),
            water: sum_of(bucket, Category::Water),
            calories: sum_of(bucket, Category::Calories),
            sleep: sum_of(bucket, Category::Sleep),
            heart_rate: mean_of(bucket, Category::HeartRate),
        }
    }

    /// Map raw totals to sub-scores
    pub fn normalize(totals: &DailyTotals, config: &ScoreConfig) -> NormalizedDailyScore {
        let mut scores = NormalizedDailyScore::new();

        if let Some(steps) = totals.steps {
            scores.insert(Category::Steps, goal_ratio(steps, config.step_goal));
        }
        if let Some(water) = totals.water {
            scores.insert(Category::Water, goal_ratio(water, config.water_goal));
        }
        if let Some(calories) = totals.calories {
            scores.insert(
                Category::Calories,
                band_score(calories, config.calorie_goal, config.calorie_goal),
            );
        }
        if let Some(sleep) = totals.sleep {
            scores.insert(Category::Sleep, goal_ratio(sleep, config.sleep_goal));
        }
        if let Some(hr) = totals.heart_rate {
            scores.insert(
                Category::HeartRate,
                band_score(hr, config.heart_rate_target, config.heart_rate_tolerance),
            );
        }

        scores
    }

    /// Totals and sub-scores for one bucket
    pub fn normalize_bucket(
        bucket: &DailyBucket<'_>,
        config: &ScoreConfig,
    ) -> (DailyTotals, NormalizedDailyScore) {
        let totals = Self::totals(bucket);
        let normalized = Self::normalize(&totals, config);
        (totals, normalized)
    }
}

/// Progress toward a goal: `min(value/goal, 1)`, floored at 0
fn goal_ratio(value: f64, goal: f64) -> f64 {
    (value / goal).clamp(0.0, 1.0)
}

/// Closeness to a target: `max(0, 1 - |value-target|/tolerance)`
///
/// Penalizes both sides of the target equally.
fn band_score(value: f64, target: f64, tolerance: f64) -> f64 {
    (1.0 - (value - target).abs() / tolerance).clamp(0.0, 1.0)
}

fn parsed_values(bucket: &DailyBucket<'_>, category: Category) -> Vec<f64> {
    bucket
        .of(category)
        .filter_map(|entry| {
            let value = entry.numeric_value();
            if value.is_none() {
                debug!(
                    category = category.as_str(),
                    date = %bucket.date,
                    raw = ?entry.value,
                    "ignoring unparseable log value"
                );
            }
            value
        })
        .collect()
}

fn sum_of(bucket: &DailyBucket<'_>, category: Category) -> Option<f64> {
    let values = parsed_values(bucket, category);
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum())
}

fn mean_of(bucket: &DailyBucket<'_>, category: Category) -> Option<f64> {
    crate::stats::mean(&parsed_values(bucket, category))
}
