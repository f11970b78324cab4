//! Daily aggregation
//!
//! Reduces a day's sub-scores into one composite score.

use crate::bucket::DailyBucket;
use crate::config::ScoreConfig;
use crate::normalizer::Normalizer;
use crate::types::{DayScore, NormalizedDailyScore};
use tracing::trace;

/// Aggregator producing daily composite scores
pub struct DailyAggregator;

impl DailyAggregator {
    /// Mean of the present sub-scores; 0 for a day with nothing logged
    pub fn composite(normalized: &NormalizedDailyScore) -> f64 {
        if normalized.is_empty() {
            return 0.0;
        }
        normalized.iter().map(|(_, score)| score).sum::<f64>() / normalized.len() as f64
    }

    /// Normalize and aggregate one bucket
    pub fn score_day(bucket: &DailyBucket<'_>, config: &ScoreConfig) -> DayScore {
        let (totals, normalized) = Normalizer::normalize_bucket(bucket, config);
        let composite = Self::composite(&normalized);

        trace!(
            date = %bucket.date,
            categories = normalized.len(),
            composite,
            "scored day"
        );

        DayScore {
            date: bucket.date,
            totals,
            normalized,
            composite,
        }
    }
}
