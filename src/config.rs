//! Scoring configuration
//!
//! Goals and targets used by the normalizer and insight rules. Defaults match
//! the app's built-in goals; a JSON document can override any subset.

use crate::error::ComputeError;
use serde::{Deserialize, Serialize};

/// Default daily step goal
pub const DEFAULT_STEP_GOAL: f64 = 8000.0;

/// Default daily water goal (cups)
pub const DEFAULT_WATER_GOAL: f64 = 8.0;

/// Default daily calorie goal (kcal)
pub const DEFAULT_CALORIE_GOAL: f64 = 2000.0;

/// Default nightly sleep goal (hours)
pub const DEFAULT_SLEEP_GOAL: f64 = 7.0;

/// Default heart-rate target center (bpm)
pub const DEFAULT_HEART_RATE_TARGET: f64 = 70.0;

/// Default heart-rate tolerance (bpm away from target at which the score hits 0)
pub const DEFAULT_HEART_RATE_TOLERANCE: f64 = 100.0;

/// Goals and targets for normalization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScoreConfig {
    pub step_goal: f64,
    pub water_goal: f64,
    pub calorie_goal: f64,
    pub sleep_goal: f64,
    pub heart_rate_target: f64,
    pub heart_rate_tolerance: f64,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            step_goal: DEFAULT_STEP_GOAL,
            water_goal: DEFAULT_WATER_GOAL,
            calorie_goal: DEFAULT_CALORIE_GOAL,
            sleep_goal: DEFAULT_SLEEP_GOAL,
            heart_rate_target: DEFAULT_HEART_RATE_TARGET,
            heart_rate_tolerance: DEFAULT_HEART_RATE_TOLERANCE,
        }
    }
}

impl ScoreConfig {
    /// Load and validate a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self, ComputeError> {
        let config: ScoreConfig = serde_json::from_str(json)
            .map_err(|e| ComputeError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Reject goals that would make normalization divide by zero or go negative
    pub fn validate(&self) -> Result<(), ComputeError> {
        let positive = [
            ("stepGoal", self.step_goal),
            ("waterGoal", self.water_goal),
            ("calorieGoal", self.calorie_goal),
            ("sleepGoal", self.sleep_goal),
            ("heartRateTolerance", self.heart_rate_tolerance),
        ];

        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ComputeError::InvalidConfig(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }

        if !self.heart_rate_target.is_finite() {
            return Err(ComputeError::InvalidConfig(
                "heartRateTarget must be a finite number".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_goals() {
        let config = ScoreConfig::default();
        assert_eq!(config.step_goal, 8000.0);
        assert_eq!(config.water_goal, 8.0);
        assert_eq!(config.calorie_goal, 2000.0);
        assert_eq!(config.sleep_goal, 7.0);
        assert_eq!(config.heart_rate_target, 70.0);
        assert_eq!(config.heart_rate_tolerance, 100.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_override() {
        let config = ScoreConfig::from_json(r#"{"stepGoal": 10000, "sleepGoal": 8}"#).unwrap();
        assert_eq!(
            config,
            ScoreConfig {
                step_goal: 10000.0,
                sleep_goal: 8.0,
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_rejects_non_positive_goal() {
        let result = ScoreConfig::from_json(r#"{"calorieGoal": 0}"#);
        assert!(matches!(result, Err(ComputeError::InvalidConfig(_))));

        let result = ScoreConfig::from_json(r#"{"waterGoal": -2}"#);
        assert!(matches!(result, Err(ComputeError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let result = ScoreConfig::from_json("{stepGoal: }");
        assert!(matches!(result, Err(ComputeError::InvalidConfig(_))));
    }

    #[test]
    fn test_serialization_round_trip() {
        let config = ScoreConfig {
            calorie_goal: 2400.0,
            ..Default::default()
        };
        let json = config.to_json().unwrap();
        assert!(json.contains("calorieGoal"));
        assert_eq!(ScoreConfig::from_json(&json).unwrap(), config);
    }
}
