use crate::error::ConfigError;
use crate::rules::{default_rules, validate_rules, RecommendationRule};
use crate::scoring::ScoringPolicy;
use serde::Deserialize;

/// The root configuration structure for the analytics engine.
///
/// Every section falls back to its documented default, so an empty policy file
/// (or no file at all) yields the stock behaviour.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub scoring: ScoringPolicy,
    pub recommendations: Vec<RecommendationRule>,
    pub budget: BudgetThresholds,
    pub forecast: ForecastParams,
    pub anomaly: AnomalyParams,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            scoring: ScoringPolicy::default(),
            recommendations: default_rules(),
            budget: BudgetThresholds::default(),
            forecast: ForecastParams::default(),
            anomaly: AnomalyParams::default(),
        }
    }
}

impl AnalyticsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scoring.validate()?;
        validate_rules(&self.recommendations)?;
        self.budget.validate()?;
        self.forecast.validate()?;
        self.anomaly.validate()?;
        Ok(())
    }
}

/// Usage percentages at which a budget changes status.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BudgetThresholds {
    /// Usage at or above this percentage is a warning.
    pub warning_pct: f64,
    /// Usage strictly above this percentage is exceeded.
    pub exceeded_pct: f64,
}

impl Default for BudgetThresholds {
    fn default() -> Self {
        Self {
            warning_pct: 80.0,
            exceeded_pct: 100.0,
        }
    }
}

impl BudgetThresholds {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.warning_pct > 0.0 && self.warning_pct <= self.exceeded_pct) || !self.exceeded_pct.is_finite() {
            return Err(ConfigError::ValidationError(
                "budget: require 0 < warning_pct <= exceeded_pct".to_string(),
            ));
        }
        Ok(())
    }
}

/// Shape of the cash-flow projection bands.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ForecastParams {
    /// Number of most recent months the trend line is fitted to.
    pub trend_window: usize,
    /// Relative upward spread for the first projected month (0.10 = 10%).
    pub upward_spread: f64,
    /// Relative downward spread for the first projected month.
    pub downward_spread: f64,
    /// Added to both spreads for every further month.
    pub spread_growth: f64,
    /// Confidence of the nearest month with a full trend window of history.
    pub confidence_ceiling: f64,
    /// Multiplier applied to confidence per additional month, in (0, 1).
    pub confidence_decay: f64,
    /// Longest horizon, in months, a single request may ask for.
    pub max_horizon: u32,
}

impl Default for ForecastParams {
    fn default() -> Self {
        Self {
            trend_window: 6,
            upward_spread: 0.10,
            downward_spread: 0.15,
            spread_growth: 0.05,
            confidence_ceiling: 0.95,
            confidence_decay: 0.9,
            max_horizon: 120,
        }
    }
}

impl ForecastParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fail = |reason: &str| Err(ConfigError::ValidationError(format!("forecast: {reason}")));

        if self.trend_window == 0 {
            return fail("trend_window must be at least 1");
        }
        for (name, spread) in [
            ("upward_spread", self.upward_spread),
            ("downward_spread", self.downward_spread),
            ("spread_growth", self.spread_growth),
        ] {
            if !(spread.is_finite() && spread >= 0.0) {
                return fail(&format!("{name} must be a non-negative number"));
            }
        }
        if !(self.confidence_ceiling > 0.0 && self.confidence_ceiling <= 1.0) {
            return fail("confidence_ceiling must be in (0, 1]");
        }
        if !(self.confidence_decay > 0.0 && self.confidence_decay < 1.0) {
            return fail("confidence_decay must be in (0, 1)");
        }
        if self.confidence_decay > 1.0 - f64::EPSILON {
            return fail("confidence_decay is too close to 1 to keep confidence decreasing");
        }
        if self.max_horizon == 0 {
            return fail("max_horizon must be at least 1");
        }
        // Lowest confidence the forecaster can emit: half a window of history at
        // the furthest month. It must stay a normal float or later months collapse to 0.
        let steps = i32::try_from(self.max_horizon - 1).unwrap_or(i32::MAX);
        let weakest = self.confidence_ceiling * 0.5 * self.confidence_decay.powi(steps);
        if !weakest.is_normal() {
            return fail("max_horizon is too long for confidence_decay, confidence would underflow");
        }
        Ok(())
    }
}

/// Statistical cut-offs for transaction outlier detection.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnomalyParams {
    /// Smallest population the detector will assess.
    pub min_sample_size: usize,
    /// |z| strictly above this is a medium anomaly.
    pub medium_z: f64,
    /// |z| strictly above this is a high anomaly.
    pub high_z: f64,
    /// Length of the trailing window used by `detect_trailing`.
    pub window_months: u32,
    /// Floor for the peer standard deviation, relative to the peer mean.
    pub min_relative_dispersion: f64,
}

impl Default for AnomalyParams {
    fn default() -> Self {
        Self {
            min_sample_size: 5,
            medium_z: 2.0,
            high_z: 3.0,
            window_months: 6,
            min_relative_dispersion: 0.01,
        }
    }
}

impl AnomalyParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fail = |reason: &str| Err(ConfigError::ValidationError(format!("anomaly: {reason}")));

        // Scoring against peers needs at least two other transactions.
        if self.min_sample_size < 3 {
            return fail("min_sample_size must be at least 3");
        }
        if !(self.medium_z > 0.0 && self.medium_z < self.high_z && self.high_z.is_finite()) {
            return fail("require 0 < medium_z < high_z");
        }
        if self.window_months == 0 {
            return fail("window_months must be at least 1");
        }
        if !(self.min_relative_dispersion.is_finite() && self.min_relative_dispersion >= 0.0) {
            return fail("min_relative_dispersion must be a non-negative number");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        AnalyticsConfig::default().validate().unwrap();
    }

    #[test]
    fn test_budget_warning_above_exceeded_rejected() {
        let thresholds = BudgetThresholds {
            warning_pct: 110.0,
            exceeded_pct: 100.0,
        };
        assert!(thresholds.validate().is_err());
    }

    #[test]
    fn test_forecast_decay_must_shrink() {
        let params = ForecastParams {
            confidence_decay: 1.0,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_forecast_horizon_must_keep_confidence_positive() {
        let params = ForecastParams {
            max_horizon: 10_000,
            ..Default::default()
        };
        assert!(params.validate().is_err());

        let params = ForecastParams {
            max_horizon: 600,
            ..Default::default()
        };
        params.validate().unwrap();
    }

    #[test]
    fn test_anomaly_cutoffs_ordered() {
        let params = AnomalyParams {
            medium_z: 3.0,
            high_z: 2.0,
            ..Default::default()
        };
        assert!(params.validate().is_err());

        let params = AnomalyParams {
            min_sample_size: 2,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }
}
