use crate::error::ConfigError;
use core_types::{Grade, RatioMetric};
use serde::Deserialize;

/// Upper bound on the points a single bucket may award. Four buckets keep the
/// composite score inside 0..=100.
pub const BUCKET_MAX_POINTS: u32 = 25;

/// Whether a larger metric value is healthier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    HigherIsBetter,
    LowerIsBetter,
}

impl Direction {
    /// Returns true when `value` reaches the tier `threshold` (inclusive).
    pub fn meets(&self, value: f64, threshold: f64) -> bool {
        match self {
            Direction::HigherIsBetter => value >= threshold,
            Direction::LowerIsBetter => value <= threshold,
        }
    }
}

/// One rung of a tier table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Tier {
    pub threshold: f64,
    pub points: u32,
}

impl Tier {
    pub fn new(threshold: f64, points: u32) -> Self {
        Self { threshold, points }
    }
}

/// An ordered, data-driven discretization of one ratio into points.
///
/// Tiers are checked best-first; the first tier the value meets wins and
/// anything that meets none of them gets `fallback_points`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TierTable {
    pub metric: RatioMetric,
    pub direction: Direction,
    pub tiers: Vec<Tier>,
    pub fallback_points: u32,
}

impl TierTable {
    pub fn validate(&self, bucket: &str) -> Result<(), ConfigError> {
        let fail = |reason: String| ConfigError::ValidationError(format!("scoring.{bucket}: {reason}"));

        if self.metric == RatioMetric::HealthScore {
            return Err(fail("a bucket cannot be scored from the health score itself".to_string()));
        }
        if self.fallback_points > BUCKET_MAX_POINTS {
            return Err(fail(format!(
                "fallback_points {} exceeds {BUCKET_MAX_POINTS}",
                self.fallback_points
            )));
        }

        let mut previous: Option<&Tier> = None;
        for tier in &self.tiers {
            if !tier.threshold.is_finite() {
                return Err(fail("tier thresholds must be finite".to_string()));
            }
            if tier.points > BUCKET_MAX_POINTS {
                return Err(fail(format!(
                    "tier points {} exceed {BUCKET_MAX_POINTS}",
                    tier.points
                )));
            }
            if tier.points < self.fallback_points {
                return Err(fail("tier points must not be below fallback_points".to_string()));
            }
            if let Some(prev) = previous {
                let ordered = match self.direction {
                    Direction::HigherIsBetter => tier.threshold < prev.threshold,
                    Direction::LowerIsBetter => tier.threshold > prev.threshold,
                };
                if !ordered {
                    return Err(fail(format!(
                        "thresholds must be strictly {} from best to worst",
                        match self.direction {
                            Direction::HigherIsBetter => "decreasing",
                            Direction::LowerIsBetter => "increasing",
                        }
                    )));
                }
                if tier.points > prev.points {
                    return Err(fail("points must not increase for worse tiers".to_string()));
                }
            }
            previous = Some(tier);
        }
        Ok(())
    }
}

/// A grade awarded to every total score at or above `min_score`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GradeBand {
    pub min_score: u32,
    pub grade: Grade,
    pub label: String,
}

impl GradeBand {
    pub fn new(min_score: u32, grade: Grade, label: &str) -> Self {
        Self {
            min_score,
            grade,
            label: label.to_string(),
        }
    }
}

/// The complete health-score policy: four buckets plus the grade bands.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScoringPolicy {
    pub liquidity: TierTable,
    pub profitability: TierTable,
    pub leverage: TierTable,
    pub returns: TierTable,
    pub grades: Vec<GradeBand>,
}

impl ScoringPolicy {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.liquidity.validate("liquidity")?;
        self.profitability.validate("profitability")?;
        self.leverage.validate("leverage")?;
        self.returns.validate("returns")?;

        let mut previous: Option<u32> = None;
        for band in &self.grades {
            if band.min_score > 100 {
                return Err(ConfigError::ValidationError(format!(
                    "scoring.grades: min_score {} exceeds 100",
                    band.min_score
                )));
            }
            if previous.is_some_and(|p| band.min_score >= p) {
                return Err(ConfigError::ValidationError(
                    "scoring.grades: min_score must be strictly decreasing".to_string(),
                ));
            }
            previous = Some(band.min_score);
        }
        // The last band has to catch everything down to zero.
        if previous != Some(0) {
            return Err(ConfigError::ValidationError(
                "scoring.grades: the last band must start at 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            liquidity: TierTable {
                metric: RatioMetric::CurrentRatio,
                direction: Direction::HigherIsBetter,
                tiers: vec![
                    Tier::new(2.0, 25),
                    Tier::new(1.5, 20),
                    Tier::new(1.0, 15),
                    Tier::new(0.8, 10),
                ],
                fallback_points: 5,
            },
            profitability: TierTable {
                metric: RatioMetric::NetProfitMargin,
                direction: Direction::HigherIsBetter,
                tiers: vec![
                    Tier::new(15.0, 25),
                    Tier::new(10.0, 20),
                    Tier::new(5.0, 15),
                    Tier::new(0.0, 10),
                ],
                fallback_points: 0,
            },
            leverage: TierTable {
                metric: RatioMetric::DebtToAssetRatio,
                direction: Direction::LowerIsBetter,
                tiers: vec![
                    Tier::new(30.0, 25),
                    Tier::new(50.0, 20),
                    Tier::new(70.0, 15),
                    Tier::new(85.0, 10),
                ],
                fallback_points: 5,
            },
            returns: TierTable {
                metric: RatioMetric::Roa,
                direction: Direction::HigherIsBetter,
                tiers: vec![
                    Tier::new(15.0, 25),
                    Tier::new(10.0, 20),
                    Tier::new(5.0, 15),
                    Tier::new(0.0, 10),
                ],
                fallback_points: 0,
            },
            grades: vec![
                GradeBand::new(85, Grade::A, "excellent"),
                GradeBand::new(70, Grade::B, "good"),
                GradeBand::new(50, Grade::C, "fair"),
                GradeBand::new(35, Grade::D, "needs improvement"),
                GradeBand::new(0, Grade::F, "needs improvement"),
            ],
        }
    }
}
