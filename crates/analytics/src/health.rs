use crate::error::Result;
use crate::ratios::RatioSet;
use configuration::{GradeBand, ScoringPolicy, TierTable, BUCKET_MAX_POINTS};
use core_types::{Grade, RatioMetric};
use serde::{Deserialize, Serialize};

/// The points awarded by each of the four buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubScores {
    pub liquidity: u32,
    pub profitability: u32,
    pub leverage: u32,
    pub returns: u32,
}

impl SubScores {
    pub fn total(&self) -> u32 {
        self.liquidity + self.profitability + self.leverage + self.returns
    }
}

/// One line of the itemized explanation behind a health score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketScore {
    pub bucket: String,
    pub metric: RatioMetric,
    pub value: f64,
    pub points: u32,
    pub max_points: u32,
    pub explanation: String,
}

/// Composite 0-100 summary of a ratio set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthScore {
    pub score: u32,
    pub grade: Grade,
    pub grade_label: String,
    pub sub_scores: SubScores,
    pub breakdown: Vec<BucketScore>,
}

/// Discretizes a ratio set into four 25-point buckets and grades the total.
#[derive(Debug, Clone)]
pub struct HealthScorer {
    policy: ScoringPolicy,
}

impl Default for HealthScorer {
    fn default() -> Self {
        Self {
            policy: ScoringPolicy::default(),
        }
    }
}

impl HealthScorer {
    /// Creates a scorer after checking the policy is monotonic and bounded.
    pub fn new(policy: ScoringPolicy) -> Result<Self> {
        policy.validate()?;
        Ok(Self { policy })
    }

    pub fn score(&self, ratios: &RatioSet) -> HealthScore {
        let buckets = [
            ("liquidity", &self.policy.liquidity),
            ("profitability", &self.policy.profitability),
            ("leverage", &self.policy.leverage),
            ("returns", &self.policy.returns),
        ];

        let breakdown: Vec<BucketScore> = buckets
            .iter()
            .map(|(bucket, table)| score_bucket(bucket, table, ratios))
            .collect();

        let sub_scores = SubScores {
            liquidity: breakdown[0].points,
            profitability: breakdown[1].points,
            leverage: breakdown[2].points,
            returns: breakdown[3].points,
        };
        let score = sub_scores.total();
        let (grade, grade_label) = grade_for(&self.policy.grades, score);

        tracing::debug!(score, grade = %grade, "Health score computed");

        HealthScore {
            score,
            grade,
            grade_label,
            sub_scores,
            breakdown,
        }
    }
}

fn score_bucket(bucket: &str, table: &TierTable, ratios: &RatioSet) -> BucketScore {
    let value = ratios.value(table.metric).unwrap_or(f64::NAN);

    let matched = table
        .tiers
        .iter()
        .find(|tier| table.direction.meets(value, tier.threshold));

    let (points, explanation) = match matched {
        Some(tier) => (
            tier.points,
            format!(
                "{} of {} meets the {} tier",
                table.metric,
                format_value(table.metric, value),
                format_value(table.metric, tier.threshold)
            ),
        ),
        None if value.is_nan() => {
            tracing::warn!(bucket, metric = %table.metric, "Metric unavailable, awarding fallback points");
            (
                table.fallback_points,
                format!("{} unavailable", table.metric),
            )
        }
        None => (
            table.fallback_points,
            format!(
                "{} of {} is below every tier",
                table.metric,
                format_value(table.metric, value)
            ),
        ),
    };

    BucketScore {
        bucket: bucket.to_string(),
        metric: table.metric,
        value,
        points: points.min(BUCKET_MAX_POINTS),
        max_points: BUCKET_MAX_POINTS,
        explanation,
    }
}

fn grade_for(bands: &[GradeBand], score: u32) -> (Grade, String) {
    bands
        .iter()
        .find(|band| score >= band.min_score)
        .map(|band| (band.grade, band.label.clone()))
        // Validated policies always end with a band at 0.
        .unwrap_or((Grade::F, "needs improvement".to_string()))
}

fn format_value(metric: RatioMetric, value: f64) -> String {
    if metric.is_percentage() {
        format!("{value:.2}%")
    } else {
        format!("{value:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ratios(current: f64, npm: f64, dta: f64, roa: f64) -> RatioSet {
        RatioSet {
            current_ratio: current,
            quick_ratio: current,
            cash_ratio: 0.5,
            working_capital: 0.0,
            gross_profit_margin: 40.0,
            operating_margin: npm,
            net_profit_margin: npm,
            roa,
            roe: roa,
            debt_to_asset_ratio: dta,
            debt_to_equity_ratio: dta,
            asset_turnover: 1.0,
        }
    }

    #[test]
    fn test_reference_liquidity_tier() {
        let health = HealthScorer::default().score(&ratios(1.83, 12.0, 60.46, 13.79));
        assert_eq!(health.sub_scores.liquidity, 20);
        assert_eq!(health.sub_scores.profitability, 20);
        assert_eq!(health.sub_scores.leverage, 15);
        assert_eq!(health.sub_scores.returns, 20);
        assert_eq!(health.score, 75);
        assert_eq!(health.grade, Grade::B);
        assert_eq!(health.grade_label, "good");
    }

    #[test]
    fn test_tier_boundaries_are_inclusive() {
        let health = HealthScorer::default().score(&ratios(2.0, 15.0, 30.0, 15.0));
        assert_eq!(health.score, 100);
        assert_eq!(health.grade, Grade::A);

        let health = HealthScorer::default().score(&ratios(0.79, -0.1, 85.1, -3.0));
        assert_eq!(health.sub_scores.liquidity, 5);
        assert_eq!(health.sub_scores.profitability, 0);
        assert_eq!(health.sub_scores.leverage, 5);
        assert_eq!(health.sub_scores.returns, 0);
        assert_eq!(health.score, 10);
        assert_eq!(health.grade, Grade::F);
    }

    #[test]
    fn test_grade_bands() {
        let scorer = HealthScorer::default();
        // liquidity 15, profitability 15, leverage 15, returns 10 = 55
        let health = scorer.score(&ratios(1.0, 5.0, 70.0, 0.0));
        assert_eq!(health.score, 55);
        assert_eq!(health.grade, Grade::C);

        // 10 + 10 + 10 + 10 = 40
        let health = scorer.score(&ratios(0.8, 0.0, 85.0, 0.0));
        assert_eq!(health.score, 40);
        assert_eq!(health.grade, Grade::D);
        assert_eq!(health.grade_label, "needs improvement");
    }

    #[test]
    fn test_nan_metric_gets_fallback() {
        let health = HealthScorer::default().score(&ratios(f64::NAN, 12.0, 40.0, 12.0));
        assert_eq!(health.sub_scores.liquidity, 5);
        assert!(health.breakdown[0].explanation.contains("unavailable"));
    }

    #[test]
    fn test_breakdown_matches_sub_scores() {
        let health = HealthScorer::default().score(&ratios(1.6, 7.0, 45.0, 3.0));
        let sum: u32 = health.breakdown.iter().map(|b| b.points).sum();
        assert_eq!(sum, health.score);
        assert_eq!(health.breakdown.len(), 4);
        assert!(health.breakdown.iter().all(|b| b.max_points == 25));
    }

    #[test]
    fn test_invalid_policy_rejected() {
        let mut policy = ScoringPolicy::default();
        policy.liquidity.tiers.reverse();
        assert!(HealthScorer::new(policy).is_err());
    }
}
