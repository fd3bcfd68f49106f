use crate::error::ConfigError;
use core_types::{RatioMetric, Severity};
use serde::Deserialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    /// Fires when the metric is strictly below the threshold.
    Below,
    /// Fires when the metric is strictly above the threshold.
    Above,
}

impl Comparison {
    pub fn holds(&self, value: f64, threshold: f64) -> bool {
        match self {
            Comparison::Below => value < threshold,
            Comparison::Above => value > threshold,
        }
    }
}

/// A standalone predicate over one metric and the finding it produces.
///
/// `body` may contain `{value}`, which is replaced by the observed metric.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RecommendationRule {
    pub id: String,
    pub metric: RatioMetric,
    pub comparison: Comparison,
    pub threshold: f64,
    pub severity: Severity,
    pub title: String,
    pub body: String,
}

impl RecommendationRule {
    fn new(
        id: &str,
        metric: RatioMetric,
        comparison: Comparison,
        threshold: f64,
        severity: Severity,
        title: &str,
        body: &str,
    ) -> Self {
        Self {
            id: id.to_string(),
            metric,
            comparison,
            threshold,
            severity,
            title: title.to_string(),
            body: body.to_string(),
        }
    }
}

pub fn validate_rules(rules: &[RecommendationRule]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for rule in rules {
        if rule.id.trim().is_empty() || rule.title.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "recommendations: every rule needs an id and a title".to_string(),
            ));
        }
        if !seen.insert(rule.id.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "recommendations: duplicate rule id '{}'",
                rule.id
            )));
        }
        if !rule.threshold.is_finite() {
            return Err(ConfigError::ValidationError(format!(
                "recommendations.{}: threshold must be finite",
                rule.id
            )));
        }
    }
    Ok(())
}

/// The built-in rule set, in declaration order.
pub fn default_rules() -> Vec<RecommendationRule> {
    use Comparison::{Above, Below};

    vec![
        RecommendationRule::new(
            "insufficient_liquidity",
            RatioMetric::CurrentRatio,
            Below,
            1.0,
            Severity::Error,
            "Insufficient liquidity",
            "Current assets cover only {value}x of short-term obligations. Speed up receivables collection or renegotiate payment terms before bills fall due.",
        ),
        RecommendationRule::new(
            "idle_cash",
            RatioMetric::CurrentRatio,
            Above,
            3.0,
            Severity::Info,
            "Idle cash",
            "A current ratio of {value} suggests surplus working capital. Consider investing excess cash or paying down debt.",
        ),
        RecommendationRule::new(
            "inventory_dependent_liquidity",
            RatioMetric::QuickRatio,
            Below,
            0.8,
            Severity::Warning,
            "Inventory-dependent liquidity",
            "Without inventory, liquid assets cover {value}x of current liabilities. Short-term solvency depends on selling stock.",
        ),
        RecommendationRule::new(
            "low_profitability",
            RatioMetric::NetProfitMargin,
            Below,
            5.0,
            Severity::Warning,
            "Low profitability",
            "Net profit margin is {value}%. Review pricing and the largest operating expense buckets.",
        ),
        RecommendationRule::new(
            "thin_gross_margin",
            RatioMetric::GrossProfitMargin,
            Below,
            20.0,
            Severity::Warning,
            "Thin gross margin",
            "Gross margin is {value}%. Cost of goods leaves little room to absorb operating expenses.",
        ),
        RecommendationRule::new(
            "excessive_leverage",
            RatioMetric::DebtToAssetRatio,
            Above,
            70.0,
            Severity::Error,
            "Excessive leverage",
            "Liabilities finance {value}% of assets. Reduce borrowing or strengthen equity before taking on new debt.",
        ),
        RecommendationRule::new(
            "efficient_asset_use",
            RatioMetric::Roa,
            Above,
            15.0,
            Severity::Success,
            "Efficient asset use",
            "Return on assets of {value}% shows the asset base is being put to productive use.",
        ),
        RecommendationRule::new(
            "low_health_score",
            RatioMetric::HealthScore,
            Below,
            50.0,
            Severity::Warning,
            "Overall financial health needs attention",
            "The composite health score is {value}/100. Address the error-level findings first.",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_are_valid() {
        validate_rules(&default_rules()).unwrap();
    }

    #[test]
    fn test_comparison_is_strict() {
        assert!(Comparison::Below.holds(0.99, 1.0));
        assert!(!Comparison::Below.holds(1.0, 1.0));
        assert!(Comparison::Above.holds(3.01, 3.0));
        assert!(!Comparison::Above.holds(3.0, 3.0));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut rules = default_rules();
        rules.push(rules[0].clone());
        let err = validate_rules(&rules).unwrap_err();
        assert!(err.to_string().contains("insufficient_liquidity"));
    }
}
