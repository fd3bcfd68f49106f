use crate::error::Result;
use crate::health::HealthScore;
use crate::ratios::RatioSet;
use configuration::rules::{default_rules, validate_rules};
use configuration::RecommendationRule;
use core_types::{RatioMetric, Severity};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

/// A single human-readable finding produced by one rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub id: String,
    pub title: String,
    pub body: String,
    pub severity: Severity,
    pub metric: RatioMetric,
    pub value: f64,
}

/// Evaluates every rule independently, so any number of findings can co-exist.
#[derive(Debug, Clone)]
pub struct RecommendationEngine {
    rules: Vec<RecommendationRule>,
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self {
            rules: default_rules(),
        }
    }
}

impl RecommendationEngine {
    pub fn new(rules: Vec<RecommendationRule>) -> Result<Self> {
        validate_rules(&rules)?;
        Ok(Self { rules })
    }

    /// Returns the findings ordered by severity (error, then warning, then
    /// info and success). Rules of equal rank keep their declaration order.
    pub fn recommend(&self, ratios: &RatioSet, health: &HealthScore) -> Vec<Recommendation> {
        let mut findings: Vec<Recommendation> = self
            .rules
            .iter()
            .filter_map(|rule| {
                let value = metric_value(rule.metric, ratios, health)?;
                if !rule.comparison.holds(value, rule.threshold) {
                    return None;
                }
                Some(Recommendation {
                    id: rule.id.clone(),
                    title: rule.title.clone(),
                    body: rule.body.replace("{value}", &format!("{value:.2}")),
                    severity: rule.severity,
                    metric: rule.metric,
                    value,
                })
            })
            .collect();

        // `sort_by_key` is stable.
        findings.sort_by_key(|finding| Reverse(finding.severity.priority()));

        tracing::debug!(
            evaluated = self.rules.len(),
            fired = findings.len(),
            "Recommendations evaluated"
        );
        findings
    }
}

fn metric_value(metric: RatioMetric, ratios: &RatioSet, health: &HealthScore) -> Option<f64> {
    match metric {
        RatioMetric::HealthScore => Some(f64::from(health.score)),
        other => ratios.value(other).filter(|v| !v.is_nan()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::HealthScorer;
    use configuration::Comparison;

    fn ratios(current: f64, quick: f64, npm: f64, gpm: f64, dta: f64, roa: f64) -> RatioSet {
        RatioSet {
            current_ratio: current,
            quick_ratio: quick,
            cash_ratio: 0.4,
            working_capital: 1000.0,
            gross_profit_margin: gpm,
            operating_margin: npm,
            net_profit_margin: npm,
            roa,
            roe: roa,
            debt_to_asset_ratio: dta,
            debt_to_equity_ratio: dta,
            asset_turnover: 1.1,
        }
    }

    fn ids(findings: &[Recommendation]) -> Vec<&str> {
        findings.iter().map(|f| f.id.as_str()).collect()
    }

    #[test]
    fn test_healthy_company_gets_only_praise() {
        let ratios = ratios(1.83, 1.5, 12.0, 44.0, 40.0, 16.0);
        let health = HealthScorer::default().score(&ratios);
        let findings = RecommendationEngine::default().recommend(&ratios, &health);
        assert_eq!(ids(&findings), vec!["efficient_asset_use"]);
        assert_eq!(findings[0].severity, Severity::Success);
        assert!(findings[0].body.contains("16.00%"));
    }

    #[test]
    fn test_findings_coexist_and_sort_by_severity() {
        let ratios = ratios(0.7, 0.5, 2.0, 15.0, 80.0, 1.0);
        let health = HealthScorer::default().score(&ratios);
        let findings = RecommendationEngine::default().recommend(&ratios, &health);

        assert_eq!(
            ids(&findings),
            vec![
                "insufficient_liquidity",
                "excessive_leverage",
                "inventory_dependent_liquidity",
                "low_profitability",
                "thin_gross_margin",
                "low_health_score",
            ]
        );
        let priorities: Vec<u8> = findings.iter().map(|f| f.severity.priority()).collect();
        assert!(priorities.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_info_and_success_keep_declaration_order() {
        let ratios = ratios(3.5, 3.0, 20.0, 50.0, 20.0, 18.0);
        let health = HealthScorer::default().score(&ratios);
        let findings = RecommendationEngine::default().recommend(&ratios, &health);
        assert_eq!(ids(&findings), vec!["idle_cash", "efficient_asset_use"]);
    }

    #[test]
    fn test_thresholds_are_strict() {
        let ratios = ratios(1.0, 0.8, 5.0, 20.0, 70.0, 15.0);
        let health = HealthScorer::default().score(&ratios);
        let findings = RecommendationEngine::default().recommend(&ratios, &health);
        assert!(findings.is_empty());
    }

    #[test]
    fn test_custom_rules() {
        let rule = RecommendationRule {
            id: "tight_cash".to_string(),
            metric: RatioMetric::CashRatio,
            comparison: Comparison::Below,
            threshold: 0.5,
            severity: Severity::Warning,
            title: "Tight cash".to_string(),
            body: "Cash covers {value}x of current liabilities.".to_string(),
        };
        let engine = RecommendationEngine::new(vec![rule]).unwrap();
        let ratios = ratios(1.5, 1.2, 10.0, 40.0, 40.0, 10.0);
        let health = HealthScorer::default().score(&ratios);
        let findings = engine.recommend(&ratios, &health);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].body, "Cash covers 0.40x of current liabilities.");
    }

    #[test]
    fn test_duplicate_rule_ids_rejected() {
        let mut rules = default_rules();
        rules.push(rules[1].clone());
        assert!(RecommendationEngine::new(rules).is_err());
    }
}
