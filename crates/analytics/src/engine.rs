use crate::anomaly::{AnomalyDetector, AnomalyReport};
use crate::budget::{BudgetExecution, BudgetOverview, BudgetTracker};
use crate::error::Result;
use crate::forecast::{CashflowForecaster, ForecastPoint, MonthlyNetFlow};
use crate::health::{HealthScore, HealthScorer};
use crate::ratios::{RatioCalculator, RatioSet};
use crate::recommendations::{Recommendation, RecommendationEngine};
use crate::report::HealthAssessment;
use chrono::NaiveDate;
use configuration::AnalyticsConfig;
use core_types::{
    BalanceSheetSnapshot, BudgetDefinition, IncomeStatementSnapshot, Transaction, TransactionType,
};

/// Bundles the six components, each built from one validated `AnalyticsConfig`.
///
/// The engine holds no mutable state. It can be shared behind an `Arc` and
/// called concurrently.
#[derive(Debug, Clone, Default)]
pub struct AnalyticsEngine {
    ratios: RatioCalculator,
    scorer: HealthScorer,
    recommender: RecommendationEngine,
    budgets: BudgetTracker,
    forecaster: CashflowForecaster,
    anomalies: AnomalyDetector,
}

impl AnalyticsEngine {
    pub fn new(config: &AnalyticsConfig) -> Result<Self> {
        Ok(Self {
            ratios: RatioCalculator::new(),
            scorer: HealthScorer::new(config.scoring.clone())?,
            recommender: RecommendationEngine::new(config.recommendations.clone())?,
            budgets: BudgetTracker::new(config.budget.clone())?,
            forecaster: CashflowForecaster::new(config.forecast.clone())?,
            anomalies: AnomalyDetector::new(config.anomaly.clone())?,
        })
    }

    pub fn ratios(
        &self,
        balance_sheet: &BalanceSheetSnapshot,
        income_statement: &IncomeStatementSnapshot,
    ) -> Result<RatioSet> {
        self.ratios.calculate(balance_sheet, income_statement)
    }

    pub fn health_score(&self, ratios: &RatioSet) -> HealthScore {
        self.scorer.score(ratios)
    }

    pub fn recommendations(&self, ratios: &RatioSet, health: &HealthScore) -> Vec<Recommendation> {
        self.recommender.recommend(ratios, health)
    }

    /// Runs ratios, scoring and recommendations in one pass over the statements.
    pub fn assess_health(
        &self,
        balance_sheet: &BalanceSheetSnapshot,
        income_statement: &IncomeStatementSnapshot,
    ) -> Result<HealthAssessment> {
        let ratios = self.ratios(balance_sheet, income_statement)?;
        let health = self.health_score(&ratios);
        let recommendations = self.recommendations(&ratios, &health);

        tracing::info!(
            score = health.score,
            grade = %health.grade,
            findings = recommendations.len(),
            "Health assessment complete"
        );

        Ok(HealthAssessment {
            ratios,
            health,
            recommendations,
        })
    }

    pub fn budget_execution(
        &self,
        budget: &BudgetDefinition,
        transactions: &[Transaction],
    ) -> Result<BudgetExecution> {
        self.budgets.execute(budget, transactions)
    }

    pub fn budget_overview(
        &self,
        period: &str,
        budgets: &[BudgetDefinition],
        transactions: &[Transaction],
    ) -> Result<BudgetOverview> {
        self.budgets.overview(period, budgets, transactions)
    }

    pub fn forecast(&self, history: &[MonthlyNetFlow], horizon: i32) -> Result<Vec<ForecastPoint>> {
        self.forecaster.forecast(history, horizon)
    }

    pub fn detect_anomalies(&self, transactions: &[Transaction]) -> Result<AnomalyReport> {
        self.anomalies.detect(transactions)
    }

    pub fn detect_recent_anomalies(
        &self,
        transactions: &[Transaction],
        kind: TransactionType,
        as_of: NaiveDate,
    ) -> Result<AnomalyReport> {
        self.anomalies.detect_trailing(transactions, kind, as_of)
    }
}
