//! Actual-vs-planned tracking for budget definitions.
//!
//! Executions are always recomputed from the transactions handed in; the
//! overview is a pure fold over individual executions so the two can never
//! disagree.

use crate::error::{AnalyticsError, Result};
use crate::ratios::to_f64;
use configuration::BudgetThresholds;
use core_types::{BudgetDefinition, Transaction};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetStatus {
    Normal,
    Warning,
    Exceeded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetExecution {
    pub budget_id: Uuid,
    pub name: String,
    pub category: String,
    pub period: String,
    pub planned_amount: f64,
    pub actual_amount: f64,
    /// Planned minus actual; negative once the budget is overspent.
    pub remaining: f64,
    pub usage_percentage: f64,
    pub status: BudgetStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetOverview {
    pub period: String,
    pub total_budgets: usize,
    pub total_planned: f64,
    pub total_actual: f64,
    pub overall_usage: f64,
    pub exceeded_count: usize,
    pub warning_count: usize,
    pub executions: Vec<BudgetExecution>,
}

impl BudgetOverview {
    /// Aggregates already computed executions. Totals are sums of the rows.
    pub fn from_executions(period: impl Into<String>, executions: Vec<BudgetExecution>) -> Self {
        let total_planned: f64 = executions.iter().map(|e| e.planned_amount).sum();
        let total_actual: f64 = executions.iter().map(|e| e.actual_amount).sum();
        let overall_usage = if total_planned > 0.0 {
            total_actual / total_planned * 100.0
        } else {
            0.0
        };

        Self {
            period: period.into(),
            total_budgets: executions.len(),
            total_planned,
            total_actual,
            overall_usage,
            exceeded_count: count_status(&executions, BudgetStatus::Exceeded),
            warning_count: count_status(&executions, BudgetStatus::Warning),
            executions,
        }
    }
}

fn count_status(executions: &[BudgetExecution], status: BudgetStatus) -> usize {
    executions.iter().filter(|e| e.status == status).count()
}

#[derive(Debug, Clone)]
pub struct BudgetTracker {
    thresholds: BudgetThresholds,
}

impl Default for BudgetTracker {
    fn default() -> Self {
        Self {
            thresholds: BudgetThresholds::default(),
        }
    }
}

impl BudgetTracker {
    pub fn new(thresholds: BudgetThresholds) -> Result<Self> {
        thresholds.validate()?;
        Ok(Self { thresholds })
    }

    /// Computes the execution of one budget.
    ///
    /// `transactions` may be wider than the budget: only entries with the
    /// budget's category and flow whose date lies in its period are summed,
    /// whatever their settlement status.
    pub fn execute(
        &self,
        budget: &BudgetDefinition,
        transactions: &[Transaction],
    ) -> Result<BudgetExecution> {
        // --- 1. Validation ---
        if budget.planned_amount <= Decimal::ZERO {
            tracing::error!(
                budget_id = %budget.id,
                planned = %budget.planned_amount,
                "Budget reached the tracker with a non-positive planned amount"
            );
            return Err(AnalyticsError::InvariantViolation(format!(
                "budget '{}' ({}) has planned amount {}, expected > 0",
                budget.name, budget.id, budget.planned_amount
            )));
        }
        let period = budget.resolve_period()?;

        // --- 2. Aggregation ---
        let mut actual = Decimal::ZERO;
        for tx in transactions.iter().filter(|tx| budget.matches(&period, tx)) {
            tx.validate()?;
            actual = actual.checked_add(tx.amount).ok_or_else(|| {
                AnalyticsError::InvalidInput(format!(
                    "actual amount of budget '{}' overflows",
                    budget.name
                ))
            })?;
        }

        // --- 3. Classification ---
        let usage = actual
            .checked_div(budget.planned_amount)
            .and_then(|share| share.checked_mul(Decimal::ONE_HUNDRED))
            .map(to_f64)
            .ok_or_else(|| {
                AnalyticsError::InvalidInput(format!(
                    "usage of budget '{}' overflows",
                    budget.name
                ))
            })?;
        let status = self.classify(usage);

        tracing::debug!(
            budget_id = %budget.id,
            period = %period,
            usage,
            ?status,
            "Budget execution computed"
        );

        Ok(BudgetExecution {
            budget_id: budget.id,
            name: budget.name.clone(),
            category: budget.category.clone(),
            period: period.to_string(),
            planned_amount: to_f64(budget.planned_amount),
            actual_amount: to_f64(actual),
            remaining: to_f64(budget.planned_amount - actual),
            usage_percentage: usage,
            status,
        })
    }

    /// Executes every definition whose period key equals `period` and folds
    /// them into an overview. Definitions for other periods are ignored.
    pub fn overview(
        &self,
        period: &str,
        budgets: &[BudgetDefinition],
        transactions: &[Transaction],
    ) -> Result<BudgetOverview> {
        let executions = budgets
            .iter()
            .filter(|budget| budget.period == period)
            .map(|budget| self.execute(budget, transactions))
            .collect::<Result<Vec<_>>>()?;

        let overview = BudgetOverview::from_executions(period, executions);
        tracing::debug!(
            period,
            budgets = overview.total_budgets,
            exceeded = overview.exceeded_count,
            warnings = overview.warning_count,
            "Budget overview computed"
        );
        Ok(overview)
    }

    fn classify(&self, usage: f64) -> BudgetStatus {
        if usage > self.thresholds.exceeded_pct {
            BudgetStatus::Exceeded
        } else if usage >= self.thresholds.warning_pct {
            BudgetStatus::Warning
        } else {
            BudgetStatus::Normal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use core_types::{BudgetType, TransactionStatus, TransactionType};
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn expense(day: NaiveDate, amount: Decimal, category: &str) -> Transaction {
        Transaction::new(day, TransactionType::Expense, amount, category)
            .with_status(TransactionStatus::Paid)
    }

    fn marketing() -> BudgetDefinition {
        BudgetDefinition::new(
            "Marketing",
            "marketing",
            BudgetType::Monthly,
            "2024-03",
            dec!(15000),
        )
    }

    #[test]
    fn test_exceeded_reference_case() {
        let txs = vec![
            expense(date(2024, 3, 2), dec!(10000), "marketing"),
            expense(date(2024, 3, 20), dec!(5750), "marketing"),
        ];
        let execution = BudgetTracker::default().execute(&marketing(), &txs).unwrap();
        assert_eq!(execution.actual_amount, 15750.0);
        assert_eq!(execution.usage_percentage, 105.0);
        assert_eq!(execution.status, BudgetStatus::Exceeded);
        assert_eq!(execution.remaining, -750.0);
        assert_eq!(execution.period, "2024-03");
    }

    #[test]
    fn test_only_matching_transactions_count() {
        let txs = vec![
            expense(date(2024, 3, 5), dec!(6000), "marketing"),
            // different category
            expense(date(2024, 3, 5), dec!(9000), "rent"),
            // outside the month
            expense(date(2024, 4, 1), dec!(9000), "marketing"),
            // income in the same category
            Transaction::new(date(2024, 3, 9), TransactionType::Income, dec!(9000), "marketing"),
            // pending still counts
            Transaction::new(date(2024, 3, 28), TransactionType::Expense, dec!(3000), "marketing"),
        ];
        let execution = BudgetTracker::default().execute(&marketing(), &txs).unwrap();
        assert_eq!(execution.actual_amount, 9000.0);
        assert_eq!(execution.usage_percentage, 60.0);
        assert_eq!(execution.status, BudgetStatus::Normal);
    }

    #[test]
    fn test_status_boundaries() {
        let tracker = BudgetTracker::default();
        let budget = BudgetDefinition::new("Ops", "ops", BudgetType::Yearly, "2024", dec!(1000));

        let at = |amount: Decimal| {
            let txs = vec![expense(date(2024, 6, 1), amount, "ops")];
            tracker.execute(&budget, &txs).unwrap().status
        };

        assert_eq!(at(dec!(799.99)), BudgetStatus::Normal);
        assert_eq!(at(dec!(800)), BudgetStatus::Warning);
        assert_eq!(at(dec!(1000)), BudgetStatus::Warning);
        assert_eq!(at(dec!(1000.01)), BudgetStatus::Exceeded);
    }

    #[test]
    fn test_income_budget_sums_income() {
        let budget = marketing().with_flow(TransactionType::Income);
        let txs = vec![
            Transaction::new(date(2024, 3, 9), TransactionType::Income, dec!(3000), "marketing"),
            expense(date(2024, 3, 9), dec!(7000), "marketing"),
        ];
        let execution = BudgetTracker::default().execute(&budget, &txs).unwrap();
        assert_eq!(execution.actual_amount, 3000.0);
    }

    #[test]
    fn test_non_positive_plan_is_invariant_violation() {
        let mut budget = marketing();
        budget.planned_amount = Decimal::ZERO;
        let err = BudgetTracker::default().execute(&budget, &[]).unwrap_err();
        assert!(matches!(err, AnalyticsError::InvariantViolation(_)));
    }

    #[test]
    fn test_mismatched_period_key_is_invalid_input() {
        let budget = BudgetDefinition::new("Bad", "x", BudgetType::Monthly, "2024", dec!(10));
        let err = BudgetTracker::default().execute(&budget, &[]).unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidInput(_)));
    }

    #[test]
    fn test_overview_is_sum_of_rows() {
        let budgets = vec![
            marketing(),
            BudgetDefinition::new("Rent", "rent", BudgetType::Monthly, "2024-03", dec!(4000)),
            BudgetDefinition::new("Travel", "travel", BudgetType::Monthly, "2024-03", dec!(1000)),
            // a different period is ignored
            BudgetDefinition::new("Rent", "rent", BudgetType::Monthly, "2024-04", dec!(4000)),
        ];
        let txs = vec![
            expense(date(2024, 3, 2), dec!(15750), "marketing"),
            expense(date(2024, 3, 1), dec!(3400), "rent"),
            expense(date(2024, 3, 15), dec!(100), "travel"),
        ];

        let overview = BudgetTracker::default().overview("2024-03", &budgets, &txs).unwrap();
        assert_eq!(overview.total_budgets, 3);
        assert_eq!(overview.total_planned, 20000.0);
        assert_eq!(overview.total_actual, 19250.0);
        assert!((overview.overall_usage - 96.25).abs() < 1e-9);
        assert_eq!(overview.exceeded_count, 1);
        assert_eq!(overview.warning_count, 1);

        let row_sum: f64 = overview.executions.iter().map(|e| e.actual_amount).sum();
        assert_eq!(overview.total_actual, row_sum);
    }

    #[test]
    fn test_empty_overview() {
        let overview = BudgetTracker::default().overview("2024-03", &[], &[]).unwrap();
        assert_eq!(overview.total_budgets, 0);
        assert_eq!(overview.overall_usage, 0.0);
    }

    #[test]
    fn test_overflowing_usage_is_invalid_input() {
        let budget = BudgetDefinition::new(
            "Tiny",
            "marketing",
            BudgetType::Monthly,
            "2024-03",
            dec!(0.01),
        );
        let huge = Decimal::from_i128_with_scale(10i128.pow(27), 0);
        let txs = vec![expense(date(2024, 3, 4), huge, "marketing")];

        let err = BudgetTracker::default().execute(&budget, &txs).unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidInput(_)));
    }
}
