//! Financial statement snapshots consumed by the ratio calculator.
//!
//! Totals and derived income-statement lines are methods rather than stored
//! fields, so a snapshot can never disagree with its own components.

use crate::error::CoreError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentAssets {
    pub cash: Decimal,
    pub receivables: Decimal,
    pub inventory: Decimal,
    pub prepaid: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixedAssets {
    pub equipment: Decimal,
    pub furniture: Decimal,
    /// Positive figure, subtracted from the gross fixed assets.
    pub accumulated_depreciation: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentLiabilities {
    pub payables: Decimal,
    pub short_term_loan: Decimal,
    pub accrued: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LongTermLiabilities {
    pub long_term_loan: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Equity {
    pub capital: Decimal,
    /// May be negative after accumulated losses.
    pub retained_earnings: Decimal,
}

/// Balance sheet as of a single date. `total_assets == total_liabilities + total_equity`
/// is assumed to hold on input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSheetSnapshot {
    pub as_of: NaiveDate,
    pub current_assets: CurrentAssets,
    pub fixed_assets: FixedAssets,
    pub current_liabilities: CurrentLiabilities,
    pub long_term_liabilities: LongTermLiabilities,
    pub equity: Equity,
}

impl BalanceSheetSnapshot {
    pub fn total_current_assets(&self) -> Result<Decimal, CoreError> {
        let a = &self.current_assets;
        checked_sum("total current assets", &[a.cash, a.receivables, a.inventory, a.prepaid])
    }

    pub fn total_fixed_assets(&self) -> Result<Decimal, CoreError> {
        let f = &self.fixed_assets;
        let gross = checked_sum("total fixed assets", &[f.equipment, f.furniture])?;
        checked_sub("total fixed assets", gross, f.accumulated_depreciation)
    }

    pub fn total_assets(&self) -> Result<Decimal, CoreError> {
        checked_sum(
            "total assets",
            &[self.total_current_assets()?, self.total_fixed_assets()?],
        )
    }

    pub fn total_current_liabilities(&self) -> Result<Decimal, CoreError> {
        let l = &self.current_liabilities;
        checked_sum("total current liabilities", &[l.payables, l.short_term_loan, l.accrued])
    }

    pub fn total_liabilities(&self) -> Result<Decimal, CoreError> {
        checked_sum(
            "total liabilities",
            &[
                self.total_current_liabilities()?,
                self.long_term_liabilities.long_term_loan,
            ],
        )
    }

    pub fn total_equity(&self) -> Result<Decimal, CoreError> {
        checked_sum("total equity", &[self.equity.capital, self.equity.retained_earnings])
    }

    /// Rejects negative figures everywhere except retained earnings.
    pub fn validate(&self) -> Result<(), CoreError> {
        let fields = [
            ("currentAssets.cash", self.current_assets.cash),
            ("currentAssets.receivables", self.current_assets.receivables),
            ("currentAssets.inventory", self.current_assets.inventory),
            ("currentAssets.prepaid", self.current_assets.prepaid),
            ("fixedAssets.equipment", self.fixed_assets.equipment),
            ("fixedAssets.furniture", self.fixed_assets.furniture),
            (
                "fixedAssets.accumulatedDepreciation",
                self.fixed_assets.accumulated_depreciation,
            ),
            ("currentLiabilities.payables", self.current_liabilities.payables),
            (
                "currentLiabilities.shortTermLoan",
                self.current_liabilities.short_term_loan,
            ),
            ("currentLiabilities.accrued", self.current_liabilities.accrued),
            (
                "longTermLiabilities.longTermLoan",
                self.long_term_liabilities.long_term_loan,
            ),
            ("equity.capital", self.equity.capital),
        ];
        ensure_non_negative("balance sheet", &fields)?;

        if self.total_fixed_assets()? < Decimal::ZERO {
            return Err(CoreError::InvalidInput(
                "balance sheet".to_string(),
                "accumulated depreciation exceeds gross fixed assets".to_string(),
            ));
        }
        self.total_assets()?;
        self.total_liabilities()?;
        self.total_equity()?;
        Ok(())
    }
}

/// Income statement for one reporting period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeStatementSnapshot {
    /// Free-form period label such as `2024` or `2024-03`.
    pub period: String,
    pub revenue: Decimal,
    pub cost_of_goods: Decimal,
    /// Named operating expense buckets (salaries, rent, utilities, ...).
    #[serde(default)]
    pub operating_expenses: BTreeMap<String, Decimal>,
    #[serde(default)]
    pub other_income: Decimal,
    #[serde(default)]
    pub other_expenses: Decimal,
}

impl IncomeStatementSnapshot {
    pub fn gross_profit(&self) -> Result<Decimal, CoreError> {
        checked_sub("gross profit", self.revenue, self.cost_of_goods)
    }

    pub fn total_operating_expenses(&self) -> Result<Decimal, CoreError> {
        let amounts: Vec<Decimal> = self.operating_expenses.values().copied().collect();
        checked_sum("total operating expenses", &amounts)
    }

    pub fn operating_income(&self) -> Result<Decimal, CoreError> {
        checked_sub(
            "operating income",
            self.gross_profit()?,
            self.total_operating_expenses()?,
        )
    }

    pub fn net_income(&self) -> Result<Decimal, CoreError> {
        let with_other = checked_sum("net income", &[self.operating_income()?, self.other_income])?;
        checked_sub("net income", with_other, self.other_expenses)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        let mut fields = vec![
            ("revenue".to_string(), self.revenue),
            ("costOfGoods".to_string(), self.cost_of_goods),
            ("otherIncome".to_string(), self.other_income),
            ("otherExpenses".to_string(), self.other_expenses),
        ];
        fields.extend(
            self.operating_expenses
                .iter()
                .map(|(name, amount)| (format!("operatingExpenses.{name}"), *amount)),
        );

        for (name, value) in &fields {
            if *value < Decimal::ZERO {
                return Err(CoreError::InvalidInput(
                    format!("income statement {}", self.period),
                    format!("{name} must not be negative, got {value}"),
                ));
            }
        }
        self.net_income()?;
        Ok(())
    }
}

fn checked_sum(what: &str, values: &[Decimal]) -> Result<Decimal, CoreError> {
    values.iter().try_fold(Decimal::ZERO, |total, value| {
        total
            .checked_add(*value)
            .ok_or_else(|| CoreError::Overflow(what.to_string()))
    })
}

fn checked_sub(what: &str, lhs: Decimal, rhs: Decimal) -> Result<Decimal, CoreError> {
    lhs.checked_sub(rhs)
        .ok_or_else(|| CoreError::Overflow(what.to_string()))
}

fn ensure_non_negative(owner: &str, fields: &[(&str, Decimal)]) -> Result<(), CoreError> {
    for (name, value) in fields {
        if *value < Decimal::ZERO {
            return Err(CoreError::InvalidInput(
                owner.to_string(),
                format!("{name} must not be negative, got {value}"),
            ));
        }
    }
    Ok(())
}
