use crate::error::{AnalyticsError, Result};
use core_types::{BalanceSheetSnapshot, IncomeStatementSnapshot, RatioMetric};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The named ratios derived from one balance sheet and one income statement.
///
/// Margins and return/leverage measures are percentages already multiplied by
/// 100; `current_ratio`, `quick_ratio`, `cash_ratio` and `asset_turnover` are
/// plain ratios. `working_capital` is a currency amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatioSet {
    // I. Liquidity
    pub current_ratio: f64,
    pub quick_ratio: f64,
    pub cash_ratio: f64,
    pub working_capital: f64,

    // II. Profitability
    pub gross_profit_margin: f64,
    pub operating_margin: f64,
    pub net_profit_margin: f64,

    // III. Returns
    pub roa: f64,
    pub roe: f64,

    // IV. Leverage
    pub debt_to_asset_ratio: f64,
    pub debt_to_equity_ratio: f64,

    // V. Efficiency
    pub asset_turnover: f64,
}

impl RatioSet {
    /// Looks a ratio up by tag. `HealthScore` is not part of a ratio set.
    pub fn value(&self, metric: RatioMetric) -> Option<f64> {
        let value = match metric {
            RatioMetric::CurrentRatio => self.current_ratio,
            RatioMetric::QuickRatio => self.quick_ratio,
            RatioMetric::CashRatio => self.cash_ratio,
            RatioMetric::GrossProfitMargin => self.gross_profit_margin,
            RatioMetric::OperatingMargin => self.operating_margin,
            RatioMetric::NetProfitMargin => self.net_profit_margin,
            RatioMetric::Roa => self.roa,
            RatioMetric::Roe => self.roe,
            RatioMetric::DebtToAssetRatio => self.debt_to_asset_ratio,
            RatioMetric::DebtToEquityRatio => self.debt_to_equity_ratio,
            RatioMetric::AssetTurnover => self.asset_turnover,
            RatioMetric::HealthScore => return None,
        };
        Some(value)
    }
}

/// A stateless calculator turning statement snapshots into a `RatioSet`.
#[derive(Debug, Clone, Default)]
pub struct RatioCalculator {}

impl RatioCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes every ratio independently. A zero divisor yields 0 for that ratio
    /// instead of an error; only snapshots that fail validation are rejected.
    pub fn calculate(
        &self,
        balance_sheet: &BalanceSheetSnapshot,
        income_statement: &IncomeStatementSnapshot,
    ) -> Result<RatioSet> {
        balance_sheet.validate()?;
        income_statement.validate()?;

        let current_assets = balance_sheet.total_current_assets()?;
        let current_liabilities = balance_sheet.total_current_liabilities()?;
        let total_assets = balance_sheet.total_assets()?;
        let total_liabilities = balance_sheet.total_liabilities()?;
        let total_equity = balance_sheet.total_equity()?;

        let revenue = income_statement.revenue;
        let net_income = income_statement.net_income()?;
        let quick_assets = current_assets
            .checked_sub(balance_sheet.current_assets.inventory)
            .ok_or_else(|| overflow("quickRatio"))?;
        let working_capital = current_assets
            .checked_sub(current_liabilities)
            .ok_or_else(|| overflow("workingCapital"))?;

        let ratios = RatioSet {
            current_ratio: ratio("currentRatio", current_assets, current_liabilities)?,
            quick_ratio: ratio("quickRatio", quick_assets, current_liabilities)?,
            cash_ratio: ratio("cashRatio", balance_sheet.current_assets.cash, current_liabilities)?,
            working_capital: to_f64(working_capital),

            gross_profit_margin: percentage(
                "grossProfitMargin",
                income_statement.gross_profit()?,
                revenue,
            )?,
            operating_margin: percentage(
                "operatingMargin",
                income_statement.operating_income()?,
                revenue,
            )?,
            net_profit_margin: percentage("netProfitMargin", net_income, revenue)?,

            roa: percentage("roa", net_income, total_assets)?,
            roe: percentage("roe", net_income, total_equity)?,

            debt_to_asset_ratio: percentage("debtToAssetRatio", total_liabilities, total_assets)?,
            debt_to_equity_ratio: percentage("debtToEquityRatio", total_liabilities, total_equity)?,

            asset_turnover: ratio("assetTurnover", revenue, total_assets)?,
        };

        tracing::debug!(
            as_of = %balance_sheet.as_of,
            period = %income_statement.period,
            current_ratio = ratios.current_ratio,
            net_profit_margin = ratios.net_profit_margin,
            "Ratios calculated"
        );

        Ok(ratios)
    }
}

/// `numerator / denominator`, or 0 when the denominator is 0.
fn safe_div(name: &str, numerator: Decimal, denominator: Decimal) -> Result<Decimal> {
    if denominator.is_zero() {
        return Ok(Decimal::ZERO);
    }
    numerator
        .checked_div(denominator)
        .ok_or_else(|| overflow(name))
}

fn ratio(name: &str, numerator: Decimal, denominator: Decimal) -> Result<f64> {
    safe_div(name, numerator, denominator).map(to_f64)
}

fn percentage(name: &str, numerator: Decimal, denominator: Decimal) -> Result<f64> {
    safe_div(name, numerator, denominator)?
        .checked_mul(Decimal::ONE_HUNDRED)
        .map(to_f64)
        .ok_or_else(|| overflow(name))
}

fn overflow(name: &str) -> AnalyticsError {
    AnalyticsError::InvalidInput(format!("{name} overflows the supported decimal range"))
}

pub(crate) fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}
