use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    /// Returns the amount with the sign it contributes to net cash flow
    /// (income positive, expense negative).
    pub fn signed(&self, amount: Decimal) -> Decimal {
        match self {
            TransactionType::Income => amount,
            TransactionType::Expense => -amount,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settlement state of a ledger entry. `Paid` applies to expenses and
/// `Received` to income.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Paid,
    Received,
    Pending,
    Overdue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetType {
    Monthly,
    Yearly,
}

/// Severity of a recommendation, ordered so that the most urgent findings sort first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    /// Sort rank: error > warning > info = success.
    pub fn priority(&self) -> u8 {
        match self {
            Severity::Error => 2,
            Severity::Warning => 1,
            Severity::Info | Severity::Success => 0,
        }
    }
}

/// Letter grade attached to a composite health score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        };
        f.write_str(letter)
    }
}

/// Tag naming one value of a ratio set, used by the data-driven score and rule tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RatioMetric {
    CurrentRatio,
    QuickRatio,
    CashRatio,
    GrossProfitMargin,
    OperatingMargin,
    NetProfitMargin,
    Roa,
    Roe,
    DebtToAssetRatio,
    DebtToEquityRatio,
    AssetTurnover,
    /// The composite health score rather than a balance-sheet ratio.
    HealthScore,
}

impl RatioMetric {
    /// Whether the metric is expressed as a percentage (already multiplied by 100).
    pub fn is_percentage(&self) -> bool {
        matches!(
            self,
            RatioMetric::GrossProfitMargin
                | RatioMetric::OperatingMargin
                | RatioMetric::NetProfitMargin
                | RatioMetric::Roa
                | RatioMetric::Roe
                | RatioMetric::DebtToAssetRatio
                | RatioMetric::DebtToEquityRatio
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            RatioMetric::CurrentRatio => "current ratio",
            RatioMetric::QuickRatio => "quick ratio",
            RatioMetric::CashRatio => "cash ratio",
            RatioMetric::GrossProfitMargin => "gross profit margin",
            RatioMetric::OperatingMargin => "operating margin",
            RatioMetric::NetProfitMargin => "net profit margin",
            RatioMetric::Roa => "return on assets",
            RatioMetric::Roe => "return on equity",
            RatioMetric::DebtToAssetRatio => "debt-to-asset ratio",
            RatioMetric::DebtToEquityRatio => "debt-to-equity ratio",
            RatioMetric::AssetTurnover => "asset turnover",
            RatioMetric::HealthScore => "health score",
        }
    }
}

impl fmt::Display for RatioMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
