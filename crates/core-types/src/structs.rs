use crate::enums::{BudgetType, TransactionStatus, TransactionType};
use crate::error::CoreError;
use crate::period::BudgetPeriod;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single income or expense entry from the ledger.
///
/// The analytics engine only ever reads snapshots of these; the ledger owns them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// Always non-negative; the direction is carried by `kind`.
    pub amount: Decimal,
    pub category: String,
    /// Customer for income, vendor for expenses.
    #[serde(default)]
    pub counterpart: Option<String>,
    pub status: TransactionStatus,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

impl Transaction {
    /// Creates a pending transaction with no counterpart or due date.
    pub fn new(
        date: NaiveDate,
        kind: TransactionType,
        amount: Decimal,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            kind,
            amount,
            category: category.into(),
            counterpart: None,
            status: TransactionStatus::Pending,
            due_date: None,
        }
    }

    pub fn with_status(mut self, status: TransactionStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// The status as of `today`: a pending entry past its due date is overdue.
    pub fn effective_status(&self, today: NaiveDate) -> TransactionStatus {
        match (self.status, self.due_date) {
            (TransactionStatus::Pending, Some(due)) if due < today => TransactionStatus::Overdue,
            (status, _) => status,
        }
    }

    /// The amount with the sign it contributes to net cash flow.
    pub fn signed_amount(&self) -> Decimal {
        self.kind.signed(self.amount)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.amount < Decimal::ZERO {
            return Err(CoreError::InvalidInput(
                format!("transaction {}", self.id),
                format!("amount must not be negative, got {}", self.amount),
            ));
        }
        if self.category.trim().is_empty() {
            return Err(CoreError::InvalidInput(
                format!("transaction {}", self.id),
                "category must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_flow() -> TransactionType {
    TransactionType::Expense
}

/// A user-defined spending (or income) target for one category and period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetDefinition {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    #[serde(rename = "type")]
    pub budget_type: BudgetType,
    /// `YYYY-MM` for monthly budgets, `YYYY` for yearly ones.
    pub period: String,
    pub planned_amount: Decimal,
    /// Which transaction type the budget sums. Expense budgets are the common case.
    #[serde(default = "default_flow")]
    pub flow: TransactionType,
}

impl BudgetDefinition {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        budget_type: BudgetType,
        period: impl Into<String>,
        planned_amount: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            category: category.into(),
            budget_type,
            period: period.into(),
            planned_amount,
            flow: TransactionType::Expense,
        }
    }

    pub fn with_flow(mut self, flow: TransactionType) -> Self {
        self.flow = flow;
        self
    }

    pub fn resolve_period(&self) -> Result<BudgetPeriod, CoreError> {
        BudgetPeriod::parse(self.budget_type, &self.period)
    }

    /// Whether `tx` counts toward this budget: same category, same flow, inside the period.
    pub fn matches(&self, period: &BudgetPeriod, tx: &Transaction) -> bool {
        tx.kind == self.flow && tx.category == self.category && period.contains(tx.date)
    }
}
