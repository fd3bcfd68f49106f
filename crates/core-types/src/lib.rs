//! # Core Types
//!
//! Layer 0 of the workspace: the ledger records, statement snapshots and calendar
//! keys that every other crate speaks. This crate has no knowledge of analytics
//! policy, configuration or transport.

pub mod enums;
pub mod error;
pub mod period;
pub mod statements;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{BudgetType, Grade, RatioMetric, Severity, TransactionStatus, TransactionType};
pub use error::CoreError;
pub use period::{BudgetPeriod, MonthKey};
pub use statements::{
    BalanceSheetSnapshot, CurrentAssets, CurrentLiabilities, Equity, FixedAssets,
    IncomeStatementSnapshot, LongTermLiabilities,
};
pub use structs::{BudgetDefinition, Transaction};
