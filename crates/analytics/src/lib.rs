//! # Tally Analytics Engine
//!
//! This crate turns ledger snapshots into decision-grade outputs: financial
//! ratios, a composite health score, prioritized recommendations, budget
//! execution, cash-flow forecasts and transaction anomaly flags.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of storage
//!   or transport. It depends only on `core-types` (Layer 0) and the policy
//!   tables in `configuration`.
//! - **Stateless Calculation:** Every component is a stateless calculator built
//!   from an immutable policy. Identical inputs always give identical outputs,
//!   and none of the components call each other.
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: Facade holding all six components for one configuration.
//! - `RatioCalculator`, `HealthScorer`, `RecommendationEngine`, `BudgetTracker`,
//!   `CashflowForecaster`, `AnomalyDetector`: The components themselves.
//! - `AnalyticsError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod anomaly;
pub mod budget;
pub mod engine;
pub mod error;
pub mod forecast;
pub mod health;
pub mod ratios;
pub mod recommendations;
pub mod report;

// Re-export the key components to create a clean, public-facing API.
pub use anomaly::{AnomalyDetector, AnomalyRecord, AnomalyReport, AnomalySeverity};
pub use budget::{BudgetExecution, BudgetOverview, BudgetStatus, BudgetTracker};
pub use engine::AnalyticsEngine;
pub use error::{AnalyticsError, ErrorKind};
pub use forecast::{monthly_net_flows, CashflowForecaster, ForecastPoint, MonthlyNetFlow};
pub use health::{BucketScore, HealthScore, HealthScorer, SubScores};
pub use ratios::{RatioCalculator, RatioSet};
pub use recommendations::{Recommendation, RecommendationEngine};
pub use report::HealthAssessment;
