//! # Configuration
//!
//! Every tunable policy of the analytics engine (score tiers, grade bands,
//! recommendation rules, budget thresholds, forecast bands, anomaly cut-offs)
//! lives here as plain data with documented defaults. Nothing reads a hidden
//! global: callers load an `AnalyticsConfig` once and hand it to the engine.

use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod rules;
pub mod scoring;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use rules::{Comparison, RecommendationRule};
pub use scoring::{Direction, GradeBand, ScoringPolicy, Tier, TierTable, BUCKET_MAX_POINTS};
pub use settings::{AnalyticsConfig, AnomalyParams, BudgetThresholds, ForecastParams};

/// Loads and validates the analytics policy.
///
/// Sources are layered: built-in defaults, then the optional TOML file at `path`,
/// then environment variables such as `TALLY__BUDGET__WARNING_PCT=75`.
pub fn load_config(path: Option<&Path>) -> Result<AnalyticsConfig, ConfigError> {
    let mut builder = config::Config::builder();

    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path).required(true));
    }

    let settings = builder
        .add_source(
            config::Environment::with_prefix("TALLY")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `AnalyticsConfig` struct
    let config = settings.try_deserialize::<AnalyticsConfig>()?;
    config.validate()?;

    tracing::debug!(
        rules = config.recommendations.len(),
        source = ?path,
        "Analytics configuration loaded"
    );
    Ok(config)
}
