use configuration::error::ConfigError;
use core_types::CoreError;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    /// Malformed or missing input; the caller must fix it before retrying.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Not enough history or population to produce a meaningful result.
    #[error("Not enough data to perform calculation: {0}")]
    InsufficientData(String),

    /// Upstream data broke an invariant the ledger is supposed to guarantee.
    #[error("Data integrity violation: {0}")]
    InvariantViolation(String),

    #[error("Forecast horizon must be a positive number of months within the configured maximum, got {0}")]
    InvalidHorizon(i32),

    #[error("Invalid analytics configuration: {0}")]
    Configuration(#[from] ConfigError),
}

impl From<CoreError> for AnalyticsError {
    fn from(error: CoreError) -> Self {
        AnalyticsError::InvalidInput(error.to_string())
    }
}

/// Coarse category of an `AnalyticsError`, for callers that map errors onto
/// transport-level status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    InsufficientData,
    InvariantViolation,
    InvalidHorizon,
    Configuration,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::InsufficientData => "insufficient_data",
            ErrorKind::InvariantViolation => "invariant_violation",
            ErrorKind::InvalidHorizon => "invalid_horizon",
            ErrorKind::Configuration => "configuration",
        }
    }
}

impl AnalyticsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalyticsError::InvalidInput(_) => ErrorKind::InvalidInput,
            AnalyticsError::InsufficientData(_) => ErrorKind::InsufficientData,
            AnalyticsError::InvariantViolation(_) => ErrorKind::InvariantViolation,
            AnalyticsError::InvalidHorizon(_) => ErrorKind::InvalidHorizon,
            AnalyticsError::Configuration(_) => ErrorKind::Configuration,
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;
