use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),

    #[error("Invalid period key '{0}': {1}")]
    InvalidPeriod(String, String),

    #[error("Arithmetic overflow while computing {0}")]
    Overflow(String),
}
