use thiserror::Error;

/// Failures raised by deck generation, scoring and aggregation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PenneyError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Invalid combo: {0}")]
    InvalidCombo(String),
    #[error("Invalid deck: {0}")]
    InvalidDeck(String),
    #[error("Cannot aggregate over an empty deck set")]
    EmptyDeckSet,
}
