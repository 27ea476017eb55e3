//! Error types for the weight_trend crate

use thiserror::Error;

/// Custom error types for the weight_trend crate
#[derive(Debug, Error)]
pub enum TrendError {
    /// A date string or numeric value could not be parsed
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error while loading or validating configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error while reading or writing the stored JSON format
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Error while importing CSV records
    #[error("CSV error: {0}")]
    CsvError(String),

    /// Error from trend calculations
    #[error("Math error: {0}")]
    MathError(#[from] trend_math::MathError),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, TrendError>;

impl From<serde_json::Error> for TrendError {
    fn from(err: serde_json::Error) -> Self {
        TrendError::SerializationError(err.to_string())
    }
}

impl From<csv::Error> for TrendError {
    fn from(err: csv::Error) -> Self {
        TrendError::CsvError(err.to_string())
    }
}

impl From<figment::Error> for TrendError {
    fn from(err: figment::Error) -> Self {
        TrendError::ConfigError(err.to_string())
    }
}
