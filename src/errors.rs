//! Shared error types for the engine.
//!
//! Only structural failures are errors here: a dataset that was never
//! supplied, or a supplied dataset missing a column an analyzer reads.
//! Malformed cell values (unparseable fractions, non-numeric scores)
//! are absorbed where they occur and degrade to safe defaults; they
//! never surface as errors.

use thiserror::Error;

/// Main error type for riskmap analysis operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// A supplied dataset lacks a column the engine reads.
    #[error("dataset '{dataset}' is missing required column '{column}'")]
    Schema { dataset: String, column: String },

    /// One or more required datasets were not supplied at all.
    #[error("missing input dataset(s): {}", datasets.join(", "))]
    MissingInput { datasets: Vec<String> },

    /// Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl EngineError {
    /// Create a schema error naming the offending dataset and column.
    pub fn schema(dataset: impl Into<String>, column: impl Into<String>) -> Self {
        Self::Schema {
            dataset: dataset.into(),
            column: column.into(),
        }
    }
}

/// Result type alias using our error type.
pub type Result<T> = std::result::Result<T, EngineError>;
