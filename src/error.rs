//! Error type for everything that touches the outside world
//!
//! The projection math itself never fails; it degrades to well-defined
//! fallback values. Loading deals, benchmarks and writing reports can.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProformaError {
    #[error("Invalid input: {field} - {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProformaError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ProformaError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type ProformaResult<T> = Result<T, ProformaError>;
