//! Crate-wide error type.

use std::io;

use thiserror::Error;

use crate::config::ConfigError;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures raised by the generator, the test suite, and the I/O wrappers.
///
/// Degenerate statistics (zero variance, constant samples) are not errors;
/// they surface as `NaN` fields on the returned result instead.
#[derive(Debug, Error)]
pub enum Error {
    /// A parameter was out of range. Raised before any work is done.
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument {
        /// Parameter name as the caller spelled it.
        name: &'static str,
        /// Constraint that was violated.
        reason: String,
    },

    /// The dataset handed to a test cannot support it (missing group, non-binary metric).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("i/o: {0}")]
    Io(#[from] io::Error),

    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid_argument(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }
}
