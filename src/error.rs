//! Error types for the Neurite numeric engine.
//!
//! Only configuration problems and cancellation are reported through
//! [`NeuriteError`]. Operand size mismatches between vectors or matrices are
//! programming errors and abort the operation with a panic; registry misses
//! are reported as `None`.

use thiserror::Error;

/// The main error type for Neurite operations.
#[derive(Error, Debug)]
pub enum NeuriteError {
    /// Bad configuration: non-positive dimensions, shape/weights mismatch,
    /// unknown registry names or a missing required option.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A parallel operation was cancelled before all units were dispatched.
    #[error("Operation cancelled")]
    Cancelled,

    /// A pushed sample stream yielded an error.
    #[error("Sampling error: {0}")]
    Sampling(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl NeuriteError {
    /// Shorthand for building an [`NeuriteError::InvalidParameter`].
    pub fn invalid(message: impl Into<String>) -> Self {
        NeuriteError::InvalidParameter(message.into())
    }

    /// Returns true for [`NeuriteError::Cancelled`].
    pub fn is_cancelled(&self) -> bool {
        matches!(self, NeuriteError::Cancelled)
    }
}

/// Result type alias for Neurite operations.
pub type Result<T> = std::result::Result<T, NeuriteError>;

impl From<serde_json::Error> for NeuriteError {
    fn from(err: serde_json::Error) -> Self {
        NeuriteError::Serialization(err.to_string())
    }
}
