//! # Worker Errors

use lending_ledger::errors::{LendingError, LookupError};
use thiserror::Error;

/// Errors raised while deciding a request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WorkerError {
    /// A signal could not be read.
    #[error("signal lookup failed: {0}")]
    Lookup(#[from] LookupError),

    /// The ledger refused the fulfilment.
    #[error("fulfilment refused: {0}")]
    Ledger(#[from] LendingError),
}

impl WorkerError {
    /// Returns true if the request may still be decided by a later attempt.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Lookup(_) => true,
            Self::Ledger(err) => err.is_retryable(),
        }
    }
}
