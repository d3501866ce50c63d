//! # Error Types
//!
//! All error types for the lending ledger.
//!
//! Every `LendingError` variant renders as a stable, human-readable reason
//! tag. Callers (the presentation layer, the decision worker) match on
//! the variant and show the tag verbatim.

use thiserror::Error;

// =============================================================================
// LENDING ERRORS
// =============================================================================

/// Errors surfaced by ledger operations.
///
/// A failed operation never mutates ledger state and never appends an event.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LendingError {
    /// No resolver is bound to the supplied name.
    #[error("ENS domain not registered")]
    NotRegistered,

    /// The name resolves to an address other than the requester's.
    #[error("You do not own this ENS name")]
    NotOwner,

    /// Requester balance is below the minimum threshold.
    #[error("Insufficient ETH balance")]
    InsufficientBalance,

    /// Requester has neither code nor a positive balance.
    #[error("No transaction history")]
    NoHistory,

    /// Caller is not the oracle identity.
    #[error("Only oracle can call")]
    Unauthorized,

    /// The debug entry point is not enabled on this ledger.
    #[error("Debug entry points disabled")]
    DebugDisabled,

    /// No request exists with the given id.
    #[error("Request does not exist")]
    NotFound,

    /// The request has already been fulfilled.
    #[error("Request already processed")]
    AlreadyProcessed,

    /// Credit score outside [300, 850].
    #[error("Credit score out of range")]
    ScoreOutOfRange,

    /// Interest rate above 10000 basis points.
    #[error("Interest rate too high")]
    RateTooHigh,

    /// Repayment arithmetic exceeded the 256-bit range.
    #[error("Repayment overflow")]
    Overflow,

    /// An external collaborator (registry, resolver, account model) failed.
    #[error("lookup failed: {0}")]
    Lookup(#[from] LookupError),
}

/// Error classes of the ledger's failure taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Requester or identity preconditions not met.
    Validation,
    /// Caller lacks the privilege for the operation.
    Authorization,
    /// Request lifecycle violated (missing or already processed).
    State,
    /// Fulfilment parameter outside its allowed range.
    Range,
    /// Integer arithmetic would overflow.
    Arithmetic,
    /// External collaborator unavailable or misbehaving.
    Collaborator,
}

impl LendingError {
    /// Returns the taxonomy class of this error.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotRegistered | Self::NotOwner | Self::InsufficientBalance | Self::NoHistory => {
                ErrorCategory::Validation
            }
            Self::Unauthorized | Self::DebugDisabled => ErrorCategory::Authorization,
            Self::NotFound | Self::AlreadyProcessed => ErrorCategory::State,
            Self::ScoreOutOfRange | Self::RateTooHigh => ErrorCategory::Range,
            Self::Overflow => ErrorCategory::Arithmetic,
            Self::Lookup(_) => ErrorCategory::Collaborator,
        }
    }

    /// Returns true if resubmitting (with corrected parameters, or later)
    /// can succeed against the same request.
    ///
    /// `AlreadyProcessed` is terminal: no retry can ever succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ScoreOutOfRange | Self::RateTooHigh | Self::Unauthorized | Self::Lookup(_)
        )
    }
}

// =============================================================================
// LOOKUP ERRORS
// =============================================================================

/// Errors from external collaborator lookups.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// Transport-level failure (connection refused, timeout, HTTP status).
    #[error("transport error: {0}")]
    Transport(String),

    /// The endpoint returned a JSON-RPC error object.
    #[error("rpc error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code.
        code: i64,
        /// Error message from the endpoint.
        message: String,
    },

    /// The response could not be decoded.
    #[error("malformed response: {0}")]
    Decode(String),
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_tags_are_stable() {
        assert_eq!(LendingError::NotRegistered.to_string(), "ENS domain not registered");
        assert_eq!(LendingError::NotOwner.to_string(), "You do not own this ENS name");
        assert_eq!(LendingError::InsufficientBalance.to_string(), "Insufficient ETH balance");
        assert_eq!(LendingError::Unauthorized.to_string(), "Only oracle can call");
        assert_eq!(LendingError::NotFound.to_string(), "Request does not exist");
        assert_eq!(LendingError::AlreadyProcessed.to_string(), "Request already processed");
        assert_eq!(LendingError::ScoreOutOfRange.to_string(), "Credit score out of range");
        assert_eq!(LendingError::RateTooHigh.to_string(), "Interest rate too high");
        assert_eq!(LendingError::NoHistory.to_string(), "No transaction history");
        assert_eq!(LendingError::Overflow.to_string(), "Repayment overflow");
        assert_eq!(LendingError::DebugDisabled.to_string(), "Debug entry points disabled");
    }

    #[test]
    fn test_categories() {
        assert_eq!(LendingError::NoHistory.category(), ErrorCategory::Validation);
        assert_eq!(LendingError::Unauthorized.category(), ErrorCategory::Authorization);
        assert_eq!(LendingError::AlreadyProcessed.category(), ErrorCategory::State);
        assert_eq!(LendingError::RateTooHigh.category(), ErrorCategory::Range);
        assert_eq!(LendingError::Overflow.category(), ErrorCategory::Arithmetic);
    }

    #[test]
    fn test_already_processed_is_terminal() {
        assert!(!LendingError::AlreadyProcessed.is_retryable());
        assert!(LendingError::ScoreOutOfRange.is_retryable());
        assert!(LendingError::RateTooHigh.is_retryable());
        assert!(LendingError::Unauthorized.is_retryable());
    }

    #[test]
    fn test_lookup_error_conversion() {
        let err: LendingError = LookupError::Transport("connection refused".into()).into();
        assert!(matches!(err, LendingError::Lookup(_)));
        assert_eq!(err.category(), ErrorCategory::Collaborator);
        assert!(err.to_string().contains("connection refused"));
    }
}
