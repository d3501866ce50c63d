//! # Core Domain Entities
//!
//! The loan request record and the account facts the eligibility gate
//! reads.

use crate::domain::value_objects::{Address, RequestId, U256};
use serde::{Deserialize, Serialize};

// =============================================================================
// LOAN REQUEST
// =============================================================================

/// A loan request as stored by the ledger.
///
/// Created pending by the ledger, mutated exactly once by a successful
/// fulfilment, never deleted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanRequest {
    /// Requesting account.
    pub borrower: Address,
    /// Principal in the smallest asset unit (wei).
    pub amount: U256,
    /// Name supplied as identity signal; empty when none.
    pub ens_name: String,
    /// One-way latch set by fulfilment.
    pub processed: bool,
    /// 0 until fulfilled, then within [300, 850].
    pub credit_score: u64,
    /// Meaningless until `processed`.
    pub approved: bool,
    /// 0 until fulfilled, then at most 10000.
    pub interest_rate_bps: u64,
}

impl LoanRequest {
    /// Creates an unprocessed request.
    #[must_use]
    pub fn pending(borrower: Address, amount: U256, ens_name: impl Into<String>) -> Self {
        Self {
            borrower,
            amount,
            ens_name: ens_name.into(),
            processed: false,
            credit_score: 0,
            approved: false,
            interest_rate_bps: 0,
        }
    }

    /// Returns true while no fulfilment has been recorded.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        !self.processed
    }

    /// Returns true if a name was supplied with the request.
    #[must_use]
    pub fn has_ens_name(&self) -> bool {
        !self.ens_name.is_empty()
    }
}

// =============================================================================
// FULFILMENT
// =============================================================================

/// Result of a successful fulfilment, used to build the emitted events.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fulfillment {
    /// The fulfilled request.
    pub request_id: RequestId,
    /// The request after the state transition.
    pub request: LoanRequest,
    /// Total repayment; `Some` exactly when the request was approved.
    pub total_repayment: Option<U256>,
}

// =============================================================================
// ACCOUNT SNAPSHOT
// =============================================================================

/// Point-in-time facts about an account, as reported by the account model.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AccountSnapshot {
    /// Balance of the principal asset, in wei.
    pub balance: U256,
    /// True if the account carries executable code.
    pub has_code: bool,
}

impl AccountSnapshot {
    /// Snapshot of an ordinary (code-less) account.
    #[must_use]
    pub fn eoa(balance: U256) -> Self {
        Self {
            balance,
            has_code: false,
        }
    }

    /// Snapshot of a code-bearing account.
    #[must_use]
    pub fn contract(balance: U256) -> Self {
        Self {
            balance,
            has_code: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_request_defaults() {
        let req = LoanRequest::pending(Address::new([1u8; 20]), U256::from(5), "alice.eth");
        assert!(req.is_pending());
        assert!(req.has_ens_name());
        assert_eq!(req.credit_score, 0);
        assert_eq!(req.interest_rate_bps, 0);
        assert!(!req.approved);
    }

    #[test]
    fn test_request_without_name() {
        let req = LoanRequest::pending(Address::ZERO, U256::one(), "");
        assert!(!req.has_ens_name());
    }
}
