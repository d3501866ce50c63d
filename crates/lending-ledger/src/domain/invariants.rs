//! # Domain Invariants
//!
//! Bounds and record invariants enforced by the ledger.
//!
//! - Credit score of a processed request lies in [300, 850]
//! - Interest rate never exceeds 10000 basis points
//! - An unprocessed request carries no score and no rate
//! - Requesters must hold at least 0.01 ETH and show activity

use crate::domain::entities::{AccountSnapshot, LoanRequest};
use crate::domain::value_objects::U256;
use crate::errors::LendingError;

/// Protocol limits.
pub mod limits {
    /// Lowest credit score a fulfilment may record.
    pub const MIN_CREDIT_SCORE: u64 = 300;
    /// Highest credit score a fulfilment may record.
    pub const MAX_CREDIT_SCORE: u64 = 850;
    /// Highest interest rate, in basis points (100%).
    pub const MAX_INTEREST_RATE_BPS: u64 = 10_000;
    /// Basis points per unit.
    pub const BPS_DENOMINATOR: u64 = 10_000;
    /// Minimum requester balance: 0.01 ETH in wei.
    pub const MIN_BALANCE_WEI: u64 = 10_000_000_000_000_000;
}

// =============================================================================
// RANGE CHECKS
// =============================================================================

/// Fails with `ScoreOutOfRange` unless `300 <= score <= 850`.
pub fn check_credit_score(score: u64) -> Result<(), LendingError> {
    if (limits::MIN_CREDIT_SCORE..=limits::MAX_CREDIT_SCORE).contains(&score) {
        Ok(())
    } else {
        Err(LendingError::ScoreOutOfRange)
    }
}

/// Fails with `RateTooHigh` unless `rate_bps <= 10000`.
pub fn check_interest_rate(rate_bps: u64) -> Result<(), LendingError> {
    if rate_bps <= limits::MAX_INTEREST_RATE_BPS {
        Ok(())
    } else {
        Err(LendingError::RateTooHigh)
    }
}

// =============================================================================
// ELIGIBILITY
// =============================================================================

/// Minimum balance threshold as a 256-bit value.
#[must_use]
pub fn min_balance() -> U256 {
    U256::from(limits::MIN_BALANCE_WEI)
}

/// Evaluates both eligibility preconditions, minimum balance first.
///
/// The activity check accepts code-bearing accounts, and ordinary accounts
/// with a positive balance. With a positive threshold it cannot reject an
/// ordinary account that already passed the balance check; it is kept for
/// its ordering and for code-bearing accounts.
pub fn check_eligibility(account: &AccountSnapshot) -> Result<(), LendingError> {
    if account.balance < min_balance() {
        return Err(LendingError::InsufficientBalance);
    }
    if !has_activity_history(account) {
        return Err(LendingError::NoHistory);
    }
    Ok(())
}

/// Activity proxy: non-empty code, or a positive balance.
#[must_use]
pub fn has_activity_history(account: &AccountSnapshot) -> bool {
    account.has_code || !account.balance.is_zero()
}

// =============================================================================
// RECORD INVARIANTS
// =============================================================================

/// Returns true if the stored score is 0 (unprocessed) or within range.
#[must_use]
pub fn check_score_invariant(request: &LoanRequest) -> bool {
    if request.processed {
        check_credit_score(request.credit_score).is_ok()
    } else {
        request.credit_score == 0
    }
}

/// Returns true if the stored rate is 0 (unprocessed) or within range.
#[must_use]
pub fn check_rate_invariant(request: &LoanRequest) -> bool {
    if request.processed {
        request.interest_rate_bps <= limits::MAX_INTEREST_RATE_BPS
    } else {
        request.interest_rate_bps == 0 && !request.approved
    }
}

/// Check all record invariants at once.
#[must_use]
pub fn check_all_invariants(request: &LoanRequest) -> InvariantCheckResult {
    let mut violations = Vec::new();

    if !check_score_invariant(request) {
        violations.push(InvariantViolation::ScoreOutOfRange {
            score: request.credit_score,
        });
    }

    if !check_rate_invariant(request) {
        violations.push(InvariantViolation::RateOutOfRange {
            rate_bps: request.interest_rate_bps,
        });
    }

    if violations.is_empty() {
        InvariantCheckResult::Valid
    } else {
        InvariantCheckResult::Invalid(violations)
    }
}

/// Result of checking all invariants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantCheckResult {
    /// All invariants hold.
    Valid,
    /// One or more invariants violated.
    Invalid(Vec<InvariantViolation>),
}

impl InvariantCheckResult {
    /// Returns true if all invariants hold.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// A single invariant violation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantViolation {
    /// Stored score inconsistent with the processed flag.
    ScoreOutOfRange {
        /// Offending score.
        score: u64,
    },
    /// Stored rate inconsistent with the processed flag.
    RateOutOfRange {
        /// Offending rate.
        rate_bps: u64,
    },
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::Address;

    #[test]
    fn test_credit_score_boundaries() {
        assert_eq!(check_credit_score(299), Err(LendingError::ScoreOutOfRange));
        assert!(check_credit_score(300).is_ok());
        assert!(check_credit_score(850).is_ok());
        assert_eq!(check_credit_score(851), Err(LendingError::ScoreOutOfRange));
    }

    #[test]
    fn test_interest_rate_boundaries() {
        assert!(check_interest_rate(0).is_ok());
        assert!(check_interest_rate(10_000).is_ok());
        assert_eq!(check_interest_rate(10_001), Err(LendingError::RateTooHigh));
    }

    #[test]
    fn test_balance_threshold_is_inclusive() {
        let at = AccountSnapshot::eoa(min_balance());
        assert!(check_eligibility(&at).is_ok());

        let below = AccountSnapshot::eoa(min_balance() - U256::one());
        assert_eq!(check_eligibility(&below), Err(LendingError::InsufficientBalance));
    }

    #[test]
    fn test_balance_checked_before_history() {
        // Empty account fails both checks; the balance reason wins.
        let empty = AccountSnapshot::default();
        assert_eq!(check_eligibility(&empty), Err(LendingError::InsufficientBalance));
    }

    #[test]
    fn test_contract_account_has_history() {
        assert!(has_activity_history(&AccountSnapshot::contract(U256::zero())));
        assert!(!has_activity_history(&AccountSnapshot::eoa(U256::zero())));
        assert!(check_eligibility(&AccountSnapshot::contract(min_balance())).is_ok());
    }

    #[test]
    fn test_record_invariants() {
        let mut req = LoanRequest::pending(Address::ZERO, U256::one(), "");
        assert!(check_all_invariants(&req).is_valid());

        req.credit_score = 700;
        assert!(!check_all_invariants(&req).is_valid());

        req.processed = true;
        req.interest_rate_bps = 450;
        assert!(check_all_invariants(&req).is_valid());

        req.interest_rate_bps = 10_001;
        assert_eq!(
            check_all_invariants(&req),
            InvariantCheckResult::Invalid(vec![InvariantViolation::RateOutOfRange {
                rate_bps: 10_001
            }])
        );
    }
}
