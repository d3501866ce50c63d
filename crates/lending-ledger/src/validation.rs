//! # Request Validation
//!
//! The two pre-creation checks, run over the driven ports:
//!
//! 1. [`EligibilityGate`]: minimum balance, then activity history
//! 2. [`IdentityValidator`]: name bound to the requester (only when a name
//!    is supplied)
//!
//! Both are read-only, point-in-time checks. The external registry stays
//! the source of truth and may change between a check and its use.

use crate::domain::entities::AccountSnapshot;
use crate::domain::invariants::check_eligibility;
use crate::domain::services::namehash;
use crate::domain::value_objects::{Address, U256};
use crate::errors::LendingError;
use crate::ports::outbound::{AccountReader, NameService};
use std::sync::Arc;
use tracing::debug;

// =============================================================================
// IDENTITY VALIDATOR
// =============================================================================

/// Checks that a name currently resolves to the requester.
pub struct IdentityValidator<N: NameService> {
    names: Arc<N>,
}

impl<N: NameService> IdentityValidator<N> {
    /// Create a validator over `names`.
    pub fn new(names: Arc<N>) -> Self {
        Self { names }
    }

    /// Validate that `name` is bound to `claimed_owner`.
    ///
    /// An empty name passes unconditionally.
    ///
    /// # Errors
    ///
    /// - `NotRegistered` - no resolver bound to the name
    /// - `NotOwner` - the address record is another account
    /// - `Lookup` - the registry or resolver could not be read
    pub async fn validate(&self, name: &str, claimed_owner: Address) -> Result<(), LendingError> {
        if name.is_empty() {
            return Ok(());
        }

        let node = namehash(name);
        let resolver = self.names.resolver(node).await?;
        if resolver.is_zero() {
            debug!(name, "Name has no resolver");
            return Err(LendingError::NotRegistered);
        }

        // Addresses compare by bytes, so textual casing never matters.
        let resolved = self.names.addr(resolver, node).await?;
        if resolved != claimed_owner {
            debug!(name, %resolved, %claimed_owner, "Name resolves to another account");
            return Err(LendingError::NotOwner);
        }

        Ok(())
    }
}

// =============================================================================
// ELIGIBILITY GATE
// =============================================================================

/// Checks the requester's balance and activity.
pub struct EligibilityGate<A: AccountReader> {
    accounts: Arc<A>,
}

impl<A: AccountReader> EligibilityGate<A> {
    /// Create a gate over `accounts`.
    pub fn new(accounts: Arc<A>) -> Self {
        Self { accounts }
    }

    /// Check `account` against its live balance.
    ///
    /// # Errors
    ///
    /// `InsufficientBalance` before `NoHistory`; `Lookup` on read failure.
    pub async fn check(&self, account: Address) -> Result<(), LendingError> {
        let snapshot = self.accounts.snapshot(account).await?;
        check_eligibility(&snapshot)
    }

    /// Check `account` with `balance` standing in for its live balance.
    ///
    /// Code presence is still read live.
    pub async fn check_with_balance(
        &self,
        account: Address,
        balance: U256,
    ) -> Result<(), LendingError> {
        let has_code = self.accounts.has_code(account).await?;
        check_eligibility(&AccountSnapshot { balance, has_code })
    }
}
