//! # Driving Ports (API - Inbound)
//!
//! The public API of the ledger. The presentation layer issues requests
//! through it; the decision worker fulfils them.
//!
//! Callers are identified explicitly: `caller` / `borrower` parameters are
//! the authenticated account the surrounding transport vouches for.

use crate::domain::entities::LoanRequest;
use crate::domain::value_objects::{Address, RequestId, U256};
use crate::errors::LendingError;
use async_trait::async_trait;

/// Primary API of the loan ledger.
///
/// ## Usage
///
/// ```ignore
/// let id = api.request_loan(borrower, "alice.eth", amount).await?;
/// api.fulfill_loan_request(oracle, id, 780, 450, true).await?;
/// ```
#[async_trait]
pub trait LendingApi: Send + Sync {
    /// Create a loan request for `borrower`.
    ///
    /// Runs the eligibility gate, then identity validation when `ens_name`
    /// is non-empty. On success the request is stored pending and a
    /// `Requested` event is appended.
    ///
    /// # Errors
    ///
    /// `InsufficientBalance`, `NoHistory`, `NotRegistered`, `NotOwner`, or
    /// `Lookup` when a collaborator read fails. Nothing is written on error.
    async fn request_loan(
        &self,
        borrower: Address,
        ens_name: &str,
        amount: U256,
    ) -> Result<RequestId, LendingError>;

    /// Record the oracle's decision for a pending request.
    ///
    /// Appends `Processed`, then `Executed` when `approved`.
    ///
    /// # Errors
    ///
    /// `Unauthorized`, `NotFound`, `AlreadyProcessed`, `ScoreOutOfRange`,
    /// `RateTooHigh`, `Overflow`. Nothing is written on error.
    async fn fulfill_loan_request(
        &self,
        caller: Address,
        request_id: RequestId,
        credit_score: u64,
        interest_rate_bps: u64,
        approved: bool,
    ) -> Result<(), LendingError>;

    /// Create a request evaluated against `simulated_balance` instead of
    /// the live balance.
    ///
    /// Test entry point: rejected with `DebugDisabled` unless enabled in
    /// configuration, and with `Unauthorized` unless `caller` is the
    /// oracle. Appends `DebugRequested` instead of `Requested`.
    async fn debug_request_loan_with_balance(
        &self,
        caller: Address,
        borrower: Address,
        ens_name: &str,
        amount: U256,
        simulated_balance: U256,
    ) -> Result<RequestId, LendingError>;

    /// Fetch a request record.
    ///
    /// # Errors
    ///
    /// `NotFound` if no request has this id.
    async fn get_loan_request(&self, request_id: RequestId) -> Result<LoanRequest, LendingError>;
}
