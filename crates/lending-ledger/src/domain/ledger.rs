//! # Ledger State
//!
//! The single owned state object behind the ledger: request counter,
//! oracle identity and the append-only request table.
//!
//! All transitions are synchronous and validate fully before writing, so a
//! failed call leaves the state exactly as it was.

use crate::domain::entities::{Fulfillment, LoanRequest};
use crate::domain::invariants::{check_credit_score, check_interest_rate};
use crate::domain::services::{derive_request_id, total_repayment};
use crate::domain::value_objects::{Address, RequestId, U256};
use crate::errors::LendingError;
use std::collections::HashMap;

/// Request table plus the counters that guard it.
#[derive(Debug, Clone)]
pub struct LedgerState {
    /// The only account allowed to fulfil. Fixed at construction.
    oracle: Address,
    /// Number of requests created so far; salts request ids.
    counter: u64,
    /// Every request ever created.
    requests: HashMap<RequestId, LoanRequest>,
}

impl LedgerState {
    /// Creates an empty ledger owned by `oracle`.
    #[must_use]
    pub fn new(oracle: Address) -> Self {
        Self {
            oracle,
            counter: 0,
            requests: HashMap::new(),
        }
    }

    /// The oracle identity.
    #[must_use]
    pub fn oracle(&self) -> Address {
        self.oracle
    }

    /// Number of requests created.
    #[must_use]
    pub fn request_count(&self) -> u64 {
        self.counter
    }

    /// Looks up a request.
    pub fn get(&self, request_id: &RequestId) -> Result<&LoanRequest, LendingError> {
        self.requests.get(request_id).ok_or(LendingError::NotFound)
    }

    /// Number of requests still awaiting fulfilment.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.requests.values().filter(|r| r.is_pending()).count()
    }

    /// Stores a new pending request and returns its id.
    ///
    /// Callers run eligibility and identity validation first; this only
    /// performs the write.
    pub fn record_request(
        &mut self,
        borrower: Address,
        amount: U256,
        ens_name: &str,
        timestamp: u64,
    ) -> RequestId {
        let mut request_id = derive_request_id(borrower, amount, ens_name, self.counter, timestamp);
        // The counter salt already makes ids unique; this only guards
        // against a hash collision with an earlier request.
        while self.requests.contains_key(&request_id) {
            self.counter += 1;
            request_id = derive_request_id(borrower, amount, ens_name, self.counter, timestamp);
        }
        self.counter += 1;
        self.requests
            .insert(request_id, LoanRequest::pending(borrower, amount, ens_name));
        request_id
    }

    /// Records the oracle's decision for a request, exactly once.
    ///
    /// Check order: caller, existence, processed latch, score range,
    /// rate range, then repayment arithmetic. Nothing is written unless
    /// every check passes.
    pub fn fulfill(
        &mut self,
        caller: Address,
        request_id: RequestId,
        credit_score: u64,
        interest_rate_bps: u64,
        approved: bool,
    ) -> Result<Fulfillment, LendingError> {
        if caller != self.oracle {
            return Err(LendingError::Unauthorized);
        }

        let request = self
            .requests
            .get_mut(&request_id)
            .ok_or(LendingError::NotFound)?;

        if request.processed {
            return Err(LendingError::AlreadyProcessed);
        }
        check_credit_score(credit_score)?;
        check_interest_rate(interest_rate_bps)?;

        let total_repayment = if approved {
            Some(total_repayment(request.amount, interest_rate_bps)?)
        } else {
            None
        };

        request.processed = true;
        request.credit_score = credit_score;
        request.approved = approved;
        request.interest_rate_bps = interest_rate_bps;

        Ok(Fulfillment {
            request_id,
            request: request.clone(),
            total_repayment,
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
