//! # Credit Deciders
//!
//! A [`CreditDecider`] turns a new loan request into a score and a rate.
//! The worker owns everything after that: clamping, the approval
//! threshold and the fulfilment call.
//!
//! [`SignalDecider`] is the reference rule-based policy:
//!
//! | Signal | Effect |
//! |--------|--------|
//! | base | 600 |
//! | `com.twitter` or `com.github` text record set | +50 |
//! | balance above 1 ETH | +50 |
//! | more than 10 sent transactions | +30 |
//!
//! Its rate depends on loan size:
//!
//! | Principal | Rate |
//! |-----------|------|
//! | above 5 ETH | 800 bps |
//! | above 2.5 ETH | 1000 bps |
//! | above 0.5 ETH | 1100 bps |
//! | otherwise | configured default (1200 bps) |

use crate::errors::WorkerError;
use async_trait::async_trait;
use lending_ledger::domain::services::namehash;
use lending_ledger::domain::value_objects::{Address, RequestId, U256};
use lending_ledger::events::LedgerEvent;
use lending_ledger::ports::outbound::{AccountReader, NameService};
use std::sync::Arc;
use tracing::debug;

/// Text record keys read as the social signal.
pub const SOCIAL_KEYS: [&str; 2] = ["com.twitter", "com.github"];

// =============================================================================
// INPUTS AND OUTPUTS
// =============================================================================

/// A newly created request, as announced on the event log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRequest {
    /// Request to decide.
    pub request_id: RequestId,
    /// Requesting account.
    pub borrower: Address,
    /// Principal in wei.
    pub amount: U256,
    /// Supplied name; empty when none.
    pub ens_name: String,
    /// Balance to score against instead of the live one (debug requests).
    pub simulated_balance: Option<U256>,
}

impl NewRequest {
    /// Extract a new request from `Requested` or `DebugRequested`.
    #[must_use]
    pub fn from_event(event: &LedgerEvent) -> Option<Self> {
        match event {
            LedgerEvent::Requested {
                request_id,
                borrower,
                amount,
                ens_name,
            } => Some(Self {
                request_id: *request_id,
                borrower: *borrower,
                amount: *amount,
                ens_name: ens_name.clone(),
                simulated_balance: None,
            }),
            LedgerEvent::DebugRequested {
                request_id,
                borrower,
                amount,
                ens_name,
                simulated_balance,
            } => Some(Self {
                request_id: *request_id,
                borrower: *borrower,
                amount: *amount,
                ens_name: ens_name.clone(),
                simulated_balance: Some(*simulated_balance),
            }),
            LedgerEvent::Processed { .. } | LedgerEvent::Executed { .. } => None,
        }
    }
}

/// Signals gathered about a requester.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecisionContext {
    /// Balance scored against (simulated for debug requests).
    pub balance: U256,
    /// Transactions sent by the requester.
    pub transaction_count: u64,
    /// Non-empty social text records, as `(key, value)`.
    pub social: Vec<(String, String)>,
}

impl DecisionContext {
    /// Returns true if any social record is linked.
    #[must_use]
    pub fn has_social(&self) -> bool {
        !self.social.is_empty()
    }
}

/// Raw output of a decider, before clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreditAssessment {
    /// Credit score; may fall outside [300, 850].
    pub score: u64,
    /// Interest rate in basis points; may exceed 10000.
    pub rate_bps: u64,
}

// =============================================================================
// DECIDER PORT
// =============================================================================

/// Scores a new loan request.
#[async_trait]
pub trait CreditDecider: Send + Sync {
    /// Assess `request`.
    async fn assess(&self, request: &NewRequest) -> Result<CreditAssessment, WorkerError>;
}

/// Returns the same assessment for every request.
#[derive(Debug, Clone, Copy)]
pub struct FixedDecider(pub CreditAssessment);

#[async_trait]
impl CreditDecider for FixedDecider {
    async fn assess(&self, _request: &NewRequest) -> Result<CreditAssessment, WorkerError> {
        Ok(self.0)
    }
}

// =============================================================================
// SIGNAL DECIDER
// =============================================================================

/// Rule-based decider over balance and name records.
pub struct SignalDecider<N: NameService, A: AccountReader> {
    names: Arc<N>,
    accounts: Arc<A>,
    default_rate_bps: u64,
}

impl<N: NameService, A: AccountReader> SignalDecider<N, A> {
    /// Base score before any signal.
    pub const BASE_SCORE: u64 = 600;
    /// Bonus for a linked social record.
    pub const SOCIAL_BONUS: u64 = 50;
    /// Bonus for a balance above one ETH.
    pub const BALANCE_BONUS: u64 = 50;
    /// Bonus for an established transaction history.
    pub const HISTORY_BONUS: u64 = 30;
    /// Transaction count a requester must exceed to earn the history bonus.
    pub const HISTORY_MIN_TRANSACTIONS: u64 = 10;

    /// Create a decider reading from `names` and `accounts`.
    pub fn new(names: Arc<N>, accounts: Arc<A>, default_rate_bps: u64) -> Self {
        Self {
            names,
            accounts,
            default_rate_bps,
        }
    }

    /// Gather the signals for `request`.
    pub async fn gather(&self, request: &NewRequest) -> Result<DecisionContext, WorkerError> {
        let balance = match request.simulated_balance {
            Some(balance) => balance,
            None => self.accounts.balance(request.borrower).await?,
        };
        let transaction_count = self.accounts.transaction_count(request.borrower).await?;
        let social = self.social_records(&request.ens_name).await?;

        Ok(DecisionContext {
            balance,
            transaction_count,
            social,
        })
    }

    async fn social_records(&self, ens_name: &str) -> Result<Vec<(String, String)>, WorkerError> {
        if ens_name.is_empty() {
            return Ok(Vec::new());
        }
        let node = namehash(ens_name);
        let resolver = self.names.resolver(node).await?;
        if resolver.is_zero() {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        for key in SOCIAL_KEYS {
            let value = self.names.text(resolver, node, key).await?;
            if !value.is_empty() {
                records.push((key.to_string(), value));
            }
        }
        Ok(records)
    }

    /// Score `context` with the fixed rules.
    #[must_use]
    pub fn score(context: &DecisionContext) -> u64 {
        let mut score = Self::BASE_SCORE;
        if context.has_social() {
            score += Self::SOCIAL_BONUS;
        }
        if context.balance > U256::exp10(18) {
            score += Self::BALANCE_BONUS;
        }
        if context.transaction_count > Self::HISTORY_MIN_TRANSACTIONS {
            score += Self::HISTORY_BONUS;
        }
        score
    }

    /// Rate for a loan of `amount` wei.
    #[must_use]
    pub fn rate_for(&self, amount: U256) -> u64 {
        // Thresholds in milli-ETH.
        const TIERS: [(u64, u64); 3] = [(5_000, 800), (2_500, 1_000), (500, 1_100)];
        let milli_eth = U256::exp10(15);
        TIERS
            .iter()
            .find(|(threshold, _)| amount > U256::from(*threshold) * milli_eth)
            .map_or(self.default_rate_bps, |(_, rate)| *rate)
    }
}

#[async_trait]
impl<N: NameService, A: AccountReader> CreditDecider for SignalDecider<N, A> {
    async fn assess(&self, request: &NewRequest) -> Result<CreditAssessment, WorkerError> {
        let context = self.gather(request).await?;
        let assessment = CreditAssessment {
            score: Self::score(&context),
            rate_bps: self.rate_for(request.amount),
        };
        debug!(
            request_id = %request.request_id,
            balance = %context.balance,
            transaction_count = context.transaction_count,
            social = context.social.len(),
            score = assessment.score,
            rate_bps = assessment.rate_bps,
            "Assessed loan request"
        );
        Ok(assessment)
    }
}
