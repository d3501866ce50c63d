//! # Lending Service
//!
//! Owns the single ledger state and the event log, and implements
//! [`LendingApi`] over the driven ports.
//!
//! ## Atomicity
//!
//! Collaborator reads (eligibility, identity) run first, without holding
//! any lock. The state transition and the append of its events then happen
//! together under the state lock, so the log order is the order in which
//! transitions were applied, and a failed call leaves neither a state
//! change nor an event behind.
//!
//! ## Security
//!
//! - Only the configured oracle may fulfil or use the debug entry point
//! - The debug entry point is refused unless enabled in `LedgerConfig`

use crate::adapters::{EventLog, InMemoryAccounts, InMemoryNameService, LogSubscription};
use crate::config::LedgerConfig;
use crate::domain::entities::{Fulfillment, LoanRequest};
use crate::domain::ledger::LedgerState;
use crate::domain::value_objects::{Address, RequestId, U256};
use crate::errors::LendingError;
use crate::events::{EventFilter, LedgerEvent};
use crate::ports::inbound::LendingApi;
use crate::ports::outbound::{AccountReader, NameService};
use crate::validation::{EligibilityGate, IdentityValidator};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Statistics for the Lending Service.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LedgerStats {
    /// Requests created through `request_loan`.
    pub requests_created: u64,
    /// Requests created through the debug entry point.
    pub debug_requests_created: u64,
    /// Request attempts refused by validation or lookup failure.
    pub requests_rejected: u64,
    /// Fulfilments applied.
    pub fulfillments: u64,
    /// Fulfilments that approved the loan.
    pub approvals: u64,
    /// Fulfilments that rejected the loan.
    pub rejections: u64,
    /// Fulfilment attempts that failed.
    pub fulfillments_failed: u64,
    /// Calls refused because the caller was not the oracle.
    pub unauthorized_attempts: u64,
}

/// Where a request's eligibility balance comes from.
#[derive(Clone, Copy)]
enum BalanceSource {
    Live,
    Simulated(U256),
}

/// The loan ledger service.
pub struct LendingService<N: NameService, A: AccountReader> {
    /// Ledger configuration.
    config: LedgerConfig,
    /// Name service used for identity checks.
    names: Arc<N>,
    /// Account model used for eligibility checks.
    accounts: Arc<A>,
    identity: IdentityValidator<N>,
    eligibility: EligibilityGate<A>,
    /// The single ledger state object.
    state: Mutex<LedgerState>,
    /// Events of every applied transition.
    log: Arc<EventLog>,
    /// Service statistics.
    stats: Mutex<LedgerStats>,
}

impl<N: NameService, A: AccountReader> LendingService<N, A> {
    /// Create a new Lending Service.
    pub fn new(names: Arc<N>, accounts: Arc<A>, config: LedgerConfig) -> Self {
        info!(
            oracle = %config.oracle,
            debug_entrypoints = config.debug_entrypoints,
            "Lending ledger initialised"
        );
        if config.debug_entrypoints {
            warn!("Debug entry points enabled; callers can assert arbitrary balances");
        }

        Self {
            identity: IdentityValidator::new(Arc::clone(&names)),
            eligibility: EligibilityGate::new(Arc::clone(&accounts)),
            state: Mutex::new(LedgerState::new(config.oracle)),
            log: Arc::new(EventLog::new()),
            stats: Mutex::new(LedgerStats::default()),
            names,
            accounts,
            config,
        }
    }

    /// The oracle identity.
    #[must_use]
    pub fn oracle(&self) -> Address {
        self.config.oracle
    }

    /// Number of requests created so far.
    #[must_use]
    pub fn request_count(&self) -> u64 {
        self.state.lock().request_count()
    }

    /// Get current service statistics.
    #[must_use]
    pub fn stats(&self) -> LedgerStats {
        self.stats.lock().clone()
    }

    /// Ledger configuration.
    #[must_use]
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// The name service collaborator.
    #[must_use]
    pub fn names(&self) -> &Arc<N> {
        &self.names
    }

    /// The account model collaborator.
    #[must_use]
    pub fn accounts(&self) -> &Arc<A> {
        &self.accounts
    }

    /// The event log.
    #[must_use]
    pub fn events(&self) -> Arc<EventLog> {
        Arc::clone(&self.log)
    }

    /// Subscribe to events matching `filter`, starting at `cursor`.
    #[must_use]
    pub fn subscribe(&self, cursor: u64, filter: EventFilter) -> LogSubscription {
        self.log.subscribe_from(cursor, filter)
    }

    fn record_unauthorized(&self, caller: Address, operation: &str) -> LendingError {
        warn!(%caller, operation, "Unauthorized caller");
        let mut stats = self.stats.lock();
        stats.unauthorized_attempts += 1;
        LendingError::Unauthorized
    }

    /// Validate, then store the request and append its event atomically.
    async fn create_request(
        &self,
        borrower: Address,
        ens_name: &str,
        amount: U256,
        balance: BalanceSource,
    ) -> Result<RequestId, LendingError> {
        let validated = self.validate_request(borrower, ens_name, balance).await;
        if let Err(err) = validated {
            info!(%borrower, ens_name, reason = %err, "Loan request rejected");
            self.stats.lock().requests_rejected += 1;
            return Err(err);
        }

        let timestamp = u64::try_from(Utc::now().timestamp()).unwrap_or_default();
        let request_id = {
            let mut state = self.state.lock();
            let request_id = state.record_request(borrower, amount, ens_name, timestamp);
            let event = match balance {
                BalanceSource::Live => LedgerEvent::Requested {
                    request_id,
                    borrower,
                    amount,
                    ens_name: ens_name.to_string(),
                },
                BalanceSource::Simulated(simulated_balance) => LedgerEvent::DebugRequested {
                    request_id,
                    borrower,
                    amount,
                    ens_name: ens_name.to_string(),
                    simulated_balance,
                },
            };
            self.log.append(event);
            request_id
        };

        {
            let mut stats = self.stats.lock();
            match balance {
                BalanceSource::Live => stats.requests_created += 1,
                BalanceSource::Simulated(_) => stats.debug_requests_created += 1,
            }
        }

        info!(
            request_id = %request_id,
            %borrower,
            %amount,
            ens_name,
            "Loan request created"
        );
        Ok(request_id)
    }

    async fn validate_request(
        &self,
        borrower: Address,
        ens_name: &str,
        balance: BalanceSource,
    ) -> Result<(), LendingError> {
        match balance {
            BalanceSource::Live => self.eligibility.check(borrower).await?,
            BalanceSource::Simulated(b) => self.eligibility.check_with_balance(borrower, b).await?,
        }
        self.identity.validate(ens_name, borrower).await
    }

    fn events_for(fulfillment: &Fulfillment) -> Vec<LedgerEvent> {
        let request = &fulfillment.request;
        let mut events = vec![LedgerEvent::Processed {
            request_id: fulfillment.request_id,
            borrower: request.borrower,
            credit_score: request.credit_score,
            approved: request.approved,
            interest_rate_bps: request.interest_rate_bps,
        }];
        if let Some(total_repayment) = fulfillment.total_repayment {
            events.push(LedgerEvent::Executed {
                borrower: request.borrower,
                principal: request.amount,
                total_repayment,
                interest_rate_bps: request.interest_rate_bps,
            });
        }
        events
    }
}

#[async_trait]
impl<N: NameService, A: AccountReader> LendingApi for LendingService<N, A> {
    #[instrument(skip(self, amount), fields(borrower = %borrower))]
    async fn request_loan(
        &self,
        borrower: Address,
        ens_name: &str,
        amount: U256,
    ) -> Result<RequestId, LendingError> {
        self.create_request(borrower, ens_name, amount, BalanceSource::Live)
            .await
    }

    #[instrument(skip(self), fields(caller = %caller, request_id = %request_id))]
    async fn fulfill_loan_request(
        &self,
        caller: Address,
        request_id: RequestId,
        credit_score: u64,
        interest_rate_bps: u64,
        approved: bool,
    ) -> Result<(), LendingError> {
        let result = {
            let mut state = self.state.lock();
            state
                .fulfill(caller, request_id, credit_score, interest_rate_bps, approved)
                .map(|fulfillment| {
                    self.log.append_all(Self::events_for(&fulfillment));
                    fulfillment
                })
        };

        match result {
            Ok(fulfillment) => {
                {
                    let mut stats = self.stats.lock();
                    stats.fulfillments += 1;
                    if approved {
                        stats.approvals += 1;
                    } else {
                        stats.rejections += 1;
                    }
                }
                info!(
                    credit_score,
                    approved,
                    interest_rate_bps,
                    total_repayment = ?fulfillment.total_repayment,
                    "Loan request fulfilled"
                );
                Ok(())
            }
            Err(LendingError::Unauthorized) => {
                Err(self.record_unauthorized(caller, "fulfill_loan_request"))
            }
            Err(err) => {
                self.stats.lock().fulfillments_failed += 1;
                warn!(reason = %err, "Fulfilment rejected");
                Err(err)
            }
        }
    }

    #[instrument(skip(self, amount, simulated_balance), fields(caller = %caller, borrower = %borrower))]
    async fn debug_request_loan_with_balance(
        &self,
        caller: Address,
        borrower: Address,
        ens_name: &str,
        amount: U256,
        simulated_balance: U256,
    ) -> Result<RequestId, LendingError> {
        if !self.config.debug_entrypoints {
            warn!("Debug entry point called while disabled");
            return Err(LendingError::DebugDisabled);
        }
        if caller != self.config.oracle {
            return Err(self.record_unauthorized(caller, "debug_request_loan_with_balance"));
        }

        warn!(%simulated_balance, "Debug request with simulated balance");
        self.create_request(
            borrower,
            ens_name,
            amount,
            BalanceSource::Simulated(simulated_balance),
        )
        .await
    }

    async fn get_loan_request(&self, request_id: RequestId) -> Result<LoanRequest, LendingError> {
        let request = self.state.lock().get(&request_id).cloned();
        if request.is_err() {
            debug!(request_id = %request_id, "Unknown request id");
        }
        request
    }
}

/// Create a service over fresh in-memory collaborators.
pub fn create_test_service(
    config: LedgerConfig,
) -> LendingService<InMemoryNameService, InMemoryAccounts> {
    LendingService::new(
        Arc::new(InMemoryNameService::new()),
        Arc::new(InMemoryAccounts::new()),
        config,
    )
}

// =============================================================================
// TESTS
// =============================================================================
