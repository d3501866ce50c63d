//! # Decision Worker
//!
//! Follows the ledger's event log from a cursor and fulfils every new
//! request as the oracle.
//!
//! ## Flow
//!
//! 1. `Requested` / `DebugRequested` arrives on the subscription
//! 2. The decider assesses it (score, rate)
//! 3. Score is clamped to [300, 850], rate to at most 10000 bps
//! 4. Approved iff the clamped score reaches the threshold
//! 5. `fulfill_loan_request` is called as the oracle
//!
//! A failed request is logged and skipped. Retrying is left to whoever
//! drives the worker.

use crate::config::WorkerConfig;
use crate::decider::{CreditAssessment, CreditDecider, NewRequest};
use crate::errors::WorkerError;
use lending_ledger::adapters::LogSubscription;
use lending_ledger::domain::invariants::limits;
use lending_ledger::domain::value_objects::RequestId;
use lending_ledger::events::LogEntry;
use lending_ledger::ports::inbound::LendingApi;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

/// A decision submitted to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    /// Decided request.
    pub request_id: RequestId,
    /// Clamped credit score.
    pub credit_score: u64,
    /// Capped interest rate in basis points.
    pub interest_rate_bps: u64,
    /// Verdict.
    pub approved: bool,
}

/// Statistics for the decision worker.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WorkerStats {
    /// New requests seen.
    pub requests_seen: u64,
    /// Decisions that approved.
    pub approved: u64,
    /// Decisions that rejected.
    pub rejected: u64,
    /// Requests that could not be decided or fulfilled.
    pub failed: u64,
}

/// The off-chain decision worker.
pub struct OracleWorker<L: LendingApi, D: CreditDecider> {
    ledger: Arc<L>,
    decider: D,
    config: WorkerConfig,
    stats: Mutex<WorkerStats>,
}

impl<L: LendingApi, D: CreditDecider> OracleWorker<L, D> {
    /// Create a worker fulfilling on `ledger` with `decider`.
    pub fn new(ledger: Arc<L>, decider: D, config: WorkerConfig) -> Self {
        Self {
            ledger,
            decider,
            config,
            stats: Mutex::new(WorkerStats::default()),
        }
    }

    /// Worker configuration.
    #[must_use]
    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Get current worker statistics.
    #[must_use]
    pub fn stats(&self) -> WorkerStats {
        self.stats.lock().clone()
    }

    /// Turn an assessment into a decision the ledger will accept.
    #[must_use]
    pub fn decide(&self, request_id: RequestId, assessment: CreditAssessment) -> Decision {
        let credit_score = assessment
            .score
            .clamp(limits::MIN_CREDIT_SCORE, limits::MAX_CREDIT_SCORE);
        Decision {
            request_id,
            credit_score,
            interest_rate_bps: assessment.rate_bps.min(limits::MAX_INTEREST_RATE_BPS),
            approved: credit_score >= self.config.approval_threshold,
        }
    }

    /// Decide and fulfil the request announced by `entry`.
    ///
    /// Returns `Ok(None)` for events that announce no new request.
    #[instrument(skip(self, entry), fields(sequence = entry.sequence))]
    pub async fn handle_entry(&self, entry: &LogEntry) -> Result<Option<Decision>, WorkerError> {
        let Some(request) = NewRequest::from_event(&entry.event) else {
            return Ok(None);
        };
        self.stats.lock().requests_seen += 1;

        match self.process(&request).await {
            Ok(decision) => {
                {
                    let mut stats = self.stats.lock();
                    if decision.approved {
                        stats.approved += 1;
                    } else {
                        stats.rejected += 1;
                    }
                }
                info!(
                    request_id = %decision.request_id,
                    credit_score = decision.credit_score,
                    interest_rate_bps = decision.interest_rate_bps,
                    approved = decision.approved,
                    debug = request.simulated_balance.is_some(),
                    "Loan request decided"
                );
                Ok(Some(decision))
            }
            Err(err) => {
                self.stats.lock().failed += 1;
                warn!(
                    request_id = %request.request_id,
                    reason = %err,
                    retryable = err.is_retryable(),
                    "Failed to decide loan request"
                );
                Err(err)
            }
        }
    }

    async fn process(&self, request: &NewRequest) -> Result<Decision, WorkerError> {
        let assessment = self.decider.assess(request).await?;
        let decision = self.decide(request.request_id, assessment);
        self.ledger
            .fulfill_loan_request(
                self.config.oracle,
                decision.request_id,
                decision.credit_score,
                decision.interest_rate_bps,
                decision.approved,
            )
            .await?;
        Ok(decision)
    }

    /// Run the worker loop until `shutdown` flips to true or the log
    /// closes.
    ///
    /// Returns the cursor to resume from.
    pub async fn run(
        &self,
        mut subscription: LogSubscription,
        mut shutdown: watch::Receiver<bool>,
    ) -> u64 {
        info!(cursor = subscription.cursor(), "Decision worker started");

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Shutdown signal received");
                        break;
                    }
                }
                entry = subscription.recv() => {
                    let Some(entry) = entry else {
                        info!("Event log closed, exiting");
                        break;
                    };
                    // Failures are already logged and counted.
                    if let Err(err) = self.handle_entry(&entry).await {
                        debug!(sequence = entry.sequence, reason = %err, "Skipping request");
                    }
                }
            }
        }

        info!(cursor = subscription.cursor(), "Decision worker stopped");
        subscription.cursor()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decider::FixedDecider;
    use lending_ledger::adapters::{InMemoryAccounts, InMemoryNameService};
    use lending_ledger::config::LedgerConfig;
    use lending_ledger::domain::value_objects::{Address, U256};
    use lending_ledger::errors::LendingError;
    use lending_ledger::events::LedgerEvent;
    use lending_ledger::service::{create_test_service, LendingService};

    const ORACLE: Address = Address::new([0x0A; 20]);
    const BORROWER: Address = Address::new([0xB0; 20]);

    type Ledger = LendingService<InMemoryNameService, InMemoryAccounts>;

    fn ledger() -> Arc<Ledger> {
        let ledger = create_test_service(LedgerConfig::new(ORACLE));
        ledger.accounts().set_balance(BORROWER, U256::exp10(18));
        Arc::new(ledger)
    }

    fn worker(ledger: &Arc<Ledger>, score: u64, rate_bps: u64) -> OracleWorker<Ledger, FixedDecider> {
        OracleWorker::new(
            Arc::clone(ledger),
            FixedDecider(CreditAssessment { score, rate_bps }),
            WorkerConfig::new(ORACLE),
        )
    }

    #[test]
    fn test_decide_clamps_and_thresholds() {
        let worker = worker(&ledger(), 0, 0);
        let id = RequestId::new([1u8; 32]);

        let low = worker.decide(id, CreditAssessment { score: 10, rate_bps: 50_000 });
        assert_eq!(low.credit_score, 300);
        assert_eq!(low.interest_rate_bps, 10_000);
        assert!(!low.approved);

        let high = worker.decide(id, CreditAssessment { score: 9_999, rate_bps: 450 });
        assert_eq!(high.credit_score, 850);
        assert!(high.approved);

        assert!(!worker.decide(id, CreditAssessment { score: 649, rate_bps: 0 }).approved);
        assert!(worker.decide(id, CreditAssessment { score: 650, rate_bps: 0 }).approved);
    }

    #[tokio::test]
    async fn test_handle_entry_fulfils_request() {
        let ledger = ledger();
        let worker = worker(&ledger, 780, 450);
        let id = ledger.request_loan(BORROWER, "", U256::from(5)).await.unwrap();

        let entry = ledger.events().entry(0).unwrap();
        let decision = worker.handle_entry(&entry).await.unwrap().unwrap();
        assert_eq!(decision.request_id, id);
        assert!(decision.approved);

        let stored = ledger.get_loan_request(id).await.unwrap();
        assert!(stored.processed);
        assert_eq!(stored.credit_score, 780);
        assert_eq!(worker.stats().approved, 1);
    }

    #[tokio::test]
    async fn test_handle_entry_ignores_other_events() {
        let ledger = ledger();
        let worker = worker(&ledger, 780, 450);
        let entry = LogEntry {
            sequence: 0,
            event: LedgerEvent::Executed {
                borrower: BORROWER,
                principal: U256::from(5),
                total_repayment: U256::from(5),
                interest_rate_bps: 0,
            },
        };
        assert_eq!(worker.handle_entry(&entry).await, Ok(None));
        assert_eq!(worker.stats().requests_seen, 0);
    }

    #[tokio::test]
    async fn test_replayed_entry_fails_terminally() {
        let ledger = ledger();
        let worker = worker(&ledger, 780, 450);
        ledger.request_loan(BORROWER, "", U256::from(5)).await.unwrap();
        let entry = ledger.events().entry(0).unwrap();

        worker.handle_entry(&entry).await.unwrap();
        let err = worker.handle_entry(&entry).await.unwrap_err();
        assert_eq!(err, WorkerError::Ledger(LendingError::AlreadyProcessed));
        assert!(!err.is_retryable());
        assert_eq!(worker.stats().failed, 1);
    }

    #[tokio::test]
    async fn test_wrong_identity_is_unauthorized() {
        let ledger = ledger();
        let worker = OracleWorker::new(
            Arc::clone(&ledger),
            FixedDecider(CreditAssessment { score: 700, rate_bps: 100 }),
            WorkerConfig::new(BORROWER),
        );
        ledger.request_loan(BORROWER, "", U256::from(5)).await.unwrap();
        let entry = ledger.events().entry(0).unwrap();
        assert_eq!(
            worker.handle_entry(&entry).await,
            Err(WorkerError::Ledger(LendingError::Unauthorized))
        );
    }
}
