//! # Worker Configuration

use lending_ledger::domain::value_objects::Address;

/// Default score at or above which a loan is approved.
pub const DEFAULT_APPROVAL_THRESHOLD: u64 = 650;

/// Default interest rate: 12% in basis points.
pub const DEFAULT_RATE_BPS: u64 = 1_200;

/// Decision worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Identity the worker fulfils as. Must equal the ledger's oracle.
    pub oracle: Address,
    /// Approve when the clamped score is at least this.
    pub approval_threshold: u64,
    /// Rate used for loans below every size tier.
    pub default_rate_bps: u64,
    /// Log position the worker starts reading from.
    pub start_cursor: u64,
}

impl WorkerConfig {
    /// Defaults for `oracle`.
    #[must_use]
    pub fn new(oracle: Address) -> Self {
        Self {
            oracle,
            ..Self::default()
        }
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            oracle: Address::ZERO,
            approval_threshold: DEFAULT_APPROVAL_THRESHOLD,
            default_rate_bps: DEFAULT_RATE_BPS,
            start_cursor: 0,
        }
    }
}
