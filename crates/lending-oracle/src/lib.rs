//! # Lending Oracle - Off-Chain Credit Decisions
//!
//! Subscribes to the lending ledger's event log and answers every new loan
//! request with a score, a rate and a verdict, fulfilling it as the oracle
//! identity.
//!
//! ## Components
//!
//! | Component | Location | Purpose |
//! |-----------|----------|---------|
//! | `CreditDecider` | `decider.rs` | Scoring port |
//! | `SignalDecider` | `decider.rs` | Rule-based reference policy |
//! | `OracleWorker` | `worker.rs` | Subscription loop, clamping, fulfilment |
//!
//! ## Usage Example
//!
//! ```ignore
//! use lending_oracle::prelude::*;
//!
//! let worker = OracleWorker::new(ledger.clone(), decider, WorkerConfig::new(oracle));
//! let subscription = ledger.subscribe(0, EventFilter::new_requests());
//! worker.run(subscription, shutdown_rx).await;
//! ```

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod decider;
pub mod errors;
pub mod worker;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::config::{WorkerConfig, DEFAULT_APPROVAL_THRESHOLD, DEFAULT_RATE_BPS};
    pub use crate::decider::{
        CreditAssessment, CreditDecider, DecisionContext, FixedDecider, NewRequest,
        SignalDecider, SOCIAL_KEYS,
    };
    pub use crate::errors::WorkerError;
    pub use crate::worker::{Decision, OracleWorker, WorkerStats};
}

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
