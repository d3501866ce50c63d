//! # Lending Ledger - Identity-Gated Loan Requests
//!
//! Records loan requests from accounts that pass a balance gate and, when
//! they supply an ENS name, an identity check against the live name
//! registry. A single trusted oracle later fulfils each request exactly
//! once with a credit score, an interest rate and a verdict; approved
//! loans get their total repayment fixed in integer basis-point
//! arithmetic.
//!
//! ## Request Flow
//!
//! ```text
//! requester ──request_loan──→ EligibilityGate ──→ IdentityValidator ──→ LedgerState
//!                                                                          │
//!                                                                 Requested│
//!                                                                          ↓
//!                                     decision worker ←──subscribe──── EventLog
//!                                            │                             ↑
//!                                            └──fulfill_loan_request──→ LedgerState
//!                                                                 Processed│Executed
//! ```
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | Score of a processed request in [300, 850] | `domain/invariants.rs` - `check_credit_score()` |
//! | Rate at most 10000 bps | `domain/invariants.rs` - `check_interest_rate()` |
//! | A request is fulfilled at most once | `domain/ledger.rs` - `LedgerState::fulfill()` |
//! | Failed calls change nothing | `domain/ledger.rs`, `service.rs` |
//! | Repayment never wraps | `domain/services.rs` - `total_repayment()` |
//!
//! ## Authorization
//!
//! | Operation | Allowed caller |
//! |-----------|----------------|
//! | `request_loan` | any account (as its own borrower) |
//! | `fulfill_loan_request` | oracle only |
//! | `debug_request_loan_with_balance` | oracle only, and only when enabled |
//! | `get_loan_request` | anyone |
//!
//! ## Outbound Dependencies
//!
//! | Collaborator | Trait | Purpose |
//! |--------------|-------|---------|
//! | Name registry | `NameRegistry` | node → resolver |
//! | Resolver | `NameResolver` | node → address / text record |
//! | Account model | `AccountReader` | balance, code presence |
//!
//! ## Usage Example
//!
//! ```ignore
//! use lending_ledger::prelude::*;
//!
//! let id = service.request_loan(borrower, "alice.eth", amount).await?;
//! service.fulfill_loan_request(oracle, id, 780, 450, true).await?;
//! ```

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod config;
pub mod domain;
pub mod errors;
pub mod events;
pub mod ports;
pub mod service;
pub mod validation;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Domain entities
    pub use crate::domain::entities::{AccountSnapshot, Fulfillment, LoanRequest};

    // Value objects
    pub use crate::domain::value_objects::{Address, HexParseError, Node, RequestId, U256};

    // Domain services
    pub use crate::domain::services::{derive_request_id, keccak256, namehash, total_repayment};

    // Invariants
    pub use crate::domain::invariants::{
        check_all_invariants, check_eligibility, limits, min_balance, InvariantCheckResult,
        InvariantViolation,
    };

    // Ledger state
    pub use crate::domain::ledger::LedgerState;

    // Ports
    pub use crate::ports::inbound::LendingApi;
    pub use crate::ports::outbound::{AccountReader, NameRegistry, NameResolver, NameService};

    // Adapters
    pub use crate::adapters::{
        EthRpcAdapter, EventLog, InMemoryAccounts, InMemoryNameService, LogSubscription,
    };

    // Events
    pub use crate::events::{EventFilter, EventKind, LedgerEvent, LogEntry};

    // Errors
    pub use crate::errors::{ErrorCategory, LendingError, LookupError};

    // Configuration
    pub use crate::config::{ConfigError, LedgerConfig, RpcConfig, ENS_REGISTRY};

    // Validation
    pub use crate::validation::{EligibilityGate, IdentityValidator};

    // Service
    pub use crate::service::{create_test_service, LedgerStats, LendingService};
}

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prelude_exports() {
        use prelude::*;
        let _ = RpcConfig::default();
        let _ = Address::ZERO;
        assert_eq!(limits::MAX_CREDIT_SCORE, 850);
    }
}
