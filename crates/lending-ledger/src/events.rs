//! # Ledger Events
//!
//! Domain events appended to the event log by successful ledger
//! operations, and the filter observers subscribe with.
//!
//! | Event | Appended by | Carries |
//! |-------|-------------|---------|
//! | `Requested` | `request_loan` | id, borrower, amount, name |
//! | `DebugRequested` | `debug_request_loan_with_balance` | as `Requested`, plus simulated balance |
//! | `Processed` | `fulfill_loan_request` | id, borrower, score, approved, rate |
//! | `Executed` | `fulfill_loan_request` (approved only) | borrower, principal, total repayment, rate |
//!
//! For a given request, `Requested` always precedes `Processed`, which
//! precedes `Executed`. `Executed` is appended in the same batch as its
//! `Processed`, directly after it.

use crate::domain::value_objects::{Address, RequestId, U256};
use serde::{Deserialize, Serialize};

// =============================================================================
// EVENTS
// =============================================================================

/// An event appended to the ledger's event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    /// A loan request was created.
    Requested {
        /// Id of the new request.
        request_id: RequestId,
        /// Requesting account.
        borrower: Address,
        /// Principal in wei.
        amount: U256,
        /// Supplied name; empty when none.
        ens_name: String,
    },

    /// A loan request was created through the debug entry point.
    ///
    /// Emitted instead of `Requested`; decision services score it against
    /// `simulated_balance` rather than the live balance.
    DebugRequested {
        /// Id of the new request.
        request_id: RequestId,
        /// Requesting account.
        borrower: Address,
        /// Principal in wei.
        amount: U256,
        /// Supplied name; empty when none.
        ens_name: String,
        /// Balance the request was evaluated against.
        simulated_balance: U256,
    },

    /// The oracle recorded its decision for a request.
    Processed {
        /// The fulfilled request.
        request_id: RequestId,
        /// Requesting account.
        borrower: Address,
        /// Score in [300, 850].
        credit_score: u64,
        /// Oracle verdict.
        approved: bool,
        /// Rate in basis points, at most 10000.
        interest_rate_bps: u64,
    },

    /// An approved loan's repayment terms were fixed.
    Executed {
        /// Requesting account.
        borrower: Address,
        /// Principal in wei.
        principal: U256,
        /// Principal plus floored interest.
        total_repayment: U256,
        /// Rate in basis points.
        interest_rate_bps: u64,
    },
}

impl LedgerEvent {
    /// Returns the kind of this event.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Requested { .. } => EventKind::Requested,
            Self::DebugRequested { .. } => EventKind::DebugRequested,
            Self::Processed { .. } => EventKind::Processed,
            Self::Executed { .. } => EventKind::Executed,
        }
    }

    /// Returns the request id carried by the event.
    ///
    /// `Executed` carries none; it always directly follows the
    /// `Processed` event of its request.
    #[must_use]
    pub fn request_id(&self) -> Option<RequestId> {
        match self {
            Self::Requested { request_id, .. }
            | Self::DebugRequested { request_id, .. }
            | Self::Processed { request_id, .. } => Some(*request_id),
            Self::Executed { .. } => None,
        }
    }

    /// Returns the borrower the event concerns.
    #[must_use]
    pub fn borrower(&self) -> Address {
        match self {
            Self::Requested { borrower, .. }
            | Self::DebugRequested { borrower, .. }
            | Self::Processed { borrower, .. }
            | Self::Executed { borrower, .. } => *borrower,
        }
    }
}

/// Event kinds for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// `LedgerEvent::Requested`.
    Requested,
    /// `LedgerEvent::DebugRequested`.
    DebugRequested,
    /// `LedgerEvent::Processed`.
    Processed,
    /// `LedgerEvent::Executed`.
    Executed,
}

// =============================================================================
// LOG ENTRIES
// =============================================================================

/// An event together with its position in the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Zero-based position in the log. Resuming from `sequence + 1`
    /// yields every later event exactly once.
    pub sequence: u64,
    /// The event.
    pub event: LedgerEvent,
}

// =============================================================================
// FILTER
// =============================================================================

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Kinds to include. Empty means all kinds.
    pub kinds: Vec<EventKind>,
    /// Borrowers to include. Empty means all borrowers.
    pub borrowers: Vec<Address>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific kinds.
    #[must_use]
    pub fn kinds(kinds: Vec<EventKind>) -> Self {
        Self {
            kinds,
            borrowers: Vec::new(),
        }
    }

    /// Create a filter for events concerning specific borrowers.
    #[must_use]
    pub fn for_borrowers(borrowers: Vec<Address>) -> Self {
        Self {
            kinds: Vec::new(),
            borrowers,
        }
    }

    /// Filter matching new requests of either flavour.
    #[must_use]
    pub fn new_requests() -> Self {
        Self::kinds(vec![EventKind::Requested, EventKind::DebugRequested])
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &LedgerEvent) -> bool {
        let kind_match = self.kinds.is_empty() || self.kinds.contains(&event.kind());
        let borrower_match = self.borrowers.is_empty() || self.borrowers.contains(&event.borrower());
        kind_match && borrower_match
    }
}
