//! # Domain Layer (Inner Hexagon)
//!
//! Pure business logic for the loan ledger.
//! NO I/O, NO async, NO external collaborators.
//!
//! - All types here are pure domain concepts.
//! - Dependencies point INWARD only (adapters depend on this, not vice versa).

pub mod entities;
pub mod invariants;
pub mod ledger;
pub mod services;
pub mod value_objects;

pub use entities::*;
pub use invariants::*;
pub use ledger::*;
pub use services::*;
pub use value_objects::*;
