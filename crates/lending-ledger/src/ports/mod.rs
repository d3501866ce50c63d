//! # Ports Layer (Middle Hexagon)
//!
//! Trait definitions for the loan ledger.
//! These are the interfaces between the domain and the outside world.
//!
//! - **Driving Ports (Inbound)**: `LendingApi`
//! - **Driven Ports (Outbound)**: `NameRegistry`, `NameResolver`, `AccountReader`
//! - No concrete implementations in this module

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
