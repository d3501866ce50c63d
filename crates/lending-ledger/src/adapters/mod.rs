//! # Adapters Layer (Outer Hexagon)
//!
//! Adapters connect the ledger to external systems.
//!
//! - `event_log`: ordered, append-only event log with cursor subscriptions
//! - `name_service`, `accounts`: in-memory implementations of the driven ports
//! - `rpc`, `abi`: the driven ports over Ethereum JSON-RPC

pub mod abi;
pub mod accounts;
pub mod event_log;
pub mod name_service;
pub mod rpc;

pub use accounts::*;
pub use event_log::*;
pub use name_service::*;
pub use rpc::{EthRpcAdapter, JsonRpcClient};
