//! # Ledger Configuration
//!
//! ## Security Requirements
//!
//! - `oracle` MUST NOT be the zero address in production
//! - `debug_entrypoints` MUST be off in production: the debug entry point
//!   lets its caller assert an arbitrary balance

use crate::domain::value_objects::Address;
use thiserror::Error;

/// Canonical ENS registry address on Ethereum mainnet and major testnets.
pub const ENS_REGISTRY: Address = Address::new([
    0x00, 0x00, 0x00, 0x00, 0x00, 0x0c, 0x2e, 0x07, 0x4e, 0xc6, 0x9a, 0x0d, 0xfb, 0x29, 0x97,
    0xba, 0x6c, 0x7d, 0x2e, 0x1e,
]);

/// Ledger configuration.
#[derive(Debug, Clone, Default)]
pub struct LedgerConfig {
    /// The only account allowed to fulfil requests.
    pub oracle: Address,
    /// Enables `debug_request_loan_with_balance`.
    pub debug_entrypoints: bool,
}

impl LedgerConfig {
    /// Configuration for `oracle` with debug entry points off.
    #[must_use]
    pub fn new(oracle: Address) -> Self {
        Self {
            oracle,
            debug_entrypoints: false,
        }
    }

    /// Validate configuration for production readiness.
    ///
    /// # Returns
    ///
    /// Returns `Err` if:
    /// - The oracle is the zero address
    /// - Debug entry points are enabled
    pub fn validate_for_production(&self) -> Result<(), ConfigError> {
        if self.oracle.is_zero() {
            return Err(ConfigError::ZeroOracle);
        }
        if self.debug_entrypoints {
            return Err(ConfigError::DebugEnabled);
        }
        Ok(())
    }
}

/// JSON-RPC endpoint configuration.
#[derive(Debug, Clone)]
pub struct RpcConfig {
    /// HTTP endpoint URL.
    pub url: String,
    /// Name registry contract.
    pub registry: Address,
    /// Whole-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Connect timeout in milliseconds.
    pub connect_timeout_ms: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8545".to_string(),
            registry: ENS_REGISTRY,
            timeout_ms: 5_000,
            connect_timeout_ms: 2_000,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Oracle identity not set.
    #[error("SECURITY VIOLATION: oracle is the zero address. Set LENDING_ORACLE_ADDRESS.")]
    ZeroOracle,

    /// Debug entry points enabled.
    #[error("SECURITY VIOLATION: debug entry points are enabled. Unset LENDING_ENABLE_DEBUG.")]
    DebugEnabled,

    /// A value could not be parsed.
    #[error("invalid value for {key}: {reason}")]
    InvalidValue {
        /// Setting name.
        key: String,
        /// Why it was rejected.
        reason: String,
    },
}
