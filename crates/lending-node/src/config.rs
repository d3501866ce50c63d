//! # Node Configuration
//!
//! Ledger, RPC and worker settings, loaded from the environment and then
//! overridden by command-line flags.
//!
//! | Variable | Setting |
//! |----------|---------|
//! | `LENDING_RPC_URL` | `rpc.url` |
//! | `LENDING_REGISTRY_ADDRESS` | `rpc.registry` |
//! | `LENDING_ORACLE_ADDRESS` | `ledger.oracle`, `worker.oracle` |
//! | `LENDING_ENABLE_DEBUG` | `ledger.debug_entrypoints` |
//! | `RUST_LOG` | log filter (read by the subscriber) |

use lending_ledger::config::{ConfigError, LedgerConfig, RpcConfig};
use lending_ledger::domain::value_objects::Address;
use lending_oracle::config::WorkerConfig;
use std::str::FromStr;
use tracing::info;

/// Complete node configuration.
#[derive(Debug, Clone, Default)]
pub struct NodeConfig {
    /// JSON-RPC endpoint.
    pub rpc: RpcConfig,
    /// Ledger settings.
    pub ledger: LedgerConfig,
    /// Decision worker settings.
    pub worker: WorkerConfig,
}

impl NodeConfig {
    /// Build a configuration from `lookup`, starting from the defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("LENDING_RPC_URL") {
            config.rpc.url = url;
        }
        if let Some(registry) = lookup("LENDING_REGISTRY_ADDRESS") {
            config.rpc.registry = parse_address("LENDING_REGISTRY_ADDRESS", &registry)?;
        }
        if let Some(oracle) = lookup("LENDING_ORACLE_ADDRESS") {
            config.set_oracle(parse_address("LENDING_ORACLE_ADDRESS", &oracle)?);
        }
        if let Some(flag) = lookup("LENDING_ENABLE_DEBUG") {
            config.ledger.debug_entrypoints = parse_flag("LENDING_ENABLE_DEBUG", &flag)?;
        }

        Ok(config)
    }

    /// Set the oracle identity for both the ledger and the worker.
    pub fn set_oracle(&mut self, oracle: Address) {
        self.ledger.oracle = oracle;
        self.worker.oracle = oracle;
    }
}

/// Load configuration from the process environment.
pub fn load_config() -> Result<NodeConfig, ConfigError> {
    let config = NodeConfig::from_lookup(|key| std::env::var(key).ok())?;
    info!(
        rpc_url = %config.rpc.url,
        registry = %config.rpc.registry,
        oracle = %config.ledger.oracle,
        debug_entrypoints = config.ledger.debug_entrypoints,
        "Configuration loaded"
    );
    Ok(config)
}

/// Parse an address setting.
pub fn parse_address(key: &str, value: &str) -> Result<Address, ConfigError> {
    Address::from_str(value.trim()).map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            reason: format!("expected a boolean, got {other:?}"),
        }),
    }
}
