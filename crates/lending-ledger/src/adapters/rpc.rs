//! # Ethereum JSON-RPC Adapter
//!
//! Implements the outbound ports against a live node:
//!
//! | Port | JSON-RPC method |
//! |------|-----------------|
//! | `NameRegistry::resolver` | `eth_call` → registry `resolver(bytes32)` |
//! | `NameResolver::addr` | `eth_call` → resolver `addr(bytes32)` |
//! | `NameResolver::text` | `eth_call` → resolver `text(bytes32,string)` |
//! | `AccountReader::balance` | `eth_getBalance` |
//! | `AccountReader::code_size` | `eth_getCode` |
//! | `AccountReader::transaction_count` | `eth_getTransactionCount` |
//!
//! All reads are made against the `latest` block.

use crate::adapters::abi;
use crate::config::RpcConfig;
use crate::domain::value_objects::{Address, Node, U256};
use crate::errors::LookupError;
use crate::ports::outbound::{AccountReader, NameRegistry, NameResolver};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

const BLOCK_TAG: &str = "latest";

// =============================================================================
// WIRE TYPES
// =============================================================================

/// JSON-RPC request envelope.
#[derive(Debug, Serialize)]
pub struct JsonRpcRequest<T> {
    /// Always `"2.0"`.
    pub jsonrpc: &'static str,
    /// Method name.
    pub method: String,
    /// Positional parameters.
    pub params: T,
    /// Correlation id.
    pub id: u64,
}

impl<T> JsonRpcRequest<T> {
    /// Build a request envelope.
    pub fn new(method: impl Into<String>, params: T, id: u64) -> Self {
        Self {
            jsonrpc: "2.0",
            method: method.into(),
            params,
            id,
        }
    }
}

/// JSON-RPC response envelope.
#[derive(Debug, Deserialize)]
pub struct JsonRpcResponse<T> {
    /// Correlation id echoed back.
    pub id: u64,
    /// Present on success.
    pub result: Option<T>,
    /// Present on failure.
    #[serde(default)]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error object.
#[derive(Debug, Deserialize)]
pub struct JsonRpcError {
    /// Error code.
    pub code: i64,
    /// Error message.
    pub message: String,
}

/// Transaction object for `eth_call`.
#[derive(Debug, Serialize)]
pub struct CallRequest {
    /// Contract to call.
    pub to: String,
    /// ABI-encoded calldata.
    pub data: String,
}

// =============================================================================
// CLIENT
// =============================================================================

/// Minimal JSON-RPC over HTTP client.
pub struct JsonRpcClient {
    client: Client,
    url: String,
    request_id: AtomicU64,
}

impl JsonRpcClient {
    /// Create a client for `config.url` with the configured timeouts.
    pub fn new(config: &RpcConfig) -> Result<Self, LookupError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .build()
            .map_err(|e| LookupError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            url: config.url.clone(),
            request_id: AtomicU64::new(1),
        })
    }

    /// Endpoint URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    fn next_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Call a JSON-RPC method.
    pub async fn call<P: Serialize + Send + Sync, R: DeserializeOwned>(
        &self,
        method: &str,
        params: P,
    ) -> Result<R, LookupError> {
        let request = JsonRpcRequest::new(method, params, self.next_id());
        debug!(method, id = request.id, "JSON-RPC call");

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    LookupError::Transport(format!("cannot connect to {}", self.url))
                } else {
                    LookupError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(method, %status, "JSON-RPC endpoint returned error status");
            return Err(LookupError::Transport(format!("HTTP status {status}")));
        }

        let rpc_response: JsonRpcResponse<R> = response
            .json()
            .await
            .map_err(|e| LookupError::Decode(e.to_string()))?;

        into_result(rpc_response)
    }
}

fn into_result<R>(response: JsonRpcResponse<R>) -> Result<R, LookupError> {
    if let Some(error) = response.error {
        return Err(LookupError::Rpc {
            code: error.code,
            message: error.message,
        });
    }
    response
        .result
        .ok_or_else(|| LookupError::Decode("missing result in response".to_string()))
}

// =============================================================================
// ETHEREUM ADAPTER
// =============================================================================

/// Registry, resolver and account model over Ethereum JSON-RPC.
pub struct EthRpcAdapter {
    rpc: JsonRpcClient,
    registry: Address,
}

impl EthRpcAdapter {
    /// Create an adapter from configuration.
    pub fn new(config: &RpcConfig) -> Result<Self, LookupError> {
        Ok(Self {
            rpc: JsonRpcClient::new(config)?,
            registry: config.registry,
        })
    }

    /// Registry contract this adapter queries.
    #[must_use]
    pub fn registry(&self) -> Address {
        self.registry
    }

    async fn eth_call(&self, to: Address, data: Vec<u8>) -> Result<Vec<u8>, LookupError> {
        let call = CallRequest {
            to: to.to_string(),
            data: abi::to_hex(&data),
        };
        let result: String = self.rpc.call("eth_call", (call, BLOCK_TAG)).await?;
        abi::from_hex(&result)
    }
}

#[async_trait]
impl NameRegistry for EthRpcAdapter {
    async fn resolver(&self, node: Node) -> Result<Address, LookupError> {
        let data = abi::encode_node_call(abi::RESOLVER_SIG, node);
        let output = self.eth_call(self.registry, data).await?;
        abi::decode_address(&output)
    }
}

#[async_trait]
impl NameResolver for EthRpcAdapter {
    async fn addr(&self, resolver: Address, node: Node) -> Result<Address, LookupError> {
        let data = abi::encode_node_call(abi::ADDR_SIG, node);
        let output = self.eth_call(resolver, data).await?;
        abi::decode_address(&output)
    }

    async fn text(&self, resolver: Address, node: Node, key: &str) -> Result<String, LookupError> {
        let data = abi::encode_text_call(node, key);
        let output = self.eth_call(resolver, data).await?;
        abi::decode_string(&output)
    }
}

#[async_trait]
impl AccountReader for EthRpcAdapter {
    async fn balance(&self, account: Address) -> Result<U256, LookupError> {
        let result: String = self
            .rpc
            .call("eth_getBalance", (account.to_string(), BLOCK_TAG))
            .await?;
        abi::parse_quantity(&result)
    }

    async fn code_size(&self, account: Address) -> Result<usize, LookupError> {
        let result: String = self
            .rpc
            .call("eth_getCode", (account.to_string(), BLOCK_TAG))
            .await?;
        Ok(abi::from_hex(&result)?.len())
    }

    async fn transaction_count(&self, account: Address) -> Result<u64, LookupError> {
        let result: String = self
            .rpc
            .call("eth_getTransactionCount", (account.to_string(), BLOCK_TAG))
            .await?;
        abi::parse_u64_quantity(&result)
    }
}
