//! # Driven Ports (SPI - Outbound)
//!
//! These are the interfaces the ledger depends on.
//! External adapters implement these traits to provide:
//! - Name registry lookups (node -> resolver)
//! - Resolver records (node -> address, node -> text)
//! - Account facts (balance, code, transaction count)
//!
//! All reads are point-in-time: nothing guarantees the answer still holds
//! when the ledger acts on it.

use crate::domain::entities::AccountSnapshot;
use crate::domain::value_objects::{Address, Node, U256};
use crate::errors::LookupError;
use async_trait::async_trait;

// =============================================================================
// NAME REGISTRY
// =============================================================================

/// Maps a name node to the resolver responsible for it.
#[async_trait]
pub trait NameRegistry: Send + Sync {
    /// Resolver bound to `node`; `Address::ZERO` when none is bound.
    async fn resolver(&self, node: Node) -> Result<Address, LookupError>;
}

// =============================================================================
// NAME RESOLVER
// =============================================================================

/// Record lookups against a specific resolver.
#[async_trait]
pub trait NameResolver: Send + Sync {
    /// Address record of `node` at `resolver`; `Address::ZERO` when unset.
    async fn addr(&self, resolver: Address, node: Node) -> Result<Address, LookupError>;

    /// Text record `key` of `node` at `resolver`; empty when unset.
    ///
    /// # Arguments
    ///
    /// * `resolver` - Resolver to query
    /// * `node` - Name node
    /// * `key` - Record key, e.g. `com.twitter`
    async fn text(&self, resolver: Address, node: Node, key: &str) -> Result<String, LookupError>;
}

/// A registry and resolver reachable through one handle.
pub trait NameService: NameRegistry + NameResolver {}

impl<T: NameRegistry + NameResolver> NameService for T {}

// =============================================================================
// ACCOUNT READER
// =============================================================================

/// Read-only account model.
#[async_trait]
pub trait AccountReader: Send + Sync {
    /// Balance of the principal asset, in wei.
    async fn balance(&self, account: Address) -> Result<U256, LookupError>;

    /// Size of the code deployed at `account`; 0 for ordinary accounts.
    async fn code_size(&self, account: Address) -> Result<usize, LookupError>;

    /// Number of transactions sent from `account` (its nonce).
    async fn transaction_count(&self, account: Address) -> Result<u64, LookupError>;

    /// Returns true if `account` carries code.
    async fn has_code(&self, account: Address) -> Result<bool, LookupError> {
        Ok(self.code_size(account).await? > 0)
    }

    /// Balance and code presence in one snapshot.
    async fn snapshot(&self, account: Address) -> Result<AccountSnapshot, LookupError> {
        Ok(AccountSnapshot {
            balance: self.balance(account).await?,
            has_code: self.has_code(account).await?,
        })
    }
}
