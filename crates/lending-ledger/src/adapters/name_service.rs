//! # In-Memory Name Service
//!
//! Registry and resolver in one in-memory store, for tests and the demo.
//! The network implementation is `EthRpcAdapter`.

use crate::domain::services::namehash;
use crate::domain::value_objects::{Address, Node};
use crate::errors::LookupError;
use crate::ports::outbound::{NameRegistry, NameResolver};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// In-memory registry plus resolvers.
#[derive(Debug, Default)]
pub struct InMemoryNameService {
    /// node -> resolver.
    resolvers: RwLock<HashMap<Node, Address>>,
    /// (resolver, node) -> address record.
    addrs: RwLock<HashMap<(Address, Node), Address>>,
    /// (resolver, node, key) -> text record.
    texts: RwLock<HashMap<(Address, Node, String), String>>,
    /// When set, every lookup fails with a transport error.
    unavailable: AtomicBool,
}

impl InMemoryNameService {
    /// Create an empty name service.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `node` to `resolver`. `Address::ZERO` unbinds it.
    pub fn set_resolver(&self, node: Node, resolver: Address) {
        self.resolvers.write().insert(node, resolver);
    }

    /// Set the address record of `node` at `resolver`.
    pub fn set_addr(&self, resolver: Address, node: Node, addr: Address) {
        self.addrs.write().insert((resolver, node), addr);
    }

    /// Set a text record of `node` at `resolver`.
    pub fn set_text(&self, resolver: Address, node: Node, key: &str, value: &str) {
        self.texts
            .write()
            .insert((resolver, node, key.to_string()), value.to_string());
    }

    /// Register `name` under `resolver` with `owner` as its address record.
    ///
    /// Returns the name's node.
    pub fn register(&self, name: &str, resolver: Address, owner: Address) -> Node {
        let node = namehash(name);
        self.set_resolver(node, resolver);
        self.set_addr(resolver, node, owner);
        node
    }

    /// Make every subsequent lookup fail (or succeed again).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> Result<(), LookupError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(LookupError::Transport("name service unavailable".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl NameRegistry for InMemoryNameService {
    async fn resolver(&self, node: Node) -> Result<Address, LookupError> {
        self.ensure_available()?;
        Ok(self
            .resolvers
            .read()
            .get(&node)
            .copied()
            .unwrap_or(Address::ZERO))
    }
}

#[async_trait]
impl NameResolver for InMemoryNameService {
    async fn addr(&self, resolver: Address, node: Node) -> Result<Address, LookupError> {
        self.ensure_available()?;
        Ok(self
            .addrs
            .read()
            .get(&(resolver, node))
            .copied()
            .unwrap_or(Address::ZERO))
    }

    async fn text(&self, resolver: Address, node: Node, key: &str) -> Result<String, LookupError> {
        self.ensure_available()?;
        Ok(self
            .texts
            .read()
            .get(&(resolver, node, key.to_string()))
            .cloned()
            .unwrap_or_default())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const RESOLVER: Address = Address::new([0x5E; 20]);
    const OWNER: Address = Address::new([0xB0; 20]);

    #[tokio::test]
    async fn test_unbound_node_returns_zero() {
        let ns = InMemoryNameService::new();
        let node = namehash("nobody.eth");
        assert_eq!(ns.resolver(node).await.unwrap(), Address::ZERO);
        assert_eq!(ns.addr(RESOLVER, node).await.unwrap(), Address::ZERO);
        assert_eq!(ns.text(RESOLVER, node, "com.github").await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_register_binds_resolver_and_addr() {
        let ns = InMemoryNameService::new();
        let node = ns.register("alice.eth", RESOLVER, OWNER);
        assert_eq!(node, namehash("alice.eth"));
        assert_eq!(ns.resolver(node).await.unwrap(), RESOLVER);
        assert_eq!(ns.addr(RESOLVER, node).await.unwrap(), OWNER);
        // Records are per resolver.
        assert_eq!(ns.addr(Address::ZERO, node).await.unwrap(), Address::ZERO);
    }

    #[tokio::test]
    async fn test_text_records() {
        let ns = InMemoryNameService::new();
        let node = ns.register("alice.eth", RESOLVER, OWNER);
        ns.set_text(RESOLVER, node, "com.twitter", "@alice");
        assert_eq!(ns.text(RESOLVER, node, "com.twitter").await.unwrap(), "@alice");
        assert_eq!(ns.text(RESOLVER, node, "com.github").await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_unavailable_fails_lookups() {
        let ns = InMemoryNameService::new();
        ns.set_unavailable(true);
        assert!(matches!(
            ns.resolver(Node::ZERO).await,
            Err(LookupError::Transport(_))
        ));
        ns.set_unavailable(false);
        assert!(ns.resolver(Node::ZERO).await.is_ok());
    }
}
