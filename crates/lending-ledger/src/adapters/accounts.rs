//! # In-Memory Accounts
//!
//! Account model for tests and the demo. Accounts never touched read as
//! empty, code-less accounts with no transactions.

use crate::domain::value_objects::{Address, U256};
use crate::errors::LookupError;
use crate::ports::outbound::AccountReader;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

/// In-memory balances, code and transaction counts.
#[derive(Debug, Default)]
pub struct InMemoryAccounts {
    /// Balances in wei.
    balances: RwLock<HashMap<Address, U256>>,
    /// Deployed code.
    code: RwLock<HashMap<Address, Vec<u8>>>,
    /// Sent-transaction counts.
    transaction_counts: RwLock<HashMap<Address, u64>>,
}

impl InMemoryAccounts {
    /// Create an empty account model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set balance for an address.
    pub fn set_balance(&self, address: Address, balance: U256) {
        self.balances.write().insert(address, balance);
    }

    /// Set code for an address. Empty code makes it an ordinary account.
    pub fn set_code(&self, address: Address, code: Vec<u8>) {
        self.code.write().insert(address, code);
    }

    /// Set the sent-transaction count for an address.
    pub fn set_transaction_count(&self, address: Address, count: u64) {
        self.transaction_counts.write().insert(address, count);
    }
}

#[async_trait]
impl AccountReader for InMemoryAccounts {
    async fn balance(&self, account: Address) -> Result<U256, LookupError> {
        Ok(self
            .balances
            .read()
            .get(&account)
            .copied()
            .unwrap_or_default())
    }

    async fn code_size(&self, account: Address) -> Result<usize, LookupError> {
        Ok(self.code.read().get(&account).map_or(0, Vec::len))
    }

    async fn transaction_count(&self, account: Address) -> Result<u64, LookupError> {
        Ok(self
            .transaction_counts
            .read()
            .get(&account)
            .copied()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_set_balance() {
        let accounts = InMemoryAccounts::new();
        let addr = Address::new([1u8; 20]);

        assert_eq!(accounts.balance(addr).await.unwrap(), U256::zero());

        accounts.set_balance(addr, U256::from(1000));
        assert_eq!(accounts.balance(addr).await.unwrap(), U256::from(1000));
    }

    #[tokio::test]
    async fn test_snapshot_reports_code() {
        let accounts = InMemoryAccounts::new();
        let addr = Address::new([2u8; 20]);

        let snap = accounts.snapshot(addr).await.unwrap();
        assert!(!snap.has_code);

        accounts.set_code(addr, vec![0x60, 0x00]);
        accounts.set_balance(addr, U256::from(7));
        let snap = accounts.snapshot(addr).await.unwrap();
        assert!(snap.has_code);
        assert_eq!(snap.balance, U256::from(7));
        assert_eq!(accounts.code_size(addr).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_transaction_count_defaults_to_zero() {
        let accounts = InMemoryAccounts::new();
        let addr = Address::new([3u8; 20]);

        assert_eq!(accounts.transaction_count(addr).await.unwrap(), 0);

        accounts.set_transaction_count(addr, 11);
        assert_eq!(accounts.transaction_count(addr).await.unwrap(), 11);
    }
}
