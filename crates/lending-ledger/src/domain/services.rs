//! # Domain Services
//!
//! Pure functions used by the ledger: hashing, name-hash computation,
//! request id derivation and repayment arithmetic.
//!
//! - NO I/O operations
//! - NO async code
//! - Deterministic: same inputs, same outputs

use crate::domain::invariants::limits;
use crate::domain::value_objects::{Address, Node, RequestId, U256, U512};
use crate::errors::LendingError;
use sha3::{Digest, Keccak256};

// =============================================================================
// HASHING
// =============================================================================

/// Keccak-256 of `data`.
#[must_use]
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Keccak256::digest(data));
    out
}

/// Computes the name-hash node of a dot-separated name.
///
/// Labels are folded right to left starting from the root node:
/// `node = keccak256(node ++ keccak256(label))`. The empty name is the
/// root node. Matches the canonical ENS algorithm bit for bit, so nodes
/// computed here resolve against any ENS-compatible registry.
#[must_use]
pub fn namehash(name: &str) -> Node {
    if name.is_empty() {
        return Node::ZERO;
    }

    name.rsplit('.').fold(Node::ZERO, |node, label| {
        let mut buf = [0u8; 64];
        buf[..32].copy_from_slice(node.as_bytes());
        buf[32..].copy_from_slice(&keccak256(label.as_bytes()));
        Node::new(keccak256(&buf))
    })
}

/// Derives a request id from the request contents and a uniqueness salt.
///
/// `keccak256(borrower ++ amount ++ ens_name ++ counter ++ timestamp)` with
/// fixed-width big-endian integers. The counter makes ids unique even for
/// identical requests created in the same second.
#[must_use]
pub fn derive_request_id(
    borrower: Address,
    amount: U256,
    ens_name: &str,
    counter: u64,
    timestamp: u64,
) -> RequestId {
    let mut data = Vec::with_capacity(20 + 32 + ens_name.len() + 32 + 32);
    data.extend_from_slice(borrower.as_bytes());
    data.extend_from_slice(&u256_be(amount));
    data.extend_from_slice(ens_name.as_bytes());
    data.extend_from_slice(&u256_be(U256::from(counter)));
    data.extend_from_slice(&u256_be(U256::from(timestamp)));
    RequestId::new(keccak256(&data))
}

fn u256_be(value: U256) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    value.to_big_endian(&mut bytes);
    bytes
}

// =============================================================================
// REPAYMENT
// =============================================================================

/// Total repayment: `principal + floor(principal * rate_bps / 10000)`.
///
/// The product is taken in 512 bits, so only a total above `U256::MAX`
/// fails, with `Overflow`.
pub fn total_repayment(principal: U256, rate_bps: u64) -> Result<U256, LendingError> {
    let interest =
        principal.full_mul(U256::from(rate_bps)) / U512::from(limits::BPS_DENOMINATOR);
    let interest = U256::try_from(interest).map_err(|_| LendingError::Overflow)?;
    principal
        .checked_add(interest)
        .ok_or(LendingError::Overflow)
}

// =============================================================================
// TESTS
// =============================================================================
