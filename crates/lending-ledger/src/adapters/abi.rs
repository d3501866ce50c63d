//! # ABI Codec
//!
//! The handful of contract-ABI encodings the network adapter needs:
//! calls taking a `bytes32` node (optionally followed by a `string`), and
//! `address` / `string` return values. Plus JSON-RPC hex helpers.

use crate::domain::services::keccak256;
use crate::domain::value_objects::{Address, Node, U256};
use crate::errors::LookupError;

/// Registry: `resolver(bytes32) -> address`.
pub const RESOLVER_SIG: &str = "resolver(bytes32)";
/// Resolver: `addr(bytes32) -> address`.
pub const ADDR_SIG: &str = "addr(bytes32)";
/// Resolver: `text(bytes32,string) -> string`.
pub const TEXT_SIG: &str = "text(bytes32,string)";

const WORD: usize = 32;

/// First four bytes of the Keccak-256 of a function signature.
#[must_use]
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Calldata for `signature(bytes32 node)`.
#[must_use]
pub fn encode_node_call(signature: &str, node: Node) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 + WORD);
    data.extend_from_slice(&selector(signature));
    data.extend_from_slice(node.as_bytes());
    data
}

/// Calldata for `text(bytes32 node, string key)`.
#[must_use]
pub fn encode_text_call(node: Node, key: &str) -> Vec<u8> {
    let key = key.as_bytes();
    let padded = key.len().div_ceil(WORD) * WORD;

    let mut data = Vec::with_capacity(4 + 3 * WORD + padded);
    data.extend_from_slice(&selector(TEXT_SIG));
    data.extend_from_slice(node.as_bytes());
    // Head: offset of the dynamic argument, counted from the first argument.
    data.extend_from_slice(&word(2 * WORD));
    data.extend_from_slice(&word(key.len()));
    data.extend_from_slice(key);
    data.resize(4 + 3 * WORD + padded, 0);
    data
}

fn word(value: usize) -> [u8; WORD] {
    let mut out = [0u8; WORD];
    U256::from(value).to_big_endian(&mut out);
    out
}

/// Decode an `address` return value. Empty return data reads as the zero
/// address, which is what a call to a code-less account yields.
pub fn decode_address(data: &[u8]) -> Result<Address, LookupError> {
    if data.is_empty() {
        return Ok(Address::ZERO);
    }
    if data.len() < WORD {
        return Err(LookupError::Decode(format!(
            "address return too short: {} bytes",
            data.len()
        )));
    }
    Address::from_slice(&data[12..WORD])
        .ok_or_else(|| LookupError::Decode("bad address word".into()))
}

/// Decode a single `string` return value. Empty return data reads as the
/// empty string.
pub fn decode_string(data: &[u8]) -> Result<String, LookupError> {
    if data.is_empty() {
        return Ok(String::new());
    }
    let offset = read_usize(data, 0)?;
    let len = read_usize(data, offset)?;
    let start = offset
        .checked_add(WORD)
        .ok_or_else(|| LookupError::Decode("string offset overflow".into()))?;
    let end = start
        .checked_add(len)
        .ok_or_else(|| LookupError::Decode("string length overflow".into()))?;
    let bytes = data
        .get(start..end)
        .ok_or_else(|| LookupError::Decode("string exceeds return data".into()))?;
    String::from_utf8(bytes.to_vec()).map_err(|e| LookupError::Decode(e.to_string()))
}

fn read_usize(data: &[u8], at: usize) -> Result<usize, LookupError> {
    let end = at
        .checked_add(WORD)
        .ok_or_else(|| LookupError::Decode("word offset overflow".into()))?;
    let bytes = data
        .get(at..end)
        .ok_or_else(|| LookupError::Decode(format!("missing word at offset {at}")))?;
    let value = U256::from_big_endian(bytes);
    if value > U256::from(u32::MAX) {
        return Err(LookupError::Decode(format!("word at {at} too large")));
    }
    Ok(value.as_usize())
}

// =============================================================================
// HEX HELPERS
// =============================================================================

/// `0x`-prefixed lowercase hex.
#[must_use]
pub fn to_hex(data: &[u8]) -> String {
    format!("0x{}", hex::encode(data))
}

/// Decode `0x`-prefixed hex data.
pub fn from_hex(s: &str) -> Result<Vec<u8>, LookupError> {
    let trimmed = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(trimmed).map_err(|e| LookupError::Decode(format!("invalid hex data: {e}")))
}

/// Decode a JSON-RPC quantity (`0x`-prefixed, no leading zeros).
pub fn parse_quantity(s: &str) -> Result<U256, LookupError> {
    let trimmed = s.strip_prefix("0x").unwrap_or(s);
    if trimmed.is_empty() {
        return Ok(U256::zero());
    }
    U256::from_str_radix(trimmed, 16)
        .map_err(|e| LookupError::Decode(format!("invalid quantity {s}: {e:?}")))
}

/// Parse a hex quantity that must fit in 64 bits.
pub fn parse_u64_quantity(s: &str) -> Result<u64, LookupError> {
    let value = parse_quantity(s)?;
    if value > U256::from(u64::MAX) {
        return Err(LookupError::Decode(format!("quantity out of range: {s}")));
    }
    Ok(value.low_u64())
}
