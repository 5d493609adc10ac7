//! Hex codecs for addresses and 32-byte identifiers
//!
//! Addresses and correlation ids cross the configuration and payload
//! boundaries as 0x-prefixed hex strings. These helpers parse and render them
//! with strict length checks so malformed entries fail loudly at the edge
//! instead of deep inside an operation.

use ethereum_types::{Address, H256};
use thiserror::Error;

/// Errors raised while parsing hex-encoded values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),
    #[error("invalid length for {value}: expected {expected} bytes, got {actual}")]
    InvalidLength {
        value: String,
        expected: usize,
        actual: usize,
    },
}

/// Parses a 20-byte address from a 0x-prefixed (or bare) hex string.
pub fn parse_address(s: &str) -> Result<Address, CodecError> {
    let stripped = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(stripped).map_err(|_| CodecError::InvalidHex(s.to_string()))?;
    if bytes.len() != 20 {
        return Err(CodecError::InvalidLength {
            value: s.to_string(),
            expected: 20,
            actual: bytes.len(),
        });
    }
    Ok(Address::from_slice(&bytes))
}

/// Parses a 32-byte identifier from a 0x-prefixed (or bare) hex string.
/// Short values are left-padded with zeros, matching how on-chain ids are
/// commonly abbreviated.
pub fn parse_hash(s: &str) -> Result<H256, CodecError> {
    let stripped = s.strip_prefix("0x").unwrap_or(s);
    if stripped.len() > 64 {
        return Err(CodecError::InvalidLength {
            value: s.to_string(),
            expected: 32,
            actual: stripped.len() / 2,
        });
    }
    let padded = format!("{:0>64}", stripped);
    let bytes = hex::decode(&padded).map_err(|_| CodecError::InvalidHex(s.to_string()))?;
    Ok(H256::from_slice(&bytes))
}

/// Renders an address as a full 0x-prefixed lowercase hex string.
pub fn format_address(address: &Address) -> String {
    format!("0x{}", hex::encode(address.as_bytes()))
}

/// Renders a 32-byte identifier as a full 0x-prefixed lowercase hex string.
pub fn format_hash(hash: &H256) -> String {
    format!("0x{}", hex::encode(hash.as_bytes()))
}
