//! Function selector type
//!
//! Selectors identify operations behind the module router. They follow the
//! EVM convention: the first four bytes of the Keccak-256 digest of a
//! signature string, rendered as 0x-prefixed hex.

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Keccak256};

use crate::codec::CodecError;

/// A 4-byte function selector.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Selector(pub [u8; 4]);

impl Selector {
    /// The all-zero selector. Never routable; registry batches containing it
    /// are rejected as malformed.
    pub const ZERO: Selector = Selector([0u8; 4]);

    /// Derives a selector from a signature string, e.g.
    /// `"transfer(address,uint256)"`.
    pub fn from_signature(signature: &str) -> Self {
        let digest = Keccak256::digest(signature.as_bytes());
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&digest[..4]);
        Selector(bytes)
    }

    /// Returns true for the all-zero selector.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 4]
    }

    /// Raw selector bytes.
    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Selector({})", self)
    }
}

impl FromStr for Selector {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(stripped).map_err(|_| CodecError::InvalidHex(s.to_string()))?;
        if bytes.len() != 4 {
            return Err(CodecError::InvalidLength {
                value: s.to_string(),
                expected: 4,
                actual: bytes.len(),
            });
        }
        let mut out = [0u8; 4];
        out.copy_from_slice(&bytes);
        Ok(Selector(out))
    }
}

impl Serialize for Selector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Selector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}
