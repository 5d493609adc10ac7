//! Shared primitive types for the bridge aggregation engine
//!
//! This crate provides the vocabulary used across the engine and host tooling:
//! 4-byte function selectors, hex codecs for addresses and 32-byte identifiers,
//! and chain identifiers. It deliberately stays free of engine logic so that
//! configuration tools and test harnesses can depend on it alone.

pub mod codec;
pub mod selector;

// Re-export commonly used types
pub use codec::{format_address, format_hash, parse_address, parse_hash, CodecError};
pub use selector::Selector;

/// Unique identifier of a network, as used in transfer intents and
/// destination-resolution tables.
pub type ChainId = u64;
