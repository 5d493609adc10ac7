//! Destination resolution seam
//!
//! Provider modules resolve per-destination parameters through this injected
//! interface; the engine owns no per-network tables itself. The shipped
//! implementation is a static map built from the TOML configuration.

use std::collections::HashMap;

use bridge_common::ChainId;
use ethereum_types::Address;

/// Per-destination provider parameters supplied by the host configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DestinationParams {
    /// Local entry point of the provider's bridge for this destination
    pub router: Address,
    /// Asset relay fees are denominated in; zero for the native asset
    pub fee_asset: Address,
    /// Sending asset -> provider pool identifier
    pub pools: HashMap<Address, u64>,
    /// Provider messaging-layer identifier of the destination chain
    pub messaging_chain_id: u16,
    /// Auxiliary provider contracts for this destination
    pub aux_addresses: Vec<Address>,
}

/// Supplies per-destination parameters to provider modules.
pub trait DestinationResolver: Send + Sync {
    /// Resolves the parameters a provider needs to reach `chain_id`.
    /// Returns `None` when the chain is unconfigured for that provider.
    fn resolve_destination(&self, provider: &str, chain_id: ChainId) -> Option<DestinationParams>;
}

/// Static resolver backed by per-provider destination tables.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    tables: HashMap<String, HashMap<ChainId, DestinationParams>>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the parameters for one (provider, destination) pair,
    /// replacing any previous entry.
    pub fn insert(&mut self, provider: &str, chain_id: ChainId, params: DestinationParams) {
        self.tables
            .entry(provider.to_string())
            .or_default()
            .insert(chain_id, params);
    }
}

impl DestinationResolver for StaticResolver {
    fn resolve_destination(&self, provider: &str, chain_id: ChainId) -> Option<DestinationParams> {
        self.tables
            .get(provider)
            .and_then(|table| table.get(&chain_id))
            .cloned()
    }
}
