//! Shared engine state
//!
//! All modules operate on this one state struct, passed by reference through
//! the router, so provider modules share a single persistent identity and
//! storage space. Namespace separation is enforced by construction: each
//! provider owns a typed sub-struct under `providers` and never touches a
//! sibling's fields.

use std::collections::HashMap;

use bridge_common::{ChainId, Selector};
use ethereum_types::Address;

use crate::events::EventLog;
use crate::gate::AllowList;
use crate::ledger::AssetLedger;

/// Stargate provider namespace.
#[derive(Debug, Clone, Default)]
pub struct StargateState {
    /// Local router recorded at init; also the trusted sgReceive caller
    pub router: Option<Address>,
}

/// Hyphen provider namespace.
#[derive(Debug, Clone, Default)]
pub struct HyphenState {
    /// Executor address trusted to deliver completions, recorded at init
    pub relay: Option<Address>,
}

/// Wormhole provider namespace.
#[derive(Debug, Clone, Default)]
pub struct WormholeState {
    /// Local token bridge recorded at init; also the trusted completion caller
    pub token_bridge: Option<Address>,
    /// Destination chain id -> wormhole chain id translation table
    pub chain_mappings: HashMap<ChainId, u16>,
}

/// Per-provider namespaces within the shared state. Disjoint by construction.
#[derive(Debug, Clone, Default)]
pub struct ProviderNamespaces {
    pub stargate: StargateState,
    pub hyphen: HyphenState,
    pub wormhole: WormholeState,
}

/// The journaled state shared by every module behind the router. Cloned at
/// each public entry and restored wholesale on failure, so a failed call
/// leaves no partial effect anywhere in it.
#[derive(Debug, Clone, Default)]
pub struct EngineState {
    /// Selector -> module address dispatch table
    pub routes: HashMap<Selector, Address>,
    /// Swap target/selector approvals
    pub gate: AllowList,
    /// Asset custody book
    pub ledger: AssetLedger,
    /// Observability event journal
    pub events: EventLog,
    /// Typed per-provider namespaces
    pub providers: ProviderNamespaces,
}

impl EngineState {
    pub fn new() -> Self {
        Self::default()
    }
}
