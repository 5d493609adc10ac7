//! External collaborator seams
//!
//! The engine never owns bridge transports or DEX logic. Swap targets,
//! Stargate routers, Hyphen liquidity pools, and Wormhole token bridges are
//! injected as trait objects keyed by their on-network address. They receive
//! a mutable reference to the asset ledger and nothing else: an external call
//! can move funds but can never re-enter the engine mid-operation.

use std::collections::HashMap;
use std::sync::Arc;

use bridge_common::{ChainId, Selector};
use ethereum_types::{Address, U256};

use crate::errors::EngineError;
use crate::ledger::AssetLedger;

// ============================================================================
// SWAP TARGETS
// ============================================================================

/// A call performed by the swap executor against an allow-listed target.
#[derive(Debug, Clone)]
pub struct TargetCall<'a> {
    /// The engine address, on whose custody the target operates
    pub caller: Address,
    /// Selector encoded in the step's call data
    pub selector: Selector,
    /// Opaque argument bytes
    pub payload: &'a [u8],
    /// Native value forwarded with the call
    pub value: U256,
}

/// An external contract the swap executor may invoke.
pub trait SwapTarget: Send + Sync {
    fn call(&self, ledger: &mut AssetLedger, call: TargetCall<'_>) -> Result<(), EngineError>;
}

// ============================================================================
// STARGATE
// ============================================================================

/// Arguments of a Stargate router swap entry.
#[derive(Debug, Clone)]
pub struct StargateSwapCall<'a> {
    /// The engine address
    pub caller: Address,
    /// Asset backing the source pool
    pub asset: Address,
    /// Source pool funding the transfer
    pub src_pool_id: u64,
    /// LayerZero identifier of the destination chain
    pub dst_chain_id: u16,
    /// Destination pool identifier
    pub dst_pool_id: u64,
    /// Amount pulled from the caller's allowance
    pub amount: U256,
    /// Slippage floor in destination-local decimals
    pub min_amount_ld: U256,
    /// Gas budget for the destination call
    pub dst_gas_for_call: u64,
    /// Recipient on the destination chain
    pub receiver: Address,
    /// Destination contract to call on arrival; zero for none
    pub call_to: Address,
    /// Payload for the destination call
    pub call_data: &'a [u8],
    /// Native relay fee already transferred to the router
    pub fee_value: U256,
}

/// The local Stargate router contract.
pub trait StargateRouter: Send + Sync {
    /// Quotes the LayerZero relay fee for a destination. Read-only.
    fn quote_layer_zero_fee(
        &self,
        dst_chain_id: u16,
        dst_gas_for_call: u64,
        payload: &[u8],
    ) -> Result<(U256, U256), EngineError>;

    /// Pulls the bridged amount from the caller's allowance and dispatches
    /// the cross-chain transfer.
    fn swap(&self, ledger: &mut AssetLedger, call: StargateSwapCall<'_>) -> Result<(), EngineError>;
}

// ============================================================================
// HYPHEN
// ============================================================================

/// Arguments of a Hyphen liquidity pool deposit.
#[derive(Debug, Clone)]
pub struct HyphenDepositCall {
    /// The engine address
    pub caller: Address,
    /// Token deposited; ignored for native deposits
    pub token: Address,
    /// Recipient on the destination chain
    pub receiver: Address,
    /// Destination chain identifier
    pub to_chain_id: ChainId,
    /// Amount deposited
    pub amount: U256,
    /// Aggregator tag recorded by the pool
    pub tag: String,
}

/// The local Hyphen liquidity pool contract.
pub trait HyphenPool: Send + Sync {
    fn deposit_erc20(
        &self,
        ledger: &mut AssetLedger,
        call: HyphenDepositCall,
    ) -> Result<(), EngineError>;

    fn deposit_native(
        &self,
        ledger: &mut AssetLedger,
        call: HyphenDepositCall,
    ) -> Result<(), EngineError>;
}

// ============================================================================
// WORMHOLE
// ============================================================================

/// Arguments of a Wormhole token bridge transfer.
#[derive(Debug, Clone)]
pub struct WormholeTransferCall {
    /// The engine address
    pub caller: Address,
    /// Asset transferred; ignored by the wrapping native entry
    pub asset: Address,
    /// Amount transferred
    pub amount: U256,
    /// Wormhole identifier of the destination chain
    pub recipient_chain: u16,
    /// Recipient on the destination chain
    pub recipient: Address,
    /// Fee paid out of the transferred tokens to the delivering arbiter
    pub arbiter_fee: U256,
    /// Caller-chosen message nonce
    pub nonce: u32,
}

/// The local Wormhole token bridge contract.
pub trait WormholeTokenBridge: Send + Sync {
    /// Token transfer; pulls the amount from the caller's allowance and
    /// returns the bridge message sequence number.
    fn transfer_tokens(
        &self,
        ledger: &mut AssetLedger,
        call: WormholeTransferCall,
    ) -> Result<u64, EngineError>;

    /// Native transfer; the amount has already been moved to the bridge as
    /// call value.
    fn wrap_and_transfer(
        &self,
        ledger: &mut AssetLedger,
        call: WormholeTransferCall,
    ) -> Result<u64, EngineError>;
}

// ============================================================================
// REGISTRY OF EXTERNAL OBJECTS
// ============================================================================

/// Address-keyed registry of the external contracts visible to the engine.
#[derive(Clone, Default)]
pub struct Externals {
    swap_targets: HashMap<Address, Arc<dyn SwapTarget>>,
    stargate_routers: HashMap<Address, Arc<dyn StargateRouter>>,
    hyphen_pools: HashMap<Address, Arc<dyn HyphenPool>>,
    wormhole_bridges: HashMap<Address, Arc<dyn WormholeTokenBridge>>,
}

impl Externals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_swap_target(&mut self, address: Address, target: Arc<dyn SwapTarget>) {
        self.swap_targets.insert(address, target);
    }

    pub fn register_stargate_router(&mut self, address: Address, router: Arc<dyn StargateRouter>) {
        self.stargate_routers.insert(address, router);
    }

    pub fn register_hyphen_pool(&mut self, address: Address, pool: Arc<dyn HyphenPool>) {
        self.hyphen_pools.insert(address, pool);
    }

    pub fn register_wormhole_bridge(
        &mut self,
        address: Address,
        bridge: Arc<dyn WormholeTokenBridge>,
    ) {
        self.wormhole_bridges.insert(address, bridge);
    }

    pub fn swap_target(&self, address: &Address) -> Option<Arc<dyn SwapTarget>> {
        self.swap_targets.get(address).cloned()
    }

    pub fn stargate_router(&self, address: &Address) -> Option<Arc<dyn StargateRouter>> {
        self.stargate_routers.get(address).cloned()
    }

    pub fn hyphen_pool(&self, address: &Address) -> Option<Arc<dyn HyphenPool>> {
        self.hyphen_pools.get(address).cloned()
    }

    pub fn wormhole_bridge(&self, address: &Address) -> Option<Arc<dyn WormholeTokenBridge>> {
        self.wormhole_bridges.get(address).cloned()
    }
}
