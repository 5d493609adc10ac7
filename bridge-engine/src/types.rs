//! Core data model
//!
//! Transfer intents, swap steps, completion payloads, and the tagged unions
//! carried through the module router. Intents and payloads are ephemeral:
//! they are constructed per call and never persisted by the engine.

use bridge_common::{ChainId, Selector};
use ethereum_types::{Address, H256, U256};
use serde::{Deserialize, Serialize};

use crate::errors::EngineError;

/// The native asset of the host network, denoted by the zero address.
pub fn native_asset() -> Address {
    Address::zero()
}

/// Returns true when `asset` denotes the native asset.
pub fn is_native(asset: &Address) -> bool {
    asset.is_zero()
}

// ============================================================================
// TRANSFER INTENT
// ============================================================================

/// Caller-declared description of a requested transfer.
///
/// The correlation id is caller-supplied and used only to correlate the
/// paired start/completion events; the engine never checks it for uniqueness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferIntent {
    /// Caller-supplied identifier echoed in start/completion events
    pub correlation_id: H256,
    /// Integrator label for observability
    pub integrator: String,
    /// Referrer address for observability
    pub referrer: Address,
    /// Asset the caller funds the transfer with
    pub sending_asset: Address,
    /// Asset expected on the destination chain
    pub receiving_asset: Address,
    /// Recipient on the destination chain
    pub receiver: Address,
    /// Destination chain identifier
    pub destination_chain_id: ChainId,
    /// Amount of the sending asset to bridge
    pub amount: U256,
}

// ============================================================================
// SWAP STEPS
// ============================================================================

/// Call payload of one swap step: the selector the gate checks plus opaque
/// argument bytes interpreted by the target alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapCallData {
    /// Selector encoded in the call; must be allow-listed
    pub selector: Selector,
    /// Argument bytes, opaque to the engine
    #[serde(default)]
    pub payload: Vec<u8>,
}

/// One external call in a pre- or post-bridge conversion sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapStep {
    /// Contract invoked by this step
    pub target: Address,
    /// Contract granted the step's exact allowance
    pub approve_target: Address,
    /// Asset consumed by this step
    pub sending_asset: Address,
    /// Asset produced by this step
    pub receiving_asset: Address,
    /// Amount of the sending asset consumed
    pub from_amount: U256,
    /// Selector plus argument bytes forwarded to the target
    pub call_data: SwapCallData,
    /// Whether the step pulls its funding from the caller first
    pub requires_deposit: bool,
}

// ============================================================================
// COMPLETION PAYLOAD
// ============================================================================

/// Message delivered by a bridge relay describing how to finalize a transfer
/// on the destination side. Decoded once per inbound call, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionPayload {
    /// The originating intent, echoed by the source side
    pub intent: TransferIntent,
    /// Destination-side conversion steps; empty for direct delivery
    #[serde(default)]
    pub swaps: Vec<SwapStep>,
    /// Final recipient of the delivered asset
    pub recipient: Address,
}

impl CompletionPayload {
    /// Encodes the payload into the byte form carried by bridge messages.
    pub fn encode(&self) -> Result<Vec<u8>, EngineError> {
        serde_json::to_vec(self).map_err(|e| EngineError::InvalidCallData(e.to_string()))
    }

    /// Decodes a payload from bridge message bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, EngineError> {
        serde_json::from_slice(bytes).map_err(|e| EngineError::InvalidCallData(e.to_string()))
    }
}

// ============================================================================
// PROVIDER PARAMETERS
// ============================================================================

/// Stargate-specific bridge parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StargateParams {
    /// Destination pool identifier
    pub dst_pool_id: u64,
    /// Minimum amount, in destination-local decimals, accepted after fees
    pub min_amount_ld: U256,
    /// Gas budget for an optional destination-side call
    pub dst_gas_for_call: u64,
    /// Destination contract to call on arrival; zero for none
    pub call_to: Address,
    /// Payload forwarded to the destination call
    #[serde(default)]
    pub call_data: Vec<u8>,
}

/// Wormhole-specific bridge parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WormholeParams {
    /// Fee paid out of the transferred tokens to the delivering arbiter
    pub arbiter_fee: U256,
    /// Caller-chosen message nonce
    pub nonce: u32,
}

/// Tagged per-provider parameter block carried by bridge calls. Each provider
/// accepts exactly its own variant and rejects the rest as `InvalidCallData`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderParams {
    Stargate(StargateParams),
    Hyphen,
    Wormhole(WormholeParams),
}

/// One-time provider initialization, issued through the registry's
/// initializer hook. Records the provider's trusted inbound relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitParams {
    /// Stargate: the local router that is also the trusted sgReceive caller
    Stargate { router: Address },
    /// Hyphen: the executor address trusted to deliver completions
    Hyphen { relay: Address },
    /// Wormhole: the local token bridge, trusted for completions
    Wormhole { token_bridge: Address },
}

// ============================================================================
// MODULE CALLS
// ============================================================================

/// Operations addressable through the module registry. The router forwards
/// these without interpreting them; each module decodes against its schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleCall {
    /// One-time provider initialization
    Init(InitParams),
    /// Fee quote for a destination, read-only
    QuoteFee {
        destination_chain_id: ChainId,
        params: ProviderParams,
    },
    /// Start an outbound transfer funded by the caller
    StartBridge {
        intent: TransferIntent,
        params: ProviderParams,
    },
    /// Run source-side swaps, then start the transfer with the swap output
    SwapAndStartBridge {
        intent: TransferIntent,
        swaps: Vec<SwapStep>,
        params: ProviderParams,
    },
    /// Inbound completion delivered by the provider's relay network
    ReceiveMessage {
        arrived_asset: Address,
        arrived_amount: U256,
        payload: Vec<u8>,
    },
    /// Internal finalize step; only the engine itself may be the caller
    CompleteTransfer {
        payload: CompletionPayload,
        arrived_asset: Address,
        arrived_amount: U256,
    },
    /// Record a destination chain-id translation (Wormhole)
    SetChainMapping { chain_id: ChainId, mapped: u16 },
}

/// Result of a routed call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutput {
    /// Operation completed with no return value
    Unit,
    /// Fee quote: native relay fee plus a provider-specific auxiliary fee
    FeeQuote { native_fee: U256, aux_fee: U256 },
}

/// Execution context of one engine entry: the external caller and the native
/// value attached to the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    pub caller: Address,
    pub value: U256,
}

impl CallContext {
    pub fn new(caller: Address, value: U256) -> Self {
        Self { caller, value }
    }
}
