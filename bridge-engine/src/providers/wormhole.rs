//! Wormhole provider module
//!
//! Token-bridge transfers with an arbiter fee paid out of the transferred
//! amount. Destination chains use Wormhole's own chain numbering, so the
//! module owns a translation table from network chain ids, mutated through a
//! registered `setWormholeChainId`-style operation. Completions arrive
//! through the local token bridge recorded at init.

use bridge_common::{ChainId, Selector};
use ethereum_types::Address;
use tracing::info;

use crate::engine::ModuleHost;
use crate::errors::EngineError;
use crate::externals::WormholeTransferCall;
use crate::providers::{
    acquire_funding, emit_transfer_started, finalize_completion, receive_message,
    validate_intent, EngineModule,
};
use crate::registry::RegistryEntry;
use crate::swap::execute_swaps;
use crate::types::{
    is_native, CallContext, CallOutput, InitParams, ModuleCall, ProviderParams, TransferIntent,
    WormholeParams,
};

/// Provider name carried in events and resolver lookups.
pub const NAME: &str = "wormhole";

/// Wormhole bridge provider.
pub struct WormholeModule {
    address: Address,
}

impl WormholeModule {
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    pub fn init_selector() -> Selector {
        Selector::from_signature("initWormhole(address)")
    }

    pub fn quote_fee_selector() -> Selector {
        Selector::from_signature("quoteWormholeFee(uint256,WormholeData)")
    }

    pub fn start_selector() -> Selector {
        Selector::from_signature("startBridgeTokensViaWormhole(BridgeData,WormholeData)")
    }

    pub fn swap_and_start_selector() -> Selector {
        Selector::from_signature(
            "swapAndStartBridgeTokensViaWormhole(BridgeData,SwapData[],WormholeData)",
        )
    }

    pub fn receive_selector() -> Selector {
        Selector::from_signature("receiveWormholeTransfer(address,uint256,bytes)")
    }

    pub fn complete_selector() -> Selector {
        Selector::from_signature(
            "completeBridgeTokensViaWormhole(CompletionPayload,address,uint256)",
        )
    }

    pub fn set_chain_mapping_selector() -> Selector {
        Selector::from_signature("setWormholeChainId(uint256,uint16)")
    }

    /// Registry batch binding every Wormhole selector to this module.
    pub fn registry_entries(&self) -> Vec<RegistryEntry> {
        self.selectors()
            .into_iter()
            .map(|selector| RegistryEntry {
                selector,
                module: self.address,
            })
            .collect()
    }

    fn params(params: ProviderParams) -> Result<WormholeParams, EngineError> {
        match params {
            ProviderParams::Wormhole(p) => Ok(p),
            other => Err(EngineError::InvalidCallData(format!(
                "expected wormhole parameters, got {:?}",
                other
            ))),
        }
    }

    fn init(
        &self,
        host: &mut ModuleHost<'_>,
        token_bridge: Address,
    ) -> Result<CallOutput, EngineError> {
        if host.state.providers.wormhole.token_bridge.is_some() {
            return Err(EngineError::AlreadyInitialized);
        }
        host.state.providers.wormhole.token_bridge = Some(token_bridge);
        info!(
            "initialized wormhole with token bridge 0x{}",
            hex::encode(token_bridge.as_bytes())
        );
        Ok(CallOutput::Unit)
    }

    fn set_chain_mapping(
        &self,
        host: &mut ModuleHost<'_>,
        chain_id: ChainId,
        mapped: u16,
    ) -> Result<CallOutput, EngineError> {
        host.state
            .providers
            .wormhole
            .chain_mappings
            .insert(chain_id, mapped);
        info!("mapped chain {} to wormhole chain {}", chain_id, mapped);
        Ok(CallOutput::Unit)
    }

    /// Wormhole charges no native relay fee; the arbiter fee is paid out of
    /// the transferred tokens.
    fn quote_fee(&self, params: &WormholeParams) -> CallOutput {
        CallOutput::FeeQuote {
            native_fee: ethereum_types::U256::zero(),
            aux_fee: params.arbiter_fee,
        }
    }

    fn start_inner(
        &self,
        host: &mut ModuleHost<'_>,
        ctx: &CallContext,
        intent: &TransferIntent,
        params: &WormholeParams,
        has_source_swap: bool,
        funds_in_custody: bool,
    ) -> Result<CallOutput, EngineError> {
        validate_intent(intent)?;

        let recipient_chain = *host
            .state
            .providers
            .wormhole
            .chain_mappings
            .get(&intent.destination_chain_id)
            .ok_or(EngineError::DestinationNotSupported(
                intent.destination_chain_id,
            ))?;
        let dest = host
            .resolver
            .resolve_destination(NAME, intent.destination_chain_id)
            .ok_or(EngineError::DestinationNotSupported(
                intent.destination_chain_id,
            ))?;
        let bridge = host.externals.wormhole_bridge(&dest.router).ok_or_else(|| {
            EngineError::External(format!(
                "no wormhole token bridge at 0x{}",
                hex::encode(dest.router.as_bytes())
            ))
        })?;

        if !funds_in_custody {
            acquire_funding(host, ctx, intent.sending_asset, intent.amount)?;
        }

        let engine = host.engine_address;
        let call = WormholeTransferCall {
            caller: engine,
            asset: intent.sending_asset,
            amount: intent.amount,
            recipient_chain,
            recipient: intent.receiver,
            arbiter_fee: params.arbiter_fee,
            nonce: params.nonce,
        };
        if is_native(&intent.sending_asset) {
            // The amount travels to the bridge as call value and is wrapped.
            host.state
                .ledger
                .transfer(Address::zero(), engine, dest.router, intent.amount)?;
            bridge.wrap_and_transfer(&mut host.state.ledger, call)?;
        } else {
            host.state
                .ledger
                .approve(engine, dest.router, intent.sending_asset, intent.amount);
            bridge.transfer_tokens(&mut host.state.ledger, call)?;
            host.state.ledger.approve(
                engine,
                dest.router,
                intent.sending_asset,
                ethereum_types::U256::zero(),
            );
        }

        emit_transfer_started(
            host,
            NAME,
            format!("nonce:{}", params.nonce),
            intent,
            has_source_swap,
            false,
        );
        Ok(CallOutput::Unit)
    }

    fn swap_and_start(
        &self,
        host: &mut ModuleHost<'_>,
        ctx: &CallContext,
        intent: TransferIntent,
        swaps: Vec<crate::types::SwapStep>,
        params: &WormholeParams,
    ) -> Result<CallOutput, EngineError> {
        validate_intent(&intent)?;
        let engine = host.engine_address;
        let outcome = execute_swaps(host.state, host.externals, engine, ctx.caller, &swaps, None)?;
        if outcome.asset != intent.sending_asset {
            return Err(EngineError::InvalidCallData(format!(
                "swap output asset {:?} does not match the intent's sending asset {:?}",
                outcome.asset, intent.sending_asset
            )));
        }
        if outcome.amount.is_zero() {
            return Err(EngineError::InvalidAmount);
        }
        let mut effective = intent;
        effective.amount = outcome.amount;
        self.start_inner(host, ctx, &effective, params, true, true)
    }
}

impl EngineModule for WormholeModule {
    fn address(&self) -> Address {
        self.address
    }

    fn name(&self) -> &'static str {
        NAME
    }

    fn selectors(&self) -> Vec<Selector> {
        vec![
            Self::init_selector(),
            Self::quote_fee_selector(),
            Self::start_selector(),
            Self::swap_and_start_selector(),
            Self::receive_selector(),
            Self::complete_selector(),
            Self::set_chain_mapping_selector(),
        ]
    }

    fn handle(
        &self,
        host: &mut ModuleHost<'_>,
        ctx: &CallContext,
        selector: Selector,
        call: ModuleCall,
    ) -> Result<CallOutput, EngineError> {
        if selector == Self::init_selector() {
            return match call {
                ModuleCall::Init(InitParams::Wormhole { token_bridge }) => {
                    self.init(host, token_bridge)
                }
                other => Err(EngineError::InvalidCallData(format!(
                    "expected wormhole init, got {:?}",
                    other
                ))),
            };
        }
        if selector == Self::set_chain_mapping_selector() {
            return match call {
                ModuleCall::SetChainMapping { chain_id, mapped } => {
                    self.set_chain_mapping(host, chain_id, mapped)
                }
                other => Err(EngineError::InvalidCallData(format!(
                    "expected chain mapping call, got {:?}",
                    other
                ))),
            };
        }
        if selector == Self::quote_fee_selector() {
            return match call {
                ModuleCall::QuoteFee { params, .. } => {
                    let params = Self::params(params)?;
                    Ok(self.quote_fee(&params))
                }
                other => Err(EngineError::InvalidCallData(format!(
                    "expected fee quote call, got {:?}",
                    other
                ))),
            };
        }
        if selector == Self::start_selector() {
            return match call {
                ModuleCall::StartBridge { intent, params } => {
                    let params = Self::params(params)?;
                    self.start_inner(host, ctx, &intent, &params, false, false)
                }
                other => Err(EngineError::InvalidCallData(format!(
                    "expected start call, got {:?}",
                    other
                ))),
            };
        }
        if selector == Self::swap_and_start_selector() {
            return match call {
                ModuleCall::SwapAndStartBridge {
                    intent,
                    swaps,
                    params,
                } => {
                    let params = Self::params(params)?;
                    self.swap_and_start(host, ctx, intent, swaps, &params)
                }
                other => Err(EngineError::InvalidCallData(format!(
                    "expected swap-and-start call, got {:?}",
                    other
                ))),
            };
        }
        if selector == Self::receive_selector() {
            return match call {
                ModuleCall::ReceiveMessage {
                    arrived_asset,
                    arrived_amount,
                    payload,
                } => {
                    let trusted = host.state.providers.wormhole.token_bridge;
                    receive_message(
                        host,
                        ctx,
                        trusted,
                        Self::complete_selector(),
                        arrived_asset,
                        arrived_amount,
                        &payload,
                    )
                }
                other => Err(EngineError::InvalidCallData(format!(
                    "expected completion message, got {:?}",
                    other
                ))),
            };
        }
        if selector == Self::complete_selector() {
            return match call {
                ModuleCall::CompleteTransfer {
                    payload,
                    arrived_asset,
                    arrived_amount,
                } => finalize_completion(host, ctx, NAME, &payload, arrived_asset, arrived_amount),
                other => Err(EngineError::InvalidCallData(format!(
                    "expected finalize call, got {:?}",
                    other
                ))),
            };
        }
        Err(EngineError::SelectorNotFound(selector))
    }
}
