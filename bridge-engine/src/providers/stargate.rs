//! Stargate provider module
//!
//! Pool-based bridging metered by LayerZero relay fees. Outbound transfers
//! map the sending asset to a source pool, enforce the caller-quoted native
//! fee, and may carry a destination-side call. Inbound completions arrive
//! through the local router recorded at init (the sgReceive path).

use bridge_common::Selector;
use ethereum_types::Address;
use tracing::info;

use crate::engine::ModuleHost;
use crate::errors::EngineError;
use crate::externals::StargateSwapCall;
use crate::providers::{
    acquire_funding, emit_transfer_started, finalize_completion, receive_message,
    validate_intent, EngineModule,
};
use crate::registry::RegistryEntry;
use crate::swap::execute_swaps;
use crate::types::{
    is_native, CallContext, CallOutput, InitParams, ModuleCall, ProviderParams, StargateParams,
    TransferIntent,
};

/// Provider name carried in events and resolver lookups.
pub const NAME: &str = "stargate";

/// Stargate bridge provider.
pub struct StargateModule {
    address: Address,
}

impl StargateModule {
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    pub fn init_selector() -> Selector {
        Selector::from_signature("initStargate(address)")
    }

    pub fn quote_fee_selector() -> Selector {
        Selector::from_signature("quoteLayerZeroFee(uint256,StargateData)")
    }

    pub fn start_selector() -> Selector {
        Selector::from_signature("startBridgeTokensViaStargate(BridgeData,StargateData)")
    }

    pub fn swap_and_start_selector() -> Selector {
        Selector::from_signature(
            "swapAndStartBridgeTokensViaStargate(BridgeData,SwapData[],StargateData)",
        )
    }

    pub fn receive_selector() -> Selector {
        Selector::from_signature("sgReceive(uint16,bytes,uint256,address,uint256,bytes)")
    }

    pub fn complete_selector() -> Selector {
        Selector::from_signature("completeBridgeTokensViaStargate(CompletionPayload,address,uint256)")
    }

    /// Registry batch binding every Stargate selector to this module.
    pub fn registry_entries(&self) -> Vec<RegistryEntry> {
        self.selectors()
            .into_iter()
            .map(|selector| RegistryEntry {
                selector,
                module: self.address,
            })
            .collect()
    }

    fn params(params: ProviderParams) -> Result<StargateParams, EngineError> {
        match params {
            ProviderParams::Stargate(p) => Ok(p),
            other => Err(EngineError::InvalidCallData(format!(
                "expected stargate parameters, got {:?}",
                other
            ))),
        }
    }

    fn init(&self, host: &mut ModuleHost<'_>, router: Address) -> Result<CallOutput, EngineError> {
        if host.state.providers.stargate.router.is_some() {
            return Err(EngineError::AlreadyInitialized);
        }
        host.state.providers.stargate.router = Some(router);
        info!(
            "initialized stargate with router 0x{}",
            hex::encode(router.as_bytes())
        );
        Ok(CallOutput::Unit)
    }

    fn quote_fee(
        &self,
        host: &mut ModuleHost<'_>,
        destination_chain_id: u64,
        params: &StargateParams,
    ) -> Result<CallOutput, EngineError> {
        let dest = host
            .resolver
            .resolve_destination(NAME, destination_chain_id)
            .ok_or(EngineError::DestinationNotSupported(destination_chain_id))?;
        let router = host.externals.stargate_router(&dest.router).ok_or_else(|| {
            EngineError::External(format!(
                "no stargate router at 0x{}",
                hex::encode(dest.router.as_bytes())
            ))
        })?;
        let (native_fee, aux_fee) = router.quote_layer_zero_fee(
            dest.messaging_chain_id,
            params.dst_gas_for_call,
            &params.call_data,
        )?;
        Ok(CallOutput::FeeQuote {
            native_fee,
            aux_fee,
        })
    }

    /// Shared body of the start paths. With `funds_in_custody` the bridged
    /// amount is already held by the engine (source swaps pulled it);
    /// otherwise it is pulled from the caller here. `fee_value` is the native
    /// value still available for the relay fee: the full attached value on
    /// the plain path, the attached value minus what source swaps consumed on
    /// the swap path.
    fn start_inner(
        &self,
        host: &mut ModuleHost<'_>,
        ctx: &CallContext,
        intent: &TransferIntent,
        params: &StargateParams,
        fee_value: ethereum_types::U256,
        has_source_swap: bool,
        funds_in_custody: bool,
    ) -> Result<CallOutput, EngineError> {
        validate_intent(intent)?;
        if is_native(&intent.sending_asset) {
            return Err(EngineError::InvalidCallData(
                "the stargate provider bridges pool tokens, not the native asset".to_string(),
            ));
        }

        let dest = host
            .resolver
            .resolve_destination(NAME, intent.destination_chain_id)
            .ok_or(EngineError::DestinationNotSupported(
                intent.destination_chain_id,
            ))?;
        let src_pool_id = *dest
            .pools
            .get(&intent.sending_asset)
            .ok_or(EngineError::DestinationNotSupported(
                intent.destination_chain_id,
            ))?;
        let router = host.externals.stargate_router(&dest.router).ok_or_else(|| {
            EngineError::External(format!(
                "no stargate router at 0x{}",
                hex::encode(dest.router.as_bytes())
            ))
        })?;

        let (native_fee, _) = router.quote_layer_zero_fee(
            dest.messaging_chain_id,
            params.dst_gas_for_call,
            &params.call_data,
        )?;
        if fee_value < native_fee {
            return Err(EngineError::InsufficientFee {
                required: native_fee,
                provided: fee_value,
            });
        }

        if !funds_in_custody {
            acquire_funding(host, ctx, intent.sending_asset, intent.amount)?;
        }

        let engine = host.engine_address;
        host.state
            .ledger
            .approve(engine, dest.router, intent.sending_asset, intent.amount);
        // The remaining attached value travels to the router with the call.
        host.state
            .ledger
            .transfer(Address::zero(), engine, dest.router, fee_value)?;
        router.swap(
            &mut host.state.ledger,
            StargateSwapCall {
                caller: engine,
                asset: intent.sending_asset,
                src_pool_id,
                dst_chain_id: dest.messaging_chain_id,
                dst_pool_id: params.dst_pool_id,
                amount: intent.amount,
                min_amount_ld: params.min_amount_ld,
                dst_gas_for_call: params.dst_gas_for_call,
                receiver: intent.receiver,
                call_to: params.call_to,
                call_data: &params.call_data,
                fee_value,
            },
        )?;
        host.state
            .ledger
            .approve(engine, dest.router, intent.sending_asset, ethereum_types::U256::zero());

        emit_transfer_started(
            host,
            NAME,
            format!("pool:{}->{}", src_pool_id, params.dst_pool_id),
            intent,
            has_source_swap,
            !params.call_data.is_empty(),
        );
        Ok(CallOutput::Unit)
    }

    fn swap_and_start(
        &self,
        host: &mut ModuleHost<'_>,
        ctx: &CallContext,
        intent: TransferIntent,
        swaps: Vec<crate::types::SwapStep>,
        params: &StargateParams,
    ) -> Result<CallOutput, EngineError> {
        validate_intent(&intent)?;
        let engine = host.engine_address;
        let native_before = host
            .state
            .ledger
            .balance_of(engine, Address::zero());
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
        // Whatever native value the swaps consumed is no longer available as
        // relay fee.
        let native_after = host.state.ledger.balance_of(engine, Address::zero());
        let native_spent = native_before.saturating_sub(native_after);
        let fee_value = ctx.value.saturating_sub(native_spent);
        let mut effective = intent;
        effective.amount = outcome.amount;
        self.start_inner(host, ctx, &effective, params, fee_value, true, true)
    }
}

impl EngineModule for StargateModule {
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
                ModuleCall::Init(InitParams::Stargate { router }) => self.init(host, router),
                other => Err(EngineError::InvalidCallData(format!(
                    "expected stargate init, got {:?}",
                    other
                ))),
            };
        }
        if selector == Self::quote_fee_selector() {
            return match call {
                ModuleCall::QuoteFee {
                    destination_chain_id,
                    params,
                } => {
                    let params = Self::params(params)?;
                    self.quote_fee(host, destination_chain_id, &params)
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
                    self.start_inner(host, ctx, &intent, &params, ctx.value, false, false)
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
                    let trusted = host.state.providers.stargate.router;
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
