//! Hyphen provider module
//!
//! Liquidity-pool deposits with no relay fee. The destination pool pays out
//! on its own; the source side only deposits into the local pool resolved for
//! the destination chain. Completions arrive through the executor address
//! recorded at init.

use bridge_common::Selector;
use ethereum_types::Address;
use tracing::info;

use crate::engine::ModuleHost;
use crate::errors::EngineError;
use crate::externals::HyphenDepositCall;
use crate::providers::{
    acquire_funding, emit_transfer_started, finalize_completion, receive_message,
    validate_intent, EngineModule,
};
use crate::registry::RegistryEntry;
use crate::swap::execute_swaps;
use crate::types::{
    is_native, CallContext, CallOutput, InitParams, ModuleCall, ProviderParams, TransferIntent,
};

/// Provider name carried in events and resolver lookups.
pub const NAME: &str = "hyphen";

/// Tag recorded by the pool alongside each deposit.
const DEPOSIT_TAG: &str = "bridge-engine";

/// Hyphen bridge provider.
pub struct HyphenModule {
    address: Address,
}

impl HyphenModule {
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    pub fn init_selector() -> Selector {
        Selector::from_signature("initHyphen(address)")
    }

    pub fn quote_fee_selector() -> Selector {
        Selector::from_signature("quoteHyphenFee(uint256)")
    }

    pub fn start_selector() -> Selector {
        Selector::from_signature("startBridgeTokensViaHyphen(BridgeData)")
    }

    pub fn swap_and_start_selector() -> Selector {
        Selector::from_signature("swapAndStartBridgeTokensViaHyphen(BridgeData,SwapData[])")
    }

    pub fn receive_selector() -> Selector {
        Selector::from_signature("receiveHyphenTransfer(address,uint256,bytes)")
    }

    pub fn complete_selector() -> Selector {
        Selector::from_signature("completeBridgeTokensViaHyphen(CompletionPayload,address,uint256)")
    }

    /// Registry batch binding every Hyphen selector to this module.
    pub fn registry_entries(&self) -> Vec<RegistryEntry> {
        self.selectors()
            .into_iter()
            .map(|selector| RegistryEntry {
                selector,
                module: self.address,
            })
            .collect()
    }

    fn expect_hyphen_params(params: ProviderParams) -> Result<(), EngineError> {
        match params {
            ProviderParams::Hyphen => Ok(()),
            other => Err(EngineError::InvalidCallData(format!(
                "expected hyphen parameters, got {:?}",
                other
            ))),
        }
    }

    fn init(&self, host: &mut ModuleHost<'_>, relay: Address) -> Result<CallOutput, EngineError> {
        if host.state.providers.hyphen.relay.is_some() {
            return Err(EngineError::AlreadyInitialized);
        }
        host.state.providers.hyphen.relay = Some(relay);
        info!(
            "initialized hyphen with relay 0x{}",
            hex::encode(relay.as_bytes())
        );
        Ok(CallOutput::Unit)
    }

    /// Hyphen charges no relay fee; quotes are always zero.
    fn quote_fee(&self) -> CallOutput {
        CallOutput::FeeQuote {
            native_fee: ethereum_types::U256::zero(),
            aux_fee: ethereum_types::U256::zero(),
        }
    }

    fn start_inner(
        &self,
        host: &mut ModuleHost<'_>,
        ctx: &CallContext,
        intent: &TransferIntent,
        has_source_swap: bool,
        funds_in_custody: bool,
    ) -> Result<CallOutput, EngineError> {
        validate_intent(intent)?;

        let dest = host
            .resolver
            .resolve_destination(NAME, intent.destination_chain_id)
            .ok_or(EngineError::DestinationNotSupported(
                intent.destination_chain_id,
            ))?;
        let pool = host.externals.hyphen_pool(&dest.router).ok_or_else(|| {
            EngineError::External(format!(
                "no hyphen liquidity pool at 0x{}",
                hex::encode(dest.router.as_bytes())
            ))
        })?;

        if !funds_in_custody {
            acquire_funding(host, ctx, intent.sending_asset, intent.amount)?;
        }

        let engine = host.engine_address;
        let call = HyphenDepositCall {
            caller: engine,
            token: intent.sending_asset,
            receiver: intent.receiver,
            to_chain_id: intent.destination_chain_id,
            amount: intent.amount,
            tag: DEPOSIT_TAG.to_string(),
        };
        if is_native(&intent.sending_asset) {
            // The deposit travels to the pool as call value.
            host.state
                .ledger
                .transfer(Address::zero(), engine, dest.router, intent.amount)?;
            pool.deposit_native(&mut host.state.ledger, call)?;
        } else {
            host.state
                .ledger
                .approve(engine, dest.router, intent.sending_asset, intent.amount);
            pool.deposit_erc20(&mut host.state.ledger, call)?;
            host.state.ledger.approve(
                engine,
                dest.router,
                intent.sending_asset,
                ethereum_types::U256::zero(),
            );
        }

        emit_transfer_started(host, NAME, String::new(), intent, has_source_swap, false);
        Ok(CallOutput::Unit)
    }

    fn swap_and_start(
        &self,
        host: &mut ModuleHost<'_>,
        ctx: &CallContext,
        intent: TransferIntent,
        swaps: Vec<crate::types::SwapStep>,
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
        self.start_inner(host, ctx, &effective, true, true)
    }
}

impl EngineModule for HyphenModule {
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
                ModuleCall::Init(InitParams::Hyphen { relay }) => self.init(host, relay),
                other => Err(EngineError::InvalidCallData(format!(
                    "expected hyphen init, got {:?}",
                    other
                ))),
            };
        }
        if selector == Self::quote_fee_selector() {
            return match call {
                ModuleCall::QuoteFee { params, .. } => {
                    Self::expect_hyphen_params(params)?;
                    Ok(self.quote_fee())
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
                    Self::expect_hyphen_params(params)?;
                    self.start_inner(host, ctx, &intent, false, false)
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
                    Self::expect_hyphen_params(params)?;
                    self.swap_and_start(host, ctx, intent, swaps)
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
                    let trusted = host.state.providers.hyphen.relay;
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
