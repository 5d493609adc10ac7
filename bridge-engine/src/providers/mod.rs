//! Bridge provider modules
//!
//! One module per external bridging protocol, all installed behind the
//! selector router and operating on the shared engine state. Every module
//! follows the same shape: validate the intent, pull funding, resolve the
//! destination, forward to the external bridge, and authenticate + finalize
//! asynchronous completions.

pub mod hyphen;
pub mod stargate;
pub mod wormhole;

use bridge_common::Selector;
use ethereum_types::{Address, U256};
use tracing::info;

use crate::engine::ModuleHost;
use crate::errors::EngineError;
use crate::events::EngineEvent;
use crate::swap::{execute_swaps, SwapSeed};
use crate::types::{
    is_native, CallContext, CallOutput, CompletionPayload, ModuleCall, TransferIntent,
};

/// A provider module installed behind the selector router.
///
/// Modules are independently addressed but share one persistent state space;
/// each claims a typed namespace under `EngineState::providers` and must not
/// touch a sibling's fields.
pub trait EngineModule: Send + Sync {
    /// Stable identity of the module inside the registry.
    fn address(&self) -> Address;

    /// Provider name carried in events.
    fn name(&self) -> &'static str;

    /// Selectors this module serves.
    fn selectors(&self) -> Vec<Selector>;

    /// Handles one routed call against the shared state.
    fn handle(
        &self,
        host: &mut ModuleHost<'_>,
        ctx: &CallContext,
        selector: Selector,
        call: ModuleCall,
    ) -> Result<CallOutput, EngineError>;
}

/// Rejects intents with a zero amount or a zero receiver before any asset
/// movement.
pub(crate) fn validate_intent(intent: &TransferIntent) -> Result<(), EngineError> {
    if intent.amount.is_zero() {
        return Err(EngineError::InvalidAmount);
    }
    if intent.receiver.is_zero() {
        return Err(EngineError::InvalidReceiver);
    }
    Ok(())
}

/// Pulls `amount` of `asset` from the caller into engine custody. Token
/// funding spends the caller's allowance; native funding must already be
/// attached as call value (the dispatch entry moved it into custody).
pub(crate) fn acquire_funding(
    host: &mut ModuleHost<'_>,
    ctx: &CallContext,
    asset: Address,
    amount: U256,
) -> Result<(), EngineError> {
    if is_native(&asset) {
        if ctx.value < amount {
            return Err(EngineError::InsufficientBalance {
                needed: amount,
                available: ctx.value,
            });
        }
        return Ok(());
    }
    let engine = host.engine_address;
    host.state
        .ledger
        .transfer_from(asset, ctx.caller, engine, engine, amount)
}

/// Authenticates an inbound completion against the provider's trusted relay
/// and re-dispatches the internal finalize selector with the engine as
/// caller. Direct external invocation of the finalize selector fails the
/// caller check inside the finalize handler instead.
pub(crate) fn receive_message(
    host: &mut ModuleHost<'_>,
    ctx: &CallContext,
    trusted_relay: Option<Address>,
    complete_selector: Selector,
    arrived_asset: Address,
    arrived_amount: U256,
    payload_bytes: &[u8],
) -> Result<CallOutput, EngineError> {
    match trusted_relay {
        Some(relay) if relay == ctx.caller => {}
        _ => return Err(EngineError::InvalidCaller(ctx.caller)),
    }
    let payload = CompletionPayload::decode(payload_bytes)?;
    host.redispatch(
        complete_selector,
        ModuleCall::CompleteTransfer {
            payload,
            arrived_asset,
            arrived_amount,
        },
    )
}

/// Finalizes a completion: either delivers the arrived asset directly or
/// runs the destination-side swap sequence seeded with the arrived funds and
/// delivers the output. Reachable only through the engine's own re-dispatch.
pub(crate) fn finalize_completion(
    host: &mut ModuleHost<'_>,
    ctx: &CallContext,
    provider: &'static str,
    payload: &CompletionPayload,
    arrived_asset: Address,
    arrived_amount: U256,
) -> Result<CallOutput, EngineError> {
    if ctx.caller != host.engine_address {
        return Err(EngineError::InvalidCaller(ctx.caller));
    }
    if payload.recipient.is_zero() {
        return Err(EngineError::InvalidReceiver);
    }

    let engine = host.engine_address;
    let (asset, amount) = if payload.swaps.is_empty() {
        host.state
            .ledger
            .transfer(arrived_asset, engine, payload.recipient, arrived_amount)?;
        (arrived_asset, arrived_amount)
    } else {
        let outcome = execute_swaps(
            host.state,
            host.externals,
            engine,
            engine,
            &payload.swaps,
            Some(SwapSeed {
                asset: arrived_asset,
                amount: arrived_amount,
            }),
        )?;
        host.state
            .ledger
            .transfer(outcome.asset, engine, payload.recipient, outcome.amount)?;
        (outcome.asset, outcome.amount)
    };

    info!(
        "completed {} transfer {:?}: delivered {} of {:?} to {:?}",
        provider, payload.intent.correlation_id, amount, asset, payload.recipient
    );

    host.state.events.record(EngineEvent::TransferCompleted {
        correlation_id: payload.intent.correlation_id,
        provider: provider.to_string(),
        asset,
        amount,
        recipient: payload.recipient,
    });
    Ok(CallOutput::Unit)
}

/// Emits the start event with every intent field echoed verbatim.
pub(crate) fn emit_transfer_started(
    host: &mut ModuleHost<'_>,
    provider: &'static str,
    aux: String,
    intent: &TransferIntent,
    has_source_swap: bool,
    has_destination_call: bool,
) {
    info!(
        "started {} transfer {:?}: {} of {:?} to chain {}",
        provider, intent.correlation_id, intent.amount, intent.sending_asset,
        intent.destination_chain_id
    );
    host.state.events.record(EngineEvent::TransferStarted {
        correlation_id: intent.correlation_id,
        provider: provider.to_string(),
        aux,
        integrator: intent.integrator.clone(),
        referrer: intent.referrer,
        sending_asset: intent.sending_asset,
        receiving_asset: intent.receiving_asset,
        receiver: intent.receiver,
        amount: intent.amount,
        destination_chain_id: intent.destination_chain_id,
        has_source_swap,
        has_destination_call,
    });
}
