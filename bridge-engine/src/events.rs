//! Observability events
//!
//! The engine's only durable record of transfer lifecycles. `TransferStarted`
//! and `TransferCompleted` are correlated by the caller-supplied correlation
//! id; the engine keeps no per-transfer state between them. Field order
//! matters to consumers and mirrors the external interface contract.

use bridge_common::{ChainId, Selector};
use ethereum_types::{Address, H256, U256};
use serde::Serialize;
use tracing::info;

/// Events recorded by engine operations. Appended to the journaled event log,
/// so a failed call leaves the log untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum EngineEvent {
    /// An outbound transfer was handed to an external bridge.
    TransferStarted {
        correlation_id: H256,
        provider: String,
        aux: String,
        integrator: String,
        referrer: Address,
        sending_asset: Address,
        receiving_asset: Address,
        receiver: Address,
        amount: U256,
        destination_chain_id: ChainId,
        has_source_swap: bool,
        has_destination_call: bool,
    },
    /// An inbound completion delivered assets to the recipient.
    TransferCompleted {
        correlation_id: H256,
        provider: String,
        asset: Address,
        amount: U256,
        recipient: Address,
    },
    /// One swap step realized an output amount.
    AssetSwapped {
        sending_asset: Address,
        receiving_asset: Address,
        from_amount: U256,
        received_amount: U256,
    },
    /// A swap target was approved or revoked.
    SwapTargetApprovalChanged { target: Address, approved: bool },
    /// A swap selector was approved or revoked.
    SwapSelectorApprovalChanged { selector: Selector, approved: bool },
    /// A selector was routed to a module for the first time.
    RouteAdded { selector: Selector, module: Address },
    /// A selector was re-routed from one module to another.
    RouteReplaced {
        selector: Selector,
        previous: Address,
        module: Address,
    },
    /// A selector's route was removed.
    RouteRemoved { selector: Selector, previous: Address },
}

/// Append-only event journal. Cloned into the entry snapshot so failed calls
/// roll their events back together with the rest of the state.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<EngineEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an event and mirrors it to the tracing subscriber.
    pub fn record(&mut self, event: EngineEvent) {
        info!("event: {:?}", event);
        self.events.push(event);
    }

    /// All events recorded so far, in emission order.
    pub fn all(&self) -> &[EngineEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
