//! Module registry
//!
//! The selector -> module dispatch table and its batch mutation rules. A
//! batch either fully applies or fully fails: entries are validated against
//! the installed module set before any route changes, and an initializer
//! failure rolls the applied batch back at the engine facade.

use std::collections::HashMap;
use std::sync::Arc;

use bridge_common::Selector;
use ethereum_types::Address;

use crate::errors::EngineError;
use crate::events::EngineEvent;
use crate::providers::EngineModule;
use crate::state::EngineState;
use crate::types::ModuleCall;

/// One selector binding in a registry mutation batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryEntry {
    pub selector: Selector,
    pub module: Address,
}

/// Optional one-time initializer dispatched against a freshly registered
/// module, with the engine itself as caller.
#[derive(Debug, Clone)]
pub struct InitCall {
    pub selector: Selector,
    pub call: ModuleCall,
}

/// Rejects malformed entries before anything is applied: zero selectors,
/// zero module addresses, and addresses with no installed module object.
pub(crate) fn validate_entries(
    entries: &[RegistryEntry],
    installed: &HashMap<Address, Arc<dyn EngineModule>>,
) -> Result<(), EngineError> {
    for entry in entries {
        if entry.selector.is_zero() {
            return Err(EngineError::InvalidRegistryEntry(
                "zero selector".to_string(),
            ));
        }
        if entry.module.is_zero() {
            return Err(EngineError::InvalidRegistryEntry(format!(
                "zero module address for selector {}",
                entry.selector
            )));
        }
        if !installed.contains_key(&entry.module) {
            return Err(EngineError::InvalidRegistryEntry(format!(
                "no installed module at 0x{} for selector {}",
                hex::encode(entry.module.as_bytes()),
                entry.selector
            )));
        }
    }
    Ok(())
}

/// Applies a validated add-or-replace batch to the route table.
pub(crate) fn apply_add_or_replace(state: &mut EngineState, entries: &[RegistryEntry]) {
    for entry in entries {
        match state.routes.insert(entry.selector, entry.module) {
            None => state.events.record(EngineEvent::RouteAdded {
                selector: entry.selector,
                module: entry.module,
            }),
            Some(previous) if previous != entry.module => {
                state.events.record(EngineEvent::RouteReplaced {
                    selector: entry.selector,
                    previous,
                    module: entry.module,
                })
            }
            Some(_) => {}
        }
    }
}

/// Rejects removal batches naming selectors that are not currently routed.
pub(crate) fn validate_removals(
    state: &EngineState,
    selectors: &[Selector],
) -> Result<(), EngineError> {
    for selector in selectors {
        if !state.routes.contains_key(selector) {
            return Err(EngineError::SelectorNotFound(*selector));
        }
    }
    Ok(())
}

/// Applies a validated removal batch to the route table.
pub(crate) fn apply_remove(state: &mut EngineState, selectors: &[Selector]) {
    for selector in selectors {
        if let Some(previous) = state.routes.remove(selector) {
            state.events.record(EngineEvent::RouteRemoved {
                selector: *selector,
                previous,
            });
        }
    }
}
