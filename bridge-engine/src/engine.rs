//! Engine facade
//!
//! The single external identity all provider modules share. Public entry
//! points run synchronously to completion: each one snapshots the journaled
//! state, executes, and restores the snapshot on any error, so a failed call
//! leaves no partial effect. External collaborators only ever see the asset
//! ledger, never the engine, which makes reentrancy structurally impossible;
//! a guard flag additionally rejects nested dispatch.

use std::collections::HashMap;
use std::sync::Arc;

use bridge_common::Selector;
use ethereum_types::{Address, U256};
use tracing::{debug, info};

use crate::errors::EngineError;
use crate::events::EngineEvent;
use crate::externals::Externals;
use crate::ledger::AssetLedger;
use crate::providers::EngineModule;
use crate::registry::{
    apply_add_or_replace, apply_remove, validate_entries, validate_removals, InitCall,
    RegistryEntry,
};
use crate::resolver::DestinationResolver;
use crate::state::EngineState;
use crate::types::{native_asset, CallContext, CallOutput, ModuleCall};

/// Per-call view handed to module handlers: the shared mutable state plus
/// read-only access to the installed modules, external contracts, and the
/// destination resolver.
pub struct ModuleHost<'a> {
    pub state: &'a mut EngineState,
    pub externals: &'a Externals,
    pub resolver: &'a dyn DestinationResolver,
    pub modules: &'a HashMap<Address, Arc<dyn EngineModule>>,
    pub engine_address: Address,
}

impl<'a> ModuleHost<'a> {
    /// Re-dispatches through the selector table with the engine itself as
    /// caller and no attached value. Used by completion paths to reach their
    /// internal finalize step.
    pub fn redispatch(
        &mut self,
        selector: Selector,
        call: ModuleCall,
    ) -> Result<CallOutput, EngineError> {
        let module_address = *self
            .state
            .routes
            .get(&selector)
            .ok_or(EngineError::SelectorNotFound(selector))?;
        let module = self
            .modules
            .get(&module_address)
            .cloned()
            .ok_or(EngineError::SelectorNotFound(selector))?;
        let ctx = CallContext::new(self.engine_address, U256::zero());
        module.handle(self, &ctx, selector, call)
    }
}

/// The dispatch/execution engine.
pub struct Engine {
    address: Address,
    state: EngineState,
    modules: HashMap<Address, Arc<dyn EngineModule>>,
    externals: Externals,
    resolver: Arc<dyn DestinationResolver>,
    in_call: bool,
}

impl Engine {
    /// Creates an engine at `address` with its injected collaborators.
    pub fn new(
        address: Address,
        externals: Externals,
        resolver: Arc<dyn DestinationResolver>,
    ) -> Self {
        Self {
            address,
            state: EngineState::new(),
            modules: HashMap::new(),
            externals,
            resolver,
            in_call: false,
        }
    }

    /// The engine's shared external identity.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Installs a module object so registry entries may route to it.
    /// Installation alone routes nothing; selectors are bound through
    /// `add_or_replace`.
    pub fn install_module(&mut self, module: Arc<dyn EngineModule>) -> Result<(), EngineError> {
        let address = module.address();
        if address.is_zero() {
            return Err(EngineError::InvalidRegistryEntry(
                "zero module address".to_string(),
            ));
        }
        if self.modules.contains_key(&address) {
            return Err(EngineError::InvalidRegistryEntry(format!(
                "module already installed at 0x{}",
                hex::encode(address.as_bytes())
            )));
        }
        info!(
            "installed module '{}' at 0x{}",
            module.name(),
            hex::encode(address.as_bytes())
        );
        self.modules.insert(address, module);
        Ok(())
    }

    // ========================================================================
    // REGISTRY MUTATION
    // ========================================================================

    /// Adds or replaces selector routes as one atomic batch, optionally
    /// issuing a one-time initializer against the newly added module. A
    /// malformed entry or a failing initializer applies nothing.
    pub fn add_or_replace(
        &mut self,
        entries: &[RegistryEntry],
        init: Option<InitCall>,
    ) -> Result<(), EngineError> {
        validate_entries(entries, &self.modules)?;
        let snapshot = self.state.clone();
        apply_add_or_replace(&mut self.state, entries);
        if let Some(init) = init {
            if let Err(err) = self.call_inner(self.address, U256::zero(), init.selector, init.call)
            {
                self.state = snapshot;
                return Err(err);
            }
        }
        Ok(())
    }

    /// Removes selector routes as one atomic batch. Naming an unrouted
    /// selector fails the whole batch.
    pub fn remove(&mut self, selectors: &[Selector]) -> Result<(), EngineError> {
        validate_removals(&self.state, selectors)?;
        apply_remove(&mut self.state, selectors);
        Ok(())
    }

    // ========================================================================
    // ALLOW-LIST MUTATION
    // ========================================================================

    /// Approves or revokes a swap call target.
    pub fn set_target_approval(&mut self, target: Address, approved: bool) {
        self.state.gate.set_target_approval(target, approved);
        self.state
            .events
            .record(EngineEvent::SwapTargetApprovalChanged { target, approved });
    }

    /// Approves or revokes a batch of swap selectors.
    pub fn set_selector_approval(&mut self, selectors: &[Selector], approved: bool) {
        for selector in selectors {
            self.state.gate.set_selector_approval(*selector, approved);
            self.state
                .events
                .record(EngineEvent::SwapSelectorApprovalChanged {
                    selector: *selector,
                    approved,
                });
        }
    }

    // ========================================================================
    // DISPATCH
    // ========================================================================

    /// Routes one call through the selector table.
    ///
    /// Moves `value` of the native asset from the caller into engine custody
    /// before the module runs; on any error the entry snapshot is restored,
    /// rolling back the value transfer, all ledger movement, and all events.
    pub fn dispatch(
        &mut self,
        caller: Address,
        value: U256,
        selector: Selector,
        call: ModuleCall,
    ) -> Result<CallOutput, EngineError> {
        if self.in_call {
            return Err(EngineError::ReentrantCall);
        }
        let snapshot = self.state.clone();
        self.in_call = true;
        let result = self.call_inner(caller, value, selector, call);
        self.in_call = false;
        if result.is_err() {
            self.state = snapshot;
        }
        result
    }

    fn call_inner(
        &mut self,
        caller: Address,
        value: U256,
        selector: Selector,
        call: ModuleCall,
    ) -> Result<CallOutput, EngineError> {
        if !value.is_zero() {
            self.state
                .ledger
                .transfer(native_asset(), caller, self.address, value)?;
        }
        let module_address = *self
            .state
            .routes
            .get(&selector)
            .ok_or(EngineError::SelectorNotFound(selector))?;
        let module = self
            .modules
            .get(&module_address)
            .cloned()
            .ok_or(EngineError::SelectorNotFound(selector))?;
        debug!(
            "dispatching {} to module '{}' at 0x{}",
            selector,
            module.name(),
            hex::encode(module_address.as_bytes())
        );
        let mut host = ModuleHost {
            state: &mut self.state,
            externals: &self.externals,
            resolver: self.resolver.as_ref(),
            modules: &self.modules,
            engine_address: self.address,
        };
        module.handle(&mut host, &CallContext::new(caller, value), selector, call)
    }

    // ========================================================================
    // HOST ACCESSORS
    // ========================================================================

    /// Read-only view of the shared state.
    pub fn state(&self) -> &EngineState {
        &self.state
    }

    /// Events recorded so far, in emission order.
    pub fn events(&self) -> &[EngineEvent] {
        self.state.events.all()
    }

    /// Read-only view of the custody book.
    pub fn ledger(&self) -> &AssetLedger {
        &self.state.ledger
    }

    /// Host-side mutable access to the custody book: seeding balances,
    /// simulating bridge deliveries. Not reachable from module code.
    pub fn ledger_mut(&mut self) -> &mut AssetLedger {
        &mut self.state.ledger
    }
}
