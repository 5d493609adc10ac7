//! Engine error taxonomy
//!
//! Every validation failure aborts the enclosing call with no partial state
//! change. Errors raised by external collaborators (DEX targets, bridge
//! routers) are carried verbatim in `External` rather than wrapped, so the
//! original diagnostic reaches the caller.

use bridge_common::Selector;
use ethereum_types::{Address, U256};
use thiserror::Error;

/// Errors produced by the dispatch/execution engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Transfer amount was zero.
    #[error("transfer amount must be greater than zero")]
    InvalidAmount,

    /// Receiver was the zero address.
    #[error("receiver must not be the zero address")]
    InvalidReceiver,

    /// Completion path invoked by an untrusted or non-self caller.
    #[error("caller 0x{} is not authorized for this entry point", hex::encode(.0.as_bytes()))]
    InvalidCaller(Address),

    /// Caller lacks funds or allowance for the requested movement.
    #[error("insufficient balance or allowance: need {needed}, have {available}")]
    InsufficientBalance { needed: U256, available: U256 },

    /// Attached native value is below the quoted relay fee.
    #[error("attached fee {provided} is below the required fee {required}")]
    InsufficientFee { required: U256, provided: U256 },

    /// No resolver entry for the destination chain.
    #[error("destination chain {0} is not supported")]
    DestinationNotSupported(u64),

    /// Router dispatch miss.
    #[error("no module registered for selector {0}")]
    SelectorNotFound(Selector),

    /// Swap target or selector is not allow-listed.
    #[error("contract call not allowed: target 0x{}, selector {selector}", hex::encode(.target.as_bytes()))]
    ContractCallNotAllowed { target: Address, selector: Selector },

    /// A registry batch contained a zero selector, a zero module address, or
    /// an address with no installed module.
    #[error("invalid registry entry: {0}")]
    InvalidRegistryEntry(String),

    /// One-time module initializer was invoked more than once.
    #[error("module is already initialized")]
    AlreadyInitialized,

    /// Swap execution was requested with an empty step list.
    #[error("no swap steps provided")]
    NoSwapDataProvided,

    /// Call arguments or payload bytes did not match the expected schema.
    #[error("invalid call data: {0}")]
    InvalidCallData(String),

    /// A nested dispatch was attempted while another call was in progress.
    #[error("reentrant call rejected")]
    ReentrantCall,

    /// Error raised by an external collaborator, forwarded unmodified.
    #[error("{0}")]
    External(String),
}
