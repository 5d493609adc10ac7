//! Bridge aggregation engine
//!
//! Aggregates independent cross-chain bridge providers behind one selector
//! router, optionally swaps the sender's asset before bridging, and finalizes
//! inbound completion messages delivered by each provider's relay network.
//!
//! The engine is a synchronous library: every public entry point runs to
//! completion as one atomic unit that either fully commits or restores the
//! entry snapshot. External bridges, DEX targets, and destination tables are
//! injected collaborators; the engine owns no transport and keeps no
//! per-transfer state between a start and its asynchronous completion.

pub mod config;
pub mod engine;
pub mod errors;
pub mod events;
pub mod externals;
pub mod gate;
pub mod ledger;
pub mod providers;
pub mod registry;
pub mod resolver;
pub mod state;
pub mod swap;
pub mod types;

// Re-export commonly used types
pub use config::EngineConfig;
pub use engine::{Engine, ModuleHost};
pub use errors::EngineError;
pub use events::{EngineEvent, EventLog};
pub use ledger::AssetLedger;
pub use providers::{hyphen::HyphenModule, stargate::StargateModule, wormhole::WormholeModule};
pub use providers::EngineModule;
pub use registry::{InitCall, RegistryEntry};
pub use resolver::{DestinationParams, DestinationResolver, StaticResolver};
pub use state::EngineState;
pub use swap::{execute_swaps, SwapOutcome, SwapSeed};
pub use types::{
    is_native, native_asset, CallContext, CallOutput, CompletionPayload, InitParams, ModuleCall,
    ProviderParams, StargateParams, SwapCallData, SwapStep, TransferIntent, WormholeParams,
};
