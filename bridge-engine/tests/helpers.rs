//! Shared test helpers for engine integration tests
//!
//! Provides dummy addresses and ids, mock external collaborators (DEX
//! targets, a Stargate router, a Hyphen pool, a Wormhole token bridge), and a
//! fully wired engine harness with all three providers installed and routed.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use bridge_common::Selector;
use ethereum_types::{Address, H256, U256};
use rand::Rng;

use bridge_engine::externals::{
    Externals, HyphenDepositCall, HyphenPool, StargateRouter, StargateSwapCall, SwapTarget,
    TargetCall, WormholeTokenBridge, WormholeTransferCall,
};
use bridge_engine::providers::hyphen::HyphenModule;
use bridge_engine::providers::stargate::StargateModule;
use bridge_engine::providers::wormhole::WormholeModule;
use bridge_engine::{
    AssetLedger, CallContext, CallOutput, Engine, EngineError, EngineModule, InitCall, InitParams,
    ModuleCall, ModuleHost, StargateParams, StaticResolver, SwapCallData, SwapStep,
    TransferIntent, WormholeParams,
};
use bridge_engine::{DestinationParams, ProviderParams};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Stargate destination used throughout the tests (Avalanche)
pub const DST_CHAIN: u64 = 43114;

/// Wormhole destination used throughout the tests (Gnosis)
pub const WORMHOLE_DST_CHAIN: u64 = 100;

/// Wormhole's own identifier for the Gnosis chain
pub const WORMHOLE_MAPPED_ID: u16 = 25;

/// LayerZero identifier for the Stargate destination
pub const LZ_CHAIN_ID: u16 = 106;

/// Native relay fee quoted by the mock Stargate router
pub const NATIVE_FEE: u64 = 1_000;

/// Rate applied by the token DEX mock: 1% taken as fee
pub const TOKEN_DEX_RATE_BPS: u64 = 9_900;

/// Rate applied by the native DEX mock: two tokens out per native in
pub const NATIVE_DEX_RATE_BPS: u64 = 20_000;

// ============================================================================
// ADDRESSES
// ============================================================================

pub fn addr(n: u64) -> Address {
    Address::from_low_u64_be(n)
}

pub fn engine_addr() -> Address {
    addr(0xE0)
}

pub fn caller_addr() -> Address {
    addr(0xCA)
}

pub fn receiver_addr() -> Address {
    addr(0xAA)
}

pub fn usdc() -> Address {
    addr(0x0C)
}

pub fn usdt() -> Address {
    addr(0x0D)
}

pub fn native() -> Address {
    Address::zero()
}

pub fn native_dex_addr() -> Address {
    addr(0xD1)
}

pub fn token_dex_addr() -> Address {
    addr(0xD2)
}

pub fn sg_router_addr() -> Address {
    addr(0x51)
}

pub fn hyphen_pool_addr() -> Address {
    addr(0x52)
}

pub fn wormhole_bridge_addr() -> Address {
    addr(0x53)
}

pub fn stargate_module_addr() -> Address {
    addr(0xA1)
}

pub fn hyphen_module_addr() -> Address {
    addr(0xA2)
}

pub fn wormhole_module_addr() -> Address {
    addr(0xA3)
}

pub fn correlation_id(n: u64) -> H256 {
    H256::from_low_u64_be(n)
}

/// Caller-style random correlation id; uniqueness is never enforced.
pub fn random_correlation_id() -> H256 {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill(&mut bytes[..]);
    H256(bytes)
}

// ============================================================================
// SWAP SELECTORS
// ============================================================================

pub fn sel_swap_native() -> Selector {
    Selector::from_signature("swapExactETHForTokens(uint256,address[],address,uint256)")
}

pub fn sel_swap_tokens() -> Selector {
    Selector::from_signature("swapExactTokensForTokens(uint256,uint256,address[],address,uint256)")
}

// ============================================================================
// MOCK EXTERNAL COLLABORATORS
// ============================================================================

/// Fixed-rate DEX. Token input is pulled through the allowance granted to the
/// DEX address; native input arrives as call value. Output is paid from the
/// DEX's own ledger inventory so the executor's balance-delta accounting is
/// exercised honestly.
pub struct MockDex {
    pub address: Address,
    pub asset_in: Address,
    pub asset_out: Address,
    pub rate_bps: u64,
    pub fail_with: Option<String>,
}

impl SwapTarget for MockDex {
    fn call(&self, ledger: &mut AssetLedger, call: TargetCall<'_>) -> Result<(), EngineError> {
        if let Some(message) = &self.fail_with {
            return Err(EngineError::External(message.clone()));
        }
        let amount_in = if call.value.is_zero() {
            let allowance = ledger.allowance(call.caller, self.address, self.asset_in);
            ledger.transfer_from(self.asset_in, call.caller, self.address, self.address, allowance)?;
            allowance
        } else {
            // Native input was already moved to us as call value.
            call.value
        };
        let amount_out = amount_in * U256::from(self.rate_bps) / U256::from(10_000u64);
        ledger.transfer(self.asset_out, self.address, call.caller, amount_out)
    }
}

/// One recorded Stargate router swap.
#[derive(Debug, Clone)]
pub struct StargateSwapRecord {
    pub asset: Address,
    pub amount: U256,
    pub dst_chain_id: u16,
    pub src_pool_id: u64,
    pub dst_pool_id: u64,
    pub receiver: Address,
    pub call_to: Address,
    pub call_data: Vec<u8>,
    pub fee_value: U256,
    pub min_amount_ld: U256,
}

/// Stargate router mock with a fixed LayerZero fee quote.
pub struct MockStargateRouter {
    pub address: Address,
    pub native_fee: U256,
    pub zro_fee: U256,
    pub swaps: Mutex<Vec<StargateSwapRecord>>,
}

impl MockStargateRouter {
    pub fn new(address: Address, native_fee: u64) -> Self {
        Self {
            address,
            native_fee: U256::from(native_fee),
            zro_fee: U256::zero(),
            swaps: Mutex::new(Vec::new()),
        }
    }

    pub fn recorded(&self) -> Vec<StargateSwapRecord> {
        self.swaps.lock().unwrap().clone()
    }
}

impl StargateRouter for MockStargateRouter {
    fn quote_layer_zero_fee(
        &self,
        _dst_chain_id: u16,
        _dst_gas_for_call: u64,
        _payload: &[u8],
    ) -> Result<(U256, U256), EngineError> {
        Ok((self.native_fee, self.zro_fee))
    }

    fn swap(
        &self,
        ledger: &mut AssetLedger,
        call: StargateSwapCall<'_>,
    ) -> Result<(), EngineError> {
        if call.fee_value < self.native_fee {
            return Err(EngineError::External(
                "LayerZero: not enough native for fees".to_string(),
            ));
        }
        if call.min_amount_ld > call.amount {
            return Err(EngineError::External("Stargate: slippage too high".to_string()));
        }
        ledger.transfer_from(call.asset, call.caller, self.address, self.address, call.amount)?;
        self.swaps.lock().unwrap().push(StargateSwapRecord {
            asset: call.asset,
            amount: call.amount,
            dst_chain_id: call.dst_chain_id,
            src_pool_id: call.src_pool_id,
            dst_pool_id: call.dst_pool_id,
            receiver: call.receiver,
            call_to: call.call_to,
            call_data: call.call_data.to_vec(),
            fee_value: call.fee_value,
            min_amount_ld: call.min_amount_ld,
        });
        Ok(())
    }
}

/// One recorded Hyphen pool deposit.
#[derive(Debug, Clone)]
pub struct HyphenDepositRecord {
    pub token: Address,
    pub receiver: Address,
    pub to_chain_id: u64,
    pub amount: U256,
    pub native: bool,
    pub tag: String,
}

/// Hyphen liquidity pool mock.
pub struct MockHyphenPool {
    pub address: Address,
    pub deposits: Mutex<Vec<HyphenDepositRecord>>,
}

impl MockHyphenPool {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            deposits: Mutex::new(Vec::new()),
        }
    }

    pub fn recorded(&self) -> Vec<HyphenDepositRecord> {
        self.deposits.lock().unwrap().clone()
    }
}

impl HyphenPool for MockHyphenPool {
    fn deposit_erc20(
        &self,
        ledger: &mut AssetLedger,
        call: HyphenDepositCall,
    ) -> Result<(), EngineError> {
        ledger.transfer_from(call.token, call.caller, self.address, self.address, call.amount)?;
        self.deposits.lock().unwrap().push(HyphenDepositRecord {
            token: call.token,
            receiver: call.receiver,
            to_chain_id: call.to_chain_id,
            amount: call.amount,
            native: false,
            tag: call.tag,
        });
        Ok(())
    }

    fn deposit_native(
        &self,
        _ledger: &mut AssetLedger,
        call: HyphenDepositCall,
    ) -> Result<(), EngineError> {
        // The deposit already arrived as call value.
        self.deposits.lock().unwrap().push(HyphenDepositRecord {
            token: call.token,
            receiver: call.receiver,
            to_chain_id: call.to_chain_id,
            amount: call.amount,
            native: true,
            tag: call.tag,
        });
        Ok(())
    }
}

/// One recorded Wormhole token bridge transfer.
#[derive(Debug, Clone)]
pub struct WormholeTransferRecord {
    pub asset: Address,
    pub amount: U256,
    pub recipient_chain: u16,
    pub recipient: Address,
    pub arbiter_fee: U256,
    pub nonce: u32,
    pub wrapped: bool,
}

/// Wormhole token bridge mock.
pub struct MockWormholeBridge {
    pub address: Address,
    pub sequence: Mutex<u64>,
    pub transfers: Mutex<Vec<WormholeTransferRecord>>,
}

impl MockWormholeBridge {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            sequence: Mutex::new(0),
            transfers: Mutex::new(Vec::new()),
        }
    }

    pub fn recorded(&self) -> Vec<WormholeTransferRecord> {
        self.transfers.lock().unwrap().clone()
    }

    fn record(&self, call: WormholeTransferCall, wrapped: bool) -> u64 {
        self.transfers.lock().unwrap().push(WormholeTransferRecord {
            asset: call.asset,
            amount: call.amount,
            recipient_chain: call.recipient_chain,
            recipient: call.recipient,
            arbiter_fee: call.arbiter_fee,
            nonce: call.nonce,
            wrapped,
        });
        let mut seq = self.sequence.lock().unwrap();
        *seq += 1;
        *seq
    }
}

impl WormholeTokenBridge for MockWormholeBridge {
    fn transfer_tokens(
        &self,
        ledger: &mut AssetLedger,
        call: WormholeTransferCall,
    ) -> Result<u64, EngineError> {
        if call.arbiter_fee > call.amount {
            return Err(EngineError::External(
                "transfer amount is less than the arbiter fee".to_string(),
            ));
        }
        ledger.transfer_from(call.asset, call.caller, self.address, self.address, call.amount)?;
        Ok(self.record(call, false))
    }

    fn wrap_and_transfer(
        &self,
        _ledger: &mut AssetLedger,
        call: WormholeTransferCall,
    ) -> Result<u64, EngineError> {
        if call.arbiter_fee > call.amount {
            return Err(EngineError::External(
                "transfer amount is less than the arbiter fee".to_string(),
            ));
        }
        // The amount already arrived as call value.
        Ok(self.record(call, true))
    }
}

/// Minimal routable module used by registry tests. Answers fee quotes with a
/// marker value so tests can observe which module a selector routes to.
pub struct PingModule {
    pub address: Address,
    pub marker: u64,
}

impl EngineModule for PingModule {
    fn address(&self) -> Address {
        self.address
    }

    fn name(&self) -> &'static str {
        "ping"
    }

    fn selectors(&self) -> Vec<Selector> {
        vec![Selector::from_signature("ping()")]
    }

    fn handle(
        &self,
        _host: &mut ModuleHost<'_>,
        _ctx: &CallContext,
        _selector: Selector,
        call: ModuleCall,
    ) -> Result<CallOutput, EngineError> {
        match call {
            ModuleCall::QuoteFee { .. } => Ok(CallOutput::FeeQuote {
                native_fee: U256::from(self.marker),
                aux_fee: U256::zero(),
            }),
            other => Err(EngineError::InvalidCallData(format!(
                "ping module cannot handle {:?}",
                other
            ))),
        }
    }
}

pub fn ping_selector() -> Selector {
    Selector::from_signature("ping()")
}

// ============================================================================
// ENGINE HARNESS
// ============================================================================

/// A fully wired engine with all three providers installed, initialized, and
/// routed, mock collaborators registered, the DEX allow-listed, and caller
/// balances seeded.
pub struct Harness {
    pub engine: Engine,
    pub native_dex: Arc<MockDex>,
    pub token_dex: Arc<MockDex>,
    pub sg_router: Arc<MockStargateRouter>,
    pub hyphen_pool: Arc<MockHyphenPool>,
    pub wormhole_bridge: Arc<MockWormholeBridge>,
}

pub fn build_harness() -> Harness {
    let native_dex = Arc::new(MockDex {
        address: native_dex_addr(),
        asset_in: native(),
        asset_out: usdc(),
        rate_bps: NATIVE_DEX_RATE_BPS,
        fail_with: None,
    });
    let token_dex = Arc::new(MockDex {
        address: token_dex_addr(),
        asset_in: usdc(),
        asset_out: usdt(),
        rate_bps: TOKEN_DEX_RATE_BPS,
        fail_with: None,
    });
    let sg_router = Arc::new(MockStargateRouter::new(sg_router_addr(), NATIVE_FEE));
    let hyphen_pool = Arc::new(MockHyphenPool::new(hyphen_pool_addr()));
    let wormhole_bridge = Arc::new(MockWormholeBridge::new(wormhole_bridge_addr()));

    let mut externals = Externals::new();
    externals.register_swap_target(native_dex_addr(), native_dex.clone());
    externals.register_swap_target(token_dex_addr(), token_dex.clone());
    externals.register_stargate_router(sg_router_addr(), sg_router.clone());
    externals.register_hyphen_pool(hyphen_pool_addr(), hyphen_pool.clone());
    externals.register_wormhole_bridge(wormhole_bridge_addr(), wormhole_bridge.clone());

    let mut resolver = StaticResolver::new();
    resolver.insert(
        "stargate",
        DST_CHAIN,
        DestinationParams {
            router: sg_router_addr(),
            fee_asset: native(),
            pools: [(usdc(), 1u64), (usdt(), 2u64)].into_iter().collect(),
            messaging_chain_id: LZ_CHAIN_ID,
            aux_addresses: Vec::new(),
        },
    );
    resolver.insert(
        "hyphen",
        DST_CHAIN,
        DestinationParams {
            router: hyphen_pool_addr(),
            ..Default::default()
        },
    );
    resolver.insert(
        "wormhole",
        WORMHOLE_DST_CHAIN,
        DestinationParams {
            router: wormhole_bridge_addr(),
            ..Default::default()
        },
    );
    // Resolvable wormhole destination that is deliberately left unmapped in
    // the chain translation table.
    resolver.insert(
        "wormhole",
        250,
        DestinationParams {
            router: wormhole_bridge_addr(),
            ..Default::default()
        },
    );

    let mut engine = Engine::new(engine_addr(), externals, Arc::new(resolver));

    let stargate = Arc::new(StargateModule::new(stargate_module_addr()));
    let entries = stargate.registry_entries();
    engine.install_module(stargate).unwrap();
    engine
        .add_or_replace(
            &entries,
            Some(InitCall {
                selector: StargateModule::init_selector(),
                call: ModuleCall::Init(InitParams::Stargate {
                    router: sg_router_addr(),
                }),
            }),
        )
        .unwrap();

    let hyphen = Arc::new(HyphenModule::new(hyphen_module_addr()));
    let entries = hyphen.registry_entries();
    engine.install_module(hyphen).unwrap();
    engine
        .add_or_replace(
            &entries,
            Some(InitCall {
                selector: HyphenModule::init_selector(),
                call: ModuleCall::Init(InitParams::Hyphen {
                    relay: hyphen_pool_addr(),
                }),
            }),
        )
        .unwrap();

    let wormhole = Arc::new(WormholeModule::new(wormhole_module_addr()));
    let entries = wormhole.registry_entries();
    engine.install_module(wormhole).unwrap();
    engine
        .add_or_replace(
            &entries,
            Some(InitCall {
                selector: WormholeModule::init_selector(),
                call: ModuleCall::Init(InitParams::Wormhole {
                    token_bridge: wormhole_bridge_addr(),
                }),
            }),
        )
        .unwrap();
    engine
        .dispatch(
            caller_addr(),
            U256::zero(),
            WormholeModule::set_chain_mapping_selector(),
            ModuleCall::SetChainMapping {
                chain_id: WORMHOLE_DST_CHAIN,
                mapped: WORMHOLE_MAPPED_ID,
            },
        )
        .unwrap();

    engine.set_target_approval(native_dex_addr(), true);
    engine.set_target_approval(token_dex_addr(), true);
    engine.set_selector_approval(&[sel_swap_native(), sel_swap_tokens()], true);

    let ledger = engine.ledger_mut();
    ledger.credit(caller_addr(), usdc(), U256::from(100_000_000u64));
    ledger.credit(caller_addr(), native(), U256::from(100_000_000u64));
    ledger.credit(native_dex_addr(), usdc(), U256::from(1_000_000_000u64));
    ledger.credit(token_dex_addr(), usdt(), U256::from(1_000_000_000u64));
    ledger.approve(caller_addr(), engine_addr(), usdc(), U256::from(u64::MAX));
    ledger.approve(caller_addr(), engine_addr(), usdt(), U256::from(u64::MAX));

    Harness {
        engine,
        native_dex,
        token_dex,
        sg_router,
        hyphen_pool,
        wormhole_bridge,
    }
}

// ============================================================================
// CALL BUILDERS
// ============================================================================

/// Default USDC intent toward the Stargate/Hyphen test destination.
pub fn usdc_intent(amount: u64) -> TransferIntent {
    TransferIntent {
        correlation_id: correlation_id(1),
        integrator: "ACME Devs".to_string(),
        referrer: Address::zero(),
        sending_asset: usdc(),
        receiving_asset: usdc(),
        receiver: receiver_addr(),
        destination_chain_id: DST_CHAIN,
        amount: U256::from(amount),
    }
}

/// Default Stargate parameters: pool 1, no slippage floor, no destination call.
pub fn sg_params() -> StargateParams {
    StargateParams {
        dst_pool_id: 1,
        min_amount_ld: U256::zero(),
        dst_gas_for_call: 0,
        call_to: Address::zero(),
        call_data: Vec::new(),
    }
}

pub fn wormhole_params(arbiter_fee: u64, nonce: u32) -> WormholeParams {
    WormholeParams {
        arbiter_fee: U256::from(arbiter_fee),
        nonce,
    }
}

/// Swap step converting native into USDC through the native DEX mock.
pub fn native_to_usdc_step(from_amount: u64) -> SwapStep {
    SwapStep {
        target: native_dex_addr(),
        approve_target: native_dex_addr(),
        sending_asset: native(),
        receiving_asset: usdc(),
        from_amount: U256::from(from_amount),
        call_data: SwapCallData {
            selector: sel_swap_native(),
            payload: Vec::new(),
        },
        requires_deposit: false,
    }
}

/// Swap step converting USDC into USDT through the token DEX mock.
pub fn usdc_to_usdt_step(from_amount: u64, requires_deposit: bool) -> SwapStep {
    SwapStep {
        target: token_dex_addr(),
        approve_target: token_dex_addr(),
        sending_asset: usdc(),
        receiving_asset: usdt(),
        from_amount: U256::from(from_amount),
        call_data: SwapCallData {
            selector: sel_swap_tokens(),
            payload: Vec::new(),
        },
        requires_deposit,
    }
}

/// Dispatches a quote-fee call and unwraps the quoted pair.
pub fn quote(engine: &mut Engine, selector: Selector, destination: u64, params: ProviderParams) -> (U256, U256) {
    match engine
        .dispatch(
            caller_addr(),
            U256::zero(),
            selector,
            ModuleCall::QuoteFee {
                destination_chain_id: destination,
                params,
            },
        )
        .unwrap()
    {
        CallOutput::FeeQuote {
            native_fee,
            aux_fee,
        } => (native_fee, aux_fee),
        other => panic!("expected a fee quote, got {:?}", other),
    }
}

/// Opt-in tracing output for debugging a test run.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_test_writer()
        .try_init();
}
