//! Swap executor
//!
//! Runs an ordered sequence of external calls against allow-listed targets
//! under bounded, reset-after-use allowances. Step outputs are measured as
//! realized balance deltas, never taken from call return data. Any step
//! failure aborts the enclosing call; the engine's entry snapshot rolls all
//! prior steps back.

use ethereum_types::{Address, U256};
use tracing::debug;

use crate::errors::EngineError;
use crate::events::EngineEvent;
use crate::externals::{Externals, TargetCall};
use crate::state::EngineState;
use crate::types::{is_native, native_asset, SwapStep};

/// Funding injected into the first step by a completion path: the asset and
/// amount delivered by the external bridge, already in engine custody.
#[derive(Debug, Clone, Copy)]
pub struct SwapSeed {
    pub asset: Address,
    pub amount: U256,
}

/// Resulting asset and realized amount of a swap sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapOutcome {
    pub asset: Address,
    pub amount: U256,
}

/// Executes `steps` in order on behalf of `caller`.
///
/// With a `seed`, the first step's declared amount is overridden with the
/// seeded amount and its deposit flag is ignored: the funds are already in
/// engine custody, delivered by a bridge. Without a seed, steps marked
/// `requires_deposit` pull their funding from the caller first.
pub fn execute_swaps(
    state: &mut EngineState,
    externals: &Externals,
    engine_address: Address,
    caller: Address,
    steps: &[SwapStep],
    seed: Option<SwapSeed>,
) -> Result<SwapOutcome, EngineError> {
    if steps.is_empty() {
        return Err(EngineError::NoSwapDataProvided);
    }
    if let Some(seed) = &seed {
        if steps[0].sending_asset != seed.asset {
            return Err(EngineError::InvalidCallData(format!(
                "first swap step consumes {:?} but the arrived asset is {:?}",
                steps[0].sending_asset, seed.asset
            )));
        }
    }

    let mut outcome = SwapOutcome {
        asset: steps[0].sending_asset,
        amount: U256::zero(),
    };

    for (index, step) in steps.iter().enumerate() {
        let seeded = index == 0 && seed.is_some();
        let from_amount = match (seeded, &seed) {
            (true, Some(seed)) => seed.amount,
            _ => step.from_amount,
        };

        // 1. Pull funding from the caller when the step asks for it. Seeded
        //    steps already hold their funding in engine custody.
        if step.requires_deposit && !seeded {
            if is_native(&step.sending_asset) {
                state
                    .ledger
                    .transfer(native_asset(), caller, engine_address, from_amount)?;
            } else {
                state.ledger.transfer_from(
                    step.sending_asset,
                    caller,
                    engine_address,
                    engine_address,
                    from_amount,
                )?;
            }
        }

        // 2. Grant exactly the step amount; native funding travels as call
        //    value instead of an allowance.
        let call_value = if is_native(&step.sending_asset) {
            from_amount
        } else {
            state.ledger.approve(
                engine_address,
                step.approve_target,
                step.sending_asset,
                from_amount,
            );
            U256::zero()
        };

        // 3. Gate check immediately before the call.
        if !state
            .gate
            .is_call_allowed(&step.target, &step.call_data.selector)
        {
            return Err(EngineError::ContractCallNotAllowed {
                target: step.target,
                selector: step.call_data.selector,
            });
        }
        let target = externals
            .swap_target(&step.target)
            .ok_or(EngineError::ContractCallNotAllowed {
                target: step.target,
                selector: step.call_data.selector,
            })?;

        // 4. Invoke the target and measure the realized output as a balance
        //    delta. Errors from the target propagate verbatim.
        let balance_before = state.ledger.balance_of(engine_address, step.receiving_asset);
        if !call_value.is_zero() {
            state
                .ledger
                .transfer(native_asset(), engine_address, step.target, call_value)?;
        }
        target.call(
            &mut state.ledger,
            TargetCall {
                caller: engine_address,
                selector: step.call_data.selector,
                payload: &step.call_data.payload,
                value: call_value,
            },
        )?;

        // 5. Reset the allowance to zero immediately after use.
        if !is_native(&step.sending_asset) {
            state.ledger.approve(
                engine_address,
                step.approve_target,
                step.sending_asset,
                U256::zero(),
            );
        }

        let balance_after = state.ledger.balance_of(engine_address, step.receiving_asset);
        let received = balance_after
            .checked_sub(balance_before)
            .unwrap_or_default();

        debug!(
            "swap step {}: {:?} -> {:?}, in {}, out {}",
            index, step.sending_asset, step.receiving_asset, from_amount, received
        );

        state.events.record(EngineEvent::AssetSwapped {
            sending_asset: step.sending_asset,
            receiving_asset: step.receiving_asset,
            from_amount,
            received_amount: received,
        });

        outcome = SwapOutcome {
            asset: step.receiving_asset,
            amount: received,
        };
    }

    Ok(outcome)
}
