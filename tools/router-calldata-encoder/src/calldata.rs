use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;
use router_commands_types::Clock;

use crate::{
    abi::{with_deadline, without_deadline},
    encoder::encode_commands,
    errors::{EncodingError, SwapError},
    sequence::build_sequence,
    types::{Calldata, CommandSequence, SwapConfig, SwapIntent, SwapTransaction},
};

pub const EXECUTE_WITH_DEADLINE_SELECTOR: [u8; 4] = with_deadline::executeCall::SELECTOR;
pub const EXECUTE_SELECTOR: [u8; 4] = without_deadline::executeCall::SELECTOR;

/// Unix deadline `minutes` from the clock's now.
pub fn deadline_after<C: Clock>(clock: &C, minutes: u64) -> U256 {
    let secs = minutes.saturating_mul(60);
    U256::from(clock.now_unix().saturating_add(secs))
}

/// Encode `execute(commands, inputs[, deadline])`. The overload follows `deadline`.
///
/// Each step carries its own input, so the two arrays always have the same length.
pub fn finalize(sequence: &CommandSequence, deadline: Option<U256>) -> Result<Calldata, EncodingError> {
    if sequence.is_empty() {
        return Err(EncodingError::EmptySequence);
    }
    let commands = encode_commands(&sequence.commands());
    let inputs = sequence.inputs();

    let (selector, data) = match deadline {
        Some(deadline) => {
            let call = with_deadline::executeCall {
                commands: commands.clone(),
                inputs: inputs.clone(),
                deadline,
            };
            (EXECUTE_WITH_DEADLINE_SELECTOR, call.abi_encode())
        }
        None => {
            let call = without_deadline::executeCall {
                commands: commands.clone(),
                inputs: inputs.clone(),
            };
            (EXECUTE_SELECTOR, call.abi_encode())
        }
    };

    Ok(Calldata {
        selector,
        commands,
        inputs,
        deadline,
        data: Bytes::from(data),
    })
}

/// Intent → sequence → calldata. Output only varies with the clock when a deadline is set.
pub fn build_calldata<C: Clock>(
    intent: &SwapIntent,
    config: &SwapConfig,
    clock: &C,
) -> Result<Calldata, SwapError> {
    let sequence = build_sequence(intent, config)?;
    let deadline = intent.deadline_minutes.map(|m| deadline_after(clock, m));
    Ok(finalize(&sequence, deadline)?)
}

/// Calldata plus the `to`/`value` fields a wallet needs; native input is sent as value.
pub fn build_transaction<C: Clock>(
    intent: &SwapIntent,
    config: &SwapConfig,
    router: Address,
    clock: &C,
) -> Result<SwapTransaction, SwapError> {
    let calldata = build_calldata(intent, config, clock)?;
    let value = if intent.token_in.is_native() {
        intent.amount_in
    } else {
        U256::ZERO
    };
    Ok(SwapTransaction {
        to: router,
        value,
        calldata,
    })
}
