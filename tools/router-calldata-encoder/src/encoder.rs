use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolValue;
use router_commands_types::{Action, Command};

use crate::{
    abi::{ExactInputSingleParams, PoolKey},
    errors::EncodingError,
    types::EncodedCommand,
};

/// Concatenate one byte per command, in execution order.
pub fn encode_commands(steps: &[Command]) -> Bytes {
    steps.iter().map(|c| c.as_u8()).collect::<Vec<u8>>().into()
}

/// Concatenate V4 action bytes.
pub fn encode_actions(actions: &[Action]) -> Bytes {
    actions.iter().map(|a| a.as_u8()).collect::<Vec<u8>>().into()
}

/// Packed V3 path `token ‖ uint24 fee ‖ token ‖ ...`.
///
/// `fees.len()` must be `tokens.len() - 1`.
pub fn encode_v3_path(tokens: &[Address], fees: &[u32]) -> Bytes {
    debug_assert_eq!(tokens.len(), fees.len() + 1);
    let mut buf = Vec::with_capacity(tokens.len() * 20 + fees.len() * 3);
    for (i, token) in tokens.iter().enumerate() {
        buf.extend_from_slice(token.as_slice());
        if let Some(fee) = fees.get(i) {
            buf.extend_from_slice(&fee.to_be_bytes()[1..]);
        }
    }
    buf.into()
}

/// Typed parameters of one V4 action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum V4ActionParams {
    SwapExactInSingle(ExactInputSingleParams),
    SettleAll { currency: Address, max_amount: U256 },
    Take { currency: Address, recipient: Address, amount: U256 },
}

impl V4ActionParams {
    pub fn action(&self) -> Action {
        match self {
            V4ActionParams::SwapExactInSingle(_) => Action::SwapExactInSingle,
            V4ActionParams::SettleAll { .. } => Action::SettleAll,
            V4ActionParams::Take { .. } => Action::Take,
        }
    }

    pub fn encode(&self) -> Bytes {
        match self {
            // The router reads the struct as a single dynamic parameter, offset word included.
            V4ActionParams::SwapExactInSingle(params) => params.abi_encode().into(),
            V4ActionParams::SettleAll { currency, max_amount } => {
                (*currency, *max_amount).abi_encode_params().into()
            }
            V4ActionParams::Take { currency, recipient, amount } => {
                (*currency, *recipient, *amount).abi_encode_params().into()
            }
        }
    }
}

/// Build the V4 single-pool exact-in swap struct, narrowing amounts to `uint128`.
pub fn exact_input_single(
    pool_key: PoolKey,
    zero_for_one: bool,
    amount_in: U256,
    amount_out_min: U256,
    hook_data: Bytes,
) -> Result<ExactInputSingleParams, EncodingError> {
    Ok(ExactInputSingleParams {
        poolKey: pool_key,
        zeroForOne: zero_for_one,
        amountIn: to_u128("amount_in", amount_in)?,
        amountOutMinimum: to_u128("amount_out_min", amount_out_min)?,
        hookData: hook_data,
    })
}

fn to_u128(field: &'static str, value: U256) -> Result<u128, EncodingError> {
    if value > U256::from(u128::MAX) {
        return Err(EncodingError::AmountOverflow { field, value });
    }
    Ok(value.to::<u128>())
}

/// Input tuple of one router command, in the router's documented field order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandParams {
    WrapEth {
        recipient: Address,
        amount_min: U256,
    },
    UnwrapWeth {
        recipient: Address,
        amount_min: U256,
    },
    /// Exact-in V3 swap; `command` picks the opcode slot (`V3SwapExactIn` or `V3SwapSingle`).
    V3SwapExactIn {
        command: Command,
        recipient: Address,
        amount_in: U256,
        amount_out_min: U256,
        path: Bytes,
        payer_is_user: bool,
    },
    V4Swap {
        actions: Vec<V4ActionParams>,
    },
    Sweep {
        token: Address,
        recipient: Address,
        amount_min: U256,
    },
    PayPortion {
        token: Address,
        recipient: Address,
        bips: U256,
    },
}

impl CommandParams {
    pub fn command(&self) -> Command {
        match self {
            CommandParams::WrapEth { .. } => Command::WrapEth,
            CommandParams::UnwrapWeth { .. } => Command::UnwrapWeth,
            CommandParams::V3SwapExactIn { command, .. } => *command,
            CommandParams::V4Swap { .. } => Command::V4Swap,
            CommandParams::Sweep { .. } => Command::Sweep,
            CommandParams::PayPortion { .. } => Command::PayPortion,
        }
    }

    /// Encode as `abi.encode(field0, field1, ...)`, the layout the router decodes each input with.
    pub fn encode(&self) -> EncodedCommand {
        let input: Vec<u8> = match self {
            CommandParams::WrapEth { recipient, amount_min }
            | CommandParams::UnwrapWeth { recipient, amount_min } => {
                (*recipient, *amount_min).abi_encode_params()
            }
            CommandParams::V3SwapExactIn {
                recipient,
                amount_in,
                amount_out_min,
                path,
                payer_is_user,
                ..
            } => (
                *recipient,
                *amount_in,
                *amount_out_min,
                path.clone(),
                *payer_is_user,
            )
                .abi_encode_params(),
            CommandParams::V4Swap { actions } => {
                let kinds: Vec<Action> = actions.iter().map(V4ActionParams::action).collect();
                let params: Vec<Bytes> = actions.iter().map(V4ActionParams::encode).collect();
                (encode_actions(&kinds), params).abi_encode_params()
            }
            CommandParams::Sweep { token, recipient, amount_min } => {
                (*token, *recipient, *amount_min).abi_encode_params()
            }
            CommandParams::PayPortion { token, recipient, bips } => {
                (*token, *recipient, *bips).abi_encode_params()
            }
        };

        EncodedCommand {
            command: self.command(),
            input: input.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{
        address,
        aliases::{I24, U24},
    };

    const WETH: Address = address!("c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2");
    const USDC: Address = address!("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48");

    #[test]
    fn commands_are_one_byte_each() {
        let bytes = encode_commands(&[Command::WrapEth, Command::V3SwapSingle, Command::UnwrapWeth]);
        assert_eq!(bytes.as_ref(), &[0x0b, 0x0e, 0x0c]);
        assert_eq!(hex::encode(&bytes), "0b0e0c");
    }

    #[test]
    fn v3_path_packs_fee_as_uint24() {
        let path = encode_v3_path(&[WETH, USDC], &[3000]);
        assert_eq!(path.len(), 43);
        assert_eq!(&path[..20], WETH.as_slice());
        assert_eq!(&path[20..23], &[0x00, 0x0b, 0xb8]);
        assert_eq!(&path[23..], USDC.as_slice());
    }

    #[test]
    fn wrap_input_is_two_static_words() {
        let step = CommandParams::WrapEth {
            recipient: Address::with_last_byte(2),
            amount_min: U256::from(5u64),
        }
        .encode();
        assert_eq!(step.command, Command::WrapEth);
        assert_eq!(step.input.len(), 64);
        assert_eq!(step.input[31], 2);
        assert_eq!(step.input[63], 5);
    }

    #[test]
    fn v3_swap_input_has_no_outer_offset() {
        let step = CommandParams::V3SwapExactIn {
            command: Command::V3SwapSingle,
            recipient: Address::with_last_byte(1),
            amount_in: U256::from(100u64),
            amount_out_min: U256::from(1u64),
            path: encode_v3_path(&[WETH, USDC], &[500]),
            payer_is_user: true,
        }
        .encode();
        // head: recipient, amountIn, amountOutMin, offset(path), payerIsUser
        assert_eq!(step.input[31], 1);
        assert_eq!(U256::from_be_slice(&step.input[96..128]), U256::from(160u64));
        assert_eq!(step.input[159], 1);
        // tail: length word then 43 path bytes padded to 64
        assert_eq!(U256::from_be_slice(&step.input[160..192]), U256::from(43u64));
        assert_eq!(step.input.len(), 160 + 32 + 64);
    }

    #[test]
    fn exact_input_single_rejects_oversized_amounts() {
        let key = PoolKey {
            currency0: USDC,
            currency1: WETH,
            fee: U24::from(3000u32),
            tickSpacing: I24::try_from(60i32).unwrap(),
            hooks: Address::ZERO,
        };
        let err = exact_input_single(key, true, U256::MAX, U256::from(1u64), Bytes::new())
            .unwrap_err();
        assert!(matches!(err, EncodingError::AmountOverflow { field: "amount_in", .. }));
    }
}
