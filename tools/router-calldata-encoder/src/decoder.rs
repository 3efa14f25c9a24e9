use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{SolCall, SolValue};
use router_commands_types::{Action, Command};

use crate::{
    abi::{with_deadline, without_deadline, ExactInputSingleParams},
    calldata::{EXECUTE_SELECTOR, EXECUTE_WITH_DEADLINE_SELECTOR},
    errors::DecodeError,
    types::Calldata,
};

const MAX_COMMANDS_DEFAULT: usize = 64;

/// Human-readable view of one command input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecodedCommand {
    WrapEth {
        recipient: Address,
        amount_min: U256,
    },
    UnwrapWeth {
        recipient: Address,
        amount_min: U256,
    },
    V3SwapExactIn {
        command: Command,
        recipient: Address,
        amount_in: U256,
        amount_out_min: U256,
        path: V3Path,
        payer_is_user: bool,
    },
    V4Swap {
        actions: Vec<DecodedAction>,
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
    /// Known command whose input layout is not decoded here.
    Opaque {
        command: Command,
        input: Bytes,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecodedAction {
    SwapExactInSingle(ExactInputSingleParams),
    SettleAll { currency: Address, max_amount: U256 },
    Take { currency: Address, recipient: Address, amount: U256 },
    Opaque { action: Action, params: Bytes },
}

/// Hops of a packed V3 path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct V3Path {
    pub tokens: Vec<Address>,
    pub fees: Vec<u32>,
}

/// Decode `execute` calldata back into its commands, inputs and optional deadline.
pub fn decode_execute(data: &[u8]) -> Result<Calldata, DecodeError> {
    if data.len() < 4 {
        return Err(DecodeError::Truncated);
    }
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&data[..4]);

    let (commands, inputs, deadline) = match selector {
        EXECUTE_WITH_DEADLINE_SELECTOR => {
            let call = with_deadline::executeCall::abi_decode(data)?;
            (call.commands, call.inputs, Some(call.deadline))
        }
        EXECUTE_SELECTOR => {
            let call = without_deadline::executeCall::abi_decode(data)?;
            (call.commands, call.inputs, None)
        }
        other => return Err(DecodeError::UnknownSelector(other)),
    };

    decode_commands(&commands)?;
    if commands.len() != inputs.len() {
        return Err(DecodeError::LengthMismatch {
            commands: commands.len(),
            inputs: inputs.len(),
        });
    }

    Ok(Calldata {
        selector,
        commands,
        inputs,
        deadline,
        data: Bytes::copy_from_slice(data),
    })
}

/// Decode command bytes into bounded commands.
pub fn decode_commands(bytes: &[u8]) -> Result<Vec<Command>, DecodeError> {
    decode_commands_with_limit(bytes, MAX_COMMANDS_DEFAULT)
}

pub fn decode_commands_with_limit(bytes: &[u8], max_commands: usize) -> Result<Vec<Command>, DecodeError> {
    if bytes.len() > max_commands {
        return Err(DecodeError::TooManyCommands(max_commands));
    }
    bytes
        .iter()
        .map(|b| Command::try_from(*b).map_err(DecodeError::UnknownCommand))
        .collect()
}

/// Decode one command input per its router layout.
pub fn describe(command: Command, input: &[u8]) -> Result<DecodedCommand, DecodeError> {
    let decoded = match command {
        Command::WrapEth => {
            let (recipient, amount_min) = <(Address, U256)>::abi_decode_params(input)?;
            DecodedCommand::WrapEth { recipient, amount_min }
        }
        Command::UnwrapWeth => {
            let (recipient, amount_min) = <(Address, U256)>::abi_decode_params(input)?;
            DecodedCommand::UnwrapWeth { recipient, amount_min }
        }
        Command::V3SwapExactIn | Command::V3SwapSingle => {
            let (recipient, amount_in, amount_out_min, path, payer_is_user) =
                <(Address, U256, U256, Bytes, bool)>::abi_decode_params(input)?;
            DecodedCommand::V3SwapExactIn {
                command,
                recipient,
                amount_in,
                amount_out_min,
                path: decode_v3_path(&path)?,
                payer_is_user,
            }
        }
        Command::V4Swap => {
            let (actions, params) = <(Bytes, Vec<Bytes>)>::abi_decode_params(input)?;
            if actions.len() != params.len() {
                return Err(DecodeError::LengthMismatch {
                    commands: actions.len(),
                    inputs: params.len(),
                });
            }
            let actions = actions
                .iter()
                .zip(params.iter())
                .map(|(a, p)| describe_action(*a, p))
                .collect::<Result<Vec<_>, _>>()?;
            DecodedCommand::V4Swap { actions }
        }
        Command::Sweep => {
            let (token, recipient, amount_min) = <(Address, Address, U256)>::abi_decode_params(input)?;
            DecodedCommand::Sweep { token, recipient, amount_min }
        }
        Command::PayPortion => {
            let (token, recipient, bips) = <(Address, Address, U256)>::abi_decode_params(input)?;
            DecodedCommand::PayPortion { token, recipient, bips }
        }
        _ => DecodedCommand::Opaque {
            command,
            input: Bytes::copy_from_slice(input),
        },
    };
    Ok(decoded)
}

fn describe_action(byte: u8, params: &[u8]) -> Result<DecodedAction, DecodeError> {
    let action = Action::try_from(byte).map_err(DecodeError::UnknownAction)?;
    let decoded = match action {
        Action::SwapExactInSingle => {
            DecodedAction::SwapExactInSingle(<ExactInputSingleParams as SolValue>::abi_decode(params)?)
        }
        Action::SettleAll => {
            let (currency, max_amount) = <(Address, U256)>::abi_decode_params(params)?;
            DecodedAction::SettleAll { currency, max_amount }
        }
        Action::Take => {
            let (currency, recipient, amount) = <(Address, Address, U256)>::abi_decode_params(params)?;
            DecodedAction::Take { currency, recipient, amount }
        }
        _ => DecodedAction::Opaque {
            action,
            params: Bytes::copy_from_slice(params),
        },
    };
    Ok(decoded)
}

/// Split a packed `token ‖ fee ‖ token ‖ ...` path.
pub fn decode_v3_path(bytes: &[u8]) -> Result<V3Path, DecodeError> {
    let mut i = 0usize;
    let mut tokens = vec![read_address(bytes, &mut i)?];
    let mut fees = Vec::new();
    while i < bytes.len() {
        fees.push(read_u24(bytes, &mut i)?);
        tokens.push(read_address(bytes, &mut i)?);
    }
    Ok(V3Path { tokens, fees })
}

fn read_address(bytes: &[u8], i: &mut usize) -> Result<Address, DecodeError> {
    if bytes.len() < *i + 20 {
        return Err(DecodeError::Truncated);
    }
    let addr = Address::from_slice(&bytes[*i..*i + 20]);
    *i += 20;
    Ok(addr)
}

fn read_u24(bytes: &[u8], i: &mut usize) -> Result<u32, DecodeError> {
    if bytes.len() < *i + 3 {
        return Err(DecodeError::Truncated);
    }
    let mut buf = [0u8; 4];
    buf[1..].copy_from_slice(&bytes[*i..*i + 3]);
    *i += 3;
    Ok(u32::from_be_bytes(buf))
}
