use alloy_primitives::U256;

/// Malformed user input (addresses, hex, amounts).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("invalid address `{0}`")]
    InvalidAddress(String),
    #[error("address `{0}` has an invalid checksum")]
    BadChecksum(String),
    #[error("invalid amount `{value}`: {reason}")]
    InvalidAmount { value: String, reason: String },
    #[error("invalid integer `{0}`")]
    InvalidInteger(String),
    #[error("invalid hex string: {0}")]
    InvalidHex(String),
}

/// A swap intent that is well-formed but incomplete or inconsistent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("amount in must be greater than zero")]
    ZeroAmount,
    #[error("input and output token are the same")]
    IdenticalTokens,
    #[error("portion of {0} bips exceeds 10000")]
    InvalidBips(u16),
    #[error("{0} cannot be used as the V3 swap command")]
    UnsupportedSwapCommand(router_commands_types::Command),
}

/// Failure while producing the binary payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodingError {
    #[error("`{field}` value {value} does not fit in uint128")]
    AmountOverflow { field: &'static str, value: U256 },
    #[error("command sequence is empty")]
    EmptySequence,
}

/// Any failure between form input and finished calldata.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SwapError {
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

/// Errors while decoding `execute` calldata or command inputs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("unknown selector 0x{}", hex::encode(.0))]
    UnknownSelector([u8; 4]),
    #[error("unknown command type 0x{0:02x}")]
    UnknownCommand(u8),
    #[error("unknown v4 action 0x{0:02x}")]
    UnknownAction(u8),
    #[error("input truncated")]
    Truncated,
    #[error("more than {0} commands")]
    TooManyCommands(usize),
    #[error("{commands} commands but {inputs} inputs")]
    LengthMismatch { commands: usize, inputs: usize },
    #[error("abi decoding failed: {0}")]
    Abi(String),
}

impl From<alloy_sol_types::Error> for DecodeError {
    fn from(err: alloy_sol_types::Error) -> Self {
        DecodeError::Abi(err.to_string())
    }
}
