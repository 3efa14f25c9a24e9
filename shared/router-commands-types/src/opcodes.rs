/// Bit flag on a command byte telling the router to continue when that command reverts.
pub const FLAG_ALLOW_REVERT: u8 = 0x80;

/// The low five bits of a command byte hold the command type.
pub const COMMAND_TYPE_MASK: u8 = 0x1f;

/// Top-level Universal Router commands (one byte each in `execute(commands, ...)`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command {
    V3SwapExactIn = 0x00,
    V3SwapExactOut = 0x01,

    Sweep = 0x04,
    Transfer = 0x05,
    PayPortion = 0x06,

    V2SwapExactIn = 0x08,
    V2SwapExactOut = 0x09,

    WrapEth = 0x0b,
    UnwrapWeth = 0x0c,

    /// Single-hop V3 swap slot used by the dApp's router table.
    V3SwapSingle = 0x0e,

    V4Swap = 0x10,
}

/// Sub-actions carried inside a `V4Swap` input (`abi.encode(bytes actions, bytes[] params)`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Action {
    SwapExactInSingle = 0x06,
    SwapExactIn = 0x07,
    SwapExactOutSingle = 0x08,
    SwapExactOut = 0x09,

    Settle = 0x0b,
    SettleAll = 0x0c,

    Take = 0x0e,
    TakeAll = 0x0f,
}

impl Command {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        use Command::*;
        match self {
            V3SwapExactIn => "V3_SWAP_EXACT_IN",
            V3SwapExactOut => "V3_SWAP_EXACT_OUT",
            Sweep => "SWEEP",
            Transfer => "TRANSFER",
            PayPortion => "PAY_PORTION",
            V2SwapExactIn => "V2_SWAP_EXACT_IN",
            V2SwapExactOut => "V2_SWAP_EXACT_OUT",
            WrapEth => "WRAP_ETH",
            UnwrapWeth => "UNWRAP_WETH",
            V3SwapSingle => "V3_SWAP_SINGLE",
            V4Swap => "V4_SWAP",
        }
    }
}

impl Action {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl core::fmt::Display for Command {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}(0x{:02x})", self.name(), self.as_u8())
    }
}

impl TryFrom<u8> for Command {
    type Error = u8;

    /// Flag bits are stripped before lookup; the unknown type byte is returned on failure.
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        use Command::*;
        let op = match value & COMMAND_TYPE_MASK {
            0x00 => V3SwapExactIn,
            0x01 => V3SwapExactOut,
            0x04 => Sweep,
            0x05 => Transfer,
            0x06 => PayPortion,
            0x08 => V2SwapExactIn,
            0x09 => V2SwapExactOut,
            0x0b => WrapEth,
            0x0c => UnwrapWeth,
            0x0e => V3SwapSingle,
            0x10 => V4Swap,
            other => return Err(other),
        };
        Ok(op)
    }
}

impl TryFrom<u8> for Action {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        use Action::*;
        let action = match value {
            0x06 => SwapExactInSingle,
            0x07 => SwapExactIn,
            0x08 => SwapExactOutSingle,
            0x09 => SwapExactOut,
            0x0b => Settle,
            0x0c => SettleAll,
            0x0e => Take,
            0x0f => TakeAll,
            other => return Err(other),
        };
        Ok(action)
    }
}
