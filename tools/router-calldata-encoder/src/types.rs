use alloy_primitives::{address, Address, Bytes, U256};
use router_commands_types::{constants::MSG_SENDER, Command, FeeTier};

/// Smallest positive output accepted by the generated swaps when the intent carries no minimum.
///
/// The swap form never derived a minimum from a slippage tolerance; callers that want price
/// protection must pass `min_amount_out` explicitly.
pub const DEFAULT_MIN_AMOUNT_OUT: U256 = U256::from_limbs([1, 0, 0, 0]);

/// Mainnet WETH9.
pub const MAINNET_WETH: Address = address!("c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2");

/// One side of a swap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenRef {
    Native,
    Erc20(Address),
}

impl TokenRef {
    pub fn is_native(&self) -> bool {
        matches!(self, TokenRef::Native)
    }

    /// Address used in V3 paths: native resolves to the wrapped-native token.
    pub fn v3_address(&self, wrapped_native: Address) -> Address {
        match self {
            TokenRef::Native => wrapped_native,
            TokenRef::Erc20(addr) => *addr,
        }
    }

    /// V4 currency: native is `address(0)`.
    pub fn v4_currency(&self) -> Address {
        match self {
            TokenRef::Native => Address::ZERO,
            TokenRef::Erc20(addr) => *addr,
        }
    }
}

/// Swap form fields as typed by the user, before validation.
#[derive(Clone, Debug, Default)]
pub struct RawSwapIntent {
    pub token_in: String,
    pub token_out: String,
    pub native_in: bool,
    pub native_out: bool,
    /// Human-readable amount, e.g. `"1.5"`.
    pub amount_in: String,
    pub min_amount_out: Option<String>,
    pub fee_tier: u32,
    pub deadline_minutes: Option<String>,
    pub decimals_in: u8,
    pub decimals_out: u8,
}

/// Validated swap request handed to the sequence builder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwapIntent {
    pub token_in: TokenRef,
    pub token_out: TokenRef,
    /// Base units of `token_in`.
    pub amount_in: U256,
    /// Base units of `token_out`; `None` falls back to [`SwapConfig::default_min_amount_out`].
    pub min_amount_out: Option<U256>,
    pub fee_tier: FeeTier,
    pub deadline_minutes: Option<u64>,
}

/// Which router path the sequence builder emits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RouteKind {
    #[default]
    V3,
    V4,
}

/// Knobs the swap form hard-coded, made explicit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwapConfig {
    pub route: RouteKind,
    /// Chain's canonical wrapped-native token, substituted for native sides in V3 paths.
    pub wrapped_native: Address,
    /// Final recipient of swapped or unwrapped funds on V3 routes. V4 routes pay out through
    /// `portion_recipient` and `sweep_recipient` only.
    pub recipient: Address,
    /// Opcode emitted for the single-hop V3 swap step.
    pub v3_swap_command: Command,
    pub default_min_amount_out: U256,
    pub v4_hooks: Address,
    /// `PAY_PORTION` recipient on V4 routes.
    pub portion_recipient: Address,
    pub portion_bips: u16,
    /// `SWEEP` recipient on V4 routes.
    pub sweep_recipient: Address,
}

impl Default for SwapConfig {
    fn default() -> Self {
        Self {
            route: RouteKind::V3,
            wrapped_native: MAINNET_WETH,
            recipient: MSG_SENDER,
            v3_swap_command: Command::V3SwapSingle,
            default_min_amount_out: DEFAULT_MIN_AMOUNT_OUT,
            v4_hooks: Address::ZERO,
            portion_recipient: MSG_SENDER,
            portion_bips: 0,
            sweep_recipient: MSG_SENDER,
        }
    }
}

/// One `(command, input)` pair of the router program.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedCommand {
    pub command: Command,
    pub input: Bytes,
}

/// Ordered router program; execution order is vector order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommandSequence {
    pub steps: Vec<EncodedCommand>,
}

impl CommandSequence {
    pub fn push(&mut self, step: EncodedCommand) {
        self.steps.push(step);
    }

    pub fn commands(&self) -> Vec<Command> {
        self.steps.iter().map(|s| s.command).collect()
    }

    pub fn inputs(&self) -> Vec<Bytes> {
        self.steps.iter().map(|s| s.input.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Selector choice for the overloaded `execute` entrypoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectorVariant {
    WithDeadline,
    WithoutDeadline,
}

/// Finished `execute` payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Calldata {
    pub selector: [u8; 4],
    pub commands: Bytes,
    pub inputs: Vec<Bytes>,
    pub deadline: Option<U256>,
    /// Selector followed by the ABI-encoded arguments.
    pub data: Bytes,
}

impl Calldata {
    pub fn variant(&self) -> SelectorVariant {
        if self.deadline.is_some() {
            SelectorVariant::WithDeadline
        } else {
            SelectorVariant::WithoutDeadline
        }
    }

    /// `0x`-prefixed lowercase hex of [`Calldata::data`].
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.data))
    }
}

/// Transaction fields for a wallet `eth_sendTransaction`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwapTransaction {
    pub to: Address,
    pub value: U256,
    pub calldata: Calldata,
}
