//! Shared Universal Router types used by the calldata encoder and the console.

pub mod clock;
pub mod constants;
pub mod fees;
pub mod opcodes;

pub use clock::{Clock, FixedClock, SystemClock};
pub use fees::{tick_spacing_for_fee, FeeTier, DEFAULT_TICK_SPACING};
pub use opcodes::{Action, Command, COMMAND_TYPE_MASK, FLAG_ALLOW_REVERT};
