//! Router-side address sentinels (`ActionConstants` in the router contracts).

use alloy_primitives::{address, Address, U256};

/// Recipient sentinel resolved by the router to `msg.sender`.
pub const MSG_SENDER: Address = address!("0000000000000000000000000000000000000001");

/// Recipient sentinel resolved by the router to itself.
pub const ADDRESS_THIS: Address = address!("0000000000000000000000000000000000000002");

/// Amount sentinel: take/settle whatever delta is open.
pub const OPEN_DELTA: U256 = U256::ZERO;

/// Marker the swap form uses for the chain's native coin.
pub const NATIVE_MARKER: Address = address!("eeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee");

/// Pay-portion denominator.
pub const BIPS_BASE: u16 = 10_000;
