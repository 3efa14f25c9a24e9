//! Validation of swap-form strings into typed values.
//!
//! Everything here runs before any network call; a failure means the user has to fix the form.

use std::str::FromStr;

use alloy_primitives::{utils::parse_units, Address, Bytes, U256};
use router_commands_types::{constants::NATIVE_MARKER, FeeTier};

use crate::{
    errors::{FormatError, SwapError, ValidationError},
    types::{RawSwapIntent, SwapIntent, TokenRef},
};

/// Parse a `0x` address. Mixed-case input must carry a valid EIP-55 checksum.
pub fn parse_address(input: &str) -> Result<Address, FormatError> {
    let s = input.trim();
    let digits = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
    if digits.len() != 40 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(FormatError::InvalidAddress(input.to_string()));
    }

    let has_lower = digits.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = digits.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper {
        let prefixed = format!("0x{digits}");
        return Address::parse_checksummed(&prefixed, None)
            .map_err(|_| FormatError::BadChecksum(input.to_string()));
    }

    Address::from_str(digits).map_err(|_| FormatError::InvalidAddress(input.to_string()))
}

/// Resolve one side of the swap form. Returns `Ok(None)` when the field is empty and not native.
pub fn parse_token(input: &str, native: bool) -> Result<Option<TokenRef>, FormatError> {
    if native {
        return Ok(Some(TokenRef::Native));
    }
    let s = input.trim();
    if s.is_empty() {
        return Ok(None);
    }
    let addr = parse_address(s)?;
    if addr == NATIVE_MARKER {
        return Ok(Some(TokenRef::Native));
    }
    Ok(Some(TokenRef::Erc20(addr)))
}

/// Parse a decimal amount like `"1.25"` into base units with `decimals` places.
pub fn parse_amount(input: &str, decimals: u8) -> Result<U256, FormatError> {
    let s = input.trim();
    let invalid = |reason: &str| FormatError::InvalidAmount {
        value: input.to_string(),
        reason: reason.to_string(),
    };

    if s.is_empty() {
        return Err(invalid("empty"));
    }
    if s.starts_with('-') {
        return Err(invalid("negative"));
    }
    if let Some((_, frac)) = s.split_once('.') {
        if frac.len() > decimals as usize {
            return Err(invalid("more fractional digits than the token has decimals"));
        }
    }

    parse_units(s, decimals)
        .map(|parsed| parsed.get_absolute())
        .map_err(|e| invalid(&e.to_string()))
}

/// Parse a `0x`-prefixed (or bare) hex string into bytes.
pub fn parse_hex_bytes(input: &str) -> Result<Bytes, FormatError> {
    let s = input.trim();
    let digits = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(digits)
        .map(Bytes::from)
        .map_err(|e| FormatError::InvalidHex(e.to_string()))
}

fn parse_minutes(input: Option<&str>) -> Result<Option<u64>, FormatError> {
    match input.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s
            .parse::<u64>()
            .map(Some)
            .map_err(|_| FormatError::InvalidInteger(s.to_string())),
    }
}

impl SwapIntent {
    /// Validate form input. Missing tokens are a [`ValidationError`]; malformed values a
    /// [`FormatError`].
    pub fn parse(raw: &RawSwapIntent) -> Result<Self, SwapError> {
        let token_in = parse_token(&raw.token_in, raw.native_in)?
            .ok_or(ValidationError::MissingField("token_in"))?;
        let token_out = parse_token(&raw.token_out, raw.native_out)?
            .ok_or(ValidationError::MissingField("token_out"))?;

        if raw.amount_in.trim().is_empty() {
            return Err(ValidationError::MissingField("amount_in").into());
        }
        let amount_in = parse_amount(&raw.amount_in, raw.decimals_in)?;
        if amount_in.is_zero() {
            return Err(ValidationError::ZeroAmount.into());
        }

        let min_amount_out = match raw.min_amount_out.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(s) => Some(parse_amount(s, raw.decimals_out)?),
        };

        Ok(SwapIntent {
            token_in,
            token_out,
            amount_in,
            min_amount_out,
            fee_tier: FeeTier::from_fee_or_default(raw.fee_tier),
            deadline_minutes: parse_minutes(raw.deadline_minutes.as_deref())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USDC: &str = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48";

    #[test]
    fn accepts_checksummed_and_lowercase() {
        let a = parse_address(USDC).unwrap();
        let b = parse_address(&USDC.to_lowercase()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_bad_checksum() {
        let broken = USDC.replace("A0b8", "a0B8");
        assert!(matches!(parse_address(&broken), Err(FormatError::BadChecksum(_))));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            parse_address("not-an-address"),
            Err(FormatError::InvalidAddress(_))
        ));
        assert!(parse_address("0x1234").is_err());
    }

    #[test]
    fn parses_decimal_amounts() {
        assert_eq!(
            parse_amount("1.0", 18).unwrap(),
            U256::from(1_000_000_000_000_000_000u128)
        );
        assert_eq!(parse_amount("2.5", 6).unwrap(), U256::from(2_500_000u64));
        assert!(parse_amount("-1", 18).is_err());
        assert!(parse_amount("0.0000001", 6).is_err());
        assert!(parse_amount("abc", 18).is_err());
    }

    #[test]
    fn native_marker_address_is_native() {
        let token = parse_token("0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE", false).unwrap();
        assert_eq!(token, Some(TokenRef::Native));
    }

    #[test]
    fn hex_bytes_accept_prefix() {
        assert_eq!(parse_hex_bytes("0x6080").unwrap().as_ref(), &[0x60, 0x80]);
        assert_eq!(parse_hex_bytes("6080").unwrap().as_ref(), &[0x60, 0x80]);
        assert!(matches!(parse_hex_bytes("0xzz"), Err(FormatError::InvalidHex(_))));
    }
}
