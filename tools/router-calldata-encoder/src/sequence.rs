use alloy_primitives::{
    aliases::{I24, U24},
    Address, Bytes, U256,
};
use router_commands_types::{
    constants::{ADDRESS_THIS, BIPS_BASE, OPEN_DELTA},
    Command, FeeTier,
};
use tracing::debug;

use crate::{
    abi::PoolKey,
    encoder::{encode_v3_path, exact_input_single, CommandParams, V4ActionParams},
    errors::{SwapError, ValidationError},
    types::{CommandSequence, RouteKind, SwapConfig, SwapIntent, TokenRef},
};

/// Turn a swap intent into the ordered router program for `config.route`.
pub fn build_sequence(
    intent: &SwapIntent,
    config: &SwapConfig,
) -> Result<CommandSequence, SwapError> {
    if intent.amount_in.is_zero() {
        return Err(ValidationError::ZeroAmount.into());
    }

    let sequence = match config.route {
        RouteKind::V3 => build_v3(intent, config)?,
        RouteKind::V4 => build_v4(intent, config)?,
    };

    debug!(
        route = ?config.route,
        commands = ?sequence.commands(),
        "built router command sequence"
    );
    Ok(sequence)
}

fn min_amount_out(intent: &SwapIntent, config: &SwapConfig) -> U256 {
    intent.min_amount_out.unwrap_or(config.default_min_amount_out)
}

/// `[WRAP_ETH] → V3 swap → [UNWRAP_WETH]`.
fn build_v3(intent: &SwapIntent, config: &SwapConfig) -> Result<CommandSequence, SwapError> {
    if !matches!(
        config.v3_swap_command,
        Command::V3SwapSingle | Command::V3SwapExactIn
    ) {
        return Err(ValidationError::UnsupportedSwapCommand(config.v3_swap_command).into());
    }

    let token_in = intent.token_in.v3_address(config.wrapped_native);
    let token_out = intent.token_out.v3_address(config.wrapped_native);
    if token_in == token_out {
        return Err(ValidationError::IdenticalTokens.into());
    }

    let native_in = intent.token_in.is_native();
    let native_out = intent.token_out.is_native();
    let min_out = min_amount_out(intent, config);
    let mut sequence = CommandSequence::default();

    if native_in {
        sequence.push(
            CommandParams::WrapEth {
                recipient: ADDRESS_THIS,
                amount_min: intent.amount_in,
            }
            .encode(),
        );
    }

    sequence.push(
        CommandParams::V3SwapExactIn {
            command: config.v3_swap_command,
            // Output stays in the router when it still has to be unwrapped.
            recipient: if native_out { ADDRESS_THIS } else { config.recipient },
            amount_in: intent.amount_in,
            amount_out_min: min_out,
            path: encode_v3_path(&[token_in, token_out], &[intent.fee_tier.fee()]),
            // Wrapped input is already held by the router.
            payer_is_user: !native_in,
        }
        .encode(),
    );

    if native_out {
        sequence.push(
            CommandParams::UnwrapWeth {
                recipient: config.recipient,
                amount_min: min_out,
            }
            .encode(),
        );
    }

    Ok(sequence)
}

/// Sorted V4 pool key for the pair; the second value is `zeroForOne`.
pub fn v4_pool_key(
    token_in: TokenRef,
    token_out: TokenRef,
    fee_tier: FeeTier,
    hooks: Address,
) -> (PoolKey, bool) {
    let currency_in = token_in.v4_currency();
    let currency_out = token_out.v4_currency();
    let zero_for_one = currency_in < currency_out;
    let (currency0, currency1) = if zero_for_one {
        (currency_in, currency_out)
    } else {
        (currency_out, currency_in)
    };

    // Every spacing in the fee table fits in int24.
    let tick_spacing = I24::try_from(fee_tier.tick_spacing()).unwrap_or(I24::ONE);

    let key = PoolKey {
        currency0,
        currency1,
        fee: U24::from(fee_tier.fee()),
        tickSpacing: tick_spacing,
        hooks,
    };
    (key, zero_for_one)
}

/// Fixed triad `V4_SWAP → PAY_PORTION → SWEEP`.
///
/// The swap settles the input and takes the output into the router; the portion and the sweep
/// then distribute whatever the router holds of the output currency.
fn build_v4(intent: &SwapIntent, config: &SwapConfig) -> Result<CommandSequence, SwapError> {
    if config.portion_bips > BIPS_BASE {
        return Err(ValidationError::InvalidBips(config.portion_bips).into());
    }

    let currency_in = intent.token_in.v4_currency();
    let currency_out = intent.token_out.v4_currency();
    if currency_in == currency_out {
        return Err(ValidationError::IdenticalTokens.into());
    }

    let min_out = min_amount_out(intent, config);
    let (pool_key, zero_for_one) =
        v4_pool_key(intent.token_in, intent.token_out, intent.fee_tier, config.v4_hooks);
    let swap = exact_input_single(
        pool_key,
        zero_for_one,
        intent.amount_in,
        min_out,
        Bytes::new(),
    )?;

    let mut sequence = CommandSequence::default();
    sequence.push(
        CommandParams::V4Swap {
            actions: vec![
                V4ActionParams::SwapExactInSingle(swap),
                V4ActionParams::SettleAll {
                    currency: currency_in,
                    max_amount: intent.amount_in,
                },
                V4ActionParams::Take {
                    currency: currency_out,
                    recipient: ADDRESS_THIS,
                    amount: OPEN_DELTA,
                },
            ],
        }
        .encode(),
    );
    sequence.push(
        CommandParams::PayPortion {
            token: currency_out,
            recipient: config.portion_recipient,
            bips: U256::from(config.portion_bips),
        }
        .encode(),
    );
    sequence.push(
        CommandParams::Sweep {
            token: currency_out,
            recipient: config.sweep_recipient,
            amount_min: min_out,
        }
        .encode(),
    );

    Ok(sequence)
}
