use std::time::Duration;

use alloy_primitives::Address;
use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, ValueEnum};
use ethers::types::{Bytes as EthersBytes, TransactionRequest};
use router_calldata_encoder::{
    build_transaction,
    chains::{preset_by_name, preset_for_chain, ChainPreset},
    parse::parse_address,
    RawSwapIntent, RouteKind, SwapConfig, SwapIntent, SwapTransaction,
};
use router_commands_types::{Command, SystemClock};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::rpc::{send_with_gas_retry, to_ethers_u256, to_h160, RpcPool, SignerArgs};

const MAINNET_CHAIN_ID: u64 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Route {
    V3,
    V4,
}

/// Opcode slot for the single-hop V3 swap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum V3SwapOpcode {
    /// `0x0e`, the dApp's router table.
    Single,
    /// `0x00`, `V3_SWAP_EXACT_IN`.
    ExactIn,
}

/// Build (and optionally send) a Universal Router swap.
#[derive(Args, Debug)]
pub struct SwapArgs {
    /// Input token address (ignored with --native-in).
    #[arg(long, default_value = "")]
    token_in: String,

    /// Output token address (ignored with --native-out).
    #[arg(long, default_value = "")]
    token_out: String,

    /// Pay with the chain's native coin.
    #[arg(long)]
    native_in: bool,

    /// Receive the chain's native coin.
    #[arg(long)]
    native_out: bool,

    /// Amount in, human-readable (eg 1.5).
    #[arg(long)]
    amount_in: String,

    /// Minimum amount out, human-readable. Defaults to one base unit.
    #[arg(long)]
    min_amount_out: Option<String>,

    #[arg(long, default_value_t = 18)]
    decimals_in: u8,

    #[arg(long, default_value_t = 18)]
    decimals_out: u8,

    /// Pool fee (500, 3000, 10000). Anything else falls back to 3000.
    #[arg(long, default_value_t = 3000)]
    fee: u32,

    /// Deadline in minutes from now; omit for the no-deadline `execute` overload.
    #[arg(long)]
    deadline_minutes: Option<String>,

    #[arg(long, value_enum, default_value_t = Route::V3)]
    route: Route,

    #[arg(long, value_enum, default_value_t = V3SwapOpcode::Single)]
    v3_opcode: V3SwapOpcode,

    /// Chain preset name (mainnet, sepolia, base, arbitrum); defaults to --chain-id.
    #[arg(long)]
    chain: Option<String>,

    /// Universal Router address override.
    #[arg(long)]
    router: Option<String>,

    /// Wrapped-native token override.
    #[arg(long)]
    wrapped_native: Option<String>,

    /// Final recipient; defaults to the router's msg.sender sentinel. On V4 routes this is
    /// the SWEEP recipient unless --sweep-recipient is given.
    #[arg(long)]
    recipient: Option<String>,

    /// V4 PAY_PORTION recipient.
    #[arg(long)]
    portion_recipient: Option<String>,

    /// V4 PAY_PORTION share in basis points.
    #[arg(long, default_value_t = 0)]
    portion_bips: u16,

    /// V4 SWEEP recipient.
    #[arg(long)]
    sweep_recipient: Option<String>,

    /// Sign and broadcast the transaction.
    #[arg(long)]
    send: bool,

    #[command(flatten)]
    signer: SignerArgs,

    /// Extra gas on top of the estimate, in percent.
    #[arg(long, default_value_t = 20)]
    gas_buffer_percent: u64,

    /// Seconds to wait for the receipt.
    #[arg(long, default_value_t = 180)]
    receipt_timeout_secs: u64,
}

impl SwapArgs {
    fn raw_intent(&self) -> RawSwapIntent {
        RawSwapIntent {
            token_in: self.token_in.clone(),
            token_out: self.token_out.clone(),
            native_in: self.native_in,
            native_out: self.native_out,
            amount_in: self.amount_in.clone(),
            min_amount_out: self.min_amount_out.clone(),
            fee_tier: self.fee,
            deadline_minutes: self.deadline_minutes.clone(),
            decimals_in: self.decimals_in,
            decimals_out: self.decimals_out,
        }
    }

    fn preset(&self, chain_id: u64) -> Result<Option<&'static ChainPreset>> {
        match self.chain.as_deref() {
            Some(name) => preset_by_name(name)
                .map(Some)
                .ok_or_else(|| anyhow!("unknown chain preset `{name}`")),
            None => Ok(preset_for_chain(chain_id)),
        }
    }

    /// Router address and encoder config for `chain_id`, with flag overrides applied.
    pub fn resolve(&self, chain_id: u64) -> Result<(Address, SwapConfig)> {
        let preset = self.preset(chain_id)?;
        let optional = |flag: &Option<String>| -> Result<Option<Address>> {
            flag.as_deref().map(parse_address).transpose().map_err(Into::into)
        };

        let router = optional(&self.router)?
            .or(preset.map(|p| p.universal_router))
            .ok_or_else(|| anyhow!("no router known for chain {chain_id}; pass --router"))?;
        let wrapped_native = optional(&self.wrapped_native)?
            .or(preset.map(|p| p.wrapped_native))
            .ok_or_else(|| anyhow!("no wrapped-native token known for chain {chain_id}; pass --wrapped-native"))?;

        let defaults = SwapConfig::default();
        let recipient = optional(&self.recipient)?;
        let config = SwapConfig {
            route: match self.route {
                Route::V3 => RouteKind::V3,
                Route::V4 => RouteKind::V4,
            },
            wrapped_native,
            recipient: recipient.unwrap_or(defaults.recipient),
            v3_swap_command: match self.v3_opcode {
                V3SwapOpcode::Single => Command::V3SwapSingle,
                V3SwapOpcode::ExactIn => Command::V3SwapExactIn,
            },
            portion_recipient: optional(&self.portion_recipient)?.unwrap_or(defaults.portion_recipient),
            portion_bips: self.portion_bips,
            sweep_recipient: optional(&self.sweep_recipient)?
                .or(recipient)
                .unwrap_or(defaults.sweep_recipient),
            ..defaults
        };
        Ok((router, config))
    }
}

pub fn transaction_json(tx: &SwapTransaction) -> Value {
    let calldata = &tx.calldata;
    json!({
        "to": tx.to.to_checksum(None),
        "value": tx.value.to_string(),
        "data": calldata.to_hex(),
        "selector": format!("0x{}", hex::encode(calldata.selector)),
        "commands": format!("0x{}", hex::encode(&calldata.commands)),
        "inputs": calldata
            .inputs
            .iter()
            .map(|i| format!("0x{}", hex::encode(i)))
            .collect::<Vec<_>>(),
        "deadline": calldata.deadline.map(|d| d.to_string()),
    })
}

/// Chain the swap targets: `--chain-id`, else the `--chain` preset, else the RPC endpoint when
/// sending, else mainnet.
async fn target_chain_id(args: &SwapArgs, pool: &RpcPool, chain_id: Option<u64>) -> Result<u64> {
    let named = args
        .chain
        .as_deref()
        .map(|name| {
            preset_by_name(name)
                .map(|p| p.chain_id)
                .ok_or_else(|| anyhow!("unknown chain preset `{name}`"))
        })
        .transpose()?;

    let id = match (chain_id, named) {
        (Some(id), Some(named)) if id != named => {
            bail!("--chain is chain {named} but --chain-id is {id}")
        }
        (Some(id), _) | (None, Some(id)) => id,
        (None, None) if args.send => pool.endpoint().await?.chain_id,
        (None, None) => {
            warn!(chain_id = MAINNET_CHAIN_ID, "no --chain-id or --chain given, assuming mainnet");
            MAINNET_CHAIN_ID
        }
    };

    if args.send {
        let live = pool.endpoint().await?.chain_id;
        if live != id {
            bail!("RPC endpoint is on chain {live}, swap targets chain {id}");
        }
    }
    Ok(id)
}

pub async fn run(args: SwapArgs, pool: &RpcPool, chain_id: Option<u64>) -> Result<Value> {
    // Form validation happens before any network traffic.
    let intent = SwapIntent::parse(&args.raw_intent()).context("invalid swap input")?;

    let chain_id = target_chain_id(&args, pool, chain_id).await?;
    let (router, config) = args.resolve(chain_id)?;
    let tx = build_transaction(&intent, &config, router, &SystemClock).context("failed to encode swap")?;
    info!(
        chain_id,
        route = ?config.route,
        commands = %hex::encode(&tx.calldata.commands),
        bytes = tx.calldata.data.len(),
        "swap calldata ready"
    );

    let mut out = transaction_json(&tx);
    if !args.send {
        return Ok(out);
    }

    let client = pool.signer(args.signer.wallet()?).await?;
    let request = TransactionRequest::new()
        .to(to_h160(tx.to))
        .value(to_ethers_u256(tx.value))
        .data(EthersBytes::from(tx.calldata.data.to_vec()));
    let receipt = send_with_gas_retry(
        &client,
        request,
        args.gas_buffer_percent,
        Duration::from_secs(args.receipt_timeout_secs),
    )
    .await?;

    info!(tx = ?receipt.transaction_hash, "swap confirmed");
    out["tx_hash"] = json!(format!("{:?}", receipt.transaction_hash));
    out["gas_used"] = json!(receipt.gas_used.map(|g| g.to_string()));
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use router_calldata_encoder::SwapError;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        swap: SwapArgs,
    }

    fn parse(args: &[&str]) -> SwapArgs {
        let mut argv = vec!["swap"];
        argv.extend_from_slice(args);
        Harness::parse_from(argv).swap
    }

    #[test]
    fn resolves_presets_and_overrides() {
        let args = parse(&["--native-in", "--token-out", "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48", "--amount-in", "1"]);
        let (router, config) = args.resolve(8453).unwrap();
        let base = preset_for_chain(8453).unwrap();
        assert_eq!(router, base.universal_router);
        assert_eq!(config.wrapped_native, base.wrapped_native);

        let args = parse(&[
            "--amount-in", "1", "--router", "0x0000000000000000000000000000000000000abc", "--route", "v4",
        ]);
        let (router, config) = args.resolve(1).unwrap();
        assert_eq!(router, parse_address("0x0000000000000000000000000000000000000abc").unwrap());
        assert_eq!(config.route, RouteKind::V4);
    }

    #[test]
    fn unknown_chain_needs_explicit_router() {
        let args = parse(&["--amount-in", "1"]);
        assert!(args.resolve(31_337).is_err());
    }

    #[tokio::test]
    async fn builds_without_network_when_not_sending() {
        let args = parse(&[
            "--native-in",
            "--token-out",
            "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48",
            "--amount-in",
            "1.0",
            "--decimals-out",
            "6",
        ]);
        let pool = RpcPool::new(vec![], None);
        let out = run(args, &pool, Some(1)).await.unwrap();
        assert_eq!(out["commands"], "0x0b0e");
        assert_eq!(out["inputs"].as_array().unwrap().len(), 2);
        assert_eq!(out["value"], "1000000000000000000");
        assert!(out["deadline"].is_null());
    }

    #[tokio::test]
    async fn rejects_malformed_address_before_network() {
        let args = parse(&["--native-in", "--token-out", "not-an-address", "--amount-in", "1"]);
        let pool = RpcPool::new(vec![], None);
        let err = run(args, &pool, None).await.unwrap_err();
        assert!(err.downcast_ref::<SwapError>().is_some());
    }

    #[test]
    fn recipient_drives_v4_sweep_unless_overridden() {
        let to = "0x0000000000000000000000000000000000000def";
        let args = parse(&["--amount-in", "1", "--route", "v4", "--recipient", to]);
        let (_, config) = args.resolve(1).unwrap();
        assert_eq!(config.recipient, parse_address(to).unwrap());
        assert_eq!(config.sweep_recipient, parse_address(to).unwrap());

        let sweep = "0x0000000000000000000000000000000000000aaa";
        let args = parse(&[
            "--amount-in", "1", "--route", "v4", "--recipient", to, "--sweep-recipient", sweep,
        ]);
        let (_, config) = args.resolve(1).unwrap();
        assert_eq!(config.sweep_recipient, parse_address(sweep).unwrap());
    }

    #[tokio::test]
    async fn chain_comes_from_flags_before_falling_back_to_mainnet() {
        let pool = RpcPool::new(vec![], None);

        let args = parse(&["--amount-in", "1"]);
        assert_eq!(target_chain_id(&args, &pool, None).await.unwrap(), MAINNET_CHAIN_ID);
        assert_eq!(target_chain_id(&args, &pool, Some(8453)).await.unwrap(), 8453);

        let args = parse(&["--amount-in", "1", "--chain", "base"]);
        assert_eq!(target_chain_id(&args, &pool, None).await.unwrap(), 8453);
        assert!(target_chain_id(&args, &pool, Some(1)).await.is_err());

        let args = parse(&["--amount-in", "1", "--chain", "nowhere"]);
        assert!(target_chain_id(&args, &pool, None).await.is_err());
    }
}
