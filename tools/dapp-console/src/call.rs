use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{anyhow, bail, Context, Result};
use clap::Args;
use ethers::{
    abi::{
        token::{LenientTokenizer, Tokenizer},
        Abi, Function, Param, StateMutability, Token,
    },
    providers::Middleware,
    types::{Bytes as EthersBytes, TransactionRequest, U256 as EthersU256},
};
use router_calldata_encoder::parse::parse_address;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::rpc::{send_with_gas_retry, to_h160, RpcPool, SignerArgs};

/// Call a contract function through its JSON ABI.
#[derive(Args, Debug)]
pub struct CallArgs {
    /// Contract address.
    #[arg(long)]
    address: String,

    /// ABI JSON file: a plain ABI array or an artifact with an `abi` field.
    #[arg(long)]
    abi: PathBuf,

    /// Function name, or a full signature like `transfer(address,uint256)` for overloads.
    #[arg(long)]
    function: String,

    /// Function argument, repeatable, in declaration order.
    #[arg(long = "arg")]
    args: Vec<String>,

    /// Wei to attach (payable functions only).
    #[arg(long, default_value = "0")]
    value: String,

    #[command(flatten)]
    signer: SignerArgs,

    /// Extra gas on top of the estimate, in percent.
    #[arg(long, default_value_t = 20)]
    gas_buffer_percent: u64,

    /// Seconds to wait for the receipt.
    #[arg(long, default_value_t = 180)]
    receipt_timeout_secs: u64,
}

pub fn load_abi(path: &Path) -> Result<Abi> {
    let raw = fs::read_to_string(path).with_context(|| format!("failed reading {}", path.display()))?;
    abi_from_str(&raw).with_context(|| format!("failed parsing ABI in {}", path.display()))
}

fn abi_from_str(raw: &str) -> Result<Abi> {
    let value: Value = serde_json::from_str(raw)?;
    let abi = match value {
        Value::Object(mut artifact) => artifact
            .remove("abi")
            .ok_or_else(|| anyhow!("artifact has no `abi` field"))?,
        other => other,
    };
    Ok(serde_json::from_value(abi)?)
}

/// `name(type,...)` without outputs.
pub fn signature(function: &Function) -> String {
    let inputs = function
        .inputs
        .iter()
        .map(|p| p.kind.to_string())
        .collect::<Vec<_>>()
        .join(",");
    format!("{}({inputs})", function.name)
}

/// Look up a function by bare name (must be unambiguous) or by signature.
pub fn find_function<'a>(abi: &'a Abi, wanted: &str) -> Result<&'a Function> {
    let wanted = wanted.replace(' ', "");
    if let Some((name, _)) = wanted.split_once('(') {
        return abi
            .functions_by_name(name)
            .ok()
            .and_then(|fs| fs.iter().find(|f| signature(f) == wanted))
            .ok_or_else(|| anyhow!("no function matching `{wanted}` in ABI"));
    }

    let candidates = abi
        .functions_by_name(&wanted)
        .map_err(|_| anyhow!("no function named `{wanted}` in ABI"))?;
    match candidates.as_slice() {
        [only] => Ok(only),
        many => {
            let sigs = many.iter().map(signature).collect::<Vec<_>>().join(", ");
            bail!("`{wanted}` is overloaded; pass one of: {sigs}")
        }
    }
}

/// Turn CLI strings into tokens for `params`.
pub fn tokenize(params: &[Param], args: &[String]) -> Result<Vec<Token>> {
    if params.len() != args.len() {
        bail!("expected {} argument(s), got {}", params.len(), args.len());
    }
    params
        .iter()
        .zip(args)
        .map(|(param, arg)| {
            LenientTokenizer::tokenize(&param.kind, arg)
                .map_err(|e| anyhow!("argument `{}` ({}): {e}", param.name, param.kind))
        })
        .collect()
}

fn is_read_only(function: &Function) -> bool {
    matches!(
        function.state_mutability,
        StateMutability::View | StateMutability::Pure
    )
}

fn tokens_json(outputs: &[Param], tokens: &[Token]) -> Value {
    Value::Array(
        outputs
            .iter()
            .zip(tokens)
            .map(|(param, token)| {
                json!({
                    "name": param.name,
                    "type": param.kind.to_string(),
                    "value": token.to_string(),
                })
            })
            .collect(),
    )
}

pub async fn run(args: CallArgs, pool: &RpcPool) -> Result<Value> {
    let address = to_h160(parse_address(&args.address)?);
    let abi = load_abi(&args.abi)?;
    let function = find_function(&abi, &args.function)?;
    let tokens = tokenize(&function.inputs, &args.args)?;
    let data = function
        .encode_input(&tokens)
        .context("failed encoding call data")?;
    let value = EthersU256::from_dec_str(args.value.trim())
        .map_err(|e| anyhow!("invalid --value `{}`: {e}", args.value))?;
    if !value.is_zero() && !matches!(function.state_mutability, StateMutability::Payable) {
        bail!("`{}` is not payable", signature(function));
    }
    debug!(function = %signature(function), bytes = data.len(), "call data ready");

    let request = TransactionRequest::new()
        .to(address)
        .value(value)
        .data(EthersBytes::from(data));

    if is_read_only(function) {
        let endpoint = pool.endpoint().await?;
        let raw = endpoint
            .provider
            .call(&request.into(), None)
            .await
            .with_context(|| format!("eth_call to {} failed", signature(function)))?;
        let outputs = function
            .decode_output(&raw)
            .context("failed decoding return data")?;
        return Ok(json!({
            "function": signature(function),
            "outputs": tokens_json(&function.outputs, &outputs),
        }));
    }

    let client = pool.signer(args.signer.wallet()?).await?;
    let receipt = send_with_gas_retry(
        &client,
        request,
        args.gas_buffer_percent,
        Duration::from_secs(args.receipt_timeout_secs),
    )
    .await?;
    info!(tx = ?receipt.transaction_hash, function = %signature(function), "call confirmed");

    Ok(json!({
        "function": signature(function),
        "tx_hash": format!("{:?}", receipt.transaction_hash),
        "gas_used": receipt.gas_used.map(|g| g.to_string()),
    }))
}
