use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{anyhow, bail, Context, Result};
use clap::Args;
use ethers::{
    abi::Abi,
    types::{Bytes as EthersBytes, TransactionReceipt, TransactionRequest},
};
use router_calldata_encoder::parse::parse_hex_bytes;
use serde::Serialize;
use serde_json::{json, Value};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tracing::{debug, info};

use crate::{
    call::{load_abi, tokenize},
    rpc::{send_with_gas_retry, RpcPool, SignerArgs},
};

/// Deploy raw creation bytecode, then write/update a deployments JSON.
#[derive(Args, Debug)]
pub struct DeployArgs {
    /// Creation bytecode as a hex string.
    #[arg(long, conflicts_with = "bytecode_file", required_unless_present = "bytecode_file")]
    bytecode: Option<String>,

    /// File with creation bytecode: raw hex, or a Foundry/Hardhat artifact JSON.
    #[arg(long)]
    bytecode_file: Option<PathBuf>,

    /// ABI-encoded constructor arguments to append (hex).
    #[arg(long, conflicts_with = "constructor_arg")]
    constructor_args: Option<String>,

    /// ABI JSON (or artifact) used to encode --constructor-arg values.
    #[arg(long)]
    abi: Option<PathBuf>,

    /// Constructor argument, repeatable, in declaration order.
    #[arg(long = "constructor-arg", requires = "abi")]
    constructor_arg: Vec<String>,

    #[command(flatten)]
    signer: SignerArgs,

    /// Path to write deployment info (eg, deployments.sepolia.json).
    #[arg(long, default_value = "deployments.json")]
    deployments_path: PathBuf,

    /// Key under `deployments` to store this contract.
    #[arg(long, default_value = "contract")]
    contract_key: String,

    /// Optional network name recorded in the deployments file.
    #[arg(long, default_value = "devnet")]
    network: String,

    /// Extra gas on top of the estimate, in percent.
    #[arg(long, default_value_t = 20)]
    gas_buffer_percent: u64,

    /// Seconds to wait for the receipt.
    #[arg(long, default_value_t = 300)]
    receipt_timeout_secs: u64,
}

/// What lands in the deployments JSON for one contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentRecord {
    pub address: String,
    pub tx_hash: String,
    pub chain_id: u64,
    pub rpc_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_used: Option<String>,
}

impl DeploymentRecord {
    fn from_receipt(receipt: &TransactionReceipt, chain_id: u64, rpc_url: &str) -> Result<Self> {
        let address = receipt
            .contract_address
            .ok_or_else(|| anyhow!("receipt has no contract address"))?;
        Ok(Self {
            address: format!("{address:?}"),
            tx_hash: format!("{:?}", receipt.transaction_hash),
            chain_id,
            rpc_url: rpc_url.to_string(),
            gas_used: receipt.gas_used.map(|g| g.to_string()),
        })
    }
}

/// Read creation code from a hex string or a file (raw hex or artifact JSON).
pub fn load_bytecode(inline: Option<&str>, file: Option<&Path>) -> Result<Vec<u8>> {
    let text = match (inline, file) {
        (Some(hex), _) => hex.to_string(),
        (None, Some(path)) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed reading {}", path.display()))?;
            bytecode_from_file_contents(&raw)
                .with_context(|| format!("no bytecode found in {}", path.display()))?
        }
        (None, None) => bail!("provide --bytecode or --bytecode-file"),
    };

    let code = parse_hex_bytes(&text)?.to_vec();
    if code.is_empty() {
        bail!("bytecode is empty");
    }
    Ok(code)
}

fn bytecode_from_file_contents(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if !trimmed.starts_with('{') {
        return Ok(trimmed.to_string());
    }

    let artifact: Value = serde_json::from_str(trimmed).context("failed parsing artifact JSON")?;
    // Foundry: { bytecode: { object } }; Hardhat: { bytecode: "0x..." }
    let code = match &artifact["bytecode"] {
        Value::String(s) => Some(s.clone()),
        Value::Object(o) => o.get("object").and_then(Value::as_str).map(str::to_string),
        _ => None,
    };
    code.ok_or_else(|| anyhow!("artifact has no `bytecode` or `bytecode.object`"))
}

/// Append constructor arguments, either pre-encoded or tokenized against the ABI.
pub fn with_constructor_args(
    code: Vec<u8>,
    encoded: Option<&str>,
    abi: Option<&Abi>,
    args: &[String],
) -> Result<Vec<u8>> {
    if let Some(hex) = encoded {
        let mut code = code;
        code.extend_from_slice(&parse_hex_bytes(hex)?);
        return Ok(code);
    }

    match abi.and_then(|a| a.constructor()) {
        Some(constructor) => {
            let tokens = tokenize(&constructor.inputs, args)?;
            constructor
                .encode_input(code, &tokens)
                .context("failed encoding constructor arguments")
        }
        None if args.is_empty() => Ok(code),
        None => bail!("constructor arguments given but the ABI has no constructor"),
    }
}

pub async fn run(args: DeployArgs, pool: &RpcPool) -> Result<Value> {
    let code = load_bytecode(args.bytecode.as_deref(), args.bytecode_file.as_deref())?;
    let abi = args.abi.as_deref().map(load_abi).transpose()?;
    let init_code = with_constructor_args(
        code,
        args.constructor_args.as_deref(),
        abi.as_ref(),
        &args.constructor_arg,
    )?;
    debug!(bytes = init_code.len(), "creation code ready");

    let wallet = args.signer.wallet()?;
    let endpoint = pool.endpoint().await?;
    let client = pool.signer(wallet).await?;

    let request = TransactionRequest::new().data(EthersBytes::from(init_code));
    let receipt = send_with_gas_retry(
        &client,
        request,
        args.gas_buffer_percent,
        Duration::from_secs(args.receipt_timeout_secs),
    )
    .await
    .context("deployment failed")?;

    let record = DeploymentRecord::from_receipt(&receipt, endpoint.chain_id, &endpoint.url)?;
    write_deployments_json(&args.deployments_path, &args.network, &args.contract_key, &record)?;

    info!(contract = %args.contract_key, address = %record.address, "deployed");
    let mut out = serde_json::to_value(&record)?;
    out["contract"] = json!(args.contract_key);
    Ok(out)
}

pub fn write_deployments_json(
    path: &Path,
    network: &str,
    contract_key: &str,
    record: &DeploymentRecord,
) -> Result<()> {
    let now = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string());

    let existing = if path.exists() {
        fs::read_to_string(path).with_context(|| format!("failed reading {}", path.display()))?
    } else {
        String::new()
    };

    let mut root: Value = if existing.trim().is_empty() {
        json!({})
    } else {
        serde_json::from_str(&existing)
            .with_context(|| format!("failed parsing JSON in {}", path.display()))?
    };

    if !root.is_object() {
        root = json!({});
    }

    root["network"] = json!(network);
    root["updated_at"] = json!(now);

    if root.get("deployments").and_then(Value::as_object).is_none() {
        root["deployments"] = json!({});
    }

    let mut entry = serde_json::to_value(record).context("failed serialising deployment record")?;
    entry["deployed_at"] = json!(now);

    root["deployments"][contract_key] = entry;

    write_json_atomic(path, &root)
}

fn write_json_atomic(path: &Path, value: &Value) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    if !parent.exists() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed creating directory {}", parent.display()))?;
    }

    let serialised =
        serde_json::to_string_pretty(value).context("failed serialising deployments JSON")?;
    let tmp_path = tmp_path_for(path);
    fs::write(&tmp_path, serialised.as_bytes())
        .with_context(|| format!("failed writing temp file {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("failed replacing {}", path.display()))?;
    Ok(())
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_os_string();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}
