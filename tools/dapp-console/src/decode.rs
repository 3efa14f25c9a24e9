use anyhow::{Context, Result};
use clap::Args;
use router_calldata_encoder::{
    decoder::{decode_commands, decode_execute, describe},
    parse::parse_hex_bytes,
};
use router_commands_types::FLAG_ALLOW_REVERT;
use serde_json::{json, Value};

/// Decode Universal Router `execute` calldata.
#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Calldata hex (0x-prefixed).
    #[arg(long)]
    data: String,
}

pub fn run(args: DecodeArgs) -> Result<Value> {
    let bytes = parse_hex_bytes(&args.data)?;
    let calldata = decode_execute(&bytes).context("not Universal Router execute calldata")?;
    let commands = decode_commands(&calldata.commands)?;

    let steps = commands
        .iter()
        .zip(calldata.commands.iter())
        .zip(calldata.inputs.iter())
        .map(|((command, byte), input)| {
            let detail = describe(*command, input)
                .map(|d| format!("{d:?}"))
                .unwrap_or_else(|e| format!("undecodable: {e}"));
            json!({
                "command": command.to_string(),
                "allow_revert": byte & FLAG_ALLOW_REVERT != 0,
                "input": format!("0x{}", hex::encode(input)),
                "decoded": detail,
            })
        })
        .collect::<Vec<_>>();

    Ok(json!({
        "selector": format!("0x{}", hex::encode(calldata.selector)),
        "deadline": calldata.deadline.map(|d| d.to_string()),
        "commands": steps,
    }))
}
