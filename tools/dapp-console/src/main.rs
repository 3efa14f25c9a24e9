use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;

mod call;
mod decode;
mod deploy;
mod logging;
mod rpc;
mod swap;

use rpc::RpcPool;

/// Universal Router swaps, contract deployment and ABI calls from the command line.
///
/// Every subcommand prints a JSON document on stdout; logs go to stderr.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Log level used when RUST_LOG is unset.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// RPC endpoints, comma-separated; tried in order until one answers.
    #[arg(long, global = true, env = "RPC_URL", value_delimiter = ',')]
    rpc_url: Vec<String>,

    /// Expected chain id; connecting to an endpoint on another chain is an error.
    #[arg(long, global = true, env = "CHAIN_ID")]
    chain_id: Option<u64>,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Build, and optionally send, a swap through the Universal Router.
    Swap(swap::SwapArgs),
    /// Decode Universal Router `execute` calldata.
    Decode(decode::DecodeArgs),
    /// Deploy creation bytecode and record the address.
    Deploy(deploy::DeployArgs),
    /// Call a contract function through its ABI.
    Call(call::CallArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    logging::init(&cli.log_level);

    let pool = RpcPool::new(cli.rpc_url, cli.chain_id);
    debug!(endpoints = pool.urls().len(), "rpc pool configured");

    let out = match cli.command {
        Cmd::Swap(args) => swap::run(args, &pool, cli.chain_id).await?,
        Cmd::Decode(args) => decode::run(args)?,
        Cmd::Deploy(args) => deploy::run(args, &pool).await?,
        Cmd::Call(args) => call::run(args, &pool).await?,
    };

    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn rpc_urls_split_on_commas() {
        let cli = Cli::try_parse_from([
            "dapp-console",
            "--rpc-url",
            "http://a:8545,http://b:8545",
            "decode",
            "--data",
            "0x",
        ])
        .unwrap();
        assert_eq!(cli.rpc_url, vec!["http://a:8545", "http://b:8545"]);
        assert!(matches!(cli.command, Cmd::Decode(_)));
    }
}
