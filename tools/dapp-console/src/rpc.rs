//! JSON-RPC access with fallback endpoints.
//!
//! The first endpoint that answers `eth_chainId` is picked on first use and kept for the rest of
//! the process; later calls never re-probe.

use std::{future::Future, path::PathBuf, sync::Arc, time::Duration};

use alloy_primitives::{Address, U256};
use anyhow::{anyhow, bail, Context, Result};
use clap::Args;
use ethers::{
    middleware::SignerMiddleware,
    providers::{Http, Middleware, Provider},
    signers::{LocalWallet, Signer},
    types::{TransactionReceipt, TransactionRequest, H160, H256, U256 as EthersU256},
};
use tokio::{sync::OnceCell, time::sleep};
use tracing::{debug, info, warn};

pub type SignerClient = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Selected endpoint.
#[derive(Clone, Debug)]
pub struct Endpoint {
    pub url: String,
    pub chain_id: u64,
    pub provider: Arc<Provider<Http>>,
}

/// Ordered RPC endpoints, connected lazily.
#[derive(Debug)]
pub struct RpcPool {
    urls: Vec<String>,
    expected_chain_id: Option<u64>,
    selected: OnceCell<Endpoint>,
}

impl RpcPool {
    pub fn new(urls: Vec<String>, expected_chain_id: Option<u64>) -> Self {
        let urls = urls
            .into_iter()
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .collect();
        Self {
            urls,
            expected_chain_id,
            selected: OnceCell::new(),
        }
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    /// Connected endpoint; probes the list in order on the first call only.
    pub async fn endpoint(&self) -> Result<&Endpoint> {
        self.selected.get_or_try_init(|| self.connect()).await
    }

    async fn connect(&self) -> Result<Endpoint> {
        if self.urls.is_empty() {
            bail!("no RPC URL configured: pass --rpc-url or set RPC_URL");
        }

        let mut last_err = None;
        for url in &self.urls {
            match probe(url).await {
                Ok((provider, chain_id)) => {
                    if let Some(expected) = self.expected_chain_id {
                        if expected != chain_id {
                            bail!(
                                "RPC {url} is on chain {chain_id}, expected {expected}; switch the endpoint or --chain-id"
                            );
                        }
                    }
                    info!(%url, chain_id, "connected to RPC endpoint");
                    return Ok(Endpoint {
                        url: url.clone(),
                        chain_id,
                        provider: Arc::new(provider),
                    });
                }
                Err(e) => {
                    warn!(%url, error = %e, "RPC endpoint unavailable, trying next");
                    last_err = Some(e);
                }
            }
        }
        Err(last_err.unwrap_or_else(|| anyhow!("no RPC endpoint reachable")))
    }

    /// Signing client bound to the selected endpoint's chain id.
    pub async fn signer(&self, wallet: LocalWallet) -> Result<Arc<SignerClient>> {
        let endpoint = self.endpoint().await?;
        let wallet = wallet.with_chain_id(endpoint.chain_id);
        info!(address = ?wallet.address(), "signer ready");
        Ok(Arc::new(SignerMiddleware::new(
            endpoint.provider.as_ref().clone(),
            wallet,
        )))
    }
}

async fn probe(url: &str) -> Result<(Provider<Http>, u64)> {
    let provider = Provider::<Http>::try_from(url).with_context(|| format!("invalid RPC URL {url}"))?;
    let chain_id = provider
        .get_chainid()
        .await
        .with_context(|| format!("eth_chainId failed on {url}"))?;
    Ok((provider, chain_id.as_u64()))
}

/// Retry an async operation with exponential backoff.
pub async fn retry_async<F, Fut, T, E>(mut op: F, attempts: usize, initial_delay: Duration) -> Result<T, E>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut delay = initial_delay;
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(v) => return Ok(v),
            Err(e) if attempt < attempts => {
                debug!(attempt, error = %e, "retrying");
                sleep(delay).await;
                delay = delay.saturating_mul(2);
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// `estimate * (100 + percent) / 100`.
pub fn apply_gas_buffer(estimate: EthersU256, percent: u64) -> EthersU256 {
    estimate.saturating_mul(EthersU256::from(100 + percent)) / EthersU256::from(100u64)
}

pub fn to_h160(addr: Address) -> H160 {
    H160::from_slice(addr.as_slice())
}

pub fn to_ethers_u256(value: U256) -> EthersU256 {
    EthersU256::from_big_endian(&value.to_be_bytes::<32>())
}

/// Private key sources, mutually exclusive.
#[derive(Args, Debug, Clone, Default)]
pub struct SignerArgs {
    /// Path to a file containing the private key.
    #[arg(long, env = "PRIV_KEY_PATH", conflicts_with = "private_key")]
    pub private_key_path: Option<PathBuf>,

    /// Private key (hex string, 0x...).
    #[arg(long, env = "PKEY", conflicts_with = "private_key_path", hide_env_values = true)]
    pub private_key: Option<String>,
}

impl SignerArgs {
    pub fn wallet(&self) -> Result<LocalWallet> {
        let raw = if let Some(ref path) = self.private_key_path {
            std::fs::read_to_string(path)
                .with_context(|| format!("failed reading {}", path.display()))?
        } else if let Some(ref pk) = self.private_key {
            pk.clone()
        } else {
            bail!("missing signer key: provide --private-key-path or --private-key (or set PRIV_KEY_PATH/PKEY)");
        };
        let key = raw.trim();
        let key = key.strip_prefix("0x").unwrap_or(key);
        key.parse::<LocalWallet>()
            .map_err(|e| anyhow!("invalid private key: {e}"))
    }
}

/// Why a submission ended without a successful receipt.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// The node refused the transaction; nothing was broadcast.
    #[error(transparent)]
    Rejected(anyhow::Error),
    /// Mined and reverted.
    #[error("transaction {hash:?} reverted")]
    Reverted { hash: H256 },
    /// Broadcast but not confirmed; it may still be mined.
    #[error("transaction {hash:?} is unconfirmed ({reason}); keep watching it before sending again")]
    Unconfirmed { hash: H256, reason: String },
}

impl SubmitError {
    /// A fresh send cannot duplicate a transaction that is still in flight.
    pub fn can_resend(&self) -> bool {
        !matches!(self, SubmitError::Unconfirmed { .. })
    }
}

/// Estimate, buffer and send `tx`; if it is rejected or reverts, resend once with a doubled buffer.
///
/// Waiting for the receipt is bounded by `timeout`. A broadcast transaction cannot be recalled,
/// so one that times out is reported with its hash and never resent.
pub async fn send_with_gas_retry(
    client: &SignerClient,
    tx: TransactionRequest,
    gas_buffer_percent: u64,
    timeout: Duration,
) -> Result<TransactionReceipt> {
    let estimate = retry_async(
        |_| {
            let typed = tx.clone().into();
            async move { client.estimate_gas(&typed, None).await }
        },
        3,
        Duration::from_millis(250),
    )
    .await
    .context("gas estimation failed")?;
    debug!(%estimate, "estimated gas");

    let first = apply_gas_buffer(estimate, gas_buffer_percent);
    let second = apply_gas_buffer(estimate, gas_buffer_percent.saturating_mul(2).max(1));
    resend_with_more_gas(first, second, |gas| submit(client, tx.clone().gas(gas), timeout)).await
}

/// Send at `first` gas, and at `second` only when the first attempt left nothing in flight.
async fn resend_with_more_gas<F, Fut>(
    first: EthersU256,
    second: EthersU256,
    mut send: F,
) -> Result<TransactionReceipt>
where
    F: FnMut(EthersU256) -> Fut,
    Fut: Future<Output = Result<TransactionReceipt, SubmitError>>,
{
    match send(first).await {
        Ok(receipt) => Ok(receipt),
        Err(e) if e.can_resend() => {
            warn!(error = %e, gas = %second, "transaction failed, retrying with more gas");
            Ok(send(second).await?)
        }
        Err(e) => Err(e.into()),
    }
}

async fn submit(
    client: &SignerClient,
    tx: TransactionRequest,
    timeout: Duration,
) -> Result<TransactionReceipt, SubmitError> {
    let pending = client
        .send_transaction(tx, None)
        .await
        .map_err(|e| SubmitError::Rejected(anyhow::Error::new(e).context("eth_sendTransaction failed")))?;
    let hash = pending.tx_hash();
    info!(tx = ?hash, "transaction submitted, waiting for receipt");

    let unconfirmed = |reason: String| SubmitError::Unconfirmed { hash, reason };
    let receipt = match tokio::time::timeout(timeout, pending).await {
        Err(_) => return Err(unconfirmed(format!("no receipt after {timeout:?}"))),
        Ok(Err(e)) => return Err(unconfirmed(format!("receipt polling failed: {e}"))),
        Ok(Ok(None)) => return Err(unconfirmed("dropped from the node's mempool".to_string())),
        Ok(Ok(Some(receipt))) => receipt,
    };

    if receipt.status.map(|s| s.as_u64()) == Some(0) {
        return Err(SubmitError::Reverted { hash });
    }
    Ok(receipt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    };

    #[test]
    fn gas_buffer_rounds_down() {
        assert_eq!(apply_gas_buffer(EthersU256::from(100_000u64), 20), EthersU256::from(120_000u64));
        assert_eq!(apply_gas_buffer(EthersU256::from(21_001u64), 0), EthersU256::from(21_001u64));
        assert_eq!(apply_gas_buffer(EthersU256::from(99u64), 10), EthersU256::from(108u64));
    }

    #[test]
    fn address_and_amount_conversions() {
        let addr = Address::with_last_byte(0xab);
        assert_eq!(to_h160(addr).as_bytes(), addr.as_slice());
        assert_eq!(to_ethers_u256(U256::from(123_456u64)), EthersU256::from(123_456u64));
    }

    #[tokio::test]
    async fn retries_until_success() {
        let counter = AtomicUsize::new(0);
        let res: Result<u32, String> = retry_async(
            |_| {
                let current = counter.fetch_add(1, Ordering::Relaxed);
                async move {
                    if current < 2 {
                        Err("not yet".to_string())
                    } else {
                        Ok(7)
                    }
                }
            },
            4,
            Duration::from_millis(1),
        )
        .await;

        assert_eq!(res.unwrap(), 7);
        assert_eq!(counter.load(Ordering::Relaxed), 3);
    }

    #[tokio::test]
    async fn empty_pool_fails_without_network() {
        let pool = RpcPool::new(vec![" ".to_string()], None);
        assert!(pool.urls().is_empty());
        let err = pool.endpoint().await.unwrap_err();
        assert!(err.to_string().contains("no RPC URL"));
    }

    #[test]
    fn signer_args_require_a_key() {
        assert!(SignerArgs::default().wallet().is_err());
        let args = SignerArgs {
            private_key: Some(
                "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318".to_string(),
            ),
            ..SignerArgs::default()
        };
        assert!(args.wallet().is_ok());
    }

    #[tokio::test]
    async fn unconfirmed_transaction_is_not_resent() {
        let sends = AtomicUsize::new(0);
        let hash = H256::repeat_byte(0x11);
        let err = resend_with_more_gas(EthersU256::from(100u64), EthersU256::from(200u64), |_| {
            sends.fetch_add(1, Ordering::Relaxed);
            async move {
                Err::<TransactionReceipt, _>(SubmitError::Unconfirmed {
                    hash,
                    reason: "no receipt after 500ms".to_string(),
                })
            }
        })
        .await
        .unwrap_err();

        assert_eq!(sends.load(Ordering::Relaxed), 1);
        assert!(matches!(
            err.downcast_ref::<SubmitError>(),
            Some(SubmitError::Unconfirmed { hash: h, .. }) if *h == hash
        ));
        assert!(err.to_string().contains("0x1111111111111111"));
        assert!(err.to_string().contains("500ms"));
    }

    #[tokio::test]
    async fn rejected_transaction_is_resent_with_more_gas() {
        let gas_seen = Mutex::new(Vec::new());
        let receipt = resend_with_more_gas(EthersU256::from(100u64), EthersU256::from(200u64), |gas| {
            let attempt = {
                let mut seen = gas_seen.lock().unwrap();
                seen.push(gas);
                seen.len()
            };
            async move {
                if attempt == 1 {
                    Err(SubmitError::Rejected(anyhow!("intrinsic gas too low")))
                } else {
                    Ok(TransactionReceipt::default())
                }
            }
        })
        .await;

        assert!(receipt.is_ok());
        assert_eq!(
            *gas_seen.lock().unwrap(),
            vec![EthersU256::from(100u64), EthersU256::from(200u64)]
        );
    }

    #[test]
    fn only_unconfirmed_blocks_a_resend() {
        let hash = H256::zero();
        assert!(SubmitError::Rejected(anyhow!("nonce too low")).can_resend());
        assert!(SubmitError::Reverted { hash }.can_resend());
        assert!(!SubmitError::Unconfirmed { hash, reason: String::new() }.can_resend());
    }
}
