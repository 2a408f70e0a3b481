use crate::config::Config;
use async_trait::async_trait;
use backon::{ConstantBuilder, Retryable};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_client::GetConfirmedSignaturesForAddress2Config;
use solana_client::rpc_config::RpcTransactionConfig;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_transaction_status::{EncodedConfirmedTransactionWithStatusMeta, UiTransactionEncoding};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("RPC error: {0}")]
    Rpc(#[from] solana_client::client_error::ClientError),

    #[error("Transient query failure: {0}")]
    Transient(String),

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("Invalid public key: {0}")]
    InvalidPubkey(String),

    #[error("Transaction not found: {0}")]
    NotFound(String),
}

/// One entry from a recent-signatures listing.
#[derive(Debug, Clone)]
pub struct SignatureInfo {
    pub signature: String,
    pub block_time: Option<i64>,
}

/// Abstraction over the ledger query service. The scheduler only depends on
/// this trait, so tests can drive it with a scripted client.
#[async_trait]
pub trait LedgerQuery: Send + Sync {
    async fn recent_signatures(
        &self,
        address: &str,
        limit: usize,
    ) -> Result<Vec<SignatureInfo>, ClientError>;

    async fn transaction_detail(
        &self,
        signature: &str,
    ) -> Result<EncodedConfirmedTransactionWithStatusMeta, ClientError>;
}

pub struct SolanaClient {
    rpc_client: RpcClient,
    commitment: CommitmentConfig,
}

impl SolanaClient {
    pub fn new(config: &Config) -> Self {
        let rpc_url = &config.solana_rpc_url;
        let timeout = Duration::from_secs(config.rpc_timeout_secs);

        let commitment = match config.solana_commitment_level.as_str() {
            "processed" => CommitmentConfig::processed(),
            "confirmed" => CommitmentConfig::confirmed(),
            "finalized" => CommitmentConfig::finalized(),
            _ => CommitmentConfig::confirmed(),
        };

        info!(
            "Initializing Solana client with RPC endpoint: {}, commitment: {:?}",
            rpc_url, commitment
        );

        let rpc_client =
            RpcClient::new_with_timeout_and_commitment(rpc_url.clone(), timeout, commitment);

        Self {
            rpc_client,
            commitment,
        }
    }

    fn retry_policy() -> ConstantBuilder {
        // A couple of quick in-tick retries; the poll interval itself is the
        // backoff for anything longer-lived.
        ConstantBuilder::default()
            .with_delay(Duration::from_millis(250))
            .with_max_times(2)
    }
}

#[async_trait]
impl LedgerQuery for SolanaClient {
    async fn recent_signatures(
        &self,
        address: &str,
        limit: usize,
    ) -> Result<Vec<SignatureInfo>, ClientError> {
        let pubkey = Pubkey::from_str(address)
            .map_err(|_| ClientError::InvalidPubkey(address.to_string()))?;

        let signatures = (|| async {
            self.rpc_client
                .get_signatures_for_address_with_config(
                    &pubkey,
                    GetConfirmedSignaturesForAddress2Config {
                        before: None,
                        until: None,
                        limit: Some(limit),
                        commitment: Some(self.commitment),
                    },
                )
                .await
        })
        .retry(Self::retry_policy())
        .await
        .map_err(classify_rpc_error)?;

        Ok(signatures
            .into_iter()
            .map(|status| SignatureInfo {
                signature: status.signature,
                block_time: status.block_time,
            })
            .collect())
    }

    async fn transaction_detail(
        &self,
        signature: &str,
    ) -> Result<EncodedConfirmedTransactionWithStatusMeta, ClientError> {
        let parsed = Signature::from_str(signature)
            .map_err(|_| ClientError::InvalidSignature(signature.to_string()))?;

        let result = (|| async {
            self.rpc_client
                .get_transaction_with_config(
                    &parsed,
                    RpcTransactionConfig {
                        encoding: Some(UiTransactionEncoding::Json),
                        commitment: Some(self.commitment),
                        max_supported_transaction_version: Some(0),
                    },
                )
                .await
        })
        .retry(Self::retry_policy())
        .await;

        match result {
            Ok(tx) => Ok(tx),
            Err(e) if e.to_string().contains("not found") => {
                Err(ClientError::NotFound(signature.to_string()))
            }
            Err(e) => Err(classify_rpc_error(e)),
        }
    }
}

/// Transport-level failures (socket errors, HTTP client errors) are retried
/// by the scheduler on a later tick; anything the node itself rejected is a
/// plain RPC error.
fn classify_rpc_error(e: solana_client::client_error::ClientError) -> ClientError {
    use solana_client::client_error::ClientErrorKind;

    match &e.kind {
        ClientErrorKind::Io(_) | ClientErrorKind::Reqwest(_) => {
            ClientError::Transient(e.to_string())
        }
        _ => ClientError::Rpc(e),
    }
}
