//! Shared fixtures: a scripted ledger-query client, a memory-backed dedup
//! ledger, and RPC-shaped transaction payloads.

use crate::blockchain::client::{ClientError, LedgerQuery, SignatureInfo};
use crate::blockchain::monitor::MonitorContext;
use crate::config::Config;
use crate::db::{DedupLedger, StoreError};
use crate::models::TransferEvent;
use crate::notify::Notifier;
use crate::registry::AddressRegistry;
use async_trait::async_trait;
use solana_transaction_status::EncodedConfirmedTransactionWithStatusMeta;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const SOURCE_WALLET: &str = "5tzFkiKscXHK5ZXCGbXZxdw7gTjjD1mBwuoFbhUvuAi9";
pub const SOURCE_LABEL: &str = "Binance Hot Wallet";
pub const CP_GATE: &str = "77DXFZnMebramt4dXfdwem1AjnfNnVnG8FkcVWpSwdjB";
pub const CP_GATE_LABEL: &str = "Gate.io Deposit Wintermute";
pub const CP_BACKPACK: &str = "ApQnTEGUNsKsM48AjFLy1yDukBwk8WgjorYe6KduVmnr";
pub const CP_BACKPACK_LABEL: &str = "Backpack Exchange Deposit Wintermute";

// Valid addresses that are not in the monitored set
pub const OUTSIDER: &str = "9ii1FEiWSgDzXAbwj2oTmJXzkfCw78mnHwPQv9WQ5iTn";
pub const OUTSIDER_2: &str = "AhAkbf3cGD6HkFod2rBEE8mie8ks9p7vuss6WGkUFAM9";
pub const SYSTEM_PROGRAM: &str = "11111111111111111111111111111111";

pub const BLOCK_TIME: i64 = 1_700_000_000;

pub fn test_config() -> Config {
    Config {
        solana_rpc_url: "http://localhost:8899".to_string(),
        solana_commitment_level: "confirmed".to_string(),
        rpc_timeout_secs: 5,
        poll_interval_secs: 1,
        signature_limit: 50,
        database_url: "sqlite::memory:".to_string(),
        csv_path: "unused.csv".to_string(),
        webhook_url: None,
        source_wallet: SOURCE_WALLET.to_string(),
        source_label: SOURCE_LABEL.to_string(),
        counterparty_wallets: vec![
            (CP_GATE.to_string(), CP_GATE_LABEL.to_string()),
            (CP_BACKPACK.to_string(), CP_BACKPACK_LABEL.to_string()),
        ],
        source_name: "Binance".to_string(),
        counterparty_name: "Wintermute".to_string(),
    }
}

pub fn test_registry() -> AddressRegistry {
    AddressRegistry::from_config(&test_config()).expect("valid test registry")
}

pub fn test_context() -> MonitorContext<MockClient, MemoryLedger> {
    let config = test_config();
    MonitorContext {
        registry: AddressRegistry::from_config(&config).expect("valid test registry"),
        client: MockClient::new(),
        ledger: MemoryLedger::default(),
        notifier: Notifier::new(&config),
        config,
    }
}

/// Build a transaction payload the way the RPC encodes it with the `json`
/// encoding, so deserialization exercises the real wire shape.
pub fn tx_fixture(
    signature: &str,
    keys: &[&str],
    pre: &[u64],
    post: &[u64],
    fee: u64,
) -> EncodedConfirmedTransactionWithStatusMeta {
    tx_fixture_json(signature, keys, pre, post, fee, serde_json::Value::Null, None)
}

pub fn failed_tx_fixture(
    signature: &str,
    keys: &[&str],
    pre: &[u64],
    post: &[u64],
    fee: u64,
) -> EncodedConfirmedTransactionWithStatusMeta {
    let err = serde_json::json!({ "InstructionError": [0, { "Custom": 1 }] });
    tx_fixture_json(signature, keys, pre, post, fee, err, None)
}

/// Versioned-transaction variant with extra accounts resolved from lookup
/// tables; the balance arrays cover static keys plus the loaded ones.
pub fn tx_fixture_with_loaded(
    signature: &str,
    keys: &[&str],
    loaded_writable: &[&str],
    pre: &[u64],
    post: &[u64],
    fee: u64,
) -> EncodedConfirmedTransactionWithStatusMeta {
    tx_fixture_json(
        signature,
        keys,
        pre,
        post,
        fee,
        serde_json::Value::Null,
        Some(loaded_writable),
    )
}

fn tx_fixture_json(
    signature: &str,
    keys: &[&str],
    pre: &[u64],
    post: &[u64],
    fee: u64,
    err: serde_json::Value,
    loaded_writable: Option<&[&str]>,
) -> EncodedConfirmedTransactionWithStatusMeta {
    let mut meta = serde_json::json!({
        "err": err,
        "status": { "Ok": null },
        "fee": fee,
        "preBalances": pre,
        "postBalances": post
    });
    if let Some(writable) = loaded_writable {
        meta["loadedAddresses"] = serde_json::json!({
            "writable": writable,
            "readonly": []
        });
    }

    let value = serde_json::json!({
        "slot": 1000,
        "blockTime": BLOCK_TIME,
        "transaction": {
            "signatures": [signature],
            "message": {
                "header": {
                    "numRequiredSignatures": 1,
                    "numReadonlySignedAccounts": 0,
                    "numReadonlyUnsignedAccounts": 1
                },
                "accountKeys": keys,
                "recentBlockhash": "GHtXQBsoZHVnNFa9YevAzFr17DJjgHXk3ycTKD5xD3Zi",
                "instructions": []
            }
        },
        "meta": meta
    });

    serde_json::from_value(value).expect("valid transaction fixture")
}

/// In-memory dedup ledger for scheduler tests.
#[derive(Default)]
pub struct MemoryLedger {
    pub seen: HashSet<String>,
    pub rows: Vec<TransferEvent>,
    pub fail_appends: bool,
    /// Shared so tests can keep counting after the context is moved
    /// into the poll loop.
    pub append_attempts: Arc<AtomicUsize>,
}

#[async_trait]
impl DedupLedger for MemoryLedger {
    fn has(&self, signature: &str) -> bool {
        self.seen.contains(signature)
    }

    async fn append(&mut self, event: &TransferEvent) -> Result<(), StoreError> {
        self.append_attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_appends {
            return Err(StoreError::Io(std::io::Error::other("append disabled")));
        }
        if self.seen.insert(event.signature.clone()) {
            self.rows.push(event.clone());
        }
        Ok(())
    }

    fn len(&self) -> usize {
        self.seen.len()
    }
}

/// Scripted ledger-query client: canned signature listings per address,
/// canned details per signature, optional simulated outages, and a fetch
/// counter to assert in-tick deduplication.
///
/// Details are held as JSON because the encoded transaction type does not
/// implement `Clone`; each fetch decodes a fresh copy.
pub struct MockClient {
    signatures: HashMap<String, Vec<SignatureInfo>>,
    details: HashMap<String, serde_json::Value>,
    pub failing: HashSet<String>,
    fetch_counts: Mutex<HashMap<String, usize>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self {
            signatures: HashMap::new(),
            details: HashMap::new(),
            failing: HashSet::new(),
            fetch_counts: Mutex::new(HashMap::new()),
        }
    }

    pub fn list(&mut self, address: &str, signature: &str) {
        self.signatures
            .entry(address.to_string())
            .or_default()
            .push(SignatureInfo {
                signature: signature.to_string(),
                block_time: Some(BLOCK_TIME),
            });
    }

    pub fn detail(&mut self, signature: &str, tx: EncodedConfirmedTransactionWithStatusMeta) {
        let value = serde_json::to_value(&tx).expect("serializable fixture");
        self.details.insert(signature.to_string(), value);
    }

    pub fn fail(&mut self, signature: &str) {
        self.failing.insert(signature.to_string());
    }

    pub fn fetches(&self, signature: &str) -> usize {
        self.fetch_counts
            .lock()
            .unwrap()
            .get(signature)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl LedgerQuery for MockClient {
    async fn recent_signatures(
        &self,
        address: &str,
        limit: usize,
    ) -> Result<Vec<SignatureInfo>, ClientError> {
        Ok(self
            .signatures
            .get(address)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .take(limit)
            .collect())
    }

    async fn transaction_detail(
        &self,
        signature: &str,
    ) -> Result<EncodedConfirmedTransactionWithStatusMeta, ClientError> {
        *self
            .fetch_counts
            .lock()
            .unwrap()
            .entry(signature.to_string())
            .or_insert(0) += 1;

        if self.failing.contains(signature) {
            return Err(ClientError::Transient("simulated outage".to_string()));
        }

        self.details
            .get(signature)
            .map(|value| serde_json::from_value(value.clone()).expect("decodable fixture"))
            .ok_or_else(|| ClientError::NotFound(signature.to_string()))
    }
}
