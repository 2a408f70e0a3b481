// Process configuration:
// - RPC endpoint URL, commitment level, request timeout
// - Poll interval and per-address signature lookback
// - Database path and CSV export path
// - Monitored wallet set (one source wallet, N counterparty wallets)
// - Optional webhook URL for notifications

use dotenv::dotenv;
use std::env;
use thiserror::Error;

/// The Binance hot wallet the monitor watches the source side of.
const DEFAULT_SOURCE_WALLET: &str = "5tzFkiKscXHK5ZXCGbXZxdw7gTjjD1mBwuoFbhUvuAi9";
const DEFAULT_SOURCE_LABEL: &str = "Binance Hot Wallet";

/// Wintermute-linked deposit and hot wallets on the counterparty side.
const DEFAULT_COUNTERPARTY_WALLETS: &[(&str, &str)] = &[
    (
        "77DXFZnMebramt4dXfdwem1AjnfNnVnG8FkcVWpSwdjB",
        "Gate.io Deposit Wintermute",
    ),
    (
        "ApQnTEGUNsKsM48AjFLy1yDukBwk8WgjorYe6KduVmnr",
        "Backpack Exchange Deposit Wintermute",
    ),
    (
        "44P5Ct5JkPz76Rs2K6juC65zXMpFRDrHatxcASJ4Dyra",
        "Wintermute Hot Wallet",
    ),
    (
        "42nh6ig8ADj87iLpqtn7EzXk4yVg1X2LZtCJdaabHMEw",
        "KuCoin Wintermute Deposit",
    ),
    (
        "4DTTpRo9BtATsVgxtiLtnFRLxiYGhCtuXrJ2njs2tgJC",
        "OKX Deposit Wintermute",
    ),
    (
        "BFAcmjQFzvxL1xEejUHVUcnAqq5yWhmKUyh3uSeTRoCz",
        "Bitvavo Wintermute",
    ),
];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value}")]
    InvalidNumber { var: String, value: String },

    #[error("Invalid wallet entry '{0}': expected 'address=label'")]
    InvalidWalletEntry(String),

    #[error("Counterparty wallet set is empty")]
    EmptyCounterpartySet,

    #[error("Invalid Solana address format: {0}")]
    InvalidSolanaAddress(String),

    #[error("Duplicate monitored address: {0}")]
    DuplicateAddress(String),

    #[error("No monitored addresses configured")]
    EmptyAddressSet,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub solana_rpc_url: String,
    pub solana_commitment_level: String,
    pub rpc_timeout_secs: u64,
    pub poll_interval_secs: u64,
    pub signature_limit: usize,
    pub database_url: String,
    pub csv_path: String,
    pub webhook_url: Option<String>,
    pub source_wallet: String,
    pub source_label: String,
    pub counterparty_wallets: Vec<(String, String)>,
    pub source_name: String,
    pub counterparty_name: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        let solana_rpc_url = env::var("SOLANA_RPC_URL")
            .unwrap_or_else(|_| "https://api.mainnet-beta.solana.com".to_string());
        let solana_commitment_level =
            env::var("SOLANA_COMMITMENT_LEVEL").unwrap_or_else(|_| "confirmed".to_string());
        let rpc_timeout_secs = parse_positive_var("RPC_TIMEOUT_SECS", 30)?;
        let poll_interval_secs = parse_positive_var("POLL_INTERVAL_SECS", 90)?;
        let signature_limit = parse_positive_var("SIGNATURE_LIMIT", 50)? as usize;
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:sol_transfers.db".to_string());
        let csv_path = env::var("CSV_PATH").unwrap_or_else(|_| "sol_transfers.csv".to_string());
        let webhook_url = env::var("WEBHOOK_URL").ok().filter(|url| !url.is_empty());
        let source_wallet =
            env::var("SOURCE_WALLET").unwrap_or_else(|_| DEFAULT_SOURCE_WALLET.to_string());
        let source_label =
            env::var("SOURCE_LABEL").unwrap_or_else(|_| DEFAULT_SOURCE_LABEL.to_string());
        let counterparty_wallets = match env::var("COUNTERPARTY_WALLETS") {
            Ok(raw) => parse_wallet_list(&raw)?,
            Err(_) => DEFAULT_COUNTERPARTY_WALLETS
                .iter()
                .map(|(addr, label)| (addr.to_string(), label.to_string()))
                .collect(),
        };
        let source_name = env::var("SOURCE_NAME").unwrap_or_else(|_| "Binance".to_string());
        let counterparty_name =
            env::var("COUNTERPARTY_NAME").unwrap_or_else(|_| "Wintermute".to_string());

        if counterparty_wallets.is_empty() {
            return Err(ConfigError::EmptyCounterpartySet);
        }

        Ok(Self {
            solana_rpc_url,
            solana_commitment_level,
            rpc_timeout_secs,
            poll_interval_secs,
            signature_limit,
            database_url,
            csv_path,
            webhook_url,
            source_wallet,
            source_label,
            counterparty_wallets,
            source_name,
            counterparty_name,
        })
    }
}

fn parse_positive_var(var: &str, default: u64) -> Result<u64, ConfigError> {
    match env::var(var) {
        Ok(value) => parse_positive(var, &value),
        Err(_) => Ok(default),
    }
}

/// All numeric settings are durations or window sizes; zero would stall or
/// disable the poll loop, so it is rejected along with garbage input.
fn parse_positive(var: &str, value: &str) -> Result<u64, ConfigError> {
    match value.parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidNumber {
            var: var.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Parse a comma-separated list of `address=label` pairs.
fn parse_wallet_list(raw: &str) -> Result<Vec<(String, String)>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (address, label) = entry
                .split_once('=')
                .ok_or_else(|| ConfigError::InvalidWalletEntry(entry.to_string()))?;
            let (address, label) = (address.trim(), label.trim());
            if address.is_empty() || label.is_empty() {
                return Err(ConfigError::InvalidWalletEntry(entry.to_string()));
            }
            Ok((address.to_string(), label.to_string()))
        })
        .collect()
}
