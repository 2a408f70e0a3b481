use crate::config::{Config, ConfigError};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletRole {
    Source,
    Counterparty,
}

#[derive(Debug, Clone)]
pub struct MonitoredAddress {
    pub address: String,
    pub label: String,
    pub role: WalletRole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    SourceToCounterparty,
    CounterpartyToSource,
}

/// Outcome of classifying a (from, to) pair against the monitored set.
#[derive(Debug, Clone)]
pub struct Classification {
    pub direction: Direction,
    pub counterparty_label: String,
}

/// Static registry of the wallets under watch. Built once at startup,
/// immutable afterwards.
pub struct AddressRegistry {
    wallets: HashMap<String, MonitoredAddress>,
    source_name: String,
    counterparty_name: String,
}

impl AddressRegistry {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let mut entries = vec![MonitoredAddress {
            address: config.source_wallet.clone(),
            label: config.source_label.clone(),
            role: WalletRole::Source,
        }];
        entries.extend(
            config
                .counterparty_wallets
                .iter()
                .map(|(address, label)| MonitoredAddress {
                    address: address.clone(),
                    label: label.clone(),
                    role: WalletRole::Counterparty,
                }),
        );
        Self::new(entries, &config.source_name, &config.counterparty_name)
    }

    pub fn new(
        entries: Vec<MonitoredAddress>,
        source_name: &str,
        counterparty_name: &str,
    ) -> Result<Self, ConfigError> {
        if entries.is_empty() {
            return Err(ConfigError::EmptyAddressSet);
        }

        let mut wallets = HashMap::with_capacity(entries.len());
        for entry in entries {
            validate_solana_address(&entry.address)?;
            if wallets.contains_key(&entry.address) {
                return Err(ConfigError::DuplicateAddress(entry.address));
            }
            wallets.insert(entry.address.clone(), entry);
        }

        Ok(Self {
            wallets,
            source_name: source_name.to_string(),
            counterparty_name: counterparty_name.to_string(),
        })
    }

    pub fn contains(&self, address: &str) -> bool {
        self.wallets.contains_key(address)
    }

    pub fn role_of(&self, address: &str) -> Option<WalletRole> {
        self.wallets.get(address).map(|entry| entry.role)
    }

    pub fn label_of(&self, address: &str) -> Option<&str> {
        self.wallets.get(address).map(|entry| entry.label.as_str())
    }

    pub fn addresses(&self) -> impl Iterator<Item = &str> {
        self.wallets.keys().map(String::as_str)
    }

    /// Classify a transfer pair. Returns `Some` only when exactly one side is
    /// a Source wallet and the other a Counterparty wallet; every other
    /// combination is filtered out.
    pub fn classify(&self, from: &str, to: &str) -> Option<Classification> {
        match (self.role_of(from)?, self.role_of(to)?) {
            (WalletRole::Source, WalletRole::Counterparty) => Some(Classification {
                direction: Direction::SourceToCounterparty,
                counterparty_label: self.label_of(to)?.to_string(),
            }),
            (WalletRole::Counterparty, WalletRole::Source) => Some(Classification {
                direction: Direction::CounterpartyToSource,
                counterparty_label: self.label_of(from)?.to_string(),
            }),
            _ => None,
        }
    }

    /// Render the direction column value, e.g. `Binance→Wintermute`.
    pub fn direction_label(&self, direction: Direction) -> String {
        match direction {
            Direction::SourceToCounterparty => {
                format!("{}→{}", self.source_name, self.counterparty_name)
            }
            Direction::CounterpartyToSource => {
                format!("{}→{}", self.counterparty_name, self.source_name)
            }
        }
    }
}

pub fn validate_solana_address(address: &str) -> Result<(), ConfigError> {
    if address.trim().is_empty() {
        return Err(ConfigError::InvalidSolanaAddress(address.to_string()));
    }

    // Solana account ids are 32 bytes, base58 encoded
    let decoded = bs58::decode(address)
        .into_vec()
        .map_err(|_| ConfigError::InvalidSolanaAddress(address.to_string()))?;

    if decoded.len() != 32 {
        return Err(ConfigError::InvalidSolanaAddress(address.to_string()));
    }

    Ok(())
}
