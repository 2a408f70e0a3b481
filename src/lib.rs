pub mod blockchain;
pub mod config;
pub mod db;
pub mod export;
pub mod models;
pub mod notify;
pub mod registry;

#[cfg(test)]
mod tests;

// Re-export specific items for convenience
pub use blockchain::client::{ClientError, LedgerQuery, SignatureInfo, SolanaClient};
pub use blockchain::extractor::{extract, BalanceChange, ExtractError};
pub use blockchain::monitor::{run_monitor, MonitorContext, TickSummary};
pub use config::{Config, ConfigError};
pub use db::{DedupLedger, SqliteLedger, StoreError};
pub use export::CsvSink;
pub use models::TransferEvent;
pub use notify::Notifier;
pub use registry::{AddressRegistry, Direction, MonitoredAddress, WalletRole};
