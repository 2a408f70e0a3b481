pub mod connection;
pub mod migration;
pub mod transfer;

use crate::export::CsvSink;
use crate::models::TransferEvent;
use async_trait::async_trait;
use sqlx::SqlitePool;
use std::collections::HashSet;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("CSV export error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The at-most-once emission contract: `has` is an exact membership check
/// over every signature ever appended, and `append` durably records a new
/// event. Injected into the scheduler so tests can swap in a memory-backed
/// implementation.
#[async_trait]
pub trait DedupLedger: Send {
    fn has(&self, signature: &str) -> bool;

    async fn append(&mut self, event: &TransferEvent) -> Result<(), StoreError>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// SQLite-backed ledger. The `transfers` table keys on signature, so the
/// seen-marker and the row are one atomic durable write; the in-memory set
/// only mirrors it for fast membership checks. Each successful append is
/// also mirrored to the CSV export.
pub struct SqliteLedger {
    pool: SqlitePool,
    seen: HashSet<String>,
    csv: CsvSink,
}

impl SqliteLedger {
    pub async fn open(pool: SqlitePool, csv: CsvSink) -> Result<Self, StoreError> {
        let seen = transfer::load_signatures(&pool).await?;
        if !seen.is_empty() {
            info!("Loaded {} previously processed signatures", seen.len());
        }
        Ok(Self { pool, seen, csv })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl DedupLedger for SqliteLedger {
    fn has(&self, signature: &str) -> bool {
        self.seen.contains(signature)
    }

    async fn append(&mut self, event: &TransferEvent) -> Result<(), StoreError> {
        let inserted = transfer::insert_transfer(&self.pool, event).await?;
        self.seen.insert(event.signature.clone());

        if inserted {
            if let Err(e) = self.csv.append(event) {
                // The table is the source of truth; the CSV is derived
                // output and can be rebuilt from it.
                warn!("CSV export failed for {}: {}", event.signature, e);
            }
        }

        Ok(())
    }

    fn len(&self) -> usize {
        self.seen.len()
    }
}
