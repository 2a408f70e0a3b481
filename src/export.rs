// CSV export for charting tools (TradingView custom indicators read this
// file). One complete row per transfer, header written once on creation.

use crate::db::StoreError;
use crate::models::TransferEvent;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

pub const CSV_COLUMNS: [&str; 8] = [
    "timestamp",
    "unix_timestamp",
    "signature",
    "from_wallet",
    "to_wallet",
    "amount_sol",
    "direction",
    "wintermute_wallet_type",
];

pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    /// Open the export file, creating it with a header row if absent.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            let file = OpenOptions::new().create(true).write(true).open(&path)?;
            let mut writer = csv::Writer::from_writer(file);
            writer.write_record(CSV_COLUMNS)?;
            writer.flush()?;
        }

        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one row and flush it, so external readers never observe a
    /// partial record.
    pub fn append(&self, event: &TransferEvent) -> Result<(), StoreError> {
        let file = OpenOptions::new().append(true).open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.serialize(event)?;
        writer.flush()?;
        Ok(())
    }
}
