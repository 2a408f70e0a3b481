use sqlx::SqlitePool;
use tracing::info;

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    info!("Running database migrations...");

    // Signature is the sole dedup key; everything else is the emitted row
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS transfers (
            signature TEXT PRIMARY KEY,
            timestamp TEXT NOT NULL,
            unix_timestamp INTEGER NOT NULL,
            from_wallet TEXT NOT NULL,
            to_wallet TEXT NOT NULL,
            amount_sol TEXT NOT NULL,
            direction TEXT NOT NULL,
            wintermute_wallet_type TEXT NOT NULL,
            created_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_transfers_unix_timestamp
         ON transfers(unix_timestamp)",
    )
    .execute(pool)
    .await?;

    info!("Database migrations completed successfully");
    Ok(())
}
