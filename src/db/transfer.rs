use crate::models::TransferEvent;
use rust_decimal::Decimal;
use sqlx::{Pool, Row, Sqlite};
use std::collections::HashSet;
use std::str::FromStr;

/// Append one transfer row. Returns false when the signature was already
/// present (the insert is a no-op in that case).
pub async fn insert_transfer(
    pool: &Pool<Sqlite>,
    event: &TransferEvent,
) -> Result<bool, sqlx::Error> {
    let amount = event.amount_sol.to_string();

    let result = sqlx::query(
        r#"
        INSERT INTO transfers
        (signature, timestamp, unix_timestamp, from_wallet, to_wallet, amount_sol, direction, wintermute_wallet_type)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(signature) DO NOTHING
        "#,
    )
    .bind(&event.signature)
    .bind(&event.timestamp)
    .bind(event.unix_timestamp)
    .bind(&event.from_wallet)
    .bind(&event.to_wallet)
    .bind(&amount)
    .bind(&event.direction)
    .bind(&event.wintermute_wallet_type)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// All previously processed signatures, for the startup membership load.
pub async fn load_signatures(pool: &Pool<Sqlite>) -> Result<HashSet<String>, sqlx::Error> {
    let rows = sqlx::query("SELECT signature FROM transfers")
        .fetch_all(pool)
        .await?;

    Ok(rows.iter().map(|row| row.get("signature")).collect())
}

pub async fn count_transfers(pool: &Pool<Sqlite>) -> Result<i64, sqlx::Error> {
    let count = sqlx::query("SELECT COUNT(*) FROM transfers")
        .fetch_one(pool)
        .await?
        .get::<i64, _>(0);

    Ok(count)
}

/// Emitted rows in append order.
pub async fn load_transfers(pool: &Pool<Sqlite>) -> Result<Vec<TransferEvent>, sqlx::Error> {
    let rows = sqlx::query(
        "SELECT signature, timestamp, unix_timestamp, from_wallet, to_wallet,
                amount_sol, direction, wintermute_wallet_type
         FROM transfers
         ORDER BY rowid ASC",
    )
    .fetch_all(pool)
    .await?;

    let transfers = rows
        .iter()
        .map(|row| TransferEvent {
            timestamp: row.get("timestamp"),
            unix_timestamp: row.get("unix_timestamp"),
            signature: row.get("signature"),
            from_wallet: row.get("from_wallet"),
            to_wallet: row.get("to_wallet"),
            amount_sol: Decimal::from_str(row.get::<String, _>("amount_sol").as_str())
                .unwrap_or_default(),
            direction: row.get("direction"),
            wintermute_wallet_type: row.get("wintermute_wallet_type"),
        })
        .collect();

    Ok(transfers)
}
