// TransferEvent is the one persisted row shape. Field order here is the
// column order of both the transfers table and the CSV export:
// timestamp, unix_timestamp, signature, from_wallet, to_wallet, amount_sol,
// direction, wintermute_wallet_type

use crate::blockchain::extractor::BalanceChange;
use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const LAMPORTS_PER_SOL_DECIMALS: u32 = 9;

/// Convert lamports to SOL exactly, with 9 fractional digits of scale.
pub fn lamports_to_sol(lamports: u64) -> Decimal {
    Decimal::from_i128_with_scale(lamports as i128, LAMPORTS_PER_SOL_DECIMALS).normalize()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransferEvent {
    pub timestamp: String,
    pub unix_timestamp: i64,
    pub signature: String,
    pub from_wallet: String,
    pub to_wallet: String,
    pub amount_sol: Decimal,
    pub direction: String,
    pub wintermute_wallet_type: String,
}

impl TransferEvent {
    pub fn new(
        signature: &str,
        block_time: Option<i64>,
        change: &BalanceChange,
        direction: String,
        counterparty_label: String,
    ) -> Self {
        let unix_timestamp = block_time.unwrap_or_else(|| Utc::now().timestamp());
        let timestamp = DateTime::<Utc>::from_timestamp(unix_timestamp, 0)
            .unwrap_or_else(Utc::now)
            .to_rfc3339_opts(SecondsFormat::Secs, true);

        Self {
            timestamp,
            unix_timestamp,
            signature: signature.to_string(),
            from_wallet: change.from.clone(),
            to_wallet: change.to.clone(),
            amount_sol: lamports_to_sol(change.lamports),
            direction,
            wintermute_wallet_type: counterparty_label,
        }
    }
}
