use solana_transaction_status::option_serializer::OptionSerializer;
use solana_transaction_status::{
    EncodedConfirmedTransactionWithStatusMeta, EncodedTransaction, UiMessage,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Transaction {0} has no metadata")]
    MissingMeta(String),

    #[error("Unsupported transaction encoding for {0}")]
    UnsupportedEncoding(String),

    #[error("Balance arrays do not match account keys for {0}")]
    BalanceMismatch(String),
}

/// A native SOL movement derived from pre/post balances. Amount is in
/// lamports, net of the transaction fee when the sender paid it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceChange {
    pub from: String,
    pub to: String,
    pub lamports: u64,
}

/// Derive sender/receiver pairs from a transaction's balance deltas.
///
/// The fee payer (first account) has the fee added back before pairing so the
/// fee never shows up as part of the transferred amount. A transaction with a
/// single net sender and single net receiver is taken as-is; fan-in/fan-out
/// transactions only contribute pairs whose fee-adjusted magnitudes match
/// exactly, and anything ambiguous is dropped rather than guessed at.
pub fn extract(
    signature: &str,
    tx: &EncodedConfirmedTransactionWithStatusMeta,
) -> Result<Vec<BalanceChange>, ExtractError> {
    let meta = tx
        .transaction
        .meta
        .as_ref()
        .ok_or_else(|| ExtractError::MissingMeta(signature.to_string()))?;

    // Failed transactions move no funds
    if meta.err.is_some() {
        return Ok(Vec::new());
    }

    let transaction = match &tx.transaction.transaction {
        EncodedTransaction::Json(tx) => tx,
        _ => return Err(ExtractError::UnsupportedEncoding(signature.to_string())),
    };

    let mut account_keys: Vec<String> = match &transaction.message {
        UiMessage::Raw(message) => message.account_keys.clone(),
        UiMessage::Parsed(message) => message
            .account_keys
            .iter()
            .map(|account| account.pubkey.clone())
            .collect(),
    };

    // Versioned transactions carry extra accounts resolved from lookup
    // tables; the balance arrays cover those too, writable before readonly.
    if let OptionSerializer::Some(loaded) = &meta.loaded_addresses {
        account_keys.extend(loaded.writable.iter().cloned());
        account_keys.extend(loaded.readonly.iter().cloned());
    }

    if meta.pre_balances.len() != account_keys.len()
        || meta.post_balances.len() != account_keys.len()
    {
        return Err(ExtractError::BalanceMismatch(signature.to_string()));
    }

    let mut senders: Vec<(usize, i128)> = Vec::new();
    let mut receivers: Vec<(usize, i128)> = Vec::new();

    for (i, (pre, post)) in meta
        .pre_balances
        .iter()
        .zip(meta.post_balances.iter())
        .enumerate()
    {
        let mut delta = *post as i128 - *pre as i128;
        // The first account pays the fee; add it back so only the
        // transferred amount remains.
        if i == 0 {
            delta += meta.fee as i128;
        }
        if delta < 0 {
            senders.push((i, delta));
        } else if delta > 0 {
            receivers.push((i, delta));
        }
    }

    let mut changes = Vec::new();

    if senders.len() == 1 && receivers.len() == 1 {
        let (from_idx, delta) = senders[0];
        let (to_idx, _) = receivers[0];
        changes.push(BalanceChange {
            from: account_keys[from_idx].clone(),
            to: account_keys[to_idx].clone(),
            lamports: (-delta) as u64,
        });
        return Ok(changes);
    }

    // Multi-party transfer: pair only exact fee-adjusted magnitude matches
    for &(from_idx, delta) in &senders {
        let amount = -delta;
        let mut matches = receivers.iter().filter(|&&(_, recv)| recv == amount);
        match (matches.next(), matches.next()) {
            (Some(&(to_idx, _)), None) => changes.push(BalanceChange {
                from: account_keys[from_idx].clone(),
                to: account_keys[to_idx].clone(),
                lamports: amount as u64,
            }),
            // No match, or several receivers with the same magnitude
            _ => continue,
        }
    }

    Ok(changes)
}
