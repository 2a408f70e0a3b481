use crate::blockchain::client::{LedgerQuery, SignatureInfo};
use crate::blockchain::extractor;
use crate::config::Config;
use crate::db::DedupLedger;
use crate::models::TransferEvent;
use crate::notify::Notifier;
use crate::registry::AddressRegistry;
use std::collections::HashSet;
use std::time::Duration;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Detail fetches within a tick are independent read-only queries; run them
/// concurrently, but keep the fan-out bounded to stay friendly to the RPC.
const DETAIL_FETCH_CHUNK: usize = 8;

/// A transiently locked database recovers within a tick or two; a store
/// that keeps failing (disk full, file gone) will not, so give up.
const MAX_STORE_ERROR_TICKS: u32 = 3;

pub struct MonitorContext<C, L> {
    pub config: Config,
    pub registry: AddressRegistry,
    pub client: C,
    pub ledger: L,
    pub notifier: Notifier,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TickSummary {
    /// Distinct signatures listed across all monitored addresses.
    pub candidates: usize,
    /// Candidates skipped because the ledger already holds them.
    pub already_seen: usize,
    /// New transfer events appended this tick.
    pub emitted: usize,
    /// Candidates skipped this tick due to fetch or parse errors.
    pub failures: usize,
    /// Events whose durable append failed; they stay unseen for retry.
    pub store_errors: usize,
}

/// Fixed-interval poll loop. Runs until the shutdown token is cancelled;
/// a tick in progress finishes its current append before exiting.
pub async fn run_monitor<C: LedgerQuery, L: DedupLedger>(
    mut ctx: MonitorContext<C, L>,
    shutdown: CancellationToken,
) {
    info!(
        "Starting transfer monitor: {} wallets, {}s interval, lookback {}",
        ctx.registry.addresses().count(),
        ctx.config.poll_interval_secs,
        ctx.config.signature_limit,
    );

    let mut ticker = interval(Duration::from_secs(ctx.config.poll_interval_secs));
    let mut store_error_streak = 0u32;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let summary = run_tick(&mut ctx, &shutdown).await;
                if summary.store_errors > 0 {
                    store_error_streak += 1;
                    if store_error_streak >= MAX_STORE_ERROR_TICKS {
                        error!(
                            "Durable store failing for {} consecutive ticks, terminating",
                            store_error_streak,
                        );
                        break;
                    }
                } else {
                    store_error_streak = 0;
                }
                if summary.emitted > 0 {
                    info!(
                        "Tick complete: {} new transfers ({} candidates, {} seen, {} failed)",
                        summary.emitted, summary.candidates, summary.already_seen, summary.failures,
                    );
                } else {
                    debug!(
                        "Tick complete: no new transfers ({} candidates, {} seen, {} failed)",
                        summary.candidates, summary.already_seen, summary.failures,
                    );
                }
            }
            _ = shutdown.cancelled() => {
                info!("Shutting down transfer monitor");
                break;
            }
        }
    }
}

/// One polling pass over all monitored addresses.
pub async fn run_tick<C: LedgerQuery, L: DedupLedger>(
    ctx: &mut MonitorContext<C, L>,
    shutdown: &CancellationToken,
) -> TickSummary {
    let mut summary = TickSummary::default();

    let addresses: Vec<String> = ctx.registry.addresses().map(str::to_string).collect();

    // Union of recent signatures across addresses, deduplicated before any
    // detail fetch so a transfer touching two monitored wallets is fetched
    // once. Discovery order is preserved.
    let mut seen_this_tick = HashSet::new();
    let mut candidates: Vec<SignatureInfo> = Vec::new();

    for address in &addresses {
        match ctx
            .client
            .recent_signatures(address, ctx.config.signature_limit)
            .await
        {
            Ok(infos) => {
                for info in infos {
                    if seen_this_tick.insert(info.signature.clone()) {
                        candidates.push(info);
                    }
                }
            }
            Err(e) => {
                // Transient failure: this address is retried next tick
                warn!("Failed to list signatures for {}: {}", address, e);
            }
        }
    }

    summary.candidates = candidates.len();

    // Membership check before fetching details
    candidates.retain(|candidate| {
        let seen = ctx.ledger.has(&candidate.signature);
        if seen {
            summary.already_seen += 1;
        }
        !seen
    });

    for chunk in candidates.chunks(DETAIL_FETCH_CHUNK) {
        // Abandon not-yet-started work on shutdown; appends already issued
        // below have completed by this point.
        if shutdown.is_cancelled() {
            debug!("Shutdown requested mid-tick, abandoning remaining candidates");
            break;
        }

        let fetches = chunk
            .iter()
            .map(|candidate| ctx.client.transaction_detail(&candidate.signature));
        let details = futures::future::join_all(fetches).await;

        for (candidate, result) in chunk.iter().zip(details) {
            match result {
                Ok(detail) => {
                    process_detail(ctx, candidate, &detail, &mut summary).await;
                }
                Err(e) => {
                    warn!("Failed to get transaction {}: {}", candidate.signature, e);
                    summary.failures += 1;
                }
            }
        }
    }

    summary
}

async fn process_detail<C: LedgerQuery, L: DedupLedger>(
    ctx: &mut MonitorContext<C, L>,
    candidate: &SignatureInfo,
    detail: &solana_transaction_status::EncodedConfirmedTransactionWithStatusMeta,
    summary: &mut TickSummary,
) {
    let changes = match extractor::extract(&candidate.signature, detail) {
        Ok(changes) => changes,
        Err(e) => {
            // Malformed record: skip this signature, keep the tick going
            warn!("Skipping malformed transaction: {}", e);
            summary.failures += 1;
            return;
        }
    };

    for change in changes {
        let Some(classification) = ctx.registry.classify(&change.from, &change.to) else {
            continue;
        };

        let event = TransferEvent::new(
            &candidate.signature,
            detail.block_time.or(candidate.block_time),
            &change,
            ctx.registry.direction_label(classification.direction),
            classification.counterparty_label,
        );

        match ctx.ledger.append(&event).await {
            Ok(()) => {
                summary.emitted += 1;
                // Notify only after the row is durable
                ctx.notifier.send(&event).await;
            }
            Err(e) => {
                // The signature stays unseen so it is retried next tick
                error!("Failed to persist transfer {}: {}", event.signature, e);
                summary.store_errors += 1;
            }
        }
    }
}
