use crate::config::Config;
use crate::models::TransferEvent;
use tracing::{info, warn};

/// Console alert plus optional webhook POST per emitted transfer. Runs
/// strictly after the row is persisted; failures here never affect the
/// ledger.
pub struct Notifier {
    http: reqwest::Client,
    webhook_url: Option<String>,
}

impl Notifier {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            webhook_url: config.webhook_url.clone(),
        }
    }

    pub async fn send(&self, event: &TransferEvent) {
        info!(
            "Transfer detected: {} SOL {} ({}) | {} -> {} | {}",
            event.amount_sol,
            event.direction,
            event.wintermute_wallet_type,
            event.from_wallet,
            event.to_wallet,
            event.signature,
        );

        if let Some(url) = &self.webhook_url {
            match self.http.post(url).json(event).send().await {
                Ok(response) if !response.status().is_success() => {
                    warn!(
                        "Webhook returned {} for {}",
                        response.status(),
                        event.signature
                    );
                }
                Ok(_) => {}
                Err(e) => warn!("Webhook delivery failed for {}: {}", event.signature, e),
            }
        }
    }
}
