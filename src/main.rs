// Initialize logging and configuration
// Build the address registry (fatal on invalid addresses)
// Open the SQLite ledger and CSV export
// Run the poll loop until ctrl-c

use sol_transfer_monitor::{
    blockchain::monitor::{run_monitor, MonitorContext},
    config::Config,
    db::{self, SqliteLedger},
    export::CsvSink,
    notify::Notifier,
    registry::AddressRegistry,
    SolanaClient,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting sol-transfer-monitor");

    // Configuration and registry problems are fatal; polling never begins
    let config = Config::from_env()?;
    let registry = AddressRegistry::from_config(&config)?;

    let pool = db::connection::establish_connection(&config.database_url).await?;
    db::migration::run_migrations(&pool).await?;
    tracing::info!("Database ready at {}", config.database_url);

    let csv = CsvSink::new(&config.csv_path)?;
    let ledger = SqliteLedger::open(pool, csv).await?;

    let client = SolanaClient::new(&config);
    let notifier = Notifier::new(&config);

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received");
            signal_token.cancel();
        }
    });

    let ctx = MonitorContext {
        config,
        registry,
        client,
        ledger,
        notifier,
    };

    run_monitor(ctx, shutdown).await;

    tracing::info!("sol-transfer-monitor stopped");
    Ok(())
}
