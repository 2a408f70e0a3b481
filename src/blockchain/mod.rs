pub mod client;
pub mod extractor;
pub mod monitor;

// Re-exports for convenience
pub use client::SolanaClient;
pub use monitor::run_monitor;
