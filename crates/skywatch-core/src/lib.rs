pub mod config;
pub mod credentials;
pub mod error;
pub mod notify;

pub use config::{
    CategoryDefinition, CityConfig, Config, ProviderConfig, TelegramConfig, ValidationResult,
    FALLBACK_CATEGORY,
};
pub use credentials::{TelegramCredentials, WeatherCredentials};
pub use error::{AppError, ConfigError, HistoryError, ReqwestErrorExt, SinkError, SourceError};
pub use notify::NotificationSink;

use anyhow::Result;

/// Initialize logging. Reads `RUST_LOG`, defaulting to `info`, and writes to stderr.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Skywatch core initialized");
    Ok(())
}
