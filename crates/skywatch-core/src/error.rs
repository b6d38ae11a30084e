//! Centralized error types for Skywatch.
//!
//! Every job run ends in either success or exactly one of these errors:
//! - configuration and credential problems are caught before any network call
//! - source and sink failures abort the run, nothing is retried
//! - a single bad history record is recovered locally by the aggregator

use thiserror::Error;

/// Top-level error returned by a job run.
///
/// Use `user_message()` for a short operator-facing hint; the `Display`
/// output keeps the full context for logs.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Weather source error: {0}")]
    Source(#[from] SourceError),

    #[error("Notification error: {0}")]
    Sink(#[from] SinkError),

    #[error("History error: {0}")]
    History(#[from] HistoryError),
}

impl AppError {
    /// Returns a short, actionable message for the operator.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Config(e) => e.user_message(),
            AppError::Source(e) => e.user_message(),
            AppError::Sink(e) => e.user_message(),
            AppError::History(e) => e.user_message(),
        }
    }
}

/// Configuration and credential errors. Always fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Configuration file is empty: {0}")]
    Empty(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Missing required credential: {0}")]
    MissingCredential(String),

    #[error("Fallback temperature category '{0}' is not defined")]
    MissingFallbackCategory(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::NotFound(_) => "Configuration file not found.",
            ConfigError::Empty(_) => "Configuration file is empty.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::MissingCredential(_) => {
                "A required environment variable is not set. Check your secrets."
            }
            ConfigError::MissingFallbackCategory(_) => {
                "The fallback temperature category is missing from the configuration."
            }
        }
    }
}

/// Weather retrieval errors.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Malformed weather payload: {0}")]
    InvalidResponse(String),
}

impl SourceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            SourceError::ConnectionFailed(_) => {
                "Unable to reach the weather service. Check your internet connection."
            }
            SourceError::Timeout => "The weather service did not answer in time.",
            SourceError::ServerError { status: 401, .. } => {
                "Weather API key is invalid. Check OPENWEATHER_API_KEY."
            }
            SourceError::ServerError { status, .. } if *status >= 500 => {
                "The weather service is experiencing issues. Try again later."
            }
            SourceError::ServerError { .. } => "The weather request was rejected.",
            SourceError::InvalidResponse(_) => "The weather service returned unexpected data.",
        }
    }
}

/// Notification delivery errors.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Message rejected: {0}")]
    Rejected(String),
}

impl SinkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            SinkError::ConnectionFailed(_) => {
                "Unable to reach the messaging service. Check your internet connection."
            }
            SinkError::Timeout => "The messaging service did not answer in time.",
            SinkError::ServerError { status: 401, .. } | SinkError::ServerError { status: 404, .. } => {
                "Bot token is invalid. Check TELEGRAM_BOT_TOKEN."
            }
            SinkError::ServerError { .. } => "The message could not be delivered.",
            SinkError::Rejected(_) => "The messaging service rejected the message.",
        }
    }
}

/// History document errors.
///
/// `InvalidTimestamp` is recoverable: the offending record is skipped.
/// The remaining variants concern the whole document and are fatal.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Invalid record timestamp '{timestamp}': {reason}")]
    InvalidTimestamp { timestamp: String, reason: String },

    #[error("Failed to read history: {0}")]
    Read(String),

    #[error("History document is malformed: {0}")]
    Parse(String),

    #[error("Failed to write history: {0}")]
    Write(String),
}

impl HistoryError {
    pub fn user_message(&self) -> &'static str {
        match self {
            HistoryError::InvalidTimestamp { .. } => "A history record has an unreadable date.",
            HistoryError::Read(_) => "Weather history could not be read.",
            HistoryError::Parse(_) => "Weather history file is corrupted.",
            HistoryError::Write(_) => "Weather history could not be saved.",
        }
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_source_error(self) -> SourceError;
    fn into_sink_error(self) -> SinkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_source_error(self) -> SourceError {
        if self.is_timeout() {
            SourceError::Timeout
        } else if self.is_decode() {
            SourceError::InvalidResponse(self.to_string())
        } else if let Some(status) = self.status() {
            SourceError::ServerError {
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else {
            SourceError::ConnectionFailed(self.to_string())
        }
    }

    fn into_sink_error(self) -> SinkError {
        if self.is_timeout() {
            SinkError::Timeout
        } else if let Some(status) = self.status() {
            SinkError::ServerError {
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else {
            SinkError::ConnectionFailed(self.to_string())
        }
    }
}
