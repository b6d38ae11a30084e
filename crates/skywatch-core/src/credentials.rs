//! Static credentials read from the process environment.
//!
//! A `.env` file in the working directory is honoured when present; real
//! environment variables take precedence over it.

use std::fmt;

use crate::error::ConfigError;

pub const OPENWEATHER_API_KEY: &str = "OPENWEATHER_API_KEY";
pub const CITY_ID: &str = "CITY_ID";
pub const TELEGRAM_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
pub const TELEGRAM_CHAT_ID: &str = "TELEGRAM_CHAT_ID";

/// Seed the environment from `.env`, if one exists.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!("Ignoring unreadable .env file: {}", e),
    }
}

fn require<F>(lookup: &F, name: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::MissingCredential(name.to_string()))
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// OpenWeatherMap access.
#[derive(Clone)]
pub struct WeatherCredentials {
    pub api_key: String,
    pub city_id: String,
}

impl WeatherCredentials {
    /// # Errors
    /// `MissingCredential` naming the first unset or blank variable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    /// # Errors
    /// `MissingCredential` naming the first unset or blank variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            api_key: require(&lookup, OPENWEATHER_API_KEY)?,
            city_id: require(&lookup, CITY_ID)?,
        })
    }
}

impl fmt::Debug for WeatherCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeatherCredentials")
            .field("api_key", &"<redacted>")
            .field("city_id", &self.city_id)
            .finish()
    }
}

/// Telegram bot access.
#[derive(Clone)]
pub struct TelegramCredentials {
    pub bot_token: String,
    pub chat_id: String,
}

impl TelegramCredentials {
    /// # Errors
    /// `MissingCredential` naming the first unset or blank variable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    /// # Errors
    /// `MissingCredential` naming the first unset or blank variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            bot_token: require(&lookup, TELEGRAM_BOT_TOKEN)?,
            chat_id: require(&lookup, TELEGRAM_CHAT_ID)?,
        })
    }
}

impl fmt::Debug for TelegramCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramCredentials")
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}
