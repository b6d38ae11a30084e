use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Primary condition group as reported by OpenWeatherMap (`weather[0].main`).
///
/// Codes outside the documented set are kept verbatim in `Other` so that
/// they survive a round trip through the history file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WeatherCondition {
    Clear,
    Clouds,
    Rain,
    Drizzle,
    Snow,
    Thunderstorm,
    Mist,
    Fog,
    Haze,
    Smoke,
    Dust,
    Sand,
    Ash,
    Squall,
    Tornado,
    Other(String),
}

impl WeatherCondition {
    /// Parse a provider condition code. Matching is exact.
    pub fn from_code(code: &str) -> Self {
        match code {
            "Clear" => Self::Clear,
            "Clouds" => Self::Clouds,
            "Rain" => Self::Rain,
            "Drizzle" => Self::Drizzle,
            "Snow" => Self::Snow,
            "Thunderstorm" => Self::Thunderstorm,
            "Mist" => Self::Mist,
            "Fog" => Self::Fog,
            "Haze" => Self::Haze,
            "Smoke" => Self::Smoke,
            "Dust" => Self::Dust,
            "Sand" => Self::Sand,
            "Ash" => Self::Ash,
            "Squall" => Self::Squall,
            "Tornado" => Self::Tornado,
            other => Self::Other(other.to_string()),
        }
    }

    /// The provider code, also the key into the configured symbol table.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Clear => "Clear",
            Self::Clouds => "Clouds",
            Self::Rain => "Rain",
            Self::Drizzle => "Drizzle",
            Self::Snow => "Snow",
            Self::Thunderstorm => "Thunderstorm",
            Self::Mist => "Mist",
            Self::Fog => "Fog",
            Self::Haze => "Haze",
            Self::Smoke => "Smoke",
            Self::Dust => "Dust",
            Self::Sand => "Sand",
            Self::Ash => "Ash",
            Self::Squall => "Squall",
            Self::Tornado => "Tornado",
            Self::Other(code) => code,
        }
    }
}

impl From<String> for WeatherCondition {
    fn from(code: String) -> Self {
        Self::from_code(&code)
    }
}

impl From<WeatherCondition> for String {
    fn from(condition: WeatherCondition) -> Self {
        match condition {
            WeatherCondition::Other(code) => code,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One sampled observation for the configured city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    /// When the reading was retrieved.
    pub timestamp: DateTime<Utc>,
    /// Degrees Celsius
    pub temperature: f64,
    pub feels_like: f64,
    /// Relative humidity, 0-100
    pub humidity: u8,
    /// Metres per second
    pub wind_speed: f64,
    pub condition: WeatherCondition,
    pub description: String,
}
