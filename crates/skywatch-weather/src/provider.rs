//! OpenWeatherMap current-conditions client.

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;
use tracing::instrument;

use skywatch_core::{ProviderConfig, ReqwestErrorExt, SourceError, WeatherCredentials};

use crate::types::{WeatherCondition, WeatherReading};

const CURRENT_WEATHER_PATH: &str = "/data/2.5/weather";
pub const REQUEST_TIMEOUT_SECS: u64 = 15;
const USER_AGENT: &str = concat!("Skywatch/", env!("CARGO_PKG_VERSION"));

/// Anything that can produce the current reading for the configured city.
pub trait WeatherSource: Send + Sync {
    fn fetch_current(&self) -> impl Future<Output = Result<WeatherReading, SourceError>> + Send;
}

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    main: MainBlock,
    wind: WindBlock,
    weather: Vec<ConditionBlock>,
}

#[derive(Debug, Deserialize)]
struct MainBlock {
    temp: f64,
    feels_like: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct WindBlock {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct ConditionBlock {
    main: String,
    description: String,
}

impl CurrentResponse {
    fn into_reading(self, fetched_at: DateTime<Utc>) -> Result<WeatherReading, SourceError> {
        let primary = self
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| SourceError::InvalidResponse("empty 'weather' list".to_string()))?;

        if self.main.humidity > 100 {
            return Err(SourceError::InvalidResponse(format!(
                "humidity {} is out of range",
                self.main.humidity
            )));
        }
        if !self.wind.speed.is_finite() || self.wind.speed < 0.0 {
            return Err(SourceError::InvalidResponse(format!(
                "wind speed {} is out of range",
                self.wind.speed
            )));
        }

        Ok(WeatherReading {
            timestamp: fetched_at,
            temperature: self.main.temp,
            feels_like: self.main.feels_like,
            humidity: self.main.humidity,
            wind_speed: self.wind.speed,
            condition: WeatherCondition::from_code(&primary.main),
            description: primary.description,
        })
    }
}

/// Fetches metric current conditions by city id.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    client: Client,
    base_url: String,
    credentials: WeatherCredentials,
    lang: String,
}

impl OpenWeatherProvider {
    /// # Errors
    /// Fails only if the HTTP client cannot be constructed.
    pub fn new(
        credentials: WeatherCredentials,
        settings: &ProviderConfig,
    ) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(ReqwestErrorExt::into_source_error)?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            credentials,
            lang: settings.lang.clone(),
        })
    }

    /// # Errors
    /// `ServerError` on non-2xx, `Timeout`/`ConnectionFailed` on transport
    /// failure, `InvalidResponse` when a required field is missing.
    #[instrument(skip(self), fields(city_id = %self.credentials.city_id), level = "info")]
    pub async fn fetch(&self) -> Result<WeatherReading, SourceError> {
        let url = format!("{}{}", self.base_url, CURRENT_WEATHER_PATH);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("id", self.credentials.city_id.as_str()),
                ("appid", self.credentials.api_key.as_str()),
                ("units", "metric"),
                ("lang", self.lang.as_str()),
            ])
            .send()
            .await
            .map_err(ReqwestErrorExt::into_source_error)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(ReqwestErrorExt::into_source_error)?;

        if !status.is_success() {
            return Err(SourceError::ServerError {
                status: status.as_u16(),
                message: body,
            });
        }

        let parsed: CurrentResponse = serde_json::from_str(&body)
            .map_err(|e| SourceError::InvalidResponse(e.to_string()))?;
        let reading = parsed.into_reading(Utc::now())?;

        tracing::info!(
            "Current weather: {:.1}°C, {} ({})",
            reading.temperature,
            reading.condition,
            reading.description
        );
        Ok(reading)
    }
}

impl WeatherSource for OpenWeatherProvider {
    async fn fetch_current(&self) -> Result<WeatherReading, SourceError> {
        self.fetch().await
    }
}
