//! Append-only log of daily readings and its JSON file store.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use skywatch_core::HistoryError;

use crate::types::{WeatherCondition, WeatherReading};

/// On-disk timestamp layout: UTC, second precision, `Z` suffix.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.format(TIMESTAMP_FORMAT).to_string()
}

/// # Errors
/// `InvalidTimestamp` when `raw` does not follow [`TIMESTAMP_FORMAT`].
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, HistoryError> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| HistoryError::InvalidTimestamp {
            timestamp: raw.to_string(),
            reason: e.to_string(),
        })
}

/// One persisted reading.
///
/// The timestamp stays a string so a single corrupted entry does not make
/// the whole document unreadable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub timestamp: String,
    pub temp: f64,
    pub weather_main: WeatherCondition,
    pub weather_description: String,
    pub humidity: u8,
    pub wind: f64,
}

impl HistoryRecord {
    pub fn from_reading(reading: &WeatherReading) -> Self {
        Self {
            timestamp: format_timestamp(reading.timestamp),
            temp: reading.temperature,
            weather_main: reading.condition.clone(),
            weather_description: reading.description.clone(),
            humidity: reading.humidity,
            wind: reading.wind_speed,
        }
    }

    /// # Errors
    /// `InvalidTimestamp` when the stored value cannot be parsed.
    pub fn parsed_timestamp(&self) -> Result<DateTime<Utc>, HistoryError> {
        parse_timestamp(&self.timestamp)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryLog {
    /// Empty until the first append.
    #[serde(default)]
    pub last_update: String,
    #[serde(default)]
    pub history: Vec<HistoryRecord>,
}

impl HistoryLog {
    /// Record `reading`. Its retrieval instant becomes both the record
    /// timestamp and `last_update`; earlier records are never touched.
    pub fn append(&mut self, reading: &WeatherReading) -> &HistoryRecord {
        let record = HistoryRecord::from_reading(reading);
        self.last_update = record.timestamp.clone();
        self.history.push(record);
        &self.history[self.history.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn records(&self) -> &[HistoryRecord] {
        &self.history
    }
}

/// JSON file holding a [`HistoryLog`].
///
/// There is no locking: two jobs writing concurrently can lose an append.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the log, or an empty one if the file does not exist yet.
    ///
    /// # Errors
    /// `Read` on I/O failure, `Parse` when the document is not a history log.
    pub fn load(&self) -> Result<HistoryLog, HistoryError> {
        if !self.path.exists() {
            tracing::info!("No history at {}, starting empty", self.path.display());
            return Ok(HistoryLog::default());
        }

        let json = fs::read_to_string(&self.path)
            .map_err(|e| HistoryError::Read(format!("{}: {}", self.path.display(), e)))?;

        let log: HistoryLog =
            serde_json::from_str(&json).map_err(|e| HistoryError::Parse(e.to_string()))?;

        tracing::debug!("Loaded {} history records", log.len());
        Ok(log)
    }

    /// Write the log, replacing the file atomically via a sibling temp file.
    ///
    /// # Errors
    /// `Write` when serialization or any filesystem step fails.
    pub fn save(&self, log: &HistoryLog) -> Result<(), HistoryError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| HistoryError::Write(format!("{}: {}", parent.display(), e)))?;
        }

        let json =
            serde_json::to_string_pretty(log).map_err(|e| HistoryError::Write(e.to_string()))?;

        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        fs::write(&tmp_path, json)
            .map_err(|e| HistoryError::Write(format!("{}: {}", tmp_path.display(), e)))?;
        fs::rename(&tmp_path, &self.path)
            .map_err(|e| HistoryError::Write(format!("{}: {}", self.path.display(), e)))?;

        tracing::info!(
            "Saved {} history records to {}",
            log.len(),
            self.path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use chrono::TimeZone;

    fn reading_at(instant: DateTime<Utc>, temperature: f64) -> WeatherReading {
        WeatherReading {
            timestamp: instant,
            temperature,
            feels_like: temperature - 2.0,
            humidity: 81,
            wind_speed: 3.4,
            condition: WeatherCondition::Rain,
            description: "небольшой дождь".to_string(),
        }
    }

    #[test]
    fn test_timestamp_format() {
        let instant = Utc.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap();
        assert_eq!(format_timestamp(instant), "2024-03-05T07:08:09Z");
        assert_eq!(parse_timestamp("2024-03-05T07:08:09Z").unwrap(), instant);
    }

    #[test]
    fn test_timestamp_drops_subseconds() {
        let instant = Utc.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap()
            + chrono::Duration::milliseconds(750);
        assert_eq!(format_timestamp(instant), "2024-03-05T07:08:09Z");
    }

    #[test]
    fn test_bad_timestamps() {
        for raw in ["", "yesterday", "2024-03-05 07:08:09", "2024-03-05T07:08:09+03:00"] {
            assert!(
                matches!(parse_timestamp(raw), Err(HistoryError::InvalidTimestamp { .. })),
                "{raw} should not parse"
            );
        }
    }

    #[test]
    fn test_append_sets_last_update() {
        let mut log = HistoryLog::default();
        let instant = Utc.with_ymd_and_hms(2024, 1, 10, 6, 0, 0).unwrap();
        let reading = reading_at(instant, 4.5);

        log.append(&reading);

        assert_eq!(log.len(), 1);
        let last = &log.records()[0];
        assert_eq!(last, &HistoryRecord::from_reading(&reading));
        assert_eq!(log.last_update, last.timestamp);
        assert_eq!(last.timestamp, "2024-01-10T06:00:00Z");
        assert_eq!(last.weather_main, WeatherCondition::Rain);
        assert_eq!(last.humidity, 81);
        assert_eq!(last.wind, 3.4);
    }

    #[test]
    fn test_append_keeps_earlier_records() {
        let mut log = HistoryLog::default();
        let first = Utc.with_ymd_and_hms(2024, 1, 10, 6, 0, 0).unwrap();
        log.append(&reading_at(first, 1.0));
        let snapshot = log.records()[0].clone();

        // Same reading twice is recorded twice
        let second = reading_at(first + chrono::Duration::days(1), 2.0);
        log.append(&second);
        log.append(&second);

        assert_eq!(log.len(), 3);
        assert_eq!(log.records()[0], snapshot);
        assert_eq!(log.last_update, "2024-01-11T06:00:00Z");
    }

    #[test]
    fn test_document_shape() {
        let mut log = HistoryLog::default();
        log.append(&reading_at(Utc.with_ymd_and_hms(2024, 1, 10, 6, 0, 0).unwrap(), 4.5));

        let value = serde_json::to_value(&log).unwrap();
        assert_eq!(value["last_update"], "2024-01-10T06:00:00Z");
        assert_eq!(value["history"][0]["temp"], 4.5);
        assert_eq!(value["history"][0]["weather_main"], "Rain");
        assert_eq!(value["history"][0]["weather_description"], "небольшой дождь");
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("weather_history.json"));
        let log = store.load().unwrap();
        assert!(log.is_empty());
        assert_eq!(log.last_update, "");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("nested").join("weather_history.json"));

        let mut log = HistoryLog::default();
        log.append(&reading_at(Utc.with_ymd_and_hms(2024, 1, 10, 6, 0, 0).unwrap(), -3.0));
        store.save(&log).unwrap();

        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("небольшой дождь"), "non-ASCII text is written as-is");
        assert!(!dir.path().join("nested").join("weather_history.json.tmp").exists());

        assert_eq!(store.load().unwrap(), log);
    }

    #[test]
    fn test_load_keeps_unparsable_timestamps() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weather_history.json");
        fs::write(
            &path,
            r#"{
                "last_update": "2024-01-10T06:00:00Z",
                "history": [
                    { "timestamp": "garbage", "temp": 1.0, "weather_main": "Clear",
                      "weather_description": "clear sky", "humidity": 40, "wind": 1.0 }
                ]
            }"#,
        )
        .unwrap();

        let log = HistoryStore::new(&path).load().unwrap();
        assert_eq!(log.len(), 1);
        assert!(log.records()[0].parsed_timestamp().is_err());
    }

    #[test]
    fn test_load_malformed_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weather_history.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        assert!(matches!(
            HistoryStore::new(&path).load(),
            Err(HistoryError::Parse(_))
        ));
    }
}
