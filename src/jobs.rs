//! The three notification pipelines.
//!
//! Each job is one linear pass: no step runs until the previous one has
//! finished, and the first error ends the run.

use chrono::{DateTime, Utc};
use std::future::Future;

use skywatch_core::{AppError, Config, NotificationSink, SinkError};
use skywatch_weather::{
    aggregate, classify, evaluate, format_alert, format_daily, format_weekly, HistoryStore,
    WeatherSource, WeeklyReport,
};

/// Fetch, classify, send, then record the reading.
///
/// History is only written after the message went out. With `store` set to
/// `None` nothing is read from or written to disk.
pub async fn run_daily<S, N>(
    config: &Config,
    source: &S,
    sink: &N,
    store: Option<&HistoryStore>,
    now: DateTime<Utc>,
) -> Result<(), AppError>
where
    S: WeatherSource,
    N: NotificationSink,
{
    let mut history = store.map(HistoryStore::load).transpose()?;

    let reading = source.fetch_current().await?;
    let category = classify(reading.temperature, &config.temperature_categories)?;
    tracing::info!(
        "{:.1}°C falls in category '{}'",
        reading.temperature,
        category.name
    );

    let message = format_daily(config, &reading, category, now);
    deliver(sink, &message).await?;

    if let (Some(store), Some(history)) = (store, history.as_mut()) {
        history.append(&reading);
        store.save(history)?;
    }

    Ok(())
}

/// Fetch and check the hazard rules. A message is sent either way.
pub async fn run_alert<S, N>(
    config: &Config,
    source: &S,
    sink: &N,
    now: DateTime<Utc>,
) -> Result<(), AppError>
where
    S: WeatherSource,
    N: NotificationSink,
{
    let reading = source.fetch_current().await?;
    let report = evaluate(&reading);

    if report.is_clear() {
        tracing::info!("No hazards detected");
    } else {
        tracing::warn!("{} hazard(s) detected: {:?}", report.hazards.len(), report.hazards);
    }

    let message = format_alert(config, &report, now);
    deliver(sink, &message).await?;
    Ok(())
}

/// Summarize the trailing week of history.
pub async fn run_weekly<N>(
    config: &Config,
    sink: &N,
    store: &HistoryStore,
    now: DateTime<Utc>,
) -> Result<(), AppError>
where
    N: NotificationSink,
{
    let history = store.load()?;
    let report = aggregate(&history, now);

    match &report {
        WeeklyReport::InsufficientData { total_records } => {
            tracing::info!("Only {} records, not enough for a summary", total_records)
        }
        WeeklyReport::NoDataInWindow { window_start, .. } => {
            tracing::info!("No readings since {}", window_start)
        }
        WeeklyReport::Summary(summary) => tracing::info!(
            "Weekly mean {:.1}°C over {} readings, {} week",
            summary.mean,
            summary.sample_count,
            summary.band.label()
        ),
    }

    let message = format_weekly(config, &report);
    deliver(sink, &message).await?;
    Ok(())
}

async fn deliver<N: NotificationSink>(sink: &N, message: &str) -> Result<(), SinkError> {
    tracing::info!("Sending {} chars via {}", message.chars().count(), sink.name());
    sink.send(message).await
}

/// Prints messages to stdout instead of delivering them. Used by `--dry-run`.
pub struct ConsoleSink;

impl NotificationSink for ConsoleSink {
    fn name(&self) -> &str {
        "console"
    }

    fn send(&self, text: &str) -> impl Future<Output = Result<(), SinkError>> + Send {
        println!("{}", text);
        std::future::ready(Ok(()))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use chrono::{Duration, TimeZone};
    use skywatch_core::{ConfigError, SourceError};
    use skywatch_weather::history::format_timestamp;
    use skywatch_weather::{HistoryLog, WeatherCondition, WeatherReading};
    use std::sync::Mutex;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 6, 0, 0).unwrap()
    }

    fn config() -> Config {
        serde_json::from_value(serde_json::json!({
            "city": { "name": "Kazan", "timezone_offset": 10800 },
            "weather_emojis": { "Clear": "☀️" },
            "temperature_categories": {
                "cold": { "min": -50, "max": 5, "clothes": ["coat"], "activities": ["skating"] },
                "cool": { "min": 5.1, "max": 18, "clothes": ["jacket"], "activities": ["walk"] },
                "warm": { "min": 18.1, "max": 50, "clothes": ["shorts"], "activities": ["swim"] }
            }
        }))
        .unwrap()
    }

    fn reading(temperature: f64, wind_speed: f64, condition: WeatherCondition) -> WeatherReading {
        WeatherReading {
            timestamp: now(),
            temperature,
            feels_like: temperature,
            humidity: 55,
            wind_speed,
            condition,
            description: "clear sky".to_string(),
        }
    }

    enum FakeSource {
        Reading(WeatherReading),
        Timeout,
    }

    impl WeatherSource for FakeSource {
        async fn fetch_current(&self) -> Result<WeatherReading, SourceError> {
            match self {
                FakeSource::Reading(r) => Ok(r.clone()),
                FakeSource::Timeout => Err(SourceError::Timeout),
            }
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        sent: Mutex<Vec<String>>,
        fail: bool,
    }

    impl RecordingSink {
        fn failing() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        fn messages(&self) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl NotificationSink for RecordingSink {
        fn name(&self) -> &str {
            "recording"
        }

        async fn send(&self, text: &str) -> Result<(), SinkError> {
            if self.fail {
                return Err(SinkError::Rejected("chat not found".to_string()));
            }
            self.sent.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    fn store_in(dir: &tempfile::TempDir) -> HistoryStore {
        HistoryStore::new(dir.path().join("weather_history.json"))
    }

    #[tokio::test]
    async fn test_daily_sends_then_appends() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let sink = RecordingSink::default();
        let source = FakeSource::Reading(reading(21.0, 2.0, WeatherCondition::Clear));

        run_daily(&config(), &source, &sink, Some(&store), now()).await.unwrap();

        let sent = sink.messages();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("Temperature category: *warm*"));
        assert!(sent[0].contains("- shorts"));
        assert!(sent[0].contains("Time: 15.06.2024 09:00"));

        let log = store.load().unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log.last_update, format_timestamp(now()));
        assert_eq!(log.records()[0].temp, 21.0);
    }

    #[tokio::test]
    async fn test_daily_appends_to_existing_history() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let sink = RecordingSink::default();

        for temp in [1.0, 2.0] {
            let source = FakeSource::Reading(reading(temp, 2.0, WeatherCondition::Clear));
            run_daily(&config(), &source, &sink, Some(&store), now()).await.unwrap();
        }

        let temps: Vec<_> = store.load().unwrap().records().iter().map(|r| r.temp).collect();
        assert_eq!(temps, vec![1.0, 2.0]);
    }

    #[tokio::test]
    async fn test_daily_send_failure_skips_history() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let sink = RecordingSink::failing();
        let source = FakeSource::Reading(reading(21.0, 2.0, WeatherCondition::Clear));

        let result = run_daily(&config(), &source, &sink, Some(&store), now()).await;

        assert!(matches!(result, Err(AppError::Sink(_))));
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_daily_source_failure_sends_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let sink = RecordingSink::default();

        let result = run_daily(&config(), &FakeSource::Timeout, &sink, Some(&store), now()).await;

        assert!(matches!(result, Err(AppError::Source(SourceError::Timeout))));
        assert!(sink.messages().is_empty());
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_daily_missing_fallback_sends_nothing() {
        let mut config = config();
        config.temperature_categories.retain(|c| c.name != "cool");
        let sink = RecordingSink::default();
        // 5.05 sits in the gap between "cold" and the removed "cool"
        let source = FakeSource::Reading(reading(5.05, 2.0, WeatherCondition::Clear));

        let result = run_daily(&config, &source, &sink, None, now()).await;

        assert!(matches!(
            result,
            Err(AppError::Config(ConfigError::MissingFallbackCategory(_)))
        ));
        assert!(sink.messages().is_empty());
    }

    #[tokio::test]
    async fn test_daily_without_store_leaves_disk_alone() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let sink = RecordingSink::default();
        let source = FakeSource::Reading(reading(10.0, 2.0, WeatherCondition::Clear));

        run_daily(&config(), &source, &sink, None, now()).await.unwrap();

        assert_eq!(sink.messages().len(), 1);
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_alert_with_hazards() {
        let sink = RecordingSink::default();
        let source = FakeSource::Reading(reading(31.0, 20.0, WeatherCondition::Thunderstorm));

        run_alert(&config(), &source, &sink, now()).await.unwrap();

        let sent = sink.messages();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].starts_with("🚨"));
        assert_eq!(sent[0].matches("\n- ").count(), 3);
    }

    #[tokio::test]
    async fn test_alert_all_clear_still_sends() {
        let sink = RecordingSink::default();
        let source = FakeSource::Reading(reading(12.0, 3.0, WeatherCondition::Clear));

        run_alert(&config(), &source, &sink, now()).await.unwrap();

        let sent = sink.messages();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].starts_with("✅"));
    }

    #[tokio::test]
    async fn test_alert_source_failure() {
        let sink = RecordingSink::default();
        let result = run_alert(&config(), &FakeSource::Timeout, &sink, now()).await;
        assert!(matches!(result, Err(AppError::Source(_))));
        assert!(sink.messages().is_empty());
    }

    #[tokio::test]
    async fn test_weekly_with_empty_history() {
        let dir = tempfile::tempdir().unwrap();
        let sink = RecordingSink::default();

        run_weekly(&config(), &sink, &store_in(&dir), now()).await.unwrap();

        assert!(sink.messages()[0].contains("Not enough data"));
    }

    #[tokio::test]
    async fn test_weekly_summary_does_not_modify_history() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let mut log = HistoryLog::default();
        for (days, temp) in [(3, 10.0), (2, 20.0), (1, 30.0)] {
            let mut r = reading(temp, 1.0, WeatherCondition::Clear);
            r.timestamp = now() - Duration::days(days);
            log.append(&r);
        }
        store.save(&log).unwrap();

        let sink = RecordingSink::default();
        run_weekly(&config(), &sink, &store, now()).await.unwrap();

        let sent = sink.messages();
        assert!(sent[0].contains("Average temperature: *20.0°C*"));
        assert!(sent[0].contains("City: *Kazan*"));
        assert_eq!(store.load().unwrap(), log);
    }

    #[tokio::test]
    async fn test_weekly_corrupt_history_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "not json").unwrap();
        let sink = RecordingSink::default();

        let result = run_weekly(&config(), &sink, &store, now()).await;

        assert!(matches!(result, Err(AppError::History(_))));
        assert!(sink.messages().is_empty());
    }
}
