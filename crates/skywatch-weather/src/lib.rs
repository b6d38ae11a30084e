//! Weather domain for Skywatch.
//!
//! Fetches current conditions from OpenWeatherMap, classifies them against
//! the configured temperature bands and hazard rules, keeps the reading
//! history, and renders the daily, alert and weekly messages.

pub mod alerts;
pub mod classify;
pub mod format;
pub mod history;
pub mod provider;
pub mod report;
pub mod types;

pub use alerts::{evaluate, AlertReport, Hazard};
pub use classify::classify;
pub use format::{format_alert, format_daily, format_weekly};
pub use history::{HistoryLog, HistoryRecord, HistoryStore};
pub use provider::{OpenWeatherProvider, WeatherSource};
pub use report::{aggregate, Recommendation, WeeklyBand, WeeklyReport, WeeklySummary};
pub use types::{WeatherCondition, WeatherReading};
