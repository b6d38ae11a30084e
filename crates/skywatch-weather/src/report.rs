//! Weekly statistics over the trailing window of the history log.

use chrono::{DateTime, Duration, Utc};

use crate::history::HistoryLog;

pub const WINDOW_DAYS: i64 = 7;

/// Below this many records in the whole log no summary is attempted.
pub const MIN_RECORDS: usize = 3;

/// Qualitative band for the mean temperature of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeeklyBand {
    Warm,
    Mild,
    Cool,
    Cold,
}

impl WeeklyBand {
    pub fn from_mean(mean: f64) -> Self {
        if mean >= 20.0 {
            Self::Warm
        } else if mean >= 10.0 {
            Self::Mild
        } else if mean >= 0.0 {
            Self::Cool
        } else {
            Self::Cold
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Warm => "warm",
            Self::Mild => "mild",
            Self::Cool => "cool",
            Self::Cold => "cold",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Warm => "The week was generally warm and comfortable.",
            Self::Mild => "The week was moderately cool.",
            Self::Cool => "The week was cool, at times cold.",
            Self::Cold => "The week was cold, with frosts possible.",
        }
    }
}

/// Advice for the coming week. The warmth check wins over the cold check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recommendation {
    PrepareForWarmth,
    KeepWarmClothingReady,
    StandardSeasonal,
}

impl Recommendation {
    pub fn from_extremes(min: f64, max: f64) -> Self {
        if max >= 25.0 {
            Self::PrepareForWarmth
        } else if min <= -5.0 {
            Self::KeepWarmClothingReady
        } else {
            Self::StandardSeasonal
        }
    }

    pub fn text(self) -> &'static str {
        match self {
            Self::PrepareForWarmth => {
                "Get ready for warmer weather: don't forget light clothing and water."
            }
            Self::KeepWarmClothingReady => {
                "Cool or cold weather is expected: keep warm clothing at hand."
            }
            Self::StandardSeasonal => {
                "No sharp temperature swings are expected, standard seasonal clothing will do."
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeeklySummary {
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub sample_count: usize,
    /// Records dropped because their timestamp could not be read.
    pub skipped_records: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub band: WeeklyBand,
    pub recommendation: Recommendation,
}

/// The three possible outcomes of a weekly aggregation.
#[derive(Debug, Clone, PartialEq)]
pub enum WeeklyReport {
    /// The log holds fewer than [`MIN_RECORDS`] records in total.
    InsufficientData { total_records: usize },
    /// Nothing readable falls inside the window.
    NoDataInWindow {
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    },
    Summary(WeeklySummary),
}

/// Summarize readings taken on or after `now - 7 days`.
///
/// The record-count check looks at the whole log before any filtering.
/// Records with unreadable timestamps are skipped, not fatal.
pub fn aggregate(log: &HistoryLog, now: DateTime<Utc>) -> WeeklyReport {
    let total_records = log.len();
    if total_records < MIN_RECORDS {
        return WeeklyReport::InsufficientData { total_records };
    }

    let window_start = now - Duration::days(WINDOW_DAYS);
    let window_end = now;

    let mut skipped_records = 0;
    let mut temps = Vec::new();
    for record in log.records() {
        match record.parsed_timestamp() {
            Ok(ts) if ts >= window_start => temps.push(record.temp),
            Ok(_) => {}
            Err(e) => {
                tracing::warn!("Skipping history record: {}", e);
                skipped_records += 1;
            }
        }
    }

    if temps.is_empty() {
        return WeeklyReport::NoDataInWindow {
            window_start,
            window_end,
        };
    }

    let sample_count = temps.len();
    let mean = temps.iter().sum::<f64>() / sample_count as f64;
    let min = temps.iter().copied().fold(f64::INFINITY, f64::min);
    let max = temps.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    tracing::debug!(
        "Aggregated {} of {} records ({} skipped)",
        sample_count,
        total_records,
        skipped_records
    );

    WeeklyReport::Summary(WeeklySummary {
        window_start,
        window_end,
        sample_count,
        skipped_records,
        mean,
        min,
        max,
        band: WeeklyBand::from_mean(mean),
        recommendation: Recommendation::from_extremes(min, max),
    })
}
