//! Message templates. Output uses Telegram's legacy Markdown (`*bold*`).

use chrono::{DateTime, Duration, Utc};
use skywatch_core::{CategoryDefinition, Config};

use crate::alerts::AlertReport;
use crate::report::WeeklyReport;
use crate::types::WeatherReading;

pub const DISPLAY_TIME_FORMAT: &str = "%d.%m.%Y %H:%M";

/// Wall-clock time at the configured city.
///
/// This shifts UTC by a fixed number of seconds; daylight-saving changes
/// are not applied.
pub fn local_display_time(now: DateTime<Utc>, offset_secs: i32) -> String {
    (now.naive_utc() + Duration::seconds(i64::from(offset_secs)))
        .format(DISPLAY_TIME_FORMAT)
        .to_string()
}

/// Upper-case the first character and lower-case the rest.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// `- item` lines in source order.
pub fn bullet_list<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(|item| format!("- {}", item.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_daily(
    config: &Config,
    reading: &WeatherReading,
    category: &CategoryDefinition,
    now: DateTime<Utc>,
) -> String {
    let symbol = config.symbol_for(reading.condition.as_str());

    format!(
        "📅 *Daily weather forecast*\n\
         City: *{city}*\n\
         Time: {time}\n\n\
         Weather: *{description}* {symbol}\n\
         Temperature: *{temp:.1}°C* (feels like {feels_like:.1}°C)\n\
         Humidity: {humidity}%\n\
         Wind: {wind:.1} m/s\n\n\
         Temperature category: *{category}*\n\n\
         👕 Clothing recommendations:\n{clothes}\n\n\
         🏃 Activity ideas:\n{activities}",
        city = config.city.name,
        time = local_display_time(now, config.city.timezone_offset),
        description = capitalize(&reading.description),
        symbol = symbol,
        temp = reading.temperature,
        feels_like = reading.feels_like,
        humidity = reading.humidity,
        wind = reading.wind_speed,
        category = category.name,
        clothes = bullet_list(&category.clothes),
        activities = bullet_list(&category.activities),
    )
}

/// Warning text when any hazard fired, an all-clear message otherwise.
pub fn format_alert(config: &Config, report: &AlertReport, now: DateTime<Utc>) -> String {
    let current = format!(
        "Current weather: {}, {:.1}°C, wind {:.1} m/s.",
        capitalize(&report.description),
        report.temperature,
        report.wind_speed
    );
    let time = local_display_time(now, config.city.timezone_offset);

    if report.is_clear() {
        format!(
            "✅ *Weather conditions are normal*\n\
             City: *{}*\n\
             Time: {}\n\n\
             {}\n\n\
             No serious weather threats detected.",
            config.city.name, time, current
        )
    } else {
        format!(
            "🚨 *Severe weather warning!*\n\
             City: *{}*\n\
             Time: {}\n\n\
             {}\n\n\
             Hazardous conditions:\n{}",
            config.city.name,
            time,
            current,
            bullet_list(&report.messages())
        )
    }
}

pub fn format_weekly(config: &Config, report: &WeeklyReport) -> String {
    match report {
        WeeklyReport::InsufficientData { .. } => "📊 Weekly weather report\n\n\
             Not enough data to analyse the week yet. \
             Wait for a few more daily updates."
            .to_string(),
        WeeklyReport::NoDataInWindow { .. } => {
            "📊 Weekly weather report\n\nNo data for the past week.".to_string()
        }
        WeeklyReport::Summary(summary) => format!(
            "📊 *Weekly weather report*\n\
             City: *{city}*\n\n\
             Period: last 7 days\n\
             Average temperature: *{mean:.1}°C*\n\
             Minimum: {min:.1}°C\n\
             Maximum: {max:.1}°C\n\n\
             Overall:\n{band}\n\n\
             Recommendations for next week:\n{recommendation}",
            city = config.city.name,
            mean = summary.mean,
            min = summary.min,
            max = summary.max,
            band = summary.band.description(),
            recommendation = summary.recommendation.text(),
        ),
    }
}
