//! Fixed hazard rules evaluated against a single reading.

use crate::types::{WeatherCondition, WeatherReading};

pub const HEAT_THRESHOLD_C: f64 = 30.0;
pub const COLD_THRESHOLD_C: f64 = -15.0;
pub const WIND_THRESHOLD_MS: f64 = 15.0;

/// A hazard rule. Variants are declared in reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hazard {
    Heat,
    Cold,
    Wind,
    Thunderstorm,
    Snow,
}

impl Hazard {
    /// All rules in the order they are reported.
    pub const ALL: [Hazard; 5] = [
        Hazard::Heat,
        Hazard::Cold,
        Hazard::Wind,
        Hazard::Thunderstorm,
        Hazard::Snow,
    ];

    pub fn applies_to(self, reading: &WeatherReading) -> bool {
        match self {
            Hazard::Heat => reading.temperature >= HEAT_THRESHOLD_C,
            Hazard::Cold => reading.temperature <= COLD_THRESHOLD_C,
            Hazard::Wind => reading.wind_speed >= WIND_THRESHOLD_MS,
            Hazard::Thunderstorm => reading.condition == WeatherCondition::Thunderstorm,
            Hazard::Snow => reading.condition == WeatherCondition::Snow,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Hazard::Heat => {
                "Extreme heat (temperature above 30°C). Avoid long exposure to the sun."
            }
            Hazard::Cold => "Severe frost (temperature below -15°C). Dress as warmly as possible.",
            Hazard::Wind => "Strong wind (over 15 m/s). Be careful outdoors.",
            Hazard::Thunderstorm => "Thunderstorm. Try to stay away from open areas.",
            Hazard::Snow => "Heavy snowfall possible. Take care on the roads and when walking.",
        }
    }
}

/// Outcome of evaluating every hazard rule, plus the values echoed in the message.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertReport {
    pub hazards: Vec<Hazard>,
    pub temperature: f64,
    pub wind_speed: f64,
    pub description: String,
}

impl AlertReport {
    /// No hazard rule matched.
    pub fn is_clear(&self) -> bool {
        self.hazards.is_empty()
    }

    pub fn messages(&self) -> Vec<&'static str> {
        self.hazards.iter().map(|h| h.message()).collect()
    }
}

/// Evaluate all hazard rules. Rules are independent; any number may match.
pub fn evaluate(reading: &WeatherReading) -> AlertReport {
    let hazards = Hazard::ALL
        .into_iter()
        .filter(|hazard| hazard.applies_to(reading))
        .collect();

    AlertReport {
        hazards,
        temperature: reading.temperature,
        wind_speed: reading.wind_speed,
        description: reading.description.clone(),
    }
}
