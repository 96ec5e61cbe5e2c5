use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Provider-agnostic hourly series. Arrays run in parallel, one entry per
/// hour, ascending in time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherSeries {
    pub time: Vec<DateTime<Utc>>,
    pub temperature: Vec<f64>,
    pub precipitation_probability: Vec<f64>,
    pub wind_speed: Vec<f64>,
    pub weather_state: Vec<String>,
}

/// One hour of a [`WeatherSeries`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HourlySample<'a> {
    pub time: DateTime<Utc>,
    pub temperature: f64,
    pub precipitation_probability: f64,
    pub wind_speed: f64,
    pub weather_state: &'a str,
}

impl WeatherSeries {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Iterate rows. Stops at the shortest array if the provider sent
    /// arrays of unequal length.
    pub fn samples(&self) -> impl Iterator<Item = HourlySample<'_>> {
        self.time
            .iter()
            .zip(&self.temperature)
            .zip(&self.precipitation_probability)
            .zip(&self.wind_speed)
            .zip(&self.weather_state)
            .map(|((((time, temperature), precip), wind), state)| HourlySample {
                time: *time,
                temperature: *temperature,
                precipitation_probability: *precip,
                wind_speed: *wind,
                weather_state: state.as_str(),
            })
    }
}
