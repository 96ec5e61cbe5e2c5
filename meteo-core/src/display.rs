//! Turning a normalized series into the table printed by the CLI.

use std::fmt::{self, Write};

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::model::{HourlySample, WeatherSeries};

/// One formatted line of the forecast table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastRow {
    pub hour: String,
    pub temperature: String,
    pub wind_speed: String,
    pub precipitation: String,
    pub weather: String,
}

impl ForecastRow {
    pub fn from_sample(sample: &HourlySample<'_>, tz: Tz) -> Self {
        let local = sample.time.with_timezone(&tz);
        Self {
            hour: local.format("%H:00").to_string(),
            temperature: format!("{:.1}°C", sample.temperature),
            wind_speed: format!("{:.1}km/h", sample.wind_speed),
            precipitation: format!("{:.0}%", sample.precipitation_probability),
            weather: sample.weather_state.to_string(),
        }
    }
}

/// Rows for every sample at or after `now`, at most `max_rows` of them.
///
/// Past samples are dropped wherever they appear and do not count towards
/// the cap.
pub fn render_rows(
    series: &WeatherSeries,
    tz: Tz,
    now: DateTime<Utc>,
    max_rows: usize,
) -> Vec<ForecastRow> {
    series
        .samples()
        .filter(|sample| sample.time >= now)
        .take(max_rows)
        .map(|sample| ForecastRow::from_sample(&sample, tz))
        .collect()
}

fn write_line(out: &mut impl Write, cols: [&str; 5]) -> fmt::Result {
    let [hour, temperature, wind, precipitation, weather] = cols;
    let line = format!("{hour:<6} {temperature:<10} {wind:<10} {precipitation:<13}  {weather}");
    writeln!(out, "{}", line.trim_end())
}

/// Fixed-width table with a header line.
pub fn write_table(out: &mut impl Write, rows: &[ForecastRow]) -> fmt::Result {
    write_line(out, ["Time", "Temp", "Wind", "Precip", "Weather"])?;
    for row in rows {
        write_line(
            out,
            [
                &row.hour,
                &row.temperature,
                &row.wind_speed,
                &row.precipitation,
                &row.weather,
            ],
        )?;
    }
    Ok(())
}

pub fn format_table(rows: &[ForecastRow]) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_table(&mut out, rows);
    out
}
