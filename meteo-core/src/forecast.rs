use std::fmt;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::debug;

use crate::{
    coords::Coordinates,
    display::{ForecastRow, render_rows, write_table},
    error::Result,
    provider::{ProviderId, WeatherProvider},
    timezone,
};

/// A rendered forecast, ready to print.
#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    pub provider: ProviderId,
    pub coords: Coordinates,
    pub timezone: Tz,
    pub rows: Vec<ForecastRow>,
}

impl fmt::Display for Forecast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Forecast for {} ({}) via {}",
            self.coords, self.timezone, self.provider
        )?;
        write_table(f, &self.rows)
    }
}

/// Fetch, normalize and render one forecast.
///
/// `now` decides which hours are already in the past.
pub async fn forecast(
    provider: &dyn WeatherProvider,
    coords: Coordinates,
    now: DateTime<Utc>,
    max_rows: usize,
) -> Result<Forecast> {
    let series = provider.fetch(coords).await?;
    debug!(provider = %provider.id(), samples = series.len(), "fetched series");

    let tz = timezone::resolve(coords)?;
    let rows = render_rows(&series, tz, now, max_rows);
    debug!(rows = rows.len(), timezone = %tz, "rendered forecast");

    Ok(Forecast {
        provider: provider.id(),
        coords,
        timezone: tz,
        rows,
    })
}
