use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use reqwest::Url;
use serde::Deserialize;
use tracing::debug;

use crate::{
    coords::Coordinates,
    error::{MeteoError, Result},
    http::{HttpClient, fetch_body},
    model::WeatherSeries,
    provider::{ProviderId, WeatherProvider, label_or_blank, lookup_condition, zero_if_missing},
    timezone,
};

const API_URL: &str = "https://api.open-meteo.com/v1/forecast";
const HOURLY_FIELDS: &str = "temperature_2m,precipitation_probability,weathercode,windspeed_10m";
const FORECAST_DAYS: u8 = 3;

/// Layout of `hourly.time` entries: local wall clock, no seconds, no zone.
pub const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// WMO weather interpretation codes.
static WEATHER_CODES: &[(i64, &str)] = &[
    (0, "Clear sky"),
    (1, "Mainly clear"),
    (2, "Partly cloudy"),
    (3, "Overcast"),
    (45, "Fog"),
    (48, "Rime fog"),
    (51, "Light drizzle"),
    (53, "Moderate drizzle"),
    (55, "Dense drizzle"),
    (56, "Light freezing drizzle"),
    (57, "Dense freezing drizzle"),
    (61, "Slight rain"),
    (63, "Moderate rain"),
    (65, "Heavy rain"),
    (66, "Light freezing rain"),
    (67, "Heavy freezing rain"),
    (71, "Slight snow"),
    (73, "Moderate snow"),
    (75, "Heavy snow"),
    (77, "Snow grains"),
    (80, "Slight rain"),
    (81, "Moderate rain"),
    (82, "Heavy rain"),
    (85, "Slight snow"),
    (86, "Heavy snow"),
    (95, "Thunderstorm"),
    (96, "Thunderstorm with slight hail"),
    (99, "Thunderstorm with heavy hail"),
];

pub fn condition_label(code: i64) -> &'static str {
    lookup_condition(WEATHER_CODES, code)
}

#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    http: Arc<dyn HttpClient>,
}

impl OpenMeteoProvider {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }
}

/// Request URL with every query value form-encoded, so zone names such as
/// `Etc/GMT+9` reach the server intact.
pub fn build_url(coords: Coordinates, timezone: &str) -> Result<String> {
    let latitude = format!("{:.6}", coords.latitude());
    let longitude = format!("{:.6}", coords.longitude());
    let forecast_days = FORECAST_DAYS.to_string();

    let url = Url::parse_with_params(
        API_URL,
        &[
            ("latitude", latitude.as_str()),
            ("longitude", longitude.as_str()),
            ("timezone", timezone),
            ("hourly", HOURLY_FIELDS),
            ("forecast_days", forecast_days.as_str()),
        ],
    )
    .map_err(|e| MeteoError::Transport {
        url: API_URL.to_string(),
        reason: e.to_string(),
    })?;

    Ok(url.into())
}

/// Hourly timestamps as sent by OpenMeteo, parsed but not yet placed in a zone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeSlice(pub Vec<NaiveDateTime>);

impl TimeSlice {
    pub fn parse<S: AsRef<str>>(values: &[S]) -> Result<Self> {
        values
            .iter()
            .map(|v| {
                let v = v.as_ref();
                NaiveDateTime::parse_from_str(v, TIME_FORMAT).map_err(|e| {
                    MeteoError::MalformedTimestamp {
                        value: v.to_string(),
                        reason: e.to_string(),
                    }
                })
            })
            .collect::<Result<Vec<_>>>()
            .map(TimeSlice)
    }

    /// Decode a raw JSON array of timestamp strings.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let values: Vec<String> =
            serde_json::from_slice(data).map_err(|e| MeteoError::MalformedTimestamp {
                value: String::from_utf8_lossy(data).into_owned(),
                reason: e.to_string(),
            })?;
        Self::parse(&values)
    }

    /// Place each wall-clock time in `tz`. On a DST overlap the earlier
    /// instant wins.
    pub fn to_utc(&self, tz: Tz) -> Result<Vec<DateTime<Utc>>> {
        self.0
            .iter()
            .map(|naive| {
                tz.from_local_datetime(naive)
                    .earliest()
                    .map(|local| local.with_timezone(&Utc))
                    .ok_or_else(|| {
                        MeteoError::timezone(format!("{naive} does not exist in {tz}"))
                    })
            })
            .collect()
    }
}

/// Measurements are nullable: hours without a value come back as `null`.
#[derive(Debug, Deserialize)]
struct OmHourly {
    time: Vec<String>,
    temperature_2m: Vec<Option<f64>>,
    precipitation_probability: Vec<Option<f64>>,
    weathercode: Vec<Option<i64>>,
    windspeed_10m: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct OmResponse {
    latitude: f64,
    longitude: f64,
    hourly: OmHourly,
}

fn decode(body: &[u8]) -> Result<OmResponse> {
    Ok(serde_json::from_slice(body)?)
}

fn normalize(parsed: OmResponse, tz: Tz) -> Result<WeatherSeries> {
    debug!(
        latitude = parsed.latitude,
        longitude = parsed.longitude,
        samples = parsed.hourly.time.len(),
        "decoded OpenMeteo forecast"
    );

    let hourly = parsed.hourly;
    let time = TimeSlice::parse(&hourly.time)?.to_utc(tz)?;

    Ok(WeatherSeries {
        time,
        temperature: zero_if_missing(hourly.temperature_2m),
        precipitation_probability: zero_if_missing(hourly.precipitation_probability),
        wind_speed: zero_if_missing(hourly.windspeed_10m),
        weather_state: label_or_blank(&hourly.weathercode, condition_label),
    })
}

#[async_trait]
impl WeatherProvider for OpenMeteoProvider {
    fn id(&self) -> ProviderId {
        ProviderId::OpenMeteo
    }

    async fn fetch(&self, coords: Coordinates) -> Result<WeatherSeries> {
        let tz_name = timezone::timezone_name(coords)?;
        let tz = timezone::parse(tz_name)?;

        let url = build_url(coords, tz_name)?;
        let body = fetch_body(self.http.as_ref(), &url).await?;

        normalize(decode(&body)?, tz)
    }
}
