use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use reqwest::Url;
use serde::Deserialize;
use sha2::Sha256;
use tracing::debug;

use crate::{
    config::MeteoblueConfig,
    coords::Coordinates,
    error::{MeteoError, Result},
    http::{HttpClient, fetch_body},
    model::WeatherSeries,
    provider::{ProviderId, WeatherProvider, label_or_blank, lookup_condition, zero_if_missing},
};

const API_URL: &str = "https://my.meteoblue.com/packages/basic-1h";
/// 2030-12-31T12:00:00Z. Signed URLs stay valid until then.
const EXPIRE: i64 = 1_924_948_800;

/// Hourly pictocodes.
static PICTOCODES: &[(i64, &str)] = &[
    (1, "Clear, cloudless sky"),
    (2, "Clear, few cirrus"),
    (3, "Clear with cirrus"),
    (4, "Clear with few low clouds"),
    (5, "Clear with few low clouds and few cirrus"),
    (6, "Clear with few low clouds and cirrus"),
    (7, "Partly cloudy"),
    (8, "Partly cloudy and few cirrus"),
    (9, "Partly cloudy and cirrus"),
    (10, "Mixed with some thunderstorm clouds possible"),
    (11, "Mixed with few cirrus with some thunderstorm clouds possible"),
    (12, "Mixed with cirrus with some thunderstorm clouds possible"),
    (13, "Clear but hazy"),
    (14, "Clear but hazy with few cirrus"),
    (15, "Clear but hazy with cirrus"),
    (16, "Fog/low stratus clouds"),
    (17, "Fog/low stratus clouds with few cirrus"),
    (18, "Fog/low stratus clouds with cirrus"),
    (19, "Mostly cloudy"),
    (20, "Mostly cloudy and few cirrus"),
    (21, "Mostly cloudy and cirrus"),
    (22, "Overcast"),
    (23, "Overcast with rain"),
    (24, "Overcast with snow"),
    (25, "Overcast with heavy rain"),
    (26, "Overcast with heavy snow"),
    (27, "Rain, thunderstorms likely"),
    (28, "Light rain, thunderstorms likely"),
    (29, "Storm with heavy snow"),
    (30, "Heavy rain, thunderstorms likely"),
    (31, "Mixed with showers"),
    (32, "Mixed with snow showers"),
    (33, "Overcast with light rain"),
    (34, "Overcast with light snow"),
    (35, "Overcast with mixed snow/rain"),
];

pub fn condition_label(pictocode: i64) -> &'static str {
    lookup_condition(PICTOCODES, pictocode)
}

#[derive(Debug, Clone)]
pub struct MeteoblueProvider {
    http: Arc<dyn HttpClient>,
    credentials: MeteoblueConfig,
}

impl MeteoblueProvider {
    pub fn new(http: Arc<dyn HttpClient>, credentials: MeteoblueConfig) -> Self {
        Self { http, credentials }
    }
}

/// Lowercase hex HMAC-SHA256 of `data` keyed with `secret`.
pub fn generate_signature(data: &str, secret: &str) -> Result<String> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .map_err(|e| MeteoError::config(format!("unusable Meteoblue shared secret: {e}")))?;
    mac.update(data.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Signed request URL. Query values are form-encoded first; the signature
/// covers the encoded path and query exactly as sent before `&sig=`.
pub fn build_url(coords: Coordinates, api_key: &str, shared_secret: &str) -> Result<String> {
    let latitude = format!("{:.6}", coords.latitude());
    let longitude = format!("{:.6}", coords.longitude());
    let expire = EXPIRE.to_string();

    let mut url = Url::parse_with_params(
        API_URL,
        &[
            ("lat", latitude.as_str()),
            ("lon", longitude.as_str()),
            ("apikey", api_key),
            ("expire", expire.as_str()),
            ("forecast_days", "3"),
            ("temperature", "C"),
            ("timeformat", "timestamp_utc"),
        ],
    )
    .map_err(|e| MeteoError::Transport {
        url: API_URL.to_string(),
        reason: e.to_string(),
    })?;

    let signed = format!("{}?{}", url.path(), url.query().unwrap_or_default());
    let sig = generate_signature(&signed, shared_secret)?;
    url.query_pairs_mut().append_pair("sig", &sig);

    Ok(url.into())
}

#[derive(Debug, Deserialize)]
struct MbMetadata {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct MbData1h {
    time: Vec<i64>,
    temperature: Vec<Option<f64>>,
    precipitation_probability: Vec<Option<f64>>,
    windspeed: Vec<Option<f64>>,
    pictocode: Vec<Option<i64>>,
}

#[derive(Debug, Deserialize)]
struct MbResponse {
    metadata: MbMetadata,
    data_1h: MbData1h,
}

fn decode(body: &[u8]) -> Result<MbResponse> {
    Ok(serde_json::from_slice(body)?)
}

fn normalize(parsed: MbResponse) -> Result<WeatherSeries> {
    debug!(
        latitude = parsed.metadata.latitude,
        longitude = parsed.metadata.longitude,
        samples = parsed.data_1h.time.len(),
        "decoded Meteoblue forecast"
    );

    let data = parsed.data_1h;
    let time = data
        .time
        .iter()
        .map(|ts| {
            DateTime::<Utc>::from_timestamp(*ts, 0).ok_or_else(|| MeteoError::MalformedTimestamp {
                value: ts.to_string(),
                reason: "unix timestamp out of range".to_string(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(WeatherSeries {
        time,
        temperature: zero_if_missing(data.temperature),
        precipitation_probability: zero_if_missing(data.precipitation_probability),
        wind_speed: zero_if_missing(data.windspeed),
        weather_state: label_or_blank(&data.pictocode, condition_label),
    })
}

#[async_trait]
impl WeatherProvider for MeteoblueProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Meteoblue
    }

    async fn fetch(&self, coords: Coordinates) -> Result<WeatherSeries> {
        let url = build_url(
            coords,
            &self.credentials.api_key,
            &self.credentials.shared_secret,
        )?;
        let body = fetch_body(self.http.as_ref(), &url).await?;

        normalize(decode(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::http::mock::MockClient;

    fn credentials() -> MeteoblueConfig {
        MeteoblueConfig {
            api_key: "meteoblue-api-key".to_string(),
            shared_secret: "meteoblue-shared-secret".to_string(),
        }
    }

    #[test]
    fn generate_signature_known_vector() {
        assert_eq!(
            generate_signature("hello", "world").unwrap(),
            "3cfa76ef14937c1c0ea519f8fc057a80fcd04a7420f8e8bcd0a7567c272e007b"
        );
    }

    #[test]
    fn build_url_signs_query() {
        let coords = Coordinates::new(37.7749, -122.4194).unwrap();
        assert_eq!(
            build_url(coords, "testApiKey", "testSecret").unwrap(),
            "https://my.meteoblue.com/packages/basic-1h?lat=37.774900&lon=-122.419400&apikey=testApiKey&expire=1924948800&forecast_days=3&temperature=C&timeformat=timestamp_utc&sig=ce1763b9edd8fc1e68ec7af70b81bf9ec8b1679b795eb189d88ec270ed22716a"
        );
    }

    #[test]
    fn build_url_with_empty_key_and_secret() {
        let coords = Coordinates::new(37.7749, -122.4194).unwrap();
        assert_eq!(
            build_url(coords, "", "").unwrap(),
            "https://my.meteoblue.com/packages/basic-1h?lat=37.774900&lon=-122.419400&apikey=&expire=1924948800&forecast_days=3&temperature=C&timeformat=timestamp_utc&sig=dcf9f0a021f16c291f89bb0f3c9e4e561900e967b3d30fb159179f603b806eb8"
        );
    }

    #[test]
    fn build_url_is_deterministic_and_verifiable() {
        let coords = Coordinates::new(-33.8688, 151.2093).unwrap();
        let first = build_url(coords, "k", "s").unwrap();
        let second = build_url(coords, "k", "s").unwrap();
        assert_eq!(first, second);

        let (signed, sig) = first.split_once("&sig=").unwrap();
        let query = signed.strip_prefix("https://my.meteoblue.com").unwrap();
        assert_eq!(generate_signature(query, "s").unwrap(), sig);
        assert_ne!(generate_signature(query, "other").unwrap(), sig);
    }

    #[test]
    fn build_url_encodes_api_key_before_signing() {
        let coords = Coordinates::new(1.0, 2.0).unwrap();
        let url = build_url(coords, "a&b+c", "s").unwrap();

        assert!(url.contains("&apikey=a%26b%2Bc&"), "{url}");
        let (signed, sig) = url.split_once("&sig=").unwrap();
        let query = signed.strip_prefix("https://my.meteoblue.com").unwrap();
        assert_eq!(generate_signature(query, "s").unwrap(), sig);

        let parsed = Url::parse(&url).unwrap();
        let apikey = parsed.query_pairs().find(|(k, _)| k == "apikey").unwrap().1;
        assert_eq!(apikey, "a&b+c");
    }

    #[test]
    fn null_measurements_become_zero() {
        let body = br#"{"metadata":{"latitude":0,"longitude":0},"data_1h":{"time":[1609459200],"temperature":[null],"precipitation_probability":[null],"pictocode":[null],"windspeed":[null]}}"#;
        let series = normalize(decode(body).unwrap()).unwrap();

        assert_eq!(series.temperature, vec![0.0]);
        assert_eq!(series.precipitation_probability, vec![0.0]);
        assert_eq!(series.wind_speed, vec![0.0]);
        assert_eq!(series.weather_state, vec![String::new()]);
    }

    #[test]
    fn maps_pictocodes() {
        assert_eq!(condition_label(1), "Clear, cloudless sky");
        assert_eq!(condition_label(7), "Partly cloudy");
        assert_eq!(condition_label(9999), "");
    }

    #[tokio::test]
    async fn fetch_normalizes_two_samples() {
        let body = r#"{
            "metadata": {"latitude": 0.0, "longitude": 0.0},
            "data_1h": {
                "time": [1609459200, 1609462800],
                "temperature": [1.1, 2.2],
                "precipitation_probability": [0.0, 0.1],
                "pictocode": [1, 7],
                "windspeed": [3.3, 4.4]
            }
        }"#;
        let client = Arc::new(MockClient::respond(200, body));
        let provider = MeteoblueProvider::new(client.clone(), credentials());

        let series = provider.fetch(Coordinates::new(0.0, 0.0).unwrap()).await.unwrap();

        assert_eq!(
            series,
            WeatherSeries {
                time: vec![
                    Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap(),
                    Utc.with_ymd_and_hms(2021, 1, 1, 1, 0, 0).unwrap(),
                ],
                temperature: vec![1.1, 2.2],
                precipitation_probability: vec![0.0, 0.1],
                wind_speed: vec![3.3, 4.4],
                weather_state: vec!["Clear, cloudless sky".to_string(), "Partly cloudy".to_string()],
            }
        );

        let urls = client.requested_urls();
        assert_eq!(urls.len(), 1);
        assert!(urls[0].starts_with("https://my.meteoblue.com/packages/basic-1h?lat=0.000000&lon=0.000000&apikey=meteoblue-api-key&"));
    }

    #[tokio::test]
    async fn fetch_surfaces_unexpected_status() {
        let provider = MeteoblueProvider::new(
            Arc::new(MockClient::respond(400, r#"{"error": "invalid request"}"#)),
            credentials(),
        );

        let err = provider.fetch(Coordinates::new(0.0, 0.0).unwrap()).await.unwrap_err();
        assert!(matches!(err, MeteoError::UnexpectedStatus { status: 400, .. }));
    }

    #[tokio::test]
    async fn fetch_surfaces_transport_and_read_errors() {
        let provider =
            MeteoblueProvider::new(Arc::new(MockClient::network_error("network error")), credentials());
        let err = provider.fetch(Coordinates::new(0.0, 0.0).unwrap()).await.unwrap_err();
        assert!(matches!(err, MeteoError::Transport { .. }));

        let provider = MeteoblueProvider::new(Arc::new(MockClient::unreadable_body(200)), credentials());
        let err = provider.fetch(Coordinates::new(0.0, 0.0).unwrap()).await.unwrap_err();
        assert!(matches!(err, MeteoError::Read(_)));
    }

    #[tokio::test]
    async fn fetch_surfaces_broken_json() {
        let provider =
            MeteoblueProvider::new(Arc::new(MockClient::respond(200, r#"{"broken json": {"#)), credentials());
        let err = provider.fetch(Coordinates::new(0.0, 0.0).unwrap()).await.unwrap_err();
        assert!(matches!(err, MeteoError::Decode(_)));
    }
}
