use crate::{
    Config, Coordinates, MeteoError, WeatherSeries,
    error::Result,
    http::HttpClient,
    provider::{meteoblue::MeteoblueProvider, openmeteo::OpenMeteoProvider},
};
use async_trait::async_trait;
use std::{convert::TryFrom, fmt::Debug, sync::Arc};

pub mod meteoblue;
pub mod openmeteo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    OpenMeteo,
    Meteoblue,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenMeteo => "openmeteo",
            ProviderId::Meteoblue => "meteoblue",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::OpenMeteo, ProviderId::Meteoblue]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = MeteoError;

    fn try_from(value: &str) -> std::result::Result<Self, Self::Error> {
        let lower = value.trim().to_lowercase();

        match lower.as_str() {
            "openmeteo" => Ok(ProviderId::OpenMeteo),
            "meteoblue" => Ok(ProviderId::Meteoblue),
            _ => Err(MeteoError::config(format!(
                "Unknown weather API '{value}'. Supported APIs: openmeteo, meteoblue."
            ))),
        }
    }
}

/// A forecast source: one request in, one normalized series out.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    fn id(&self) -> ProviderId;

    async fn fetch(&self, coords: Coordinates) -> Result<WeatherSeries>;
}

/// Label for `code` in a provider's lookup table, or `""` if unmapped.
pub(crate) fn lookup_condition(table: &[(i64, &'static str)], code: i64) -> &'static str {
    table
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, label)| *label)
        .unwrap_or("")
}

/// Missing measurements read as zero.
pub(crate) fn zero_if_missing(values: Vec<Option<f64>>) -> Vec<f64> {
    values.into_iter().map(|v| v.unwrap_or_default()).collect()
}

/// Labels for a column of condition codes; a missing code gets an empty label.
pub(crate) fn label_or_blank(codes: &[Option<i64>], label: fn(i64) -> &'static str) -> Vec<String> {
    codes
        .iter()
        .map(|code| code.map(label).unwrap_or_default().to_string())
        .collect()
}

/// Construct a provider from config and explicit ProviderId.
pub fn provider_from_config(
    id: ProviderId,
    config: &Config,
    client: Arc<dyn HttpClient>,
) -> Result<Box<dyn WeatherProvider>> {
    let boxed: Box<dyn WeatherProvider> = match id {
        ProviderId::OpenMeteo => Box::new(OpenMeteoProvider::new(client)),
        ProviderId::Meteoblue => {
            let credentials = config.meteoblue_credentials().ok_or_else(|| {
                MeteoError::config(
                    "No API key and shared secret configured for 'meteoblue' \
                     (hint: add `api-key` and `shared-secret` under `meteoblue:` in your config file)",
                )
            })?;
            Box::new(MeteoblueProvider::new(client, credentials.clone()))
        }
    };

    Ok(boxed)
}

/// Construct the default provider from config, using the `default-api` field.
pub fn default_provider_from_config(
    config: &Config,
    client: Arc<dyn HttpClient>,
) -> Result<Box<dyn WeatherProvider>> {
    let id = config.default_provider_id()?;
    provider_from_config(id, config, client)
}
