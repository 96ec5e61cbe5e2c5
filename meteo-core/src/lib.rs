//! Core library for the `meteo` CLI.
//!
//! This crate defines:
//! - Coordinate validation and the error taxonomy
//! - YAML configuration handling
//! - Abstraction over weather providers (OpenMeteo, Meteoblue)
//! - The normalized hourly series and its table rendering
//!
//! It is used by `meteo-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod coords;
pub mod display;
pub mod error;
pub mod forecast;
pub mod http;
pub mod model;
pub mod provider;
pub mod timezone;

pub use config::{CommonConfig, Config, ConfigPath, MeteoblueConfig};
pub use coords::Coordinates;
pub use error::{MeteoError, Result};
pub use forecast::{Forecast, forecast};
pub use http::{HttpClient, HttpResponse};
pub use model::{HourlySample, WeatherSeries};
pub use provider::{ProviderId, WeatherProvider};
