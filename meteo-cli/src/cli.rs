use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use inquire::{CustomType, Select};
use meteo_core::{Config, ConfigPath, Coordinates, ProviderId, http, provider};
use tracing::debug;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "meteo",
    version,
    about = "CLI app for weather prediction",
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    #[command(flatten)]
    pub show: ShowArgs,

    /// Log request details to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Flags for the default action: print an hourly forecast.
#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Forecasting latitude; overrides the config file.
    #[arg(long, allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Forecasting longitude; overrides the config file.
    #[arg(long, visible_alias = "lng", allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// Weather API to query: "openmeteo" or "meteoblue".
    #[arg(short = 'w', long)]
    pub api: Option<String>,

    /// Maximum number of hourly rows to print.
    #[arg(long)]
    pub rows: Option<usize>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Re-write default config parameters.
    Set {
        #[command(subcommand)]
        target: Option<SetTarget>,
    },
}

#[derive(Debug, Subcommand)]
pub enum SetTarget {
    /// Re-write default latitude and longitude.
    Coords {
        #[arg(long, allow_negative_numbers = true)]
        lat: Option<f64>,

        #[arg(long, visible_alias = "lng", allow_negative_numbers = true)]
        lon: Option<f64>,
    },

    /// Re-write the default weather API.
    Api {
        /// Provider short name, e.g. "openmeteo" or "meteoblue".
        name: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let location = ConfigPath::resolve()?;
        debug!(path = %location.path.display(), explicit = location.explicit, "config location");
        let config = if matches!(self.command, Some(Command::Set { .. })) {
            // `set` may be what creates the file.
            Config::load(&ConfigPath {
                explicit: false,
                ..location.clone()
            })
        } else {
            Config::load(&location)
        }
        .context("Failed to load configuration")?;

        match self.command {
            None => show(&self.show, &config).await,
            Some(Command::Set { target: None }) => {
                println!("Use `meteo set coords` or `meteo set api` to re-write defaults");
                Ok(())
            }
            Some(Command::Set { target: Some(target) }) => set(target, config, &location),
        }
    }
}

async fn show(args: &ShowArgs, config: &Config) -> Result<()> {
    let id = match args.api.as_deref() {
        Some(name) => ProviderId::try_from(name)?,
        None => config.default_provider_id()?,
    };
    let coords = config.coordinates(args.lat, args.lon)?;
    let weather = provider::provider_from_config(id, config, http::default_client())?;
    let max_rows = args.rows.unwrap_or_else(|| config.max_rows());

    let forecast = meteo_core::forecast(weather.as_ref(), coords, Utc::now(), max_rows)
        .await
        .with_context(|| format!("Failed to fetch weather data from {id}"))?;

    print!("{forecast}");
    Ok(())
}

fn set(target: SetTarget, mut config: Config, location: &ConfigPath) -> Result<()> {
    match target {
        SetTarget::Coords { lat, lon } => {
            let lat = match lat {
                Some(lat) => lat,
                None => prompt_degrees("Latitude:", config.common.latitude)?,
            };
            let lon = match lon {
                Some(lon) => lon,
                None => prompt_degrees("Longitude:", config.common.longitude)?,
            };
            let coords = Coordinates::new(lat, lon)?;

            config.set_coordinates(coords);
            config.save_to(&location.path)?;
            println!("Default coordinates set to {coords}");
        }
        SetTarget::Api { name } => {
            let id = match name {
                Some(name) => ProviderId::try_from(name.as_str())?,
                None => Select::new("Weather API:", ProviderId::all().to_vec())
                    .prompt()
                    .context("Failed to read weather API choice")?,
            };

            config.set_default_provider(id);
            config.save_to(&location.path)?;
            println!("Default weather API set to {id}");
        }
    }

    Ok(())
}

fn prompt_degrees(message: &str, current: Option<f64>) -> Result<f64> {
    let mut prompt = CustomType::<f64>::new(message)
        .with_error_message("Please type a number in degrees, e.g. 55.7522");
    if let Some(current) = current {
        prompt = prompt.with_default(current);
    }
    prompt
        .prompt()
        .with_context(|| format!("Failed to read {}", message.trim_end_matches(':')))
}
