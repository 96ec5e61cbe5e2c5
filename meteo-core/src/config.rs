use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::{
    coords::Coordinates,
    error::{MeteoError, Result},
    provider::ProviderId,
};

/// Points at the config file, or at a directory holding `config.yaml`.
pub const CONFIG_PATH_ENV: &str = "METEO_CONFIG_PATH";
pub const CONFIG_FILE_NAME: &str = "config.yaml";
pub const DEFAULT_MAX_ROWS: usize = 12;

/// Settings shared by every provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CommonConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,

    /// Provider short name, e.g. "openmeteo" or "meteoblue".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_api: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rows: Option<usize>,
}

/// Credentials for signed Meteoblue requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MeteoblueConfig {
    pub api_key: String,
    pub shared_secret: String,
}

/// Top-level configuration stored on disk.
///
/// Example YAML:
/// ```yaml
/// common:
///   latitude: 55.7522
///   longitude: 37.6156
///   default-api: openmeteo
/// meteoblue:
///   api-key: "..."
///   shared-secret: "..."
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub common: CommonConfig,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meteoblue: Option<MeteoblueConfig>,
}

/// Where the config lives, and whether the user named it explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPath {
    pub path: PathBuf,
    pub explicit: bool,
}

impl ConfigPath {
    /// Resolve from `$METEO_CONFIG_PATH`, falling back to the platform
    /// config directory.
    pub fn resolve() -> Result<Self> {
        Self::from_env_value(std::env::var_os(CONFIG_PATH_ENV))
    }

    pub fn from_env_value(value: Option<OsString>) -> Result<Self> {
        match value.filter(|v| !v.is_empty()) {
            Some(value) => Ok(Self {
                path: file_in(PathBuf::from(value)),
                explicit: true,
            }),
            None => {
                let dirs = ProjectDirs::from("dev", "meteo", "meteo").ok_or_else(|| {
                    MeteoError::config("Could not determine platform config directory")
                })?;
                Ok(Self {
                    path: dirs.config_dir().join(CONFIG_FILE_NAME),
                    explicit: false,
                })
            }
        }
    }
}

/// A path ending in `.yaml`/`.yml` names the file; anything else is a directory.
fn file_in(path: PathBuf) -> PathBuf {
    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    if is_yaml { path } else { path.join(CONFIG_FILE_NAME) }
}

impl Config {
    /// The configured default provider, or OpenMeteo when none is set.
    pub fn default_provider_id(&self) -> Result<ProviderId> {
        match self.common.default_api.as_deref() {
            Some(name) => ProviderId::try_from(name),
            None => Ok(ProviderId::OpenMeteo),
        }
    }

    /// Store default provider as string.
    pub fn set_default_provider(&mut self, id: ProviderId) {
        self.common.default_api = Some(id.as_str().to_string());
    }

    pub fn set_coordinates(&mut self, coords: Coordinates) {
        self.common.latitude = Some(coords.latitude());
        self.common.longitude = Some(coords.longitude());
    }

    /// Coordinates for this run: explicit values win over the stored ones.
    pub fn coordinates(&self, latitude: Option<f64>, longitude: Option<f64>) -> Result<Coordinates> {
        let latitude = latitude.or(self.common.latitude).ok_or_else(|| {
            MeteoError::config(
                "No latitude configured (hint: pass --lat or run `meteo set coords`)",
            )
        })?;
        let longitude = longitude.or(self.common.longitude).ok_or_else(|| {
            MeteoError::config(
                "No longitude configured (hint: pass --lon or run `meteo set coords`)",
            )
        })?;

        Coordinates::new(latitude, longitude)
    }

    /// Meteoblue credentials, if both parts are present and non-empty.
    pub fn meteoblue_credentials(&self) -> Option<&MeteoblueConfig> {
        self.meteoblue
            .as_ref()
            .filter(|mb| !mb.api_key.is_empty() && !mb.shared_secret.is_empty())
    }

    pub fn max_rows(&self) -> usize {
        self.common.max_rows.unwrap_or(DEFAULT_MAX_ROWS)
    }

    /// Load config from disk.
    ///
    /// A missing file is only an error when the user pointed at it
    /// explicitly; otherwise this is a first run and the config is empty.
    pub fn load(location: &ConfigPath) -> Result<Self> {
        if !location.path.exists() {
            if location.explicit {
                return Err(MeteoError::config(format!(
                    "config file not found: {} (from ${CONFIG_PATH_ENV})",
                    location.path.display()
                )));
            }
            debug!(path = %location.path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        Self::load_from(&location.path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            MeteoError::config(format!("Failed to read config file {}: {e}", path.display()))
        })?;

        let cfg: Config = serde_yaml::from_str(&contents).map_err(|e| {
            MeteoError::config(format!("Failed to parse config file {}: {e}", path.display()))
        })?;

        debug!(path = %path.display(), "loaded config");
        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                MeteoError::config(format!(
                    "Failed to create config directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let yaml = serde_yaml::to_string(self).map_err(|e| {
            MeteoError::config(format!("Failed to serialize configuration to YAML: {e}"))
        })?;

        fs::write(path, yaml).map_err(|e| {
            MeteoError::config(format!("Failed to write config file {}: {e}", path.display()))
        })?;

        debug!(path = %path.display(), "saved config");
        Ok(())
    }
}
