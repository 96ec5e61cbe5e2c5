//! Offline coordinate → IANA timezone lookup.

use std::sync::LazyLock;

use chrono_tz::Tz;
use tracing::debug;
use tzf_rs::DefaultFinder;

use crate::{
    coords::Coordinates,
    error::{MeteoError, Result},
};

// Building the finder decodes the bundled polygon data; do it once.
static FINDER: LazyLock<DefaultFinder> = LazyLock::new(DefaultFinder::new);

/// IANA name of the zone containing `coords`, e.g. `Europe/Moscow`.
pub fn timezone_name(coords: Coordinates) -> Result<&'static str> {
    let finder: &'static DefaultFinder = &FINDER;
    let name = finder.get_tz_name(coords.longitude(), coords.latitude());
    if name.is_empty() {
        return Err(MeteoError::timezone(format!("no timezone found for {coords}")));
    }
    debug!(%coords, timezone = name, "resolved timezone");
    Ok(name)
}

pub fn parse(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|e| MeteoError::timezone(format!("unknown timezone {name:?}: {e}")))
}

/// Zone used to display a forecast for `coords`.
pub fn resolve(coords: Coordinates) -> Result<Tz> {
    parse(timezone_name(coords)?)
}
