use std::fmt;

use crate::error::{MeteoError, Result};

const LATITUDE_RANGE: (f64, f64) = (-90.0, 90.0);
const LONGITUDE_RANGE: (f64, f64) = (-180.0, 180.0);

/// A validated point on the globe.
///
/// The only way to build one is [`Coordinates::new`], so every value that
/// reaches a URL builder is already inside the valid ranges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        check("latitude", latitude, LATITUDE_RANGE)?;
        check("longitude", longitude, LONGITUDE_RANGE)?;
        Ok(Self { latitude, longitude })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

fn check(axis: &'static str, value: f64, (min, max): (f64, f64)) -> Result<()> {
    // NaN fails `contains`, so it is rejected too.
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(MeteoError::InvalidCoordinate { axis, value, min, max })
    }
}
