use thiserror::Error;

pub type Result<T> = std::result::Result<T, MeteoError>;

/// Every way a single forecast run can fail. All of them are fatal.
#[derive(Debug, Error)]
pub enum MeteoError {
    #[error("invalid {axis} {value}: must be between {min} and {max} degrees")]
    InvalidCoordinate {
        axis: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("unexpected status code {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("failed to read response body: {0}")]
    Read(String),

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("malformed timestamp {value:?}: {reason}")]
    MalformedTimestamp { value: String, reason: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("timezone error: {0}")]
    Timezone(String),
}

impl MeteoError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn timezone<S: Into<String>>(message: S) -> Self {
        Self::Timezone(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_errors_convert_to_decode() {
        let json_err = serde_json::from_str::<u32>("{").unwrap_err();
        let err: MeteoError = json_err.into();
        assert!(matches!(err, MeteoError::Decode(_)));
    }

    #[test]
    fn invalid_coordinate_message_names_axis() {
        let err = MeteoError::InvalidCoordinate {
            axis: "latitude",
            value: 91.0,
            min: -90.0,
            max: 90.0,
        };
        assert_eq!(
            err.to_string(),
            "invalid latitude 91: must be between -90 and 90 degrees"
        );
    }
}
