use thiserror::Error;

#[derive(Error, Debug)]
pub enum PinpointError {
    #[error("Geocode error: {0}")]
    Geocode(#[from] pinpoint_geocode::GeocodeError),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Init Logging error: {0}")]
    InitLoggingError(#[from] tracing_subscriber::filter::ParseError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, PinpointError>;
