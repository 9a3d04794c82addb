use thiserror::Error;
pub type Result<T> = std::result::Result<T, GeocodeError>;

#[derive(Error, Debug)]
pub enum GeocodeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("Geocoding service responded with status {0}")]
    Status(reqwest::StatusCode),
    #[error("Malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Invalid coordinate '{value}' in record '{label}'")]
    InvalidCoordinate { label: String, value: String },
}
