use thiserror::Error;

pub type Result<T> = std::result::Result<T, CompassError>;

#[derive(Debug, Error)]
pub enum CompassError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown POI kind: {0}")]
    UnknownKind(String),

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Snapshot error: {0}")]
    Snapshot(String),
}

impl From<toml::de::Error> for CompassError {
    fn from(err: toml::de::Error) -> Self {
        CompassError::Config(format!("TOML parse error: {}", err))
    }
}

impl From<serde_json::Error> for CompassError {
    fn from(err: serde_json::Error) -> Self {
        CompassError::Snapshot(format!("JSON error: {}", err))
    }
}
