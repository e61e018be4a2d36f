use thiserror::Error;

/// Top-level error type for the Footprints client.
///
/// Subsystem crates define their own error types where they need richer
/// variants and convert from `FootprintsError` so that `?` works across
/// crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FootprintsError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Speech error: {0}")]
    Speech(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for FootprintsError {
    fn from(err: toml::de::Error) -> Self {
        FootprintsError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for FootprintsError {
    fn from(err: toml::ser::Error) -> Self {
        FootprintsError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for FootprintsError {
    fn from(err: serde_json::Error) -> Self {
        FootprintsError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Footprints operations.
pub type Result<T> = std::result::Result<T, FootprintsError>;
