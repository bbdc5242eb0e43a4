// src/utils/error.rs
use thiserror::Error;

/// Failure of a single mandatory field conversion.
#[derive(Error, Debug)]
pub enum FieldError {
    #[error("missing mandatory field: {0}")]
    Missing(&'static str),

    #[error("invalid integer '{value}'")]
    Integer {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("invalid date or datetime '{0}'")]
    Date(String),

    #[error("unexpected format for {field}: '{value}'")]
    Format { field: &'static str, value: String },
}

/// The document does not have the shape of the requested entity.
#[derive(Error, Debug)]
pub enum InvalidContent {
    #[error("content does not belong to the {0} section")]
    WrongSection(&'static str),

    #[error("malformed {entity} content: {reason}")]
    Malformed { entity: &'static str, reason: String },

    #[error("malformed {entity} content")]
    Field {
        entity: &'static str,
        #[source]
        source: FieldError,
    },

    #[error("content is not a valid {entity} JSON document")]
    Json {
        entity: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl InvalidContent {
    pub fn malformed(entity: &'static str, reason: impl Into<String>) -> Self {
        InvalidContent::Malformed { entity, reason: reason.into() }
    }

    pub fn field(entity: &'static str, source: FieldError) -> Self {
        InvalidContent::Field { entity, source }
    }
}

/// Transport-level failures, passed through the parsing layer untouched.
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Network request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("403 Forbidden: the site is likely rate limiting this client")]
    Forbidden,

    #[error("HTTP error: {0}")]
    Status(reqwest::StatusCode),

    #[error("Could not decode response body: {0}")]
    Decode(String),
}

/// Error returned by every client operation.
#[derive(Error, Debug)]
pub enum TibiaError {
    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    InvalidContent(#[from] InvalidContent),

    #[error("invalid request: {0}")]
    InvalidArgument(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Request failed: {0}")]
    Tibia(#[from] TibiaError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Could not serialize output: {0}")]
    Serialization(#[from] serde_json::Error),
}
