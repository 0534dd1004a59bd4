// Error types for longread.
// Covers cache service HTTP failures, JSON decoding, and configuration errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LongreadError {
    #[error("Cache service request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Cache service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config file error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, LongreadError>;
