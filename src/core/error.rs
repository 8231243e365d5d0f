use std::io;
use thiserror::Error;

/// Unified error type for the vchat application
#[derive(Error, Debug)]
pub enum VchatError {
    /// API-level errors returned by a provider endpoint
    #[error("API error: {0}")]
    Api(String),

    /// Configuration-related errors (unknown provider, missing key)
    #[error("Configuration error: {0}")]
    Config(String),

    /// User input errors
    #[error("Input error: {0}")]
    Input(String),

    /// IO-related errors
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Network-related errors
    #[error("Network error: {0}")]
    Network(String),
}

impl From<reqwest::Error> for VchatError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            VchatError::Network(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            VchatError::Network(format!("Connection failed: {}", err))
        } else if err.is_status() {
            VchatError::Api(format!("API returned error status: {}", err))
        } else {
            VchatError::Network(format!("Request failed: {}", err))
        }
    }
}

impl From<serde_json::Error> for VchatError {
    fn from(err: serde_json::Error) -> Self {
        VchatError::Serialization(format!("JSON error: {}", err))
    }
}

impl From<serde_yml::Error> for VchatError {
    fn from(err: serde_yml::Error) -> Self {
        VchatError::Serialization(format!("YAML error: {}", err))
    }
}
