//! Error taxonomy for herdcheck.
//!
//! Only upstream failures live here: transport, API, configuration. Problems
//! with the submission itself are never errors; they surface as
//! [`PrecheckFailure`](crate::precheck::PrecheckFailure) values or rule
//! failures inside the report.

use thiserror::Error;

/// Errors that abort a validation run before a report can be produced.
#[derive(Error, Debug)]
pub enum HerdError {
    /// Transport-level HTTP failure (connect, TLS, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(String),

    /// The code-hosting API answered with a non-success status.
    #[error("API request to {url} failed with status {status}")]
    Api { status: u16, url: String },

    /// JSON encoding or decoding of a wire payload failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be loaded or is inconsistent.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Repository identifier is not of the form `owner/name`.
    #[error("invalid repository identifier: {0}")]
    InvalidRepository(String),

    /// A credential required to talk to the API is absent.
    #[error("missing credential: {0}")]
    MissingCredential(&'static str),
}

impl From<reqwest::Error> for HerdError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => HerdError::Api {
                status: status.as_u16(),
                url: err
                    .url()
                    .map(|u| u.to_string())
                    .unwrap_or_else(|| "<unknown>".to_string()),
            },
            None => HerdError::Http(err.to_string()),
        }
    }
}

impl From<toml::de::Error> for HerdError {
    fn from(err: toml::de::Error) -> Self {
        HerdError::Config(err.to_string())
    }
}

/// Result type for herdcheck operations.
pub type Result<T> = std::result::Result<T, HerdError>;
