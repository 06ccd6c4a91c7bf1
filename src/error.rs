//! Error types for cf-dyndns.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for cf-dyndns.
pub type Result<T> = std::result::Result<T, DdnsError>;

/// Every failure is terminal for a run.
#[derive(Error, Debug)]
pub enum DdnsError {
    /// Config file could not be opened or read.
    #[error("failed to open configuration file {path}: {source}")]
    ConfigUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON, or a value has the wrong type.
    #[error("failed to parse configuration file {path}: {source}")]
    ConfigMalformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A required key is absent or empty.
    #[error("missing configuration: '{0}'")]
    ConfigIncomplete(&'static str),

    /// A key is present but its value is unusable.
    #[error("invalid configuration value for '{key}': {reason}")]
    ConfigInvalid { key: &'static str, reason: String },

    /// The IP lookup service could not be reached.
    #[error("could not obtain IPv4 address")]
    IpUnavailable,

    /// A remote service answered with an unexpected shape.
    #[error("invalid API response: {0}")]
    InvalidApiResponse(String),

    /// Transport failure talking to Cloudflare.
    #[error("cloudflare API call failed: {0}")]
    ApiCallFailed(String),

    /// Cloudflare answered with `success: false`.
    #[error("cloudflare API reported error: {0}")]
    ApiReportedError(String),

    /// The HTTP client could not be constructed.
    #[error("failed to initialise HTTP client: {0}")]
    HttpClient(String),
}

impl From<reqwest::Error> for DdnsError {
    fn from(e: reqwest::Error) -> Self {
        DdnsError::ApiCallFailed(e.to_string())
    }
}
