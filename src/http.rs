//! Shared HTTP client construction.

use crate::error::{DdnsError, Result};
use std::time::Duration;

/// Upper bound on any single request, connect included.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Build the client used for both the IP lookup and Cloudflare calls.
pub fn build_client() -> Result<reqwest::Client> {
    build_client_with_timeout(REQUEST_TIMEOUT)
}

pub fn build_client_with_timeout(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| DdnsError::HttpClient(e.to_string()))
}
