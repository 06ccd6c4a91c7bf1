//! Configuration loading for cf-dyndns.

use crate::error::{DdnsError, Result};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use url::Url;

/// Config file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Validated configuration. Every field is present and non-empty.
#[derive(Clone)]
pub struct Config {
    /// "What is my IP" endpoint returning `{"ip": "..."}`.
    pub api_endpoint_ipv4: Url,
    /// Cloudflare API base, e.g. `https://api.cloudflare.com/client/v4/`.
    pub api_endpoint_cloudflare: Url,
    /// Bearer token with DNS edit permission on the zone.
    pub cloudflare_token: String,
    pub cloudflare_zone_id: String,
    pub cloudflare_record_id: String,
    /// Record name (e.g. "home.example.com"), used for logging and the update payload.
    pub cloudflare_record_name: String,
}

/// On-disk shape. Keys are optional here so a missing one can be named.
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    api_endpoint_ipv4: Option<String>,
    api_endpoint_cloudflare: Option<String>,
    cloudflare_token: Option<String>,
    cloudflare_zone_id: Option<String>,
    cloudflare_record_id: Option<String>,
    cloudflare_record_name: Option<String>,
}

impl Config {
    /// Load and validate configuration from a JSON file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content =
            std::fs::read_to_string(path).map_err(|source| DdnsError::ConfigUnreadable {
                path: path.to_path_buf(),
                source,
            })?;

        let raw: RawConfig =
            serde_json::from_str(&content).map_err(|source| DdnsError::ConfigMalformed {
                path: path.to_path_buf(),
                source,
            })?;

        let config = Self::from_raw(raw)?;
        tracing::debug!("Loaded configuration from {}: {:?}", path.display(), config);
        Ok(config)
    }

    fn from_raw(raw: RawConfig) -> Result<Self> {
        // Presence is checked for every key before any value is interpreted.
        let api_endpoint_ipv4 = require(raw.api_endpoint_ipv4, "api_endpoint_ipv4")?;
        let api_endpoint_cloudflare =
            require(raw.api_endpoint_cloudflare, "api_endpoint_cloudflare")?;
        let cloudflare_token = require(raw.cloudflare_token, "cloudflare_token")?;
        let cloudflare_zone_id = require(raw.cloudflare_zone_id, "cloudflare_zone_id")?;
        let cloudflare_record_id = require(raw.cloudflare_record_id, "cloudflare_record_id")?;
        let cloudflare_record_name =
            require(raw.cloudflare_record_name, "cloudflare_record_name")?;

        Ok(Self {
            api_endpoint_ipv4: parse_endpoint(&api_endpoint_ipv4, "api_endpoint_ipv4")?,
            api_endpoint_cloudflare: parse_endpoint(
                &api_endpoint_cloudflare,
                "api_endpoint_cloudflare",
            )?,
            cloudflare_token,
            cloudflare_zone_id,
            cloudflare_record_id,
            cloudflare_record_name,
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_endpoint_ipv4", &self.api_endpoint_ipv4.as_str())
            .field("api_endpoint_cloudflare", &self.api_endpoint_cloudflare.as_str())
            .field("cloudflare_token", &"<redacted>")
            .field("cloudflare_zone_id", &self.cloudflare_zone_id)
            .field("cloudflare_record_id", &self.cloudflare_record_id)
            .field("cloudflare_record_name", &self.cloudflare_record_name)
            .finish()
    }
}

fn require(value: Option<String>, key: &'static str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(DdnsError::ConfigIncomplete(key)),
    }
}

fn parse_endpoint(value: &str, key: &'static str) -> Result<Url> {
    let url = Url::parse(value).map_err(|e| DdnsError::ConfigInvalid {
        key,
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(DdnsError::ConfigInvalid {
            key,
            reason: format!("unsupported URL scheme '{}'", other),
        }),
    }
}
