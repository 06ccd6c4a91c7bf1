//! Cloudflare DNS record store.

use super::{DnsRecordStore, RecordSnapshot};
use crate::config::Config;
use crate::error::{DdnsError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

/// One Cloudflare record, addressed by zone and record id.
pub struct CloudflareProvider {
    client: reqwest::Client,
    api_token: String,
    record_name: String,
    record_url: Url,
}

/// Envelope shared by every Cloudflare v4 response.
#[derive(Debug, Deserialize)]
struct CloudflareResponse {
    success: Option<bool>,
    #[serde(default)]
    result: Option<serde_json::Value>,
    #[serde(default)]
    errors: Option<Vec<CloudflareMessage>>,
}

#[derive(Debug, Deserialize)]
struct CloudflareMessage {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Serialize)]
struct UpdateRequest<'a> {
    #[serde(rename = "type")]
    record_type: &'static str,
    name: &'a str,
    content: &'a str,
}

/// `{base}/zones/{zone_id}/dns_records/{record_id}`, with a trailing slash on `base` optional.
pub fn record_endpoint(base: &Url, zone_id: &str, record_id: &str) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| DdnsError::ConfigInvalid {
            key: "api_endpoint_cloudflare",
            reason: "URL cannot be used as a base".to_string(),
        })?
        .pop_if_empty()
        .extend(["zones", zone_id, "dns_records", record_id]);
    Ok(url)
}

impl CloudflareProvider {
    pub fn new(
        client: reqwest::Client,
        base_url: &Url,
        api_token: String,
        zone_id: &str,
        record_id: &str,
        record_name: String,
    ) -> Result<Self> {
        let record_url = record_endpoint(base_url, zone_id, record_id)?;

        Ok(Self {
            client,
            api_token,
            record_name,
            record_url,
        })
    }

    pub fn from_config(client: reqwest::Client, config: &Config) -> Result<Self> {
        Self::new(
            client,
            &config.api_endpoint_cloudflare,
            config.cloudflare_token.clone(),
            &config.cloudflare_zone_id,
            &config.cloudflare_record_id,
            config.cloudflare_record_name.clone(),
        )
    }

    pub fn record_url(&self) -> &Url {
        &self.record_url
    }

    /// Send `request` and check the envelope's `success` flag.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<CloudflareResponse> {
        let response = request.bearer_auth(&self.api_token).send().await?;
        let status = response.status();
        let text = response.text().await?;

        tracing::debug!("Cloudflare answered HTTP {} for {}", status, self.record_url);
        parse_envelope(&text)
    }
}

fn parse_envelope(text: &str) -> Result<CloudflareResponse> {
    let response: CloudflareResponse = serde_json::from_str(text)
        .map_err(|e| DdnsError::InvalidApiResponse(format!("cloudflare: {}", e)))?;

    match response.success {
        Some(true) => Ok(response),
        Some(false) => {
            let errors = response.errors.unwrap_or_default();
            for error in &errors {
                tracing::debug!("Cloudflare error {:?}: {:?}", error.code, error.message);
            }
            Err(DdnsError::ApiReportedError(describe_errors(&errors)))
        }
        None => Err(DdnsError::InvalidApiResponse(
            "cloudflare: response has no 'success' field".to_string(),
        )),
    }
}

/// Pull the record out of a successful envelope.
fn into_record(response: CloudflareResponse) -> Result<RecordSnapshot> {
    let result = response.result.ok_or_else(|| {
        DdnsError::InvalidApiResponse("cloudflare: response has no 'result'".to_string())
    })?;

    serde_json::from_value(result)
        .map_err(|e| DdnsError::InvalidApiResponse(format!("cloudflare record: {}", e)))
}

fn describe_errors(errors: &[CloudflareMessage]) -> String {
    let messages: Vec<String> = errors
        .iter()
        .filter_map(|e| match (&e.message, e.code) {
            (Some(msg), Some(code)) => Some(format!("{} ({})", msg, code)),
            (Some(msg), None) => Some(msg.clone()),
            (None, Some(code)) => Some(format!("code {}", code)),
            (None, None) => None,
        })
        .collect();

    if messages.is_empty() {
        "unknown error".to_string()
    } else {
        messages.join("; ")
    }
}

#[async_trait]
impl DnsRecordStore for CloudflareProvider {
    fn record_name(&self) -> String {
        self.record_name.clone()
    }

    async fn fetch_record(&self) -> Result<RecordSnapshot> {
        let response = self.send(self.client.get(self.record_url.clone())).await?;
        into_record(response)
    }

    async fn update_record(&self, content: &str) -> Result<()> {
        let request = UpdateRequest {
            record_type: "A",
            name: &self.record_name,
            content,
        };

        // Only the envelope matters here; the echoed record is not required.
        self.send(self.client.put(self.record_url.clone()).json(&request))
            .await?;
        Ok(())
    }
}
