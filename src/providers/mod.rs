//! DNS record backends.

mod cloudflare;

pub use cloudflare::{record_endpoint, CloudflareProvider};

use crate::error::Result;
use async_trait::async_trait;
use serde::Deserialize;

/// Current state of the managed record as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RecordSnapshot {
    /// Address the record currently points at.
    pub content: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub record_type: Option<String>,
}

/// A single DNS record that can be read and rewritten.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DnsRecordStore: Send + Sync {
    /// Human-readable record name, used in logs and update payloads.
    fn record_name(&self) -> String;

    /// Read the record as currently published.
    async fn fetch_record(&self) -> Result<RecordSnapshot>;

    /// Point the A-record at `content`.
    async fn update_record(&self, content: &str) -> Result<()>;
}
