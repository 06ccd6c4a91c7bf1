//! Resolve, compare, and update: one synchronization pass.

use crate::config::Config;
use crate::detector::IpDetector;
use crate::error::{DdnsError, Result};
use crate::http::build_client;
use crate::providers::{CloudflareProvider, DnsRecordStore, RecordSnapshot};

/// How a pass ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Record already points at the current address.
    Unchanged { record_name: String, ip: String },
    /// Record was rewritten.
    Updated {
        record_name: String,
        previous: String,
        current: String,
    },
    /// Record differs but the update was skipped (dry run).
    WouldUpdate {
        record_name: String,
        previous: String,
        current: String,
    },
}

/// Bring `store` in line with `current_ip`, given what it currently holds.
///
/// No request is sent when `snapshot` already matches.
pub async fn reconcile<S>(
    store: &S,
    current_ip: &str,
    snapshot: &RecordSnapshot,
    dry_run: bool,
) -> Result<SyncOutcome>
where
    S: DnsRecordStore + ?Sized,
{
    let record_name = store.record_name();

    if snapshot.content == current_ip {
        tracing::info!("NO CHANGE: {} - {}", record_name, current_ip);
        return Ok(SyncOutcome::Unchanged {
            record_name,
            ip: current_ip.to_string(),
        });
    }

    if dry_run {
        tracing::info!(
            "WOULD UPDATE: {} - {} -> {}",
            record_name,
            snapshot.content,
            current_ip
        );
        return Ok(SyncOutcome::WouldUpdate {
            record_name,
            previous: snapshot.content.clone(),
            current: current_ip.to_string(),
        });
    }

    store.update_record(current_ip).await?;
    tracing::info!("UPDATED: {} - {}", record_name, current_ip);
    Ok(SyncOutcome::Updated {
        record_name,
        previous: snapshot.content.clone(),
        current: current_ip.to_string(),
    })
}

/// Runs the whole pipeline against one lookup service and one record.
pub struct Updater {
    detector: IpDetector,
    store: Box<dyn DnsRecordStore>,
    dry_run: bool,
}

impl Updater {
    pub fn new(detector: IpDetector, store: Box<dyn DnsRecordStore>) -> Self {
        Self {
            detector,
            store,
            dry_run: false,
        }
    }

    /// Wire up the lookup service and Cloudflare record named in `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = build_client()?;
        let detector = IpDetector::new(client.clone(), config.api_endpoint_ipv4.clone());
        let store = CloudflareProvider::from_config(client, config)?;

        Ok(Self::new(detector, Box::new(store)))
    }

    /// Compare only, never send the update.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub async fn run(&self) -> Result<SyncOutcome> {
        let current_ip = self
            .detector
            .resolve_public_ipv4()
            .await?
            .ok_or(DdnsError::IpUnavailable)?;
        tracing::debug!("Current IP: {}", current_ip);

        let snapshot = self.store.fetch_record().await?;
        tracing::debug!(
            "Record {} currently holds {}",
            self.store.record_name(),
            snapshot.content
        );

        reconcile(self.store.as_ref(), &current_ip, &snapshot, self.dry_run).await
    }
}
