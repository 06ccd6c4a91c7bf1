//! # cf-dyndns
//!
//! Keeps one Cloudflare DNS A-record pointed at the machine's current public IPv4 address.
//!
//! A run loads `config.json`, asks a JSON "what is my IP" service for the address, reads the
//! record from the Cloudflare API and rewrites it only when the two differ. Scheduling is left
//! to cron or a systemd timer.
//!
//! ## Usage
//!
//! ```bash
//! # Sync using ./config.json
//! cf-dyndns
//!
//! # Show what would change without touching the record
//! cf-dyndns --config /etc/cf-dyndns.json --dry-run
//! ```

pub mod config;
pub mod detector;
pub mod error;
pub mod http;
pub mod providers;
pub mod updater;

pub use config::Config;
pub use detector::IpDetector;
pub use error::{DdnsError, Result};
pub use updater::{reconcile, SyncOutcome, Updater};
