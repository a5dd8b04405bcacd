//! Daily public IP reputation scanner.
//!
//! Determines the host's public address, checks it against AbuseIPDB and
//! appends a human-readable record to a log file, once at startup and then
//! every day at a fixed local time.
//!
//! # Features
//!
//! - **Address resolution** - Plain-text echo service (ipify by default)
//! - **AbuseIPDB Integration** - Abuse confidence score, ISP, domain, whitelist status
//! - **Append-only log** - One timestamped block per scan, never truncated
//! - **Daily schedule** - Fixed wall-clock time, polled, no catch-up of missed days
//!
//! # Example Configuration
//!
//! ```yaml
//! files:
//!   api_key: "IP_scan_api_key.txt"
//!   log: "IP_scan.log"
//!
//! thresholds:
//!   malicious_above: 50
//!
//! schedule:
//!   daily_at: "01:00"
//!   poll_interval_seconds: 60
//! ```

pub mod bootstrap;
pub mod config;
pub mod credentials;
pub mod providers;
pub mod report;
pub mod runner;
pub mod scan;
pub mod scheduler;

pub use config::Config;
pub use scan::{CycleOutcome, ScanCycle};
