//! Configuration types for the IP scanner.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file, read only when present.
pub const DEFAULT_CONFIG_PATH: &str = "ip-scan.yaml";

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Credential and log file locations.
    #[serde(default)]
    pub files: FilesConfig,

    /// Public address echo service.
    #[serde(default)]
    pub address: AddressConfig,

    /// AbuseIPDB reputation service.
    #[serde(default)]
    pub abuseipdb: AbuseIPDBConfig,

    /// Reputation score thresholds.
    #[serde(default)]
    pub thresholds: Thresholds,

    /// Daily schedule.
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Log file bootstrap.
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
}

/// File locations.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FilesConfig {
    /// File holding the AbuseIPDB API key.
    #[serde(default = "default_api_key_path")]
    pub api_key: PathBuf,

    /// Default scan log location.
    #[serde(default = "default_log_path")]
    pub log: PathBuf,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            api_key: default_api_key_path(),
            log: default_log_path(),
        }
    }
}

fn default_api_key_path() -> PathBuf {
    PathBuf::from("IP_scan_api_key.txt")
}

fn default_log_path() -> PathBuf {
    PathBuf::from("IP_scan.log")
}

/// Address echo service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AddressConfig {
    /// Endpoint returning the caller's public IP as plain text.
    #[serde(default = "default_address_url")]
    pub url: String,

    /// Request timeout in milliseconds. Unset keeps the HTTP client default.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl Default for AddressConfig {
    fn default() -> Self {
        Self {
            url: default_address_url(),
            timeout_ms: None,
        }
    }
}

fn default_address_url() -> String {
    "https://api.ipify.org".to_string()
}

/// AbuseIPDB provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AbuseIPDBConfig {
    /// Check endpoint.
    #[serde(default = "default_abuseipdb_url")]
    pub url: String,

    /// Only consider reports from the last N days.
    #[serde(default = "default_max_age_days")]
    pub max_age_days: u32,

    /// API request timeout in milliseconds. Unset keeps the HTTP client default.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl Default for AbuseIPDBConfig {
    fn default() -> Self {
        Self {
            url: default_abuseipdb_url(),
            max_age_days: default_max_age_days(),
            timeout_ms: None,
        }
    }
}

fn default_abuseipdb_url() -> String {
    "https://api.abuseipdb.com/api/v2/check".to_string()
}

fn default_max_age_days() -> u32 {
    90
}

/// Reputation score thresholds.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Thresholds {
    /// Scores strictly above this value are reported as likely malicious.
    #[serde(default = "default_malicious_above")]
    pub malicious_above: u8,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            malicious_above: default_malicious_above(),
        }
    }
}

fn default_malicious_above() -> u8 {
    50
}

/// Daily schedule configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScheduleConfig {
    /// Local wall-clock time of the daily scan, `HH:MM`.
    #[serde(default = "default_daily_at")]
    pub daily_at: String,

    /// How often the loop checks for a due scan (seconds).
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,

    /// Run one scan immediately at startup.
    #[serde(default = "default_true")]
    pub run_on_start: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            daily_at: default_daily_at(),
            poll_interval_seconds: default_poll_interval(),
            run_on_start: true,
        }
    }
}

impl ScheduleConfig {
    /// Parse `daily_at` into a wall-clock time.
    pub fn daily_time(&self) -> anyhow::Result<NaiveTime> {
        NaiveTime::parse_from_str(self.daily_at.trim(), "%H:%M").map_err(|e| {
            anyhow::anyhow!("schedule.daily_at '{}' is not HH:MM: {}", self.daily_at, e)
        })
    }
}

fn default_daily_at() -> String {
    "01:00".to_string()
}

fn default_poll_interval() -> u64 {
    60
}

/// Log file bootstrap configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BootstrapConfig {
    /// Offer a location prompt when the log file does not exist yet.
    #[serde(default = "default_true")]
    pub interactive: bool,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self { interactive: true }
    }
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Load `path` if it was given explicitly, otherwise the default file
    /// if it exists, otherwise built-in defaults.
    pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_PATH);
                if default.exists() {
                    Self::load(default)
                } else {
                    let config = Self::default();
                    config.validate()?;
                    Ok(config)
                }
            }
        }
    }

    /// Parse and validate YAML content.
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let expanded = expand_env_vars(content);
        let config: Config = serde_yaml::from_str(&expanded)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.files.api_key.as_os_str().is_empty() {
            anyhow::bail!("files.api_key must not be empty");
        }

        if self.files.log.as_os_str().is_empty() {
            anyhow::bail!("files.log must not be empty");
        }

        if self.address.url.trim().is_empty() {
            anyhow::bail!("address.url must not be empty");
        }

        if self.abuseipdb.url.trim().is_empty() {
            anyhow::bail!("abuseipdb.url must not be empty");
        }

        // AbuseIPDB accepts 1..=365
        if !(1..=365).contains(&self.abuseipdb.max_age_days) {
            anyhow::bail!(
                "abuseipdb.max_age_days ({}) must be between 1 and 365",
                self.abuseipdb.max_age_days
            );
        }

        if self.thresholds.malicious_above > 100 {
            anyhow::bail!(
                "thresholds.malicious_above ({}) must be <= 100",
                self.thresholds.malicious_above
            );
        }

        if self.schedule.poll_interval_seconds == 0 {
            anyhow::bail!("schedule.poll_interval_seconds must be > 0");
        }

        self.schedule.daily_time()?;

        Ok(())
    }

    /// Generate example configuration YAML.
    pub fn example() -> String {
        r#"# IP Scan Configuration

files:
  api_key: "IP_scan_api_key.txt"   # AbuseIPDB API key, read on every scan
  log: "IP_scan.log"               # Default scan log location

# Public IP echo service (plain text response)
address:
  url: "https://api.ipify.org"
  # timeout_ms: 10000              # Unset = HTTP client default

# AbuseIPDB check endpoint
abuseipdb:
  url: "https://api.abuseipdb.com/api/v2/check"
  max_age_days: 90                 # Only consider reports from last 90 days
  # timeout_ms: 10000

# Reputation score thresholds (0-100, higher = worse)
thresholds:
  malicious_above: 50              # Warn if score > 50

schedule:
  daily_at: "01:00"                # Local wall-clock time
  poll_interval_seconds: 60
  run_on_start: true

bootstrap:
  interactive: true                # Ask where to create the log if missing
"#
        .to_string()
    }
}

/// Expand environment variables in the format ${VAR_NAME}.
fn expand_env_vars(content: &str) -> String {
    let re = match regex::Regex::new(r"\$\{([^}]+)\}") {
        Ok(re) => re,
        Err(_) => return content.to_string(),
    };

    re.replace_all(content, |caps: &regex::Captures| {
        std::env::var(&caps[1]).unwrap_or_default()
    })
    .into_owned()
}
