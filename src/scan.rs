//! Scan cycle: load key, resolve address, query reputation, log.

use crate::config::Config;
use crate::credentials::{CredentialError, CredentialLoader};
use crate::providers::abuseipdb::AbuseIPDBProvider;
use crate::providers::ipify::IpifyResolver;
use crate::providers::{AddressResolver, ProviderError, ReputationProvider, ReputationResult};
use crate::report::ResultLogger;
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Why a cycle stopped before completing.
#[derive(Debug)]
pub enum ScanError {
    /// API key could not be loaded.
    Credential(CredentialError),
    /// Public address could not be determined.
    AddressResolution(ProviderError),
    /// The result could not be appended to the log file.
    LogWrite(std::io::Error),
}

impl std::fmt::Display for ScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanError::Credential(e) => write!(f, "{}", e),
            ScanError::AddressResolution(e) => {
                write!(f, "Unable to detect your public IP: {}", e)
            }
            ScanError::LogWrite(e) => write!(f, "Unable to write scan log: {}", e),
        }
    }
}

impl std::error::Error for ScanError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScanError::Credential(e) => Some(e),
            ScanError::AddressResolution(e) => Some(e),
            ScanError::LogWrite(e) => Some(e),
        }
    }
}

/// What a single cycle did.
#[derive(Debug)]
pub enum CycleOutcome {
    /// A log entry was written.
    Logged {
        address: String,
        result: ReputationResult,
        path: PathBuf,
    },
    /// The cycle stopped early.
    Aborted(ScanError),
}

/// One full scan, composed from its parts.
pub struct ScanCycle {
    credentials: CredentialLoader,
    resolver: Box<dyn AddressResolver>,
    provider: Box<dyn ReputationProvider>,
    logger: ResultLogger,
}

impl ScanCycle {
    pub fn new(
        credentials: CredentialLoader,
        resolver: Box<dyn AddressResolver>,
        provider: Box<dyn ReputationProvider>,
        logger: ResultLogger,
    ) -> Self {
        Self {
            credentials,
            resolver,
            provider,
            logger,
        }
    }

    /// Build the production cycle writing to `log_path`.
    pub fn from_config(config: &Config, log_path: PathBuf) -> anyhow::Result<Self> {
        let resolver = IpifyResolver::new(config.address.clone())?;
        let provider = AbuseIPDBProvider::new(config.abuseipdb.clone())?;

        info!(
            resolver = resolver.name(),
            provider = provider.name(),
            log = %log_path.display(),
            "Scan cycle initialized"
        );

        Ok(Self::new(
            CredentialLoader::new(config.files.api_key.clone()),
            Box::new(resolver),
            Box::new(provider),
            ResultLogger::new(log_path, config.thresholds.malicious_above),
        ))
    }

    /// Run one cycle. Never fails; early stops come back as
    /// [`CycleOutcome::Aborted`] after a console diagnostic.
    pub async fn run(&self) -> CycleOutcome {
        info!("Scan cycle started");

        let api_key = match self.credentials.load() {
            Ok(key) => key,
            Err(e) => {
                warn!(
                    path = %self.credentials.path().display(),
                    error = %e,
                    "Cycle aborted: no API key"
                );
                println!("Error: {}", e);
                println!(
                    "Error: Could not read API key. \
                     Please ensure '{}' exists and contains a valid key.",
                    self.credentials.path().display()
                );
                return CycleOutcome::Aborted(ScanError::Credential(e));
            }
        };

        let address = match self.resolver.resolve().await {
            Ok(address) => address,
            Err(e) => {
                warn!(
                    resolver = self.resolver.name(),
                    error = %e,
                    "Cycle aborted: address resolution failed"
                );
                let e = ScanError::AddressResolution(e);
                println!("{}", e);
                return CycleOutcome::Aborted(e);
            }
        };
        println!("Public IP address detected: {}", address);

        let result = self.provider.check(&address, &api_key).await;

        if let Err(e) = self.logger.append(&result) {
            error!(
                path = %self.logger.path().display(),
                error = %e,
                "Failed to append scan entry"
            );
            let e = ScanError::LogWrite(e);
            println!("Error: {}", e);
            return CycleOutcome::Aborted(e);
        }
        self.logger.print(&result);

        match &result {
            ReputationResult::Report(report) => info!(
                ip = %report.ip,
                score = report.abuse_score,
                "Scan cycle complete"
            ),
            ReputationResult::Error(msg) => {
                warn!(error = %msg, "Scan cycle logged a failed lookup")
            }
        }

        CycleOutcome::Logged {
            address,
            result,
            path: self.logger.path().to_path_buf(),
        }
    }
}
