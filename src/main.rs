//! IP Scan CLI.

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use ip_scan::bootstrap::{self, LocationPrompt, NoPrompt, TerminalPrompt};
use ip_scan::runner::{run_daily, DailyRun};
use ip_scan::{Config, ScanCycle};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ip-scan")]
#[command(about = "Check this host's public IP against AbuseIPDB once a day and log the result")]
#[command(version)]
struct Args {
    /// Path to configuration file (default: ip-scan.yaml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'L', long, default_value = "info")]
    log_level: String,

    /// Print example configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Validate configuration and exit
    #[arg(long)]
    validate: bool,

    /// Run a single scan and exit
    #[arg(long)]
    once: bool,

    /// Never ask where to create the log file
    #[arg(long)]
    no_prompt: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Handle --print-config
    if args.print_config {
        println!("{}", Config::example());
        return Ok(());
    }

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = Config::load_or_default(args.config.as_deref())?;
    info!(
        api_key = %config.files.api_key.display(),
        daily_at = %config.schedule.daily_at,
        "Configuration loaded"
    );

    // Handle --validate
    if args.validate {
        info!("Configuration is valid");
        return Ok(());
    }

    let run = DailyRun::from_config(&config.schedule)?;

    let mut prompt: Box<dyn LocationPrompt> = if args.no_prompt || !config.bootstrap.interactive {
        Box::new(NoPrompt)
    } else {
        Box::new(TerminalPrompt)
    };
    let log_file = bootstrap::prepare_log_file(&config.files.log, prompt.as_mut())?;

    let cycle = ScanCycle::from_config(&config, log_file.path().to_path_buf())?;

    if args.once {
        cycle.run().await;
        return Ok(());
    }

    // One listener for the whole run, so an interrupt during a scan is not lost.
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    let completed = run_daily(&cycle, run, || Local::now().naive_local(), shutdown).await;
    info!(scans = completed, "Scheduler stopped");

    Ok(())
}
