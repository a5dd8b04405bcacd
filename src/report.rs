//! Scan result formatting for the log file and the console.

use crate::providers::{ReputationReport, ReputationResult};
use chrono::Local;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Timestamp format of the per-scan separator line.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const STATUS_MALICIOUS: &str = "[WARNING] Likely malicious";
const STATUS_CLEAN: &str = "[OK] Clean";
const BANNER_MALICIOUS: &str = "⚠️ Warning: This IP has a high reputation score (likely malicious).";
const BANNER_CLEAN: &str = "✅ This IP appears clean.";

/// Appends scan results to a log file and mirrors them on the console.
#[derive(Debug, Clone)]
pub struct ResultLogger {
    path: PathBuf,
    malicious_above: u8,
}

impl ResultLogger {
    pub fn new(path: impl Into<PathBuf>, malicious_above: u8) -> Self {
        Self {
            path: path.into(),
            malicious_above,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry stamped with the current local time.
    pub fn append(&self, result: &ReputationResult) -> io::Result<()> {
        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        let entry = render_entry(&timestamp, result, self.malicious_above);
        append_to_file(&self.path, &entry)?;
        debug!(path = %self.path.display(), bytes = entry.len(), "Scan entry appended");
        Ok(())
    }

    /// Print the console mirror of a result.
    pub fn print(&self, result: &ReputationResult) {
        print!("{}", render_console(result, self.malicious_above));
        println!();
        println!("Results saved to: {}", self.path.display());
    }
}

/// Status line for a score.
pub fn status_line(score: u8, malicious_above: u8) -> &'static str {
    if score > malicious_above {
        STATUS_MALICIOUS
    } else {
        STATUS_CLEAN
    }
}

/// Render the log file block for a result.
pub fn render_entry(timestamp: &str, result: &ReputationResult, malicious_above: u8) -> String {
    let mut out = format!("\n--- Scan at {} ---\n", timestamp);
    match result {
        ReputationResult::Error(msg) => {
            out.push_str(&format!("Error: {}\n", msg));
        }
        ReputationResult::Report(report) => {
            push_fields(&mut out, report);
            out.push_str(&format!(
                "Status: {}\n",
                status_line(report.abuse_score, malicious_above)
            ));
        }
    }
    out
}

/// Render the console mirror of a result: same fields, no separator,
/// with a closing banner instead of the status line.
pub fn render_console(result: &ReputationResult, malicious_above: u8) -> String {
    match result {
        ReputationResult::Error(msg) => format!("Error: {}\n", msg),
        ReputationResult::Report(report) => {
            let mut out = String::from("\nScan result:\n");
            push_fields(&mut out, report);
            let banner = if report.is_likely_malicious(malicious_above) {
                BANNER_MALICIOUS
            } else {
                BANNER_CLEAN
            };
            out.push_str(&format!("\n{}\n", banner));
            out
        }
    }
}

fn push_fields(out: &mut String, report: &ReputationReport) {
    out.push_str(&format!("IP: {}\n", report.ip));
    out.push_str(&format!("Reputation score: {}/100\n", report.abuse_score));
    out.push_str(&format!("Country: {}\n", or_na(&report.country_code)));
    out.push_str(&format!("ISP: {}\n", or_na(&report.isp)));
    out.push_str(&format!("Domain: {}\n", or_na(&report.domain)));
    out.push_str(&format!(
        "Is whitelisted: {}\n",
        if report.is_whitelisted { "Yes" } else { "No" }
    ));
    out.push_str(&format!("Last reported: {}\n", or_na(&report.last_reported_at)));
}

fn or_na(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("N/A")
}

/// Append text to a file, creating it if needed. Never truncates.
pub(crate) fn append_to_file(path: &Path, text: &str) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(text.as_bytes())?;
    file.flush()?;
    file.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report(score: u8) -> ReputationReport {
        ReputationReport {
            ip: "203.0.113.7".to_string(),
            abuse_score: score,
            country_code: Some("US".to_string()),
            isp: Some("ExampleISP".to_string()),
            domain: Some("example.com".to_string()),
            is_whitelisted: false,
            last_reported_at: Some("2024-01-01T00:00:00+00:00".to_string()),
        }
    }

    #[test]
    fn test_status_line_boundary() {
        assert_eq!(status_line(0, 50), "[OK] Clean");
        assert_eq!(status_line(50, 50), "[OK] Clean");
        assert_eq!(status_line(51, 50), "[WARNING] Likely malicious");
        assert_eq!(status_line(100, 50), "[WARNING] Likely malicious");
    }

    #[test]
    fn test_render_entry_report() {
        let result = ReputationResult::Report(sample_report(75));
        let entry = render_entry("2024-05-01 01:00:00", &result, 50);

        assert_eq!(
            entry,
            "\n--- Scan at 2024-05-01 01:00:00 ---\n\
             IP: 203.0.113.7\n\
             Reputation score: 75/100\n\
             Country: US\n\
             ISP: ExampleISP\n\
             Domain: example.com\n\
             Is whitelisted: No\n\
             Last reported: 2024-01-01T00:00:00+00:00\n\
             Status: [WARNING] Likely malicious\n"
        );
    }

    #[test]
    fn test_render_entry_error() {
        let result = ReputationResult::Error("Request timed out".to_string());
        let entry = render_entry("2024-05-01 01:00:00", &result, 50);
        assert_eq!(
            entry,
            "\n--- Scan at 2024-05-01 01:00:00 ---\nError: Request timed out\n"
        );
    }

    #[test]
    fn test_render_entry_missing_fields() {
        let mut report = sample_report(10);
        report.domain = None;
        report.last_reported_at = None;
        report.is_whitelisted = true;

        let entry = render_entry("ts", &ReputationResult::Report(report), 50);
        assert!(entry.contains("Domain: N/A\n"));
        assert!(entry.contains("Last reported: N/A\n"));
        assert!(entry.contains("Is whitelisted: Yes\n"));
        assert!(entry.contains("Status: [OK] Clean\n"));
    }

    #[test]
    fn test_render_console() {
        let clean = render_console(&ReputationResult::Report(sample_report(20)), 50);
        assert!(clean.contains("Scan result:"));
        assert!(clean.contains("Reputation score: 20/100"));
        assert!(clean.contains("This IP appears clean."));
        assert!(!clean.contains("--- Scan at"));
        assert!(!clean.contains("Status:"));

        let bad = render_console(&ReputationResult::Report(sample_report(90)), 50);
        assert!(bad.contains("likely malicious"));

        let err = render_console(&ReputationResult::Error("boom".to_string()), 50);
        assert_eq!(err, "Error: boom\n");
    }

    #[test]
    fn test_append_preserves_prior_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("IP_scan.log");
        std::fs::write(&path, "--- IP scan log file ---\n").unwrap();

        let logger = ResultLogger::new(&path, 50);
        let before = std::fs::read_to_string(&path).unwrap();

        logger.append(&ReputationResult::Report(sample_report(30))).unwrap();
        let middle = std::fs::read_to_string(&path).unwrap();
        assert!(middle.starts_with(&before));
        assert!(middle.len() > before.len());

        logger.append(&ReputationResult::Error("boom".to_string())).unwrap();
        let after = std::fs::read_to_string(&path).unwrap();
        assert!(after.starts_with(&middle));
        assert!(after.ends_with("Error: boom\n"));
        assert_eq!(after.matches("--- Scan at ").count(), 2);
    }

    #[test]
    fn test_append_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("new.log");

        ResultLogger::new(&path, 50)
            .append(&ReputationResult::Error("x".to_string()))
            .unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("Error: x"));
    }
}
