//! One-time log file setup at process start.
//!
//! If the default log file already exists it is used as-is. Otherwise the
//! operator may pick a location through a [`LocationPrompt`]; with no answer,
//! or when the chosen file cannot be created, the default path is created
//! instead. A new file starts with [`LOG_HEADER`]. An existing file is never
//! truncated, including one picked at the prompt.

use std::fs::OpenOptions;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// First line of a freshly created log file.
pub const LOG_HEADER: &str = "--- IP scan log file ---\n";

/// Asks the operator where the log file should live.
pub trait LocationPrompt {
    /// Return the chosen path, or `None` when nothing was chosen.
    fn choose(&mut self, default: &Path) -> Option<PathBuf>;
}

/// Never prompts.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPrompt;

impl LocationPrompt for NoPrompt {
    fn choose(&mut self, _default: &Path) -> Option<PathBuf> {
        None
    }
}

/// Prompts on the terminal. Unavailable when stdin is not a terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

impl LocationPrompt for TerminalPrompt {
    fn choose(&mut self, default: &Path) -> Option<PathBuf> {
        let stdin = io::stdin();
        if !stdin.is_terminal() {
            println!("No terminal available. Unable to ask for a save location.");
            return None;
        }

        print!(
            "Where should the log file be created? [{}]: ",
            default.display()
        );
        io::stdout().flush().ok()?;

        let mut answer = String::new();
        stdin.lock().read_line(&mut answer).ok()?;
        normalize_choice(&answer, default)
    }
}

/// Turn a typed answer into a log file path.
///
/// Empty input means no selection. A directory gets the default file name,
/// and a name without extension gets `.log`.
pub fn normalize_choice(answer: &str, default: &Path) -> Option<PathBuf> {
    let answer = answer.trim();
    if answer.is_empty() {
        return None;
    }

    let mut path = PathBuf::from(answer);
    if path.is_dir() {
        let file_name = default
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("IP_scan.log"));
        path.push(file_name);
    } else if path.extension().is_none() {
        path.set_extension("log");
    }
    Some(path)
}

/// How the log file became ready.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bootstrap {
    /// The default file already existed; nothing was written.
    Existing(PathBuf),
    /// A log file was created (or an existing one chosen at the prompt).
    Created(PathBuf),
}

impl Bootstrap {
    /// The log file every later scan appends to.
    pub fn path(&self) -> &Path {
        match self {
            Bootstrap::Existing(path) | Bootstrap::Created(path) => path,
        }
    }
}

/// Make sure a log file exists, asking for a location if it does not.
pub fn prepare_log_file(
    default: &Path,
    prompt: &mut dyn LocationPrompt,
) -> io::Result<Bootstrap> {
    if default.exists() {
        println!("The file {} already exists.", default.display());
        return Ok(Bootstrap::Existing(default.to_path_buf()));
    }

    println!(
        "The file {} does not exist. Creating the file...",
        default.display()
    );

    match prompt.choose(default) {
        Some(chosen) => match create_with_header(&chosen) {
            Ok(()) => {
                info!(path = %chosen.display(), "Log file ready");
                return Ok(Bootstrap::Created(chosen));
            }
            Err(e) => {
                warn!(path = %chosen.display(), error = %e, "Cannot create chosen log file");
                println!(
                    "Unable to create {} ({}). \
                     The file will be created in the current directory as '{}'.",
                    chosen.display(),
                    e,
                    default.display()
                );
            }
        },
        None => println!(
            "No location selected. The file will be created in the current directory as '{}'.",
            default.display()
        ),
    }

    create_with_header(default)?;
    info!(path = %default.display(), "Log file ready");
    Ok(Bootstrap::Created(default.to_path_buf()))
}

/// Create `path` with the header line. An existing file is left untouched.
fn create_with_header(path: &Path) -> io::Result<()> {
    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(mut file) => {
            file.write_all(LOG_HEADER.as_bytes())?;
            file.flush()?;
            file.sync_all()
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(()),
        Err(e) => Err(e),
    }
}
