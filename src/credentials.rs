//! AbuseIPDB API key loading.

use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Error loading the API key.
#[derive(Debug)]
pub enum CredentialError {
    /// Key file does not exist.
    Missing(PathBuf),
    /// Key file exists but could not be read.
    Read { path: PathBuf, source: io::Error },
    /// Key file is empty or whitespace only.
    Empty(PathBuf),
}

impl std::fmt::Display for CredentialError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialError::Missing(path) => {
                write!(f, "The file '{}' was not found.", path.display())
            }
            CredentialError::Read { path, source } => {
                write!(f, "Error reading API key from '{}': {}", path.display(), source)
            }
            CredentialError::Empty(path) => {
                write!(f, "The file '{}' does not contain an API key.", path.display())
            }
        }
    }
}

impl std::error::Error for CredentialError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CredentialError::Read { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Reads the API key from a fixed file, fresh on every call.
#[derive(Debug, Clone)]
pub struct CredentialLoader {
    path: PathBuf,
}

impl CredentialLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load and trim the API key.
    pub fn load(&self) -> Result<String, CredentialError> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                CredentialError::Missing(self.path.clone())
            } else {
                CredentialError::Read {
                    path: self.path.clone(),
                    source: e,
                }
            }
        })?;

        let key = content.trim();
        if key.is_empty() {
            return Err(CredentialError::Empty(self.path.clone()));
        }

        debug!(path = %self.path.display(), "API key loaded");
        Ok(key.to_string())
    }
}
