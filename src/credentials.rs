//! Account credentials and the append-only local credential file.
//!
//! The file holds one `identity:secret` line per successful verified login.
//! It is never parsed beyond splitting each line on its first colon.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// An account identifier with an optional secret.
///
/// A missing secret means the caller has to ask for one.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub identity: String,
    pub secret: Option<String>,
}

impl Credentials {
    pub fn new(identity: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            secret: Some(secret.into()),
        }
    }

    /// Split `identity:secret` on the first colon.
    ///
    /// Empty parts become empty identity / `None` secret, so `":"` yields
    /// neither.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim_end_matches(['\r', '\n']);
        let (identity, secret) = match raw.split_once(':') {
            Some((identity, secret)) => (identity, secret),
            None => (raw, ""),
        };
        Self {
            identity: identity.trim().to_string(),
            secret: if secret.is_empty() {
                None
            } else {
                Some(secret.to_string())
            },
        }
    }

    /// True when both an identity and a secret are present.
    pub fn is_complete(&self) -> bool {
        !self.identity.is_empty() && self.secret.as_deref().is_some_and(|s| !s.is_empty())
    }

    fn to_line(&self) -> String {
        format!("{}:{}", self.identity, self.secret.as_deref().unwrap_or(""))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identity", &self.identity)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Append-only store backed by a plain text file.
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one `identity:secret` line, creating parent directories.
    pub fn append(&self, credentials: &Credentials) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", credentials.to_line())?;
        tracing::info!("Saved credentials for {} to {}", credentials.identity, self.path.display());
        Ok(())
    }

    /// The most recently appended complete entry, if any.
    ///
    /// A missing file is not an error.
    pub fn latest(&self) -> Result<Option<Credentials>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.path)?;
        Ok(contents
            .lines()
            .rev()
            .map(Credentials::parse)
            .find(Credentials::is_complete))
    }
}
