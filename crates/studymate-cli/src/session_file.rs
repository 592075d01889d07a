//! Session persisted as JSON between CLI invocations.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use studymate_client::{ClientError, CredentialProvider, Session};

/// Credential provider backed by a JSON file.
pub struct FileCredentials {
    path: PathBuf,
}

impl FileCredentials {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `$HOME/.studymate/session.json`, or the working directory without a home.
    pub fn default_path() -> PathBuf {
        std::env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".studymate")
            .join("session.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialProvider for FileCredentials {
    fn get(&self) -> Option<Session> {
        let raw = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "Ignoring unreadable session file");
                None
            }
        }
    }

    fn set(&self, session: Session) -> Result<(), ClientError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|e| ClientError::Credentials(e.to_string()))?;
        }
        let json = serde_json::to_string_pretty(&session)?;
        fs::write(&self.path, json).map_err(|e| ClientError::Credentials(e.to_string()))?;
        debug!(path = %self.path.display(), "Session saved");
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ClientError::Credentials(e.to_string())),
        }
    }
}
