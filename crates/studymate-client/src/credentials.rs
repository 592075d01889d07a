//! Credential provider seam.
//!
//! The session token is handed to the client explicitly instead of being read
//! from a process-wide store, so tests and front ends choose where it lives.

use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use studymate_core::UserId;

use crate::error::ClientError;

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token sent with every authenticated request.
    pub token: String,

    /// Id of the logged-in user, if the backend reported one.
    pub user_id: Option<UserId>,
}

impl Session {
    pub fn new(token: impl Into<String>, user_id: Option<UserId>) -> Self {
        Self {
            token: token.into(),
            user_id,
        }
    }
}

/// Source of the current session.
pub trait CredentialProvider: Send + Sync {
    /// Current session, if logged in.
    fn get(&self) -> Option<Session>;

    /// Replace the stored session.
    fn set(&self, session: Session) -> Result<(), ClientError>;

    /// Forget the stored session.
    fn clear(&self) -> Result<(), ClientError>;
}

/// Session held in memory for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryCredentials {
    inner: RwLock<Option<Session>>,
}

impl MemoryCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an existing session.
    pub fn with_session(session: Session) -> Self {
        Self {
            inner: RwLock::new(Some(session)),
        }
    }
}

impl CredentialProvider for MemoryCredentials {
    fn get(&self) -> Option<Session> {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn set(&self, session: Session) -> Result<(), ClientError> {
        *self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(session);
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        *self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
        Ok(())
    }
}
