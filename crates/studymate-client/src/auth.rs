//! Login and logout.

use std::sync::Arc;

use tracing::{info, warn};

use crate::credentials::Session;
use crate::error::ClientError;
use crate::http::HttpClient;
use crate::wire::{LoginRequest, LoginResponse};

/// Client for `/users/login`; stores the resulting session in the injected
/// credential provider.
#[derive(Clone)]
pub struct AuthService {
    http: Arc<HttpClient>,
}

impl AuthService {
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    /// Exchange email and password for a session and store it.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, ClientError> {
        let response: LoginResponse = self
            .http
            .post_json_anonymous("/users/login", &LoginRequest { email, password })
            .await
            .map_err(|e| match e {
                ClientError::Status { status, body } => {
                    ClientError::Login(login_message(status, &body))
                }
                other => other,
            })?;

        let token = response
            .token
            .clone()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ClientError::Login("no token received".to_string()))?;

        let user_id = response.user_id();
        if user_id.is_none() {
            warn!("Login response carried no user id; task lists will be unavailable");
        }

        let session = Session::new(token, user_id);
        self.http.credentials().set(session.clone())?;
        info!(user_id = ?session.user_id, "Logged in");
        Ok(session)
    }

    /// Forget the stored session.
    pub fn logout(&self) -> Result<(), ClientError> {
        self.http.credentials().clear()?;
        info!("Logged out");
        Ok(())
    }

    /// Current session, if any.
    pub fn session(&self) -> Option<Session> {
        self.http.credentials().get()
    }
}

/// Prefer the backend's own `message` field when it sent one.
fn login_message(status: u16, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| format!("login failed ({})", status))
}
