//! User and group endpoints.

use std::sync::Arc;

use tracing::debug;

use studymate_core::{Group, User, UserId};

use crate::error::ClientError;
use crate::http::HttpClient;

/// Client for `/users`.
#[derive(Clone)]
pub struct UserService {
    http: Arc<HttpClient>,
}

impl UserService {
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    pub async fn list_users(&self) -> Result<Vec<User>, ClientError> {
        let users: Vec<User> = self.http.get_json("/users").await?;
        debug!(count = users.len(), "Fetched users");
        Ok(users)
    }

    pub async fn get_user(&self, id: &UserId) -> Result<User, ClientError> {
        self.http.get_json(&format!("/users/{}", id)).await
    }

    /// Profile of the logged-in user.
    pub async fn me(&self) -> Result<User, ClientError> {
        let id = self
            .http
            .session()?
            .user_id
            .ok_or(ClientError::NotAuthenticated)?;
        self.get_user(&id).await
    }
}

/// Client for `/groups`.
#[derive(Clone)]
pub struct GroupService {
    http: Arc<HttpClient>,
}

impl GroupService {
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    pub async fn list_groups(&self) -> Result<Vec<Group>, ClientError> {
        let groups: Vec<Group> = self.http.get_json("/groups").await?;
        debug!(count = groups.len(), "Fetched groups");
        Ok(groups)
    }
}
