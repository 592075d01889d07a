//! HTTP client for the REST endpoints.

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::credentials::{CredentialProvider, Session};
use crate::error::ClientError;

/// Thin wrapper over `reqwest` that knows the base URL and attaches the
/// bearer token from the injected credential provider.
pub struct HttpClient {
    inner: reqwest::Client,
    base_url: String,
    credentials: Arc<dyn CredentialProvider>,
}

impl HttpClient {
    /// Create a new HTTP client.
    pub fn new(
        config: &ClientConfig,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self, ClientError> {
        let inner = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ClientError::Connection(e.to_string()))?;

        Ok(Self {
            inner,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credentials(&self) -> &Arc<dyn CredentialProvider> {
        &self.credentials
    }

    /// Current session, or `NotAuthenticated` before any request is made.
    pub fn session(&self) -> Result<Session, ClientError> {
        self.credentials.get().ok_or(ClientError::NotAuthenticated)
    }

    /// GET JSON from an authenticated endpoint.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self.send(self.authed(Method::GET, path)?, path).await?;
        decode(response).await
    }

    /// POST a JSON body to an authenticated endpoint and decode the reply.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.authed(Method::POST, path)?.json(body);
        let response = self.send(request, path).await?;
        decode(response).await
    }

    /// POST a JSON body without a token (login).
    pub async fn post_json_anonymous<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.inner.post(self.url(path)).json(body);
        let response = self.send(request, path).await?;
        decode(response).await
    }

    /// PUT a JSON body; any response body is ignored.
    pub async fn put_json<B>(&self, path: &str, body: &B) -> Result<(), ClientError>
    where
        B: Serialize + ?Sized,
    {
        let request = self.authed(Method::PUT, path)?.json(body);
        self.send(request, path).await?;
        Ok(())
    }

    /// DELETE a resource.
    pub async fn delete(&self, path: &str) -> Result<(), ClientError> {
        self.send(self.authed(Method::DELETE, path)?, path).await?;
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        let session = self.session()?;
        Ok(self
            .inner
            .request(method, self.url(path))
            .bearer_auth(session.token))
    }

    async fn send(&self, request: RequestBuilder, path: &str) -> Result<Response, ClientError> {
        let request = request.build()?;
        debug!(method = %request.method(), url = %request.url(), "HTTP request");

        let response = self.inner.execute(request).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), path = %path, body = %body, "Request failed");

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(path.to_string()));
        }
        Err(ClientError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(ClientError::from)
}
