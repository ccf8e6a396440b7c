//! HTTP transport for the TeamTacles REST API
//!
//! Every request goes through [`ApiClient`], which:
//! - attaches `Authorization: Bearer <token>` from the shared [`Session`]
//! - decodes non-2xx bodies into [`ApiError`]
//! - expires the session on a 401 that carries no domain `errorCode`
//!
//! List endpoints are read through [`ApiClient::get_page`], which normalizes
//! the page envelope (see [`envelope`]).

mod envelope;
mod error;
mod messages;
mod session;

pub use envelope::{normalize_page, PageEnvelope};
pub use error::{ActionError, ApiError};
pub use session::{FileTokenStore, MemoryTokenStore, Session, SubscriptionId};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Shared HTTP client bound to one API base URL and one session
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<Session>,
}

impl ApiClient {
    /// Create a client for `base_url` (e.g. `https://teamtacles.example/api`)
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        session: Arc<Session>,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(4)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        tracing::debug!("API client initialized for {}", base_url);

        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Attach the bearer token; requests are never sent without one
    fn authorize(&self, req: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder, ApiError> {
        match self.session.token() {
            Some(token) => Ok(req.bearer_auth(token)),
            None => Err(ApiError::NotAuthenticated),
        }
    }

    /// GET a JSON document
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<T, ApiError> {
        let req = self.authorize(self.http.get(self.url(path)).query(query))?;
        self.send(req).await
    }

    /// GET one page of a list endpoint
    pub async fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<PageEnvelope<T>, ApiError> {
        let body: serde_json::Value = self.get_json(path, query).await?;
        normalize_page(body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// POST a JSON body and decode the JSON reply
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let req = self.authorize(self.http.post(self.url(path)).json(body))?;
        self.send(req).await
    }

    /// POST a JSON body; any 2xx counts as success, whatever the reply body
    pub async fn post_ack<B>(&self, path: &str, body: &B) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        let req = self.authorize(self.http.post(self.url(path)).json(body))?;
        let response = req.send().await?;
        self.check(response).await.map(|_| ())
    }

    /// POST without a body, ignoring the reply body
    pub async fn post_empty(&self, path: &str) -> Result<(), ApiError> {
        let req = self.authorize(self.http.post(self.url(path)))?;
        let response = req.send().await?;
        self.check(response).await.map(|_| ())
    }

    async fn send<T: DeserializeOwned>(&self, req: reqwest::RequestBuilder) -> Result<T, ApiError> {
        let response = req.send().await?;
        let response = self.check(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Turn non-2xx responses into errors, expiring the session on a bare 401
    async fn check(&self, response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().path().to_string();
        let body = response.text().await.unwrap_or_default();
        let err = ApiError::from_response(status.as_u16(), &body);

        tracing::debug!("{} {} -> {}", status.as_u16(), url, err);

        if err.is_session_expired() {
            self.session.expire();
        }

        Err(err)
    }
}
