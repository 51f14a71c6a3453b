//! # HTTP Client
//!
//! The one place requests are built, sent and their errors mapped.
//!
//! ## Request Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Request Pipeline                                │
//! │                                                                         │
//! │  api::bills::create_paid(..)                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  request(POST, "/bills/paid")                                          │
//! │       │  base_url + path                                               │
//! │       │  Authorization: Bearer <token>     (when logged in)            │
//! │       │  X-Retailer-Id: <id>               (when a retailer is known)  │
//! │       │  timeout (config.api.timeout_secs)                             │
//! │       ▼                                                                 │
//! │  send ──► 2xx ──► JSON body (empty body reads as null)                 │
//! │       │                                                                 │
//! │       └─► non-2xx ──► ClientError::Backend { status, body verbatim }   │
//! │                                                                         │
//! │  GET only: retryable failures go round again with exponential          │
//! │  backoff when retry.max_retries > 0                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{ClientConfig, RetrySettings};
use crate::error::{ClientError, ClientResult};

/// Header every retailer-scoped call carries.
pub const RETAILER_HEADER: &str = "X-Retailer-Id";

/// Query parameters as `(name, value)` pairs.
pub type Query<'a> = [(&'a str, String)];

#[derive(Clone)]
pub struct HttpClient {
    http: Client,
    base_url: String,
    auth_token: Option<String>,
    retailer_id: Option<i64>,
    timeout: Duration,
    retry: RetrySettings,
}

impl HttpClient {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ClientError::InvalidConfig(e.to_string()))?;

        Ok(HttpClient {
            http,
            base_url: config.api.base_url.trim_end_matches('/').to_string(),
            auth_token: None,
            retailer_id: None,
            timeout: config.timeout(),
            retry: config.retry.clone(),
        })
    }

    /// Points the client somewhere else (tests use a local fake backend).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base: String = base_url.into();
        self.base_url = base.trim_end_matches('/').to_string();
        self
    }

    pub fn with_auth_token(mut self, token: Option<String>) -> Self {
        self.auth_token = token;
        self
    }

    pub fn with_retailer(mut self, retailer_id: Option<i64>) -> Self {
        self.retailer_id = retailer_id;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn retailer_id(&self) -> Option<i64> {
        self.retailer_id
    }

    /// Retailer id for calls that cannot run without one.
    pub fn require_retailer(&self) -> ClientResult<i64> {
        self.retailer_id.ok_or(ClientError::MissingRetailer)
    }

    // =========================================================================
    // Request Construction
    // =========================================================================

    /// Builds a request with the base URL, auth and retailer header applied.
    pub fn request(&self, method: Method, path: &str) -> ClientResult<RequestBuilder> {
        let url = url::Url::parse(&format!("{}{}", self.base_url, path))?;
        debug!(%method, %url, "Building request");

        let mut builder = self.http.request(method, url);
        if let Some(ref token) = self.auth_token {
            builder = builder.bearer_auth(token);
        }
        if let Some(id) = self.retailer_id {
            builder = builder.header(RETAILER_HEADER, id.to_string());
        }
        Ok(builder)
    }

    // =========================================================================
    // Sending
    // =========================================================================

    /// Sends a request and decodes a JSON body. An empty 2xx body decodes
    /// as `null`, so `()` and `Option<T>` work for endpoints that return
    /// nothing.
    pub async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ClientResult<T> {
        let text = self.send_text(builder).await?;
        let body = if text.trim().is_empty() { "null" } else { text.as_str() };
        serde_json::from_str(body).map_err(|e| {
            debug!(error = %e, body = %text, "Response did not match expected shape");
            ClientError::DecodeFailed(e.to_string())
        })
    }

    /// Sends a request and returns the raw 2xx body text.
    pub async fn send_text(&self, builder: RequestBuilder) -> ClientResult<String> {
        let response = builder.send().await.map_err(|e| self.map_transport(e))?;
        let status = response.status();
        let text = response.text().await.map_err(|e| self.map_transport(e))?;

        if !status.is_success() {
            warn!(status = status.as_u16(), body = %text, "Backend rejected request");
            return Err(ClientError::Backend {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(text)
    }

    fn map_transport(&self, err: reqwest::Error) -> ClientError {
        if err.is_timeout() {
            ClientError::Timeout(self.timeout.as_secs())
        } else {
            ClientError::from(err)
        }
    }

    // =========================================================================
    // Verb Helpers
    // =========================================================================

    /// GET with optional retry.
    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &Query<'_>) -> ClientResult<T> {
        let mut attempt = 0u32;
        let mut backoff = self.create_backoff();

        loop {
            let builder = self.request(Method::GET, path)?.query(query);
            match self.send(builder).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.retry.max_retries => {
                    attempt += 1;
                    let delay = backoff
                        .next_backoff()
                        .unwrap_or_else(|| Duration::from_secs(self.retry.max_backoff_secs));
                    warn!(path, attempt, ?delay, error = %e, "GET failed, retrying");
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    pub async fn post<B, T>(&self, path: &str, query: &Query<'_>, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.request(Method::POST, path)?.query(query).json(body);
        self.send(builder).await
    }

    pub async fn put<B, T>(&self, path: &str, query: &Query<'_>, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.request(Method::PUT, path)?.query(query).json(body);
        self.send(builder).await
    }

    pub async fn delete(&self, path: &str, query: &Query<'_>) -> ClientResult<()> {
        let builder = self.request(Method::DELETE, path)?.query(query);
        self.send_text(builder).await.map(|_| ())
    }

    /// Multipart upload under the form field `file`. Returns the body text
    /// (the backend answers with either a URL or a JSON object).
    pub async fn upload(
        &self,
        path: &str,
        file_name: &str,
        bytes: Vec<u8>,
        mime: &str,
    ) -> ClientResult<String> {
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime)
            .map_err(|e| ClientError::RequestFailed(e.to_string()))?;
        let form = Form::new().part("file", part);

        let builder = self.request(Method::POST, path)?.multipart(form);
        self.send_text(builder).await
    }

    fn create_backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: Duration::from_millis(self.retry.initial_backoff_ms),
            max_interval: Duration::from_secs(self.retry.max_backoff_secs),
            multiplier: 2.0,
            max_elapsed_time: None,
            ..Default::default()
        }
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.auth_token.is_some())
            .field("retailer_id", &self.retailer_id)
            .finish()
    }
}
