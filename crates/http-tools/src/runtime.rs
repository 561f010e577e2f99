//! Upstream Bitrise API client.
//!
//! Every tool call ends here: a method, a path relative to one of the two API base URLs (the core
//! API or Release Management), optional query pairs and an optional JSON body go out; the raw
//! response text comes back. Status codes >= 400 are errors. There are no retries.

use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const DEFAULT_API_BASE_URL: &str = "https://api.bitrise.io/v0.1";
/// Release Management paths carry their own `/v1` prefix.
pub const DEFAULT_RELEASE_MANAGEMENT_BASE_URL: &str = "https://api.bitrise.io/release-management";
pub const USER_AGENT: &str = "bitrise-mcp/1.0";

#[derive(Debug, Error)]
pub enum HttpToolsError {
    #[error("config error: {0}")]
    Config(String),
    #[error("unknown tool: {0}")]
    UnknownTool(String),
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
    #[error("unexpected status code {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("http transport error: {0}")]
    Transport(String),
}

pub type Result<T> = std::result::Result<T, HttpToolsError>;

impl From<reqwest::Error> for HttpToolsError {
    fn from(value: reqwest::Error) -> Self {
        // Drop the URL: it may carry query values the caller passed in.
        Self::Transport(value.without_url().to_string())
    }
}

/// Which Bitrise API a request path is relative to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ApiBase {
    #[default]
    Core,
    ReleaseManagement,
}

/// One outbound request, relative to an API base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamRequest {
    pub base: ApiBase,
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl UpstreamRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            base: ApiBase::Core,
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn on(mut self, base: ApiBase) -> Self {
        self.base = base;
        self
    }

    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Thin, cloneable client for the Bitrise REST API.
#[derive(Debug, Clone)]
pub struct UpstreamApi {
    client: Client,
    base_url: Url,
    release_management_base_url: Url,
    token: Option<String>,
    timeout: Duration,
}

impl UpstreamApi {
    /// # Errors
    ///
    /// Returns [`HttpToolsError::Config`] if `base_url` is not an absolute http(s) URL or the
    /// HTTP client cannot be built.
    ///
    /// Release Management calls go to [`DEFAULT_RELEASE_MANAGEMENT_BASE_URL`] until
    /// [`UpstreamApi::with_release_management_base_url`] says otherwise.
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        let base_url = parse_base_url(base_url)?;
        let release_management_base_url = parse_base_url(DEFAULT_RELEASE_MANAGEMENT_BASE_URL)?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| HttpToolsError::Config(format!("build http client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            release_management_base_url,
            token: token.filter(|t| !t.trim().is_empty()),
            timeout,
        })
    }

    /// # Errors
    ///
    /// Returns [`HttpToolsError::Config`] if `base_url` is not an absolute http(s) URL.
    pub fn with_release_management_base_url(mut self, base_url: &str) -> Result<Self> {
        self.release_management_base_url = parse_base_url(base_url)?;
        Ok(self)
    }

    #[must_use]
    pub fn base_url(&self, base: ApiBase) -> &Url {
        match base {
            ApiBase::Core => &self.base_url,
            ApiBase::ReleaseManagement => &self.release_management_base_url,
        }
    }

    /// Execute `request` and return the raw response body.
    ///
    /// # Errors
    ///
    /// Returns [`HttpToolsError::Transport`] for connection/timeout/body errors and
    /// [`HttpToolsError::Status`] for responses with status >= 400.
    pub async fn call(&self, request: &UpstreamRequest) -> Result<String> {
        let url = self.url_for(request.base, &request.path)?;

        let mut builder = self
            .client
            .request(request.method.clone(), url)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .timeout(self.timeout);
        if let Some(token) = &self.token {
            builder = builder.header(reqwest::header::AUTHORIZATION, token);
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_client_error() || status.is_server_error() {
            tracing::debug!(
                method = %request.method,
                path = %request.path,
                status = status.as_u16(),
                "upstream returned error status"
            );
            return Err(HttpToolsError::Status { status, body });
        }
        Ok(body)
    }

    fn url_for(&self, base: ApiBase, path: &str) -> Result<Url> {
        let mut full = self.base_url(base).as_str().trim_end_matches('/').to_string();
        if !path.starts_with('/') {
            full.push('/');
        }
        full.push_str(path);
        Url::parse(&full).map_err(|e| HttpToolsError::InvalidArguments(format!("invalid URL: {e}")))
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw)
        .map_err(|e| HttpToolsError::Config(format!("invalid API base URL '{raw}': {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(HttpToolsError::Config(format!(
            "API base URL must be http(s), got '{}'",
            url.scheme()
        )));
    }
    Ok(url)
}
