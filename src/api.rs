//! HTTP access to the job board API with consistent timeouts and error
//! handling. The session manager only sees the [`Transport`] seam; response
//! bodies are classified by [`decode`] into success, server rejection, or
//! malformed success so each failure mode is its own branch. The transport
//! relies on ambient cookie credentials and never handles bearer tokens.

use crate::{
    config::{join_api_path, AppConfig},
    errors::{AppError, INVALID_RESPONSE_MESSAGE, NETWORK_ERROR_MESSAGE, TIMEOUT_MESSAGE},
    storage::{remove_if_exists, write_private},
    types::ErrorBody,
    APP_USER_AGENT,
};
use reqwest::{
    cookie::{CookieStore, Jar},
    Client, Method,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::{
    fs,
    future::Future,
    io::ErrorKind,
    path::PathBuf,
    sync::Arc,
};
use tracing::{debug, info_span, warn, Instrument};
use url::Url;
use uuid::Uuid;

/// Maximum number of error body characters surfaced to the UI.
const MAX_ERROR_CHARS: usize = 200;
/// Header carrying the per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Raw outcome of a request that reached the server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Request/response boundary used by the session manager and account flows.
///
/// `Err` is reserved for requests that never produced a response; any HTTP
/// status, including errors, comes back as `Ok(ApiResponse)`.
pub trait Transport: Send + Sync {
    fn get(&self, path: &str) -> impl Future<Output = Result<ApiResponse, AppError>> + Send;

    fn post(
        &self,
        path: &str,
        body: Option<Value>,
    ) -> impl Future<Output = Result<ApiResponse, AppError>> + Send;

    /// Absolute URL for an API path, used for full-page navigations.
    ///
    /// # Errors
    /// Returns `AppError::Config` if the URL cannot be built.
    fn resolve(&self, path: &str) -> Result<Url, AppError>;
}

/// Classified response body.
#[derive(Debug)]
pub enum Reply<T> {
    Success(T),
    Rejected { status: u16, message: Option<String> },
    Malformed(String),
}

impl<T> Reply<T> {
    /// Converts into a `Result`, using `fallback` when the server rejected
    /// the request without a usable message.
    ///
    /// # Errors
    /// Returns `AppError::Http` for rejections and `AppError::Parse` for
    /// malformed successes.
    pub fn into_result(self, fallback: &str) -> Result<T, AppError> {
        match self {
            Reply::Success(value) => Ok(value),
            Reply::Rejected { status, message } => Err(AppError::Http {
                status,
                message: message.unwrap_or_else(|| fallback.to_string()),
            }),
            Reply::Malformed(detail) => {
                debug!("malformed response: {detail}");
                Err(AppError::Parse(INVALID_RESPONSE_MESSAGE.to_string()))
            }
        }
    }
}

/// Classifies a response: 2xx bodies are decoded into `T`, anything else is
/// a rejection carrying the server's message when one can be extracted.
pub fn decode<T: DeserializeOwned>(response: &ApiResponse) -> Reply<T> {
    if !response.is_success() {
        return Reply::Rejected {
            status: response.status,
            message: error_message(&response.body),
        };
    }

    match serde_json::from_str::<T>(&response.body) {
        Ok(value) => Reply::Success(value),
        Err(err) => Reply::Malformed(format!("status {}: {err}", response.status)),
    }
}

/// Extracts a user-facing message from an error body: the JSON `message`
/// (or `error`) field, or the sanitized text for non-JSON bodies.
#[must_use]
pub fn error_message(body: &str) -> Option<String> {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => serde_json::from_value::<ErrorBody>(value)
            .ok()
            .and_then(ErrorBody::into_message)
            .map(|message| truncate(&message)),
        Err(_) => sanitize_body(body),
    }
}

/// Trims and truncates non-JSON error bodies; empty bodies yield `None`.
#[must_use]
pub fn sanitize_body(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(truncate(trimmed))
    }
}

fn truncate(value: &str) -> String {
    value.chars().take(MAX_ERROR_CHARS).collect()
}

/// Maps reqwest errors into the generic transport variants. The underlying
/// error is logged, not surfaced.
fn map_request_error(err: &reqwest::Error) -> AppError {
    debug!("request failed: {err}");
    if err.is_timeout() {
        AppError::Timeout(TIMEOUT_MESSAGE.to_string())
    } else {
        AppError::Network(NETWORK_ERROR_MESSAGE.to_string())
    }
}

/// reqwest-backed transport with a cookie jar. When a credentials file is
/// configured the jar is loaded from it and rewritten after every response.
pub struct HttpTransport {
    client: Client,
    base: Url,
    jar: Arc<Jar>,
    credentials_path: Option<PathBuf>,
}

impl HttpTransport {
    /// # Errors
    /// Returns an error if the base URL is invalid or the client cannot be built.
    pub fn new(config: &AppConfig) -> Result<Self, AppError> {
        let base = config.api_base()?;
        let jar = Arc::new(Jar::default());

        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .cookie_provider(Arc::clone(&jar))
            .timeout(config.request_timeout)
            .build()
            .map_err(|err| AppError::Config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            base,
            jar,
            credentials_path: None,
        })
    }

    /// Loads previously saved cookies and keeps `path` in sync afterwards.
    ///
    /// # Errors
    /// Returns `AppError::Storage` if an existing file cannot be read.
    pub fn with_credentials_file(mut self, path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let path = path.into();
        match fs::read_to_string(&path) {
            Ok(content) => {
                let mut restored = 0;
                for cookie in content.split(';').map(str::trim).filter(|c| !c.is_empty()) {
                    self.jar.add_cookie_str(cookie, &self.base);
                    restored += 1;
                }
                debug!(path = %path.display(), restored, "restored session cookies");
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => {
                return Err(AppError::Storage(format!(
                    "Failed to read credentials {}: {err}",
                    path.display()
                )));
            }
        }
        self.credentials_path = Some(path);
        Ok(self)
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Removes the credentials file. The in-memory jar is left as is.
    ///
    /// # Errors
    /// Returns `AppError::Storage` if the file exists but cannot be removed.
    pub fn forget_credentials(&self) -> Result<(), AppError> {
        let Some(path) = &self.credentials_path else {
            return Ok(());
        };
        remove_if_exists(path)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<ApiResponse, AppError> {
        let url = join_api_path(&self.base, path)?;
        let request_id = Uuid::new_v4();
        let span = info_span!(
            "http.request",
            http.method = %method,
            url = %url,
            request_id = %request_id
        );

        let mut builder = self
            .client
            .request(method, url)
            .header(REQUEST_ID_HEADER, request_id.to_string());
        if let Some(body) = body {
            builder = builder.json(&body);
        }

        let response = builder
            .send()
            .instrument(span.clone())
            .await
            .map_err(|err| map_request_error(&err))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .instrument(span.clone())
            .await
            .map_err(|err| map_request_error(&err))?;

        span.in_scope(|| debug!(status, "response received"));
        self.persist_credentials();

        Ok(ApiResponse { status, body })
    }

    fn persist_credentials(&self) {
        let Some(path) = &self.credentials_path else {
            return;
        };

        let result = match self.jar.cookies(&self.base) {
            Some(value) => match value.to_str() {
                Ok(cookies) => write_private(path, cookies),
                Err(err) => Err(AppError::Storage(format!("Invalid cookie header: {err}"))),
            },
            None => remove_if_exists(path),
        };

        if let Err(err) = result {
            warn!("failed to persist session cookies: {err}");
        }
    }
}

impl Transport for HttpTransport {
    async fn get(&self, path: &str) -> Result<ApiResponse, AppError> {
        self.send(Method::GET, path, None).await
    }

    async fn post(&self, path: &str, body: Option<Value>) -> Result<ApiResponse, AppError> {
        self.send(Method::POST, path, body).await
    }

    fn resolve(&self, path: &str) -> Result<Url, AppError> {
        join_api_path(&self.base, path)
    }
}
