//! Request dispatcher over `reqwest`
//!
//! Response bodies are never logged at this layer: token responses pass
//! through it.

use std::collections::BTreeMap;
use std::time::Duration;

use mktosync_domain::constants::{CONTENT_TYPE_JSON, DEFAULT_TIMEOUT_SECS};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client as ReqwestClient, Method};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::api::errors::ApiError;

/// One outbound call: everything except the host, which belongs to the
/// client.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub path: String,
    pub method: Method,
    pub content_type: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub payload: Option<Value>,
}

impl RequestDescriptor {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method,
            content_type: None,
            headers: BTreeMap::new(),
            payload: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Content type sent with the request, `application/json` when unset.
    pub fn effective_content_type(&self) -> &str {
        self.content_type.as_deref().unwrap_or(CONTENT_TYPE_JSON)
    }

    /// Body sent with the request, `{}` when unset.
    pub fn effective_payload(&self) -> Value {
        self.payload.clone().unwrap_or_else(|| Value::Object(serde_json::Map::new()))
    }

    /// Path without the query string, safe to log.
    pub fn redacted_path(&self) -> &str {
        self.path.split('?').next().unwrap_or_default()
    }
}

/// Fully buffered response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Request dispatcher bound to one API host.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    base_url: String,
    timeout: Duration,
    max_attempts: usize,
    base_backoff: Duration,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder(base_url: impl Into<String>) -> HttpClientBuilder {
        HttpClientBuilder::new(base_url)
    }

    /// Issue one request and buffer the whole response body.
    ///
    /// The JSON payload is always written as the body, GET included. Non-2xx
    /// statuses are returned as responses, not errors; callers decide what
    /// they mean.
    ///
    /// # Errors
    /// Returns `ApiError::Network` or `ApiError::Timeout` on transport
    /// failure, `ApiError::Client` if the descriptor cannot be encoded.
    pub async fn generic_request(
        &self,
        descriptor: &RequestDescriptor,
    ) -> Result<ApiResponse, ApiError> {
        let url = format!("{}{}", self.base_url, descriptor.path);
        let headers = build_headers(descriptor)?;
        let body = serde_json::to_vec(&descriptor.effective_payload())
            .map_err(|e| ApiError::Client(format!("Failed to serialize body: {}", e)))?;

        let method = descriptor.method.clone();
        let path = descriptor.redacted_path();
        let attempts = self.max_attempts.max(1);

        for attempt in 0..attempts {
            debug!(attempt = attempt + 1, %method, path, "sending HTTP request");

            let request = self
                .client
                .request(method.clone(), &url)
                .headers(headers.clone())
                .body(body.clone());

            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    info!(attempt = attempt + 1, %method, path, status = status.as_u16(), "received HTTP response");

                    if status.is_server_error() && attempt + 1 < attempts {
                        self.sleep_with_backoff(attempt + 1).await;
                        continue;
                    }

                    let body = response.text().await.map_err(|err| self.map_transport_error(&err))?;

                    return Ok(ApiResponse { status: status.as_u16(), body });
                }
                Err(err) => {
                    warn!(attempt = attempt + 1, %method, path, error = %err, "problem with request");

                    if attempt + 1 < attempts && should_retry_error(&err) {
                        self.sleep_with_backoff(attempt + 1).await;
                        continue;
                    }

                    return Err(self.map_transport_error(&err));
                }
            }
        }

        Err(ApiError::Network("http client exhausted retries without producing a result".into()))
    }

    fn map_transport_error(&self, err: &reqwest::Error) -> ApiError {
        if err.is_timeout() {
            ApiError::Timeout(self.timeout)
        } else {
            ApiError::Network(format!("http request failed: {}", err))
        }
    }

    fn backoff_delay(&self, retry_number: usize) -> Duration {
        let shift = retry_number.saturating_sub(1).min(8) as u32;
        let multiplier = 1u32 << shift;
        self.base_backoff.saturating_mul(multiplier)
    }

    async fn sleep_with_backoff(&self, retry_number: usize) {
        let delay = self.backoff_delay(retry_number);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    base_url: String,
    timeout: Duration,
    max_attempts: usize,
    base_backoff: Duration,
    user_agent: Option<String>,
}

impl HttpClientBuilder {
    fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_attempts: 1,
            base_backoff: Duration::from_millis(200),
            user_agent: None,
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configure the total number of attempts (initial try + retries).
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.base_backoff = backoff;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn build(self) -> Result<HttpClient, ApiError> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout).no_proxy();

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        let client = builder
            .build()
            .map_err(|e| ApiError::Config(format!("Failed to build HttpClient: {}", e)))?;

        Ok(HttpClient {
            client,
            base_url: self.base_url,
            timeout: self.timeout,
            max_attempts: self.max_attempts.max(1),
            base_backoff: self.base_backoff,
        })
    }
}

/// Content type first, then caller headers; a caller `Content-type` replaces
/// the default instead of adding a second value.
fn build_headers(descriptor: &RequestDescriptor) -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, header_value(descriptor.effective_content_type())?);

    for (name, value) in &descriptor.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ApiError::Client(format!("Invalid header name '{}': {}", name, e)))?;
        headers.insert(name, header_value(value)?);
    }

    Ok(headers)
}

fn header_value(value: &str) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(value)
        .map_err(|e| ApiError::Client(format!("Invalid header value: {}", e)))
}

fn should_retry_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_request() || err.is_connect()
}
