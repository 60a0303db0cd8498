//! Authenticated API client
//!
//! Decorates every dispatcher call with the current bearer token and the
//! content-type header.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use mktosync_domain::constants::{AUTHORIZATION_HEADER, CONTENT_TYPE_HEADER};
use mktosync_domain::ApiConfig;
use tracing::{debug, instrument};

use super::auth::{AccessTokenProvider, CredentialState, TokenAcquirer};
use super::errors::ApiError;
use crate::http::{ApiResponse, HttpClient, RequestDescriptor};

/// API client that injects the bearer token into each request
pub struct ApiClient {
    http: Arc<HttpClient>,
    auth: Arc<dyn AccessTokenProvider>,
}

impl ApiClient {
    /// Create a new API client over an existing dispatcher
    pub fn new(http: Arc<HttpClient>, auth: Arc<dyn AccessTokenProvider>) -> Self {
        Self { http, auth }
    }

    /// Create a builder for fluent configuration
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Issue an authenticated call.
    ///
    /// Sets `Authorization: Bearer <token>` and `Content-type` on the
    /// descriptor's headers, using the token that is valid at dispatch time.
    ///
    /// # Returns
    ///
    /// The buffered response of a 2xx call
    ///
    /// # Errors
    ///
    /// Returns error if no token can be obtained, the transport fails, or the
    /// API answers with a non-success status
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.redacted_path()))]
    pub async fn generic_api_call(
        &self,
        mut request: RequestDescriptor,
    ) -> Result<ApiResponse, ApiError> {
        let token = self.auth.access_token().await?;
        let content_type = request.effective_content_type().to_string();
        authorize_headers(&mut request.headers, &token, &content_type);

        let response = self.http.generic_request(&request).await?;
        if !response.is_success() {
            return Err(ApiError::from_status(
                response.status,
                request.redacted_path(),
                &response.body,
            ));
        }

        debug!(status = response.status, "API call successful");
        Ok(response)
    }
}

/// Merge the auth and content-type headers into `headers`, replacing any
/// existing values under the same names.
pub fn authorize_headers(headers: &mut BTreeMap<String, String>, token: &str, content_type: &str) {
    headers.retain(|name, _| {
        !name.eq_ignore_ascii_case(AUTHORIZATION_HEADER)
            && !name.eq_ignore_ascii_case(CONTENT_TYPE_HEADER)
    });
    headers.insert(AUTHORIZATION_HEADER.to_string(), format!("Bearer {}", token));
    headers.insert(CONTENT_TYPE_HEADER.to_string(), content_type.to_string());
}

/// Builder for API client
#[derive(Default)]
pub struct ApiClientBuilder {
    config: Option<ApiConfig>,
    auth: Option<Arc<dyn AccessTokenProvider>>,
}

impl ApiClientBuilder {
    /// Set the API configuration
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Override the token provider (defaults to a [`TokenAcquirer`] over the
    /// configured credentials)
    pub fn auth(mut self, auth: Arc<dyn AccessTokenProvider>) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Build the API client
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is missing or the HTTP client
    /// cannot be created
    pub fn build(self) -> Result<ApiClient, ApiError> {
        let config =
            self.config.ok_or_else(|| ApiError::Config("API config not set".to_string()))?;

        let http = HttpClient::builder(config.base_url())
            .timeout(Duration::from_secs(config.timeout_seconds))
            .max_attempts(config.max_attempts)
            .user_agent(concat!("mktosync/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let http = Arc::new(http);

        let auth = match self.auth {
            Some(auth) => auth,
            None => {
                let state = Arc::new(CredentialState::new(config.credentials.clone()));
                Arc::new(TokenAcquirer::new(Arc::clone(&http), state))
            }
        };

        Ok(ApiClient::new(http, auth))
    }
}
