//! Client-credentials authentication
//!
//! `CredentialState` holds the static credentials plus the current bearer
//! token. `TokenAcquirer` fills it from the identity endpoint and, as an
//! [`AccessTokenProvider`], re-acquires the token before a call whenever the
//! stored one has expired.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use mktosync_domain::constants::TOKEN_PATH;
use mktosync_domain::{AccessToken, Credentials, TokenResponse};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument};
use urlencoding::encode;

use super::errors::ApiError;
use crate::http::{HttpClient, RequestDescriptor};

/// Trait for providing access tokens
///
/// This trait allows dependency injection and testing with mock providers.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Get a token that is valid at the time of the call
    async fn access_token(&self) -> Result<String, ApiError>;
}

/// Credentials and the mutable bearer token, shared by every call
#[derive(Debug)]
pub struct CredentialState {
    credentials: Credentials,
    token: RwLock<Option<AccessToken>>,
}

impl CredentialState {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials, token: RwLock::new(None) }
    }

    /// Seed the state with an already-issued token.
    pub fn with_token(credentials: Credentials, token: AccessToken) -> Self {
        Self { credentials, token: RwLock::new(Some(token)) }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub async fn current_token(&self) -> Option<AccessToken> {
        self.token.read().await.clone()
    }

    pub async fn store(&self, token: AccessToken) {
        *self.token.write().await = Some(token);
    }
}

/// Issues client-credentials token requests
pub struct TokenAcquirer {
    http: Arc<HttpClient>,
    state: Arc<CredentialState>,
    refresh_lock: Mutex<()>,
}

impl TokenAcquirer {
    pub fn new(http: Arc<HttpClient>, state: Arc<CredentialState>) -> Self {
        Self { http, state, refresh_lock: Mutex::new(()) }
    }

    pub fn state(&self) -> &Arc<CredentialState> {
        &self.state
    }

    /// `GET /identity/oauth/token?grant_type=client_credentials&client_id=..&client_secret=..`
    pub fn token_request(credentials: &Credentials) -> RequestDescriptor {
        RequestDescriptor::get(format!(
            "{}?grant_type=client_credentials&client_id={}&client_secret={}",
            TOKEN_PATH,
            encode(&credentials.client_id),
            encode(&credentials.client_secret)
        ))
    }

    /// Request a new token and store it in the credential state.
    ///
    /// # Errors
    /// Returns `ApiError::Auth` if the identity endpoint answers with a
    /// non-success status or a body without `access_token`/`expires_in`;
    /// the stored token is left untouched in that case. Transport failures
    /// are returned as-is.
    #[instrument(skip(self), fields(subscription = %self.state.credentials().subscription_id))]
    pub async fn generate_access_token(&self) -> Result<AccessToken, ApiError> {
        let request = Self::token_request(self.state.credentials());
        let response = self.http.generic_request(&request).await?;

        if !response.is_success() {
            return Err(ApiError::Auth(format!(
                "identity endpoint returned status {}: {}",
                response.status, response.body
            )));
        }

        let parsed: TokenResponse = serde_json::from_str(&response.body)
            .map_err(|e| ApiError::Auth(format!("identity endpoint returned invalid JSON: {}", e)))?;
        let token = parsed.into_access_token(Utc::now())?;

        self.state.store(token.clone()).await;
        info!(expires_at = %token.expires_at, "Access token acquired");
        Ok(token)
    }

    /// Current token, acquiring a new one first when none is stored or the
    /// stored one has expired. Concurrent callers share one acquisition.
    pub async fn valid_token(&self) -> Result<AccessToken, ApiError> {
        if let Some(token) = self.unexpired_token().await {
            return Ok(token);
        }

        let _guard = self.refresh_lock.lock().await;
        if let Some(token) = self.unexpired_token().await {
            return Ok(token);
        }

        debug!("Access token missing or expired, acquiring a new one");
        self.generate_access_token().await
    }

    async fn unexpired_token(&self) -> Option<AccessToken> {
        self.state.current_token().await.filter(|token| !token.is_expired())
    }
}

#[async_trait]
impl AccessTokenProvider for TokenAcquirer {
    async fn access_token(&self) -> Result<String, ApiError> {
        Ok(self.valid_token().await?.token)
    }
}
