//! Client-credentials types
//!
//! Credentials are sourced from configuration, never from literals. The
//! secret halves are redacted from `Debug` output.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{MktoError, Result};

/// Static identifiers for one Marketo subscription
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Subscription host prefix (the Munchkin id, e.g. `123-ABC-456`)
    pub subscription_id: String,
    pub client_id: String,
    pub client_secret: String,
}

impl Credentials {
    pub fn new(
        subscription_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("subscription_id", &self.subscription_id)
            .field("client_id", &"<redacted>")
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Bearer token with its absolute expiry
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn new(token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self { token: token.into(), expires_at }
    }

    /// `true` once `expires_at <= now`
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Value for the `Authorization` header
    #[must_use]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Body of the identity endpoint response
///
/// Every field is optional so that error bodies still deserialize and can be
/// reported instead of being mistaken for a token.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    /// Lifetime in seconds
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
}

impl TokenResponse {
    /// Validate the response shape and compute the absolute expiry.
    ///
    /// # Errors
    /// Returns `MktoError::Auth` if the server reported an error, if
    /// `access_token` / `expires_in` are absent, or if `expires_in` is
    /// negative or too large to represent.
    pub fn into_access_token(self, now: DateTime<Utc>) -> Result<AccessToken> {
        if let Some(error) = self.error {
            let description = self.error_description.unwrap_or_default();
            return Err(MktoError::Auth(format!("identity endpoint returned {error}: {description}")));
        }

        let token = self
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| MktoError::Auth("token response missing access_token".to_string()))?;
        let expires_in = self
            .expires_in
            .ok_or_else(|| MktoError::Auth("token response missing expires_in".to_string()))?;

        let expires_at = (expires_in >= 0)
            .then(|| Duration::try_seconds(expires_in))
            .flatten()
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| {
                MktoError::Auth(format!("token response has invalid expires_in: {expires_in}"))
            })?;

        Ok(AccessToken::new(token, expires_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_response_sets_expiry_relative_to_now() {
        let now = Utc::now();
        let response: TokenResponse =
            serde_json::from_str(r#"{"access_token":"X","expires_in":3600}"#).unwrap();

        let token = response.into_access_token(now).unwrap();
        assert_eq!(token.token, "X");
        assert_eq!(token.expires_at, now + Duration::seconds(3600));
        assert_eq!(token.bearer(), "Bearer X");
    }

    #[test]
    fn token_response_without_token_is_auth_error() {
        let response: TokenResponse = serde_json::from_str(r#"{"expires_in":3600}"#).unwrap();
        let err = response.into_access_token(Utc::now()).unwrap_err();
        assert!(matches!(err, MktoError::Auth(msg) if msg.contains("access_token")));
    }

    #[test]
    fn token_response_without_expiry_is_auth_error() {
        let response: TokenResponse = serde_json::from_str(r#"{"access_token":"X"}"#).unwrap();
        let err = response.into_access_token(Utc::now()).unwrap_err();
        assert!(matches!(err, MktoError::Auth(msg) if msg.contains("expires_in")));
    }

    #[test]
    fn out_of_range_expiry_is_auth_error() {
        for expires_in in [i64::MAX, -5] {
            let response: TokenResponse = serde_json::from_str(&format!(
                r#"{{"access_token":"X","expires_in":{expires_in}}}"#
            ))
            .unwrap();
            let err = response.into_access_token(Utc::now()).unwrap_err();
            assert!(matches!(err, MktoError::Auth(msg) if msg.contains("invalid expires_in")));
        }
    }

    #[test]
    fn zero_expiry_is_accepted() {
        let now = Utc::now();
        let response: TokenResponse =
            serde_json::from_str(r#"{"access_token":"X","expires_in":0}"#).unwrap();
        assert_eq!(response.into_access_token(now).unwrap().expires_at, now);
    }

    #[test]
    fn token_response_error_body_is_reported() {
        let response: TokenResponse = serde_json::from_str(
            r#"{"error":"unauthorized","error_description":"Bad client credentials"}"#,
        )
        .unwrap();
        let err = response.into_access_token(Utc::now()).unwrap_err();
        assert!(err.to_string().contains("Bad client credentials"));
    }

    #[test]
    fn expiry_boundary_counts_as_expired() {
        let now = Utc::now();
        let token = AccessToken::new("X", now);
        assert!(token.is_expired_at(now));
        assert!(!token.is_expired_at(now - Duration::seconds(1)));
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let creds = Credentials::new("123-ABC-456", "my-id", "my-secret");
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("123-ABC-456"));
        assert!(!rendered.contains("my-id"));
        assert!(!rendered.contains("my-secret"));

        let token = AccessToken::new("tok", Utc::now());
        assert!(!format!("{token:?}").contains("\"tok\""));
    }
}
