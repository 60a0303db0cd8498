//! Configuration structures
//!
//! Loaded by `mktosync_infra::config` from environment variables or a
//! JSON/TOML file.

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_CHUNK_SIZE, DEFAULT_PORT, DEFAULT_TIMEOUT_SECS, VENDOR_DOMAIN};
use crate::errors::{MktoError, Result};
use crate::types::{Credentials, LeadUpsertOptions};

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub loader: LoaderConfig,
}

impl Config {
    /// Check the values serde cannot check on its own.
    ///
    /// # Errors
    /// Returns `MktoError::Config` naming the first invalid field.
    pub fn validate(&self) -> Result<()> {
        self.api.validate()?;
        self.loader.validate()
    }
}

/// REST API connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(flatten)]
    pub credentials: Credentials,
    /// Replaces `https://<subscription_id>.mktorest.com:443` when set
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// Total attempts per request (initial try + retries)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
}

impl ApiConfig {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            base_url: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            max_attempts: default_max_attempts(),
        }
    }

    /// Base URL every request is issued against.
    pub fn base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!(
                "https://{}.{}:{}",
                self.credentials.subscription_id, VENDOR_DOMAIN, DEFAULT_PORT
            ),
        }
    }

    fn validate(&self) -> Result<()> {
        let creds = &self.credentials;
        if creds.subscription_id.trim().is_empty() {
            return Err(MktoError::Config("subscription_id must not be empty".to_string()));
        }
        if creds.client_id.trim().is_empty() {
            return Err(MktoError::Config("client_id must not be empty".to_string()));
        }
        if creds.client_secret.trim().is_empty() {
            return Err(MktoError::Config("client_secret must not be empty".to_string()));
        }
        if self.timeout_seconds == 0 {
            return Err(MktoError::Config("timeout_seconds must be positive".to_string()));
        }
        Ok(())
    }
}

/// Which endpoint the bulk loader feeds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadTarget {
    #[default]
    Activities,
    Leads,
}

impl FromStr for LoadTarget {
    type Err = MktoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "activities" => Ok(Self::Activities),
            "leads" => Ok(Self::Leads),
            other => Err(MktoError::Config(format!("Unknown load target: {other}"))),
        }
    }
}

/// Bulk loader settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// NDJSON input file
    pub input_path: PathBuf,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default)]
    pub target: LoadTarget,
    /// Rename source columns through [`crate::FieldMapping`] before upload
    #[serde(default)]
    pub map_fields: bool,
    /// Only used when `target` is [`LoadTarget::Leads`]
    #[serde(default)]
    pub lead_options: LeadUpsertOptions,
}

impl LoaderConfig {
    pub fn new(input_path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            target: LoadTarget::default(),
            map_fields: false,
            lead_options: LeadUpsertOptions::default(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 || self.chunk_size > DEFAULT_CHUNK_SIZE {
            return Err(MktoError::Config(format!(
                "chunk_size must be between 1 and {DEFAULT_CHUNK_SIZE}, got {}",
                self.chunk_size
            )));
        }
        Ok(())
    }
}

fn default_timeout_seconds() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_max_attempts() -> usize {
    1
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}
