//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `MKTO_SUBSCRIPTION_ID`: Subscription host prefix (Munchkin id)
//! - `MKTO_CLIENT_ID`: API client id
//! - `MKTO_CLIENT_SECRET`: API client secret
//! - `MKTO_INPUT_PATH`: NDJSON input file
//! - `MKTO_BASE_URL`: Replaces the `https://<id>.mktorest.com:443` host (optional)
//! - `MKTO_TIMEOUT_SECS`: Per-request timeout (optional)
//! - `MKTO_MAX_ATTEMPTS`: Attempts per request, initial try included (optional)
//! - `MKTO_CHUNK_SIZE`: Records per call, at most 300 (optional)
//! - `MKTO_LOAD_TARGET`: `activities` or `leads` (optional)
//! - `MKTO_MAP_FIELDS`: Rename source columns before upload (optional)
//! - `MKTO_LEAD_ACTION`, `MKTO_LOOKUP_FIELD`, `MKTO_ASYNC_PROCESSING`,
//!   `MKTO_PARTITION_NAME`: Lead upsert options (optional)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./mktosync.json` or `./mktosync.toml` (current working directory)
//! 2. `./config.json` or `./config.toml` (current working directory)
//! 3. The same names next to the executable

use std::path::{Path, PathBuf};
use std::str::FromStr;

use mktosync_domain::{
    ApiConfig, Config, Credentials, LeadAction, LeadUpsertOptions, LoadTarget, LoaderConfig,
    MktoError, Result,
};

const FILE_NAMES: &[&str] = &["mktosync.json", "mktosync.toml", "config.json", "config.toml"];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `MktoError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing or invalid
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `MktoError::Config` if required variables are missing
/// or have invalid values.
pub fn load_from_env() -> Result<Config> {
    let credentials = Credentials::new(
        env_var("MKTO_SUBSCRIPTION_ID")?,
        env_var("MKTO_CLIENT_ID")?,
        env_var("MKTO_CLIENT_SECRET")?,
    );
    let input_path = env_var("MKTO_INPUT_PATH")?;

    let mut api = ApiConfig::new(credentials);
    api.base_url = std::env::var("MKTO_BASE_URL").ok().filter(|s| !s.trim().is_empty());
    if let Some(timeout) = env_parse::<u64>("MKTO_TIMEOUT_SECS")? {
        api.timeout_seconds = timeout;
    }
    if let Some(attempts) = env_parse::<usize>("MKTO_MAX_ATTEMPTS")? {
        api.max_attempts = attempts;
    }

    let mut loader = LoaderConfig::new(input_path);
    if let Some(chunk_size) = env_parse::<usize>("MKTO_CHUNK_SIZE")? {
        loader.chunk_size = chunk_size;
    }
    if let Some(target) = env_parse::<LoadTarget>("MKTO_LOAD_TARGET")? {
        loader.target = target;
    }
    loader.map_fields = env_bool("MKTO_MAP_FIELDS", false)?;
    loader.lead_options = LeadUpsertOptions {
        action: std::env::var("MKTO_LEAD_ACTION")
            .ok()
            .map(|s| parse_lead_action(&s))
            .transpose()?,
        lookup_field: std::env::var("MKTO_LOOKUP_FIELD").ok(),
        async_processing: std::env::var("MKTO_ASYNC_PROCESSING")
            .ok()
            .map(|s| parse_bool("MKTO_ASYNC_PROCESSING", &s))
            .transpose()?,
        partition_name: std::env::var("MKTO_PARTITION_NAME").ok(),
    };

    let config = Config { api, loader };
    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `MktoError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(MktoError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            MktoError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| MktoError::Config(format!("Failed to read config file: {}", e)))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| MktoError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| MktoError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(MktoError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe the working directory, then the executable's directory, for a
/// config file.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd);
    }
    if let Some(exe_dir) =
        std::env::current_exe().ok().and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        dirs.push(exe_dir);
    }

    dirs.iter()
        .flat_map(|dir| FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

/// Get required environment variable
///
/// # Errors
/// Returns `MktoError::Config` if the variable is not set.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| MktoError::Config(format!("Missing required environment variable: {}", key)))
}

/// Parse an optional environment variable
///
/// # Errors
/// Returns `MktoError::Config` if the variable is set but does not parse.
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| MktoError::Config(format!("Invalid value for {}: {}", key, e))),
        Err(_) => Ok(None),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
///
/// # Errors
/// Returns `MktoError::Config` if the variable is set to anything else.
fn env_bool(key: &str, default: bool) -> Result<bool> {
    match std::env::var(key) {
        Ok(raw) => parse_bool(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(MktoError::Config(format!("Invalid boolean for {}: {}", key, other))),
    }
}

fn parse_lead_action(raw: &str) -> Result<LeadAction> {
    serde_json::from_value(serde_json::Value::String(raw.trim().to_string()))
        .map_err(|_| MktoError::Config(format!("Invalid lead action: {}", raw)))
}
