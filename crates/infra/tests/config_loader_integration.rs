//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from files.

use std::io::Write;
use std::path::PathBuf;

use mktosync_domain::{LeadAction, LoadTarget, MktoError};
use mktosync_infra::config;
use tempfile::NamedTempFile;

fn write_config(contents: &str, extension: &str) -> PathBuf {
    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    temp_file.write_all(contents.as_bytes()).expect("Failed to write to temp file");

    let path = temp_file.path().with_extension(extension);
    std::fs::copy(temp_file.path(), &path).expect("Failed to copy file");
    path
}

#[test]
fn test_load_config_from_json_file() {
    let path = write_config(
        r#"{
            "api": {
                "subscription_id": "123-ABC-456",
                "client_id": "json-client",
                "client_secret": "json-secret",
                "base_url": "http://localhost:9000/",
                "timeout_seconds": 15,
                "max_attempts": 3
            },
            "loader": {
                "input_path": "/data/activities.ndjson",
                "chunk_size": 200,
                "target": "activities"
            }
        }"#,
        "json",
    );

    let config = config::load_from_file(Some(path.clone())).expect("json config loads");

    assert_eq!(config.api.credentials.client_id, "json-client");
    assert_eq!(config.api.base_url(), "http://localhost:9000");
    assert_eq!(config.api.timeout_seconds, 15);
    assert_eq!(config.api.max_attempts, 3);
    assert_eq!(config.loader.input_path, PathBuf::from("/data/activities.ndjson"));
    assert_eq!(config.loader.chunk_size, 200);
    assert_eq!(config.loader.target, LoadTarget::Activities);

    std::fs::remove_file(path).ok();
}

#[test]
fn test_load_config_from_toml_file() {
    let path = write_config(
        r#"
[api]
subscription_id = "123-ABC-456"
client_id = "toml-client"
client_secret = "toml-secret"

[loader]
input_path = "leads.ndjson"
target = "leads"
map_fields = true

[loader.lead_options]
action = "createOrUpdate"
lookup_field = "email"
"#,
        "toml",
    );

    let config = config::load_from_file(Some(path.clone())).expect("toml config loads");

    assert_eq!(config.api.base_url(), "https://123-ABC-456.mktorest.com:443");
    assert_eq!(config.loader.target, LoadTarget::Leads);
    assert!(config.loader.map_fields);
    assert_eq!(config.loader.lead_options.action, Some(LeadAction::CreateOrUpdate));
    assert_eq!(config.loader.lead_options.lookup_field.as_deref(), Some("email"));
    assert_eq!(config.loader.chunk_size, 300);

    std::fs::remove_file(path).ok();
}

#[test]
fn test_load_config_with_minimal_fields() {
    let path = write_config(
        r#"{
            "api": {"subscription_id": "s", "client_id": "c", "client_secret": "x"},
            "loader": {"input_path": "in.json"}
        }"#,
        "json",
    );

    let config = config::load_from_file(Some(path.clone())).expect("minimal config loads");

    assert_eq!(config.api.base_url, None);
    assert_eq!(config.api.timeout_seconds, 30);
    assert_eq!(config.api.max_attempts, 1);
    assert!(!config.loader.map_fields);
    assert_eq!(config.loader.lead_options.action, None);

    std::fs::remove_file(path).ok();
}

#[test]
fn test_oversized_chunk_is_rejected() {
    let path = write_config(
        r#"{
            "api": {"subscription_id": "s", "client_id": "c", "client_secret": "x"},
            "loader": {"input_path": "in.json", "chunk_size": 301}
        }"#,
        "json",
    );

    match config::load_from_file(Some(path.clone())) {
        Err(MktoError::Config(msg)) => assert!(msg.contains("chunk_size")),
        other => panic!("Expected Config error, got {other:?}"),
    }

    std::fs::remove_file(path).ok();
}

#[test]
fn test_load_config_from_nonexistent_file() {
    let result = config::load_from_file(Some("/nonexistent/path/config.json".into()));

    match result {
        Err(MktoError::Config(msg)) => {
            assert!(msg.contains("not found"), "Error message should mention 'not found'");
        }
        _ => panic!("Expected Config error"),
    }
}

#[test]
fn test_load_config_with_invalid_format() {
    let path = write_config(r#"{ "this is": "not valid" "#, "json");

    match config::load_from_file(Some(path.clone())) {
        Err(MktoError::Config(msg)) => {
            assert!(msg.contains("Invalid JSON"), "Error message should mention invalid JSON");
        }
        _ => panic!("Expected Config error"),
    }

    std::fs::remove_file(path).ok();
}
