//! Application constants
//!
//! Centralized location for the vendor endpoints and loader defaults.

// Host template: https://<subscription_id>.<VENDOR_DOMAIN>:<DEFAULT_PORT>
pub const VENDOR_DOMAIN: &str = "mktorest.com";
pub const DEFAULT_PORT: u16 = 443;

// Endpoints
pub const TOKEN_PATH: &str = "/identity/oauth/token";
pub const LEADS_PATH: &str = "/rest/v1/leads.json";
pub const ACTIVITIES_EXTERNAL_PATH: &str = "/rest/v1/activities/external.json";

// Headers
pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const AUTHORIZATION_HEADER: &str = "Authorization";
pub const CONTENT_TYPE_HEADER: &str = "Content-type";

// Loader
pub const DEFAULT_CHUNK_SIZE: usize = 300;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
