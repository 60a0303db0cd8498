//! # mktosync Infrastructure
//!
//! Everything that touches the network or the filesystem.
//!
//! This crate contains:
//! - The HTTP dispatcher over `reqwest`
//! - Token acquisition and the authenticated API client
//! - The lead and activity calls
//! - The NDJSON bulk loader
//! - Configuration loading from environment and files
//!
//! ## Architecture
//! - Builds on the types in `mktosync-domain`
//! - Contains all "impure" code (I/O, HTTP)

pub mod api;
pub mod config;
pub mod http;
pub mod loader;

// Re-export commonly used items
pub use api::{
    AccessTokenProvider, ApiClient, ApiClientBuilder, ApiCommands, ApiError, ApiErrorCategory,
    CredentialState, TokenAcquirer,
};
pub use http::{ApiResponse, HttpClient, HttpClientBuilder, RequestDescriptor};
pub use loader::{BulkLoader, ChunkOutcome, ChunkStatus, LoadSummary, LoaderError};
