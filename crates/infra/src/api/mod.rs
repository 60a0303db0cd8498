//! Marketo REST API client
//!
//! Handles client-credentials authentication, bearer-token injection and the
//! lead/activity calls used by the bulk loader.
//!
//! # Architecture
//!
//! - `HttpClient` dispatches one request per call and buffers the body
//! - `TokenAcquirer` owns the credential state and refreshes expired tokens
//!   before each call
//! - `ApiClient` adds the bearer token and content type
//! - `ApiCommands` builds the endpoint-specific payloads

pub mod auth;
pub mod client;
pub mod commands;
pub mod errors;

pub use auth::{AccessTokenProvider, CredentialState, TokenAcquirer};
pub use client::{ApiClient, ApiClientBuilder};
pub use commands::ApiCommands;
pub use errors::{ApiError, ApiErrorCategory};
