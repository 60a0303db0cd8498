//! HTTP transport
//!
//! One request per call against a fixed base URL, with the full response
//! body buffered before returning.

pub mod client;

pub use client::{ApiResponse, HttpClient, HttpClientBuilder, RequestDescriptor};
