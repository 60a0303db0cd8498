//! # mktosync Domain
//!
//! Domain types and models for the Marketo sync client.
//!
//! This crate contains:
//! - Credentials and access token types
//! - Request payloads for the lead and activity endpoints
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Field mapping for source records
//!
//! ## Architecture
//! - No dependencies on other mktosync crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
pub use utils::field_mapper::FieldMapping;
