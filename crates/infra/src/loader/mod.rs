//! Bulk loader for newline-delimited JSON input
//!
//! Reads the whole file, splits it into chunks of at most 300 records and
//! sends one API call per chunk.

pub mod bulk;
pub mod errors;
pub mod reader;

pub use bulk::{BulkLoader, ChunkOutcome, ChunkStatus, LoadSummary};
pub use errors::LoaderError;
pub use reader::{chunk_records, parse_records, read_records};
