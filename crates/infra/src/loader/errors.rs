//! Loader-specific error types

use std::path::PathBuf;

use mktosync_domain::MktoError;
use thiserror::Error;

/// Failures that abort a load before any chunk is sent
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Line {line} is not valid JSON: {source}")]
    Parse {
        /// 1-based line number in the input file
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Record {index} could not be mapped: {source}")]
    Mapping {
        /// 0-based position among parsed records
        index: usize,
        #[source]
        source: MktoError,
    },
}
