//! Chunked bulk upload with per-chunk results
//!
//! Every chunk is spawned as its own task before any response is awaited, so
//! all chunk requests are in flight together and complete in any order. The
//! join handles are then drained in chunk order to build the summary.

use std::path::Path;
use std::sync::Arc;

use mktosync_domain::constants::DEFAULT_CHUNK_SIZE;
use mktosync_domain::{FieldMapping, LeadUpsertOptions, LoadTarget, LoaderConfig, Record};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use super::errors::LoaderError;
use super::reader::{chunk_records, read_records};
use crate::api::{ApiCommands, ApiError};

/// Type alias for task list to avoid complexity warnings
type TaskList = Vec<(usize, usize, JoinHandle<Result<String, ApiError>>)>;

/// Endpoint a chunk is sent to
#[derive(Debug, Clone)]
enum ChunkCall {
    Activities,
    Leads(LeadUpsertOptions),
}

/// How one chunk ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChunkStatus {
    /// The API accepted the request; `response` is the raw body
    Sent { response: String },
    Failed { error: String, retryable: bool },
}

/// Result of a single chunk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkOutcome {
    /// 0-based chunk position in the input
    pub index: usize,
    /// Number of records in the chunk
    pub records: usize,
    pub status: ChunkStatus,
}

impl ChunkOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self.status, ChunkStatus::Sent { .. })
    }
}

/// Result of a whole load
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadSummary {
    pub records: usize,
    pub sent: usize,
    pub failed: usize,
    /// One entry per chunk, in chunk order
    pub outcomes: Vec<ChunkOutcome>,
}

impl LoadSummary {
    pub fn chunks(&self) -> usize {
        self.outcomes.len()
    }

    /// `true` when no chunk failed
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// NDJSON bulk loader
pub struct BulkLoader {
    commands: Arc<ApiCommands>,
    chunk_size: usize,
    mapping: Option<FieldMapping>,
    lead_options: LeadUpsertOptions,
}

impl BulkLoader {
    /// Create a loader sending chunks of [`DEFAULT_CHUNK_SIZE`] records
    pub fn new(commands: Arc<ApiCommands>) -> Self {
        Self {
            commands,
            chunk_size: DEFAULT_CHUNK_SIZE,
            mapping: None,
            lead_options: LeadUpsertOptions::default(),
        }
    }

    pub fn from_config(commands: Arc<ApiCommands>, config: &LoaderConfig) -> Self {
        let loader = Self::new(commands)
            .with_chunk_size(config.chunk_size)
            .with_lead_options(config.lead_options.clone());
        if config.map_fields {
            loader.with_field_mapping(FieldMapping::default())
        } else {
            loader
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Rename record fields before upload
    pub fn with_field_mapping(mut self, mapping: FieldMapping) -> Self {
        self.mapping = Some(mapping);
        self
    }

    /// Options sent with every lead upsert chunk
    pub fn with_lead_options(mut self, options: LeadUpsertOptions) -> Self {
        self.lead_options = options;
        self
    }

    /// Load `path` into the endpoint selected by `target`
    pub async fn run(&self, path: &Path, target: LoadTarget) -> Result<LoadSummary, LoaderError> {
        match target {
            LoadTarget::Activities => self.load_activities(path).await,
            LoadTarget::Leads => self.load_leads(path).await,
        }
    }

    /// One `add_lead_activities` call per chunk
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or a line is malformed; in
    /// that case no chunk has been sent
    #[instrument(skip(self, path), fields(path = %path.display()))]
    pub async fn load_activities(&self, path: &Path) -> Result<LoadSummary, LoaderError> {
        let records = self.prepare(path)?;
        Ok(self.dispatch(records, ChunkCall::Activities).await)
    }

    /// One `create_update_leads` call per chunk, with the configured options
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or a line is malformed; in
    /// that case no chunk has been sent
    #[instrument(skip(self, path), fields(path = %path.display()))]
    pub async fn load_leads(&self, path: &Path) -> Result<LoadSummary, LoaderError> {
        let records = self.prepare(path)?;
        Ok(self.dispatch(records, ChunkCall::Leads(self.lead_options.clone())).await)
    }

    fn prepare(&self, path: &Path) -> Result<Vec<Record>, LoaderError> {
        let records = read_records(path)?;
        match &self.mapping {
            Some(mapping) => records
                .into_iter()
                .enumerate()
                .map(|(index, record)| {
                    mapping.map_record(record).map_err(|source| LoaderError::Mapping { index, source })
                })
                .collect(),
            None => Ok(records),
        }
    }

    async fn dispatch(&self, records: Vec<Record>, call: ChunkCall) -> LoadSummary {
        let total = records.len();
        if total == 0 {
            info!("No records to load");
            return LoadSummary::default();
        }

        let chunks = chunk_records(records, self.chunk_size);
        debug!(records = total, chunks = chunks.len(), "Dispatching chunks");

        let mut tasks: TaskList = Vec::with_capacity(chunks.len());
        for (index, chunk) in chunks.into_iter().enumerate() {
            let commands = Arc::clone(&self.commands);
            let call = call.clone();
            let size = chunk.len();
            let handle = tokio::spawn(async move {
                match call {
                    ChunkCall::Activities => commands.add_lead_activities(chunk).await,
                    ChunkCall::Leads(options) => {
                        commands.create_update_leads_with(chunk, options).await
                    }
                }
            });
            tasks.push((index, size, handle));
        }

        let summary = Self::drain_tasks(tasks, total).await;

        if summary.failed > 0 {
            warn!(sent = summary.sent, failed = summary.failed, "Load completed with errors");
        } else {
            info!(sent = summary.sent, records = total, "Load successful");
        }

        summary
    }

    async fn drain_tasks(tasks: TaskList, records: usize) -> LoadSummary {
        let mut summary = LoadSummary { records, ..LoadSummary::default() };

        for (index, size, task) in tasks {
            let status = match task.await {
                Ok(Ok(response)) => ChunkStatus::Sent { response },
                Ok(Err(err)) => {
                    warn!(chunk = index, error = %err, "Chunk failed");
                    ChunkStatus::Failed { error: err.to_string(), retryable: err.should_retry() }
                }
                Err(join_err) => ChunkStatus::Failed {
                    error: format!("Task join error: {}", join_err),
                    retryable: false,
                },
            };

            match status {
                ChunkStatus::Sent { .. } => summary.sent += 1,
                ChunkStatus::Failed { .. } => summary.failed += 1,
            }
            summary.outcomes.push(ChunkOutcome { index, records: size, status });
        }

        summary
    }
}
