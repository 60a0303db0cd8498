//! Request payloads for the lead and activity endpoints
//!
//! Records are opaque JSON values; the remote API is the only judge of their
//! shape.

use serde::{Deserialize, Serialize};

/// One lead or activity record as read from input
pub type Record = serde_json::Value;

/// Upsert mode for `POST /rest/v1/leads.json`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LeadAction {
    CreateOnly,
    UpdateOnly,
    CreateOrUpdate,
    CreateDuplicate,
}

/// Optional knobs of a lead upsert, each sent only when set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadUpsertOptions {
    #[serde(default)]
    pub action: Option<LeadAction>,
    #[serde(default)]
    pub lookup_field: Option<String>,
    #[serde(default)]
    pub async_processing: Option<bool>,
    #[serde(default)]
    pub partition_name: Option<String>,
}

/// Body of `POST /rest/v1/leads.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUpdateLeadsRequest {
    pub input: Vec<Record>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<LeadAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lookup_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub async_processing: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partition_name: Option<String>,
}

impl CreateUpdateLeadsRequest {
    pub fn new(input: Vec<Record>, options: LeadUpsertOptions) -> Self {
        Self {
            input,
            action: options.action,
            lookup_field: options.lookup_field,
            async_processing: options.async_processing,
            partition_name: options.partition_name,
        }
    }
}

/// Body of `POST /rest/v1/activities/external.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddActivitiesRequest {
    pub input: Vec<Record>,
}
