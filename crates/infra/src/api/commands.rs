//! Marketo REST calls
//!
//! Each call builds a [`RequestDescriptor`] (path, method, payload) with a
//! pure function and sends it through [`ApiClient`]. Response bodies are
//! logged and handed back verbatim; this layer does not interpret them.

use std::sync::Arc;

use mktosync_domain::constants::{ACTIVITIES_EXTERNAL_PATH, CONTENT_TYPE_JSON, LEADS_PATH};
use mktosync_domain::{
    AddActivitiesRequest, CreateUpdateLeadsRequest, LeadAction, LeadUpsertOptions, Record,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, instrument};
use urlencoding::encode;

use super::client::ApiClient;
use super::errors::ApiError;
use crate::http::RequestDescriptor;

/// `POST /rest/v1/leads.json` with `{input, action?, lookupField?, asyncProcessing?, partitionName?}`
pub fn create_update_leads_request(
    leads: Vec<Record>,
    options: LeadUpsertOptions,
) -> Result<RequestDescriptor, ApiError> {
    let payload = CreateUpdateLeadsRequest::new(leads, options);
    Ok(RequestDescriptor::post(LEADS_PATH).payload(to_payload(&payload)?))
}

/// `POST /rest/v1/activities/external.json` with `{input}`
pub fn add_lead_activities_request(activities: Vec<Record>) -> Result<RequestDescriptor, ApiError> {
    let payload = AddActivitiesRequest { input: activities };
    Ok(RequestDescriptor::post(ACTIVITIES_EXTERNAL_PATH)
        .content_type(CONTENT_TYPE_JSON)
        .payload(to_payload(&payload)?))
}

pub fn get_lead_by_id_request(id: &str) -> RequestDescriptor {
    RequestDescriptor::get(format!("/rest/v1/lead/{}.json", encode(id)))
}

/// `POST /rest/v1/leads/<winner>/merge.json?leadIds=<losers>`
pub fn merge_leads_request(winner: &str, losers: &[String]) -> RequestDescriptor {
    let lead_ids = losers.iter().map(|id| encode(id).into_owned()).collect::<Vec<_>>().join(",");
    RequestDescriptor::post(format!("/rest/v1/leads/{}/merge.json?leadIds={}", encode(winner), lead_ids))
}

pub fn get_email_by_id_request(id: &str) -> RequestDescriptor {
    RequestDescriptor::get(format!("/rest/asset/v1/email/{}.json", encode(id)))
}

fn to_payload<T: Serialize>(payload: &T) -> Result<Value, ApiError> {
    serde_json::to_value(payload)
        .map_err(|e| ApiError::Client(format!("Failed to serialize body: {}", e)))
}

/// API commands for lead and activity operations
pub struct ApiCommands {
    client: Arc<ApiClient>,
}

impl ApiCommands {
    /// Create a new commands instance
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    // === Lead Operations ===

    /// Create or update a batch of leads
    ///
    /// Each optional argument is sent only when `Some`; no cross-field
    /// validation is done.
    ///
    /// # Returns
    ///
    /// Raw response body
    ///
    /// # Errors
    ///
    /// Returns error if API request fails
    #[instrument(skip(self, leads), fields(count = leads.len()))]
    pub async fn create_update_leads(
        &self,
        leads: Vec<Record>,
        action: Option<LeadAction>,
        lookup_field: Option<String>,
        is_async: Option<bool>,
        partition: Option<String>,
    ) -> Result<String, ApiError> {
        let options = LeadUpsertOptions {
            action,
            lookup_field,
            async_processing: is_async,
            partition_name: partition,
        };
        self.create_update_leads_with(leads, options).await
    }

    /// [`Self::create_update_leads`] with the options already bundled
    pub async fn create_update_leads_with(
        &self,
        leads: Vec<Record>,
        options: LeadUpsertOptions,
    ) -> Result<String, ApiError> {
        self.send(create_update_leads_request(leads, options)?).await
    }

    /// Get a lead by ID
    #[instrument(skip(self))]
    pub async fn get_lead_by_id(&self, id: &str) -> Result<String, ApiError> {
        self.send(get_lead_by_id_request(id)).await
    }

    /// Merge `losers` into `winner`; `winner` keeps its values on conflict
    #[instrument(skip(self))]
    pub async fn merge_leads(&self, winner: &str, losers: &[String]) -> Result<String, ApiError> {
        if losers.is_empty() {
            return Err(ApiError::Client("merge needs at least one losing lead".to_string()));
        }
        self.send(merge_leads_request(winner, losers)).await
    }

    // === Activity Operations ===

    /// Add a batch of custom activities
    ///
    /// # Returns
    ///
    /// Raw response body
    ///
    /// # Errors
    ///
    /// Returns error if API request fails
    #[instrument(skip(self, activities), fields(count = activities.len()))]
    pub async fn add_lead_activities(&self, activities: Vec<Record>) -> Result<String, ApiError> {
        self.send(add_lead_activities_request(activities)?).await
    }

    // === Asset Operations ===

    /// Get an email asset by ID
    #[instrument(skip(self))]
    pub async fn get_email_by_id(&self, id: &str) -> Result<String, ApiError> {
        self.send(get_email_by_id_request(id)).await
    }

    async fn send(&self, request: RequestDescriptor) -> Result<String, ApiError> {
        let response = self.client.generic_api_call(request).await?;
        info!(status = response.status, body = %response.body, "API response");
        Ok(response.body)
    }
}
