//! Domain types and models

pub mod auth;
pub mod payloads;

pub use auth::{AccessToken, Credentials, TokenResponse};
pub use payloads::{
    AddActivitiesRequest, CreateUpdateLeadsRequest, LeadAction, LeadUpsertOptions, Record,
};
