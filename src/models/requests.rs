use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::ContentPayload;

/// Request to enter the waiting queue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnterRequest {
    #[serde(alias = "userId", rename = "user_id")]
    pub user_id: i64,
    /// "any", "male", "female" or "undisclosed"
    #[serde(default = "default_preference")]
    pub preference: String,
    #[serde(default)]
    pub handle: Option<String>,
}

fn default_preference() -> String {
    "any".to_string()
}

/// Request to leave the queue or end the current conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveRequest {
    #[serde(alias = "userId", rename = "user_id")]
    pub user_id: i64,
}

/// Request to skip the current partner and search again
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkipRequest {
    #[serde(alias = "userId", rename = "user_id")]
    pub user_id: i64,
}

/// Inbound chat content to relay to the sender's partner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentRequest {
    #[serde(alias = "userId", rename = "user_id")]
    pub user_id: i64,
    pub payload: ContentPayload,
}

/// Request to report a previous partner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRequest {
    #[serde(alias = "reporterId", rename = "reporter_id")]
    pub reporter_id: i64,
    #[serde(alias = "reportedId", rename = "reported_id")]
    pub reported_id: i64,
}

/// Partial profile update; absent fields are left untouched
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpsertProfileRequest {
    #[serde(alias = "userId", rename = "user_id")]
    pub user_id: i64,
    #[serde(default)]
    pub handle: Option<String>,
    /// "male", "female" or "undisclosed"
    #[serde(default)]
    pub gender: Option<String>,
    #[validate(range(min = 13, max = 100))]
    #[serde(default)]
    pub age: Option<u8>,
    #[validate(length(max = 150))]
    #[serde(default)]
    pub bio: Option<String>,
}

/// Grant or revoke pro status (admin only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetProRequest {
    #[serde(alias = "userId", rename = "user_id")]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub handle: Option<String>,
    #[serde(default = "default_true")]
    pub is_pro: bool,
}

fn default_true() -> bool {
    true
}

/// Handle lookup query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandleQuery {
    pub handle: String,
}
