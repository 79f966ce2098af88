use serde::{Deserialize, Serialize};

use crate::models::domain::{ProfileSummary, UserStatus};

/// Response to an enter event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnterResponse {
    pub status: UserStatus,
    /// Present when the enter immediately produced a match
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partner: Option<PartnerInfo>,
}

/// The matched partner as shown to one side of a fresh pairing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerInfo {
    pub summary: ProfileSummary,
}

/// Generic acknowledgement with a user-facing message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventAck {
    pub success: bool,
    pub message: String,
}

/// Public statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub total_users: i64,
    pub active_users: usize,
}

/// Detailed statistics for the operator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminStatsResponse {
    pub total_users: i64,
    pub pro_users: i64,
    pub chatting_users: usize,
    pub waiting_users: usize,
    pub total_reports: i64,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
