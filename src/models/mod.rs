// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    ContentPayload, Gender, MediaKind, Preference, Profile, ProfileSummary, QueueEntry, Snapshot,
    UserId, UserStatus,
};
pub use requests::{
    ContentRequest, EnterRequest, HandleQuery, LeaveRequest, ReportRequest, SetProRequest,
    SkipRequest, UpsertProfileRequest,
};
pub use responses::{
    AdminStatsResponse, EnterResponse, ErrorResponse, EventAck, HealthResponse, PartnerInfo,
    StatsResponse,
};
