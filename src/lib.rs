//! Pairlink - matchmaking and session-lifecycle engine for anonymous 1:1 chat relay
//!
//! This library pairs anonymous users for one-to-one relayed conversation.
//! The core is the waiting queue, the first-fit pairing scan, the per-user
//! idle/waiting/chatting state machine, and the durable snapshot that lets
//! the engine survive a restart without losing pairings or queued users.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{Engine, EngineError, EnterOutcome, LeaveOutcome};
pub use crate::models::{
    ContentPayload, Gender, Preference, Profile, ProfileSummary, QueueEntry, Snapshot, UserId,
    UserStatus,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        // Verify that the library exports work correctly
        let pref: Preference = "any".parse().unwrap();
        assert!(pref.accepts(Gender::Undisclosed));
    }
}
