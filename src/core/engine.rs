use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::core::queue::WaitQueue;
use crate::core::registry::PairingTable;
use crate::models::{Gender, Preference, QueueEntry, Snapshot, UserId, UserStatus};
use crate::services::profiles::{ProfileError, ProfileStore};
use crate::services::store::{SessionStore, StoreError};

/// Errors surfaced by engine operations.
///
/// The first two are user errors: the operation is refused with a message
/// and no state changes. Store and profile failures bubble up as 500-class
/// problems.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("already searching or in a conversation")]
    AlreadyActive,
    #[error("not in a conversation or queue")]
    NotActive,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Profile(#[from] ProfileError),
}

/// Result of an enter event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnterOutcome {
    /// Queued; the user waits until a compatible partner arrives.
    Waiting,
    /// The scan committed a pair (`a` held the earlier queue position).
    /// Both sides flipped to chatting; the caller notifies them outside the
    /// engine's critical section. The pair usually contains the user who
    /// just entered, but a queue restored from a snapshot taken mid-match
    /// can pair two longer-waiting users instead.
    Matched { a: UserId, b: UserId },
}

impl EnterOutcome {
    /// The other side of the pair, when the given user is in it.
    pub fn partner_of(&self, user_id: UserId) -> Option<UserId> {
        match *self {
            EnterOutcome::Matched { a, b } if a == user_id => Some(b),
            EnterOutcome::Matched { a, b } if b == user_id => Some(a),
            _ => None,
        }
    }
}

/// Result of a leave event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// The user was waiting; their queue entry is gone.
    LeftQueue,
    /// The user was chatting; the pairing is torn down and the partner
    /// returned so the caller can tell them.
    EndedChat { partner: UserId },
}

struct EngineState {
    queue: WaitQueue,
    sessions: PairingTable,
}

impl EngineState {
    fn snapshot(&self) -> Snapshot {
        Snapshot {
            pairings: self.sessions.as_map().clone(),
            queue: self.queue.to_vec(),
        }
    }
}

/// The matchmaking and session-lifecycle engine.
///
/// All queue and pairing mutations are serialized through one async mutex;
/// events from concurrent users cannot interleave mid-mutation. Profile
/// lookups happen before the lock is taken and notifications happen after
/// it is released, on data captured at decision time. The snapshot write
/// stays inside the critical section so saves land in mutation order.
pub struct Engine {
    state: Mutex<EngineState>,
    store: SessionStore,
    profiles: Arc<ProfileStore>,
}

impl Engine {
    /// Rehydrate the engine from the persisted snapshot. Called once at
    /// startup, before any events are accepted.
    ///
    /// Loaded state is repaired, never trusted: unmirrored pairings are
    /// dropped, and a user found in both collections keeps the pairing and
    /// loses the queue entry (the queue removal is the write most likely to
    /// have been lost mid-match). Repairs are logged and persisted back.
    pub async fn restore(
        store: SessionStore,
        profiles: Arc<ProfileStore>,
    ) -> Result<Self, EngineError> {
        let snapshot = store.load().await?;

        let (sessions, dropped_pairings) = PairingTable::from_snapshot(snapshot.pairings);
        if dropped_pairings > 0 {
            warn!(
                dropped = dropped_pairings,
                "dropped unmirrored pairing entries while restoring"
            );
        }

        let mut queue = WaitQueue::new();
        let mut dropped_entries = 0;
        for entry in snapshot.queue {
            if sessions.contains(entry.user_id) || queue.contains(entry.user_id) {
                dropped_entries += 1;
            } else {
                queue.push(entry);
            }
        }
        if dropped_entries > 0 {
            warn!(
                dropped = dropped_entries,
                "dropped conflicting queue entries while restoring"
            );
        }

        let state = EngineState { queue, sessions };

        if dropped_pairings > 0 || dropped_entries > 0 {
            store.save(&state.snapshot()).await?;
        }

        info!(
            chatting = state.sessions.user_count(),
            waiting = state.queue.len(),
            "engine state restored"
        );

        Ok(Self {
            state: Mutex::new(state),
            store,
            profiles,
        })
    }

    /// Enter the waiting queue, matching immediately when possible.
    ///
    /// Rejected with `AlreadyActive` while the user is waiting or chatting.
    /// The user's gender comes from their profile, captured before the lock
    /// is taken; an absent or incomplete profile reads as undisclosed.
    pub async fn enter(
        &self,
        user_id: UserId,
        preference: Preference,
    ) -> Result<EnterOutcome, EngineError> {
        let gender = self
            .profiles
            .get_profile(user_id)
            .await?
            .and_then(|p| p.gender)
            .unwrap_or(Gender::Undisclosed);

        let mut state = self.state.lock().await;

        if state.queue.contains(user_id) || state.sessions.contains(user_id) {
            return Err(EngineError::AlreadyActive);
        }

        state.queue.push(QueueEntry {
            user_id,
            gender,
            preference,
        });

        let outcome = match state.queue.first_fit() {
            Some((i, j)) => {
                let (a, b) = state.queue.take_pair(i, j);
                state.sessions.establish(a.user_id, b.user_id);
                info!(user_a = %a.user_id, user_b = %b.user_id, "pair established");
                EnterOutcome::Matched {
                    a: a.user_id,
                    b: b.user_id,
                }
            }
            None => EnterOutcome::Waiting,
        };

        self.store.save(&state.snapshot()).await?;
        Ok(outcome)
    }

    /// Leave whatever the user is in: the queue or a conversation.
    /// `NotActive` when idle, with no state change.
    pub async fn leave(&self, user_id: UserId) -> Result<LeaveOutcome, EngineError> {
        let mut state = self.state.lock().await;

        if state.queue.remove(user_id) {
            self.store.save(&state.snapshot()).await?;
            return Ok(LeaveOutcome::LeftQueue);
        }

        if let Some(partner) = state.sessions.teardown(user_id) {
            info!(initiator = %user_id, partner = %partner, "pairing torn down");
            self.store.save(&state.snapshot()).await?;
            return Ok(LeaveOutcome::EndedChat { partner });
        }

        Err(EngineError::NotActive)
    }

    /// Tear down the user's conversation if they have one. Soft no-op when
    /// not chatting. Skip is modeled as this followed by a fresh `enter`,
    /// never as one atomic transition; a crash between the two leaves the
    /// user idle, not half-chatting-half-waiting.
    pub async fn end_chat(&self, user_id: UserId) -> Result<Option<UserId>, EngineError> {
        let mut state = self.state.lock().await;

        match state.sessions.teardown(user_id) {
            Some(partner) => {
                info!(initiator = %user_id, partner = %partner, "pairing torn down");
                self.store.save(&state.snapshot()).await?;
                Ok(Some(partner))
            }
            None => Ok(None),
        }
    }

    /// The user's current partner, if they are chatting.
    pub async fn resolve_partner(&self, user_id: UserId) -> Option<UserId> {
        self.state.lock().await.sessions.partner_of(user_id)
    }

    /// Whether the user holds a queue entry or a pairing.
    pub async fn is_active(&self, user_id: UserId) -> bool {
        let state = self.state.lock().await;
        state.queue.contains(user_id) || state.sessions.contains(user_id)
    }

    /// Derived status, computed from membership on demand.
    pub async fn status(&self, user_id: UserId) -> UserStatus {
        let state = self.state.lock().await;
        if state.sessions.contains(user_id) {
            UserStatus::Chatting
        } else if state.queue.contains(user_id) {
            UserStatus::Waiting
        } else {
            UserStatus::Idle
        }
    }

    /// (waiting users, chatting users) for the stats surface.
    pub async fn counts(&self) -> (usize, usize) {
        let state = self.state.lock().await;
        (state.queue.len(), state.sessions.user_count())
    }
}
