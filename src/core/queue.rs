use crate::core::compat::mutually_compatible;
use crate::models::{QueueEntry, UserId};

/// The waiting queue, in insertion order.
///
/// Holds at most one entry per user; the engine enforces that before
/// pushing. Scans are O(n²) first-fit which is fine at the queue sizes a
/// single relay instance sees, and keeps which-pair-wins fully predictable.
#[derive(Debug, Default, Clone)]
pub struct WaitQueue {
    entries: Vec<QueueEntry>,
}

impl WaitQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<QueueEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, user_id: UserId) -> bool {
        self.entries.iter().any(|e| e.user_id == user_id)
    }

    pub fn push(&mut self, entry: QueueEntry) {
        debug_assert!(!self.contains(entry.user_id));
        self.entries.push(entry);
    }

    /// Remove a user's entry if present. Returns whether anything was removed;
    /// removing an absent user is a no-op, not an error.
    pub fn remove(&mut self, user_id: UserId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.user_id != user_id);
        before != self.entries.len()
    }

    /// First-fit pairwise scan in insertion order.
    ///
    /// Walks positions i < j (both ascending) and stops at the first pair
    /// whose preferences accept each other. Exactly one pair per call;
    /// `None` means nobody matches yet, which is the normal waiting state.
    pub fn first_fit(&self) -> Option<(usize, usize)> {
        if self.entries.len() < 2 {
            return None;
        }
        for i in 0..self.entries.len() {
            for j in (i + 1)..self.entries.len() {
                if mutually_compatible(&self.entries[i], &self.entries[j]) {
                    return Some((i, j));
                }
            }
        }
        None
    }

    /// Remove the two entries at the given scan positions (i < j).
    pub fn take_pair(&mut self, i: usize, j: usize) -> (QueueEntry, QueueEntry) {
        debug_assert!(i < j);
        // Remove the later index first so the earlier one stays valid.
        let b = self.entries.remove(j);
        let a = self.entries.remove(i);
        (a, b)
    }

    pub fn entries(&self) -> &[QueueEntry] {
        &self.entries
    }

    pub fn to_vec(&self) -> Vec<QueueEntry> {
        self.entries.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gender, Preference};

    fn entry(id: i64, gender: Gender, preference: Preference) -> QueueEntry {
        QueueEntry {
            user_id: UserId(id),
            gender,
            preference,
        }
    }

    #[test]
    fn test_first_fit_prefers_earliest_insertion() {
        // A (male, any), B (female, wants male), C (female, any):
        // the scan reaches (A, B) before C is considered.
        let mut queue = WaitQueue::new();
        queue.push(entry(1, Gender::Male, Preference::Any));
        queue.push(entry(2, Gender::Female, Preference::Gender(Gender::Male)));
        queue.push(entry(3, Gender::Female, Preference::Any));

        let (i, j) = queue.first_fit().expect("pair expected");
        assert_eq!((i, j), (0, 1));

        let (a, b) = queue.take_pair(i, j);
        assert_eq!(a.user_id, UserId(1));
        assert_eq!(b.user_id, UserId(2));

        // C is still waiting
        assert_eq!(queue.len(), 1);
        assert!(queue.contains(UserId(3)));
    }

    #[test]
    fn test_first_fit_skips_incompatible_head() {
        // Head wants a male but only females follow; the match is (B, C).
        let mut queue = WaitQueue::new();
        queue.push(entry(1, Gender::Female, Preference::Gender(Gender::Male)));
        queue.push(entry(2, Gender::Female, Preference::Any));
        queue.push(entry(3, Gender::Female, Preference::Any));

        assert_eq!(queue.first_fit(), Some((1, 2)));
    }

    #[test]
    fn test_no_match_leaves_queue_untouched() {
        let mut queue = WaitQueue::new();
        queue.push(entry(1, Gender::Male, Preference::Gender(Gender::Female)));
        queue.push(entry(2, Gender::Male, Preference::Gender(Gender::Female)));

        assert_eq!(queue.first_fit(), None);
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_single_entry_never_matches() {
        let mut queue = WaitQueue::new();
        queue.push(entry(1, Gender::Male, Preference::Any));
        assert_eq!(queue.first_fit(), None);
    }

    #[test]
    fn test_worst_case_scan_commits_the_tail_pair() {
        // Males seeking females reject each other; females seeking females
        // reject the males. Only the final two entries are compatible, so
        // the scan must visit every earlier pair first.
        let mut queue = WaitQueue::new();
        for id in 0..20 {
            queue.push(entry(id, Gender::Male, Preference::Gender(Gender::Female)));
        }
        queue.push(entry(20, Gender::Female, Preference::Gender(Gender::Female)));
        queue.push(entry(21, Gender::Female, Preference::Gender(Gender::Female)));

        assert_eq!(queue.first_fit(), Some((20, 21)));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut queue = WaitQueue::new();
        queue.push(entry(1, Gender::Male, Preference::Any));

        assert!(queue.remove(UserId(1)));
        assert!(!queue.remove(UserId(1)));
        assert!(queue.is_empty());
    }
}
