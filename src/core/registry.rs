use std::collections::HashMap;

use crate::models::UserId;

/// Active-pairing bookkeeping.
///
/// The table is always mirrored: if a maps to b then b maps to a. An
/// unmirrored half-entry is corruption and is repaired away on load rather
/// than allowed to surface.
#[derive(Debug, Default, Clone)]
pub struct PairingTable {
    partners: HashMap<UserId, UserId>,
}

impl PairingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of users currently in a conversation (twice the pair count).
    pub fn user_count(&self) -> usize {
        self.partners.len()
    }

    pub fn contains(&self, user_id: UserId) -> bool {
        self.partners.contains_key(&user_id)
    }

    pub fn partner_of(&self, user_id: UserId) -> Option<UserId> {
        self.partners.get(&user_id).copied()
    }

    /// Create the mirrored pairing. The match engine guarantees neither side
    /// is already paired; a violation here is a programming fault.
    pub fn establish(&mut self, a: UserId, b: UserId) {
        debug_assert!(a != b);
        debug_assert!(!self.partners.contains_key(&a));
        debug_assert!(!self.partners.contains_key(&b));
        self.partners.insert(a, b);
        self.partners.insert(b, a);
    }

    /// Remove both halves of the initiator's pairing, returning the partner
    /// so the caller can notify them. `None` when not paired; a second call
    /// for the same initiator returns `None` with no state change.
    pub fn teardown(&mut self, initiator: UserId) -> Option<UserId> {
        let partner = self.partners.remove(&initiator)?;
        self.partners.remove(&partner);
        Some(partner)
    }

    pub fn as_map(&self) -> &HashMap<UserId, UserId> {
        &self.partners
    }

    /// Rebuild from a loaded snapshot, dropping self-pairings and unmirrored
    /// half-entries instead of propagating them. Returns the table and the
    /// number of entries dropped.
    pub fn from_snapshot(loaded: HashMap<UserId, UserId>) -> (Self, usize) {
        let mut partners = HashMap::with_capacity(loaded.len());
        let mut dropped = 0;
        for (&a, &b) in &loaded {
            if a != b && loaded.get(&b) == Some(&a) {
                partners.insert(a, b);
            } else {
                dropped += 1;
            }
        }
        (Self { partners }, dropped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_establish_is_mirrored() {
        let mut table = PairingTable::new();
        table.establish(UserId(1), UserId(2));

        assert_eq!(table.partner_of(UserId(1)), Some(UserId(2)));
        assert_eq!(table.partner_of(UserId(2)), Some(UserId(1)));
        assert_eq!(table.user_count(), 2);
    }

    #[test]
    fn test_teardown_removes_both_halves() {
        let mut table = PairingTable::new();
        table.establish(UserId(1), UserId(2));

        assert_eq!(table.teardown(UserId(1)), Some(UserId(2)));
        assert!(!table.contains(UserId(1)));
        assert!(!table.contains(UserId(2)));

        // Second teardown is a soft no-op
        assert_eq!(table.teardown(UserId(1)), None);
        assert_eq!(table.teardown(UserId(2)), None);
    }

    #[test]
    fn test_partner_initiated_teardown() {
        let mut table = PairingTable::new();
        table.establish(UserId(1), UserId(2));

        assert_eq!(table.teardown(UserId(2)), Some(UserId(1)));
        assert_eq!(table.user_count(), 0);
    }

    #[test]
    fn test_from_snapshot_repairs_half_entries() {
        let mut loaded = HashMap::new();
        loaded.insert(UserId(1), UserId(2));
        loaded.insert(UserId(2), UserId(1));
        // Half-entry: 3 points at 4 but 4 is missing
        loaded.insert(UserId(3), UserId(4));
        // Self-pairing
        loaded.insert(UserId(5), UserId(5));

        let (table, dropped) = PairingTable::from_snapshot(loaded);
        assert_eq!(dropped, 2);
        assert_eq!(table.user_count(), 2);
        assert_eq!(table.partner_of(UserId(1)), Some(UserId(2)));
        assert!(!table.contains(UserId(3)));
        assert!(!table.contains(UserId(5)));
    }

    #[test]
    fn test_from_snapshot_repairs_mismatched_mirror() {
        let mut loaded = HashMap::new();
        // 1 points at 2, but 2 points at 3: both halves are bad
        loaded.insert(UserId(1), UserId(2));
        loaded.insert(UserId(2), UserId(3));

        let (table, dropped) = PairingTable::from_snapshot(loaded);
        assert_eq!(dropped, 2);
        assert_eq!(table.user_count(), 0);
    }
}
