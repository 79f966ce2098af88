use crate::models::QueueEntry;

/// Check whether two queued users are willing to be paired with each other.
///
/// A pair is compatible only when both directions hold: A's preference
/// accepts B's gender and B's preference accepts A's gender. A single
/// failing side vetoes the pair regardless of the other.
#[inline]
pub fn mutually_compatible(a: &QueueEntry, b: &QueueEntry) -> bool {
    a.preference.accepts(b.gender) && b.preference.accepts(a.gender)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gender, Preference, UserId};

    fn entry(id: i64, gender: Gender, preference: Preference) -> QueueEntry {
        QueueEntry {
            user_id: UserId(id),
            gender,
            preference,
        }
    }

    #[test]
    fn test_any_matches_every_gender() {
        let a = entry(1, Gender::Undisclosed, Preference::Any);
        for gender in [Gender::Male, Gender::Female, Gender::Undisclosed] {
            let b = entry(2, gender, Preference::Any);
            assert!(mutually_compatible(&a, &b));
        }
    }

    #[test]
    fn test_directed_preference_must_hold_both_ways() {
        // A wants a female and B is female, but B wants a female and A is male
        let a = entry(1, Gender::Male, Preference::Gender(Gender::Female));
        let b = entry(2, Gender::Female, Preference::Gender(Gender::Female));
        assert!(!mutually_compatible(&a, &b));

        // Relax B's side and the pair works
        let b_any = entry(2, Gender::Female, Preference::Any);
        assert!(mutually_compatible(&a, &b_any));
    }

    #[test]
    fn test_one_failing_side_vetoes() {
        let a = entry(1, Gender::Male, Preference::Any);
        let b = entry(2, Gender::Female, Preference::Gender(Gender::Female));
        assert!(!mutually_compatible(&a, &b));
        assert!(!mutually_compatible(&b, &a));
    }

    #[test]
    fn test_same_gender_with_matching_preferences() {
        let a = entry(1, Gender::Male, Preference::Gender(Gender::Male));
        let b = entry(2, Gender::Male, Preference::Gender(Gender::Male));
        assert!(mutually_compatible(&a, &b));
    }
}
