use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stable identifier for a chat participant.
///
/// The transport hands us an opaque numeric id; everything in the engine and
/// the snapshot is keyed by it. Serialized transparently, so JSON map keys
/// come out as the number rendered as a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<i64> for UserId {
    fn from(value: i64) -> Self {
        UserId(value)
    }
}

/// Gender as disclosed in a user's profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Undisclosed,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Undisclosed => "undisclosed",
        }
    }
}

impl FromStr for Gender {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "undisclosed" => Ok(Gender::Undisclosed),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The gender a waiting user is willing to be matched with.
///
/// `Any` is the wildcard every user gets by default; a concrete gender
/// preference is the gated "search by gender" feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preference {
    Any,
    Gender(Gender),
}

impl Preference {
    /// Whether a candidate with the given gender satisfies this preference.
    #[inline]
    pub fn accepts(&self, gender: Gender) -> bool {
        match self {
            Preference::Any => true,
            Preference::Gender(wanted) => *wanted == gender,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Preference::Any => "any",
            Preference::Gender(g) => g.as_str(),
        }
    }
}

impl FromStr for Preference {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "any" => Ok(Preference::Any),
            other => other.parse::<Gender>().map(Preference::Gender),
        }
    }
}

impl fmt::Display for Preference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Preference {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Preference {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse()
            .map_err(|_| serde::de::Error::custom(format!("unknown preference: {}", s)))
    }
}

/// One user waiting in the match queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub user_id: UserId,
    pub gender: Gender,
    pub preference: Preference,
}

/// Derived per-user status. Never stored; always computed from queue and
/// pairing membership so it cannot drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Idle,
    Waiting,
    Chatting,
}

/// Serializable projection of the engine state, written after every mutation
/// and read once at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub pairings: std::collections::HashMap<UserId, UserId>,
    pub queue: Vec<QueueEntry>,
}

/// Stored user profile. Individual fields are optional until the user has
/// walked through the profile flow; a profile counts as complete only once
/// gender, age and bio are all present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: UserId,
    pub handle: Option<String>,
    pub gender: Option<Gender>,
    pub age: Option<u8>,
    pub bio: Option<String>,
    pub language: String,
    pub is_pro: bool,
}

impl Profile {
    pub fn is_complete(&self) -> bool {
        self.gender.is_some() && self.age.is_some() && self.bio.is_some()
    }
}

/// Profile summary shown to the other side of a new pairing. Placeholder
/// values stand in for users who never filled their profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub gender: String,
    pub age: String,
    pub bio: String,
}

impl Default for ProfileSummary {
    fn default() -> Self {
        Self {
            gender: "Misteri".to_string(),
            age: "??".to_string(),
            bio: "-".to_string(),
        }
    }
}

impl ProfileSummary {
    pub fn render(&self) -> String {
        format!("Gender: {}\nAge: {}\nBio: {}", self.gender, self.age, self.bio)
    }
}

/// Kind of media attached to a relayed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Photo,
    Sticker,
    Voice,
    Video,
}

/// Opaque content relayed between partners. The engine never inspects it;
/// it only decides whether a partner exists to forward it to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentPayload {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub media: Option<MediaKind>,
    #[serde(default)]
    pub file_id: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preference_accepts() {
        assert!(Preference::Any.accepts(Gender::Male));
        assert!(Preference::Any.accepts(Gender::Undisclosed));
        assert!(Preference::Gender(Gender::Male).accepts(Gender::Male));
        assert!(!Preference::Gender(Gender::Male).accepts(Gender::Female));
        assert!(!Preference::Gender(Gender::Female).accepts(Gender::Undisclosed));
    }

    #[test]
    fn test_preference_round_trip() {
        for s in ["any", "male", "female", "undisclosed"] {
            let p: Preference = s.parse().unwrap();
            assert_eq!(p.as_str(), s);
            let json = serde_json::to_string(&p).unwrap();
            assert_eq!(json, format!("\"{}\"", s));
            let back: Preference = serde_json::from_str(&json).unwrap();
            assert_eq!(back, p);
        }
        assert!("girls".parse::<Preference>().is_err());
    }

    #[test]
    fn test_snapshot_map_keys_are_strings() {
        let mut snapshot = Snapshot::default();
        snapshot.pairings.insert(UserId(1), UserId(2));
        snapshot.pairings.insert(UserId(2), UserId(1));

        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"1\":2"));

        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.pairings.get(&UserId(1)), Some(&UserId(2)));
    }

    #[test]
    fn test_profile_completeness() {
        let mut profile = Profile {
            user_id: UserId(7),
            handle: Some("someone".to_string()),
            gender: Some(Gender::Female),
            age: Some(24),
            bio: Some("hi".to_string()),
            language: "id".to_string(),
            is_pro: false,
        };
        assert!(profile.is_complete());

        profile.bio = None;
        assert!(!profile.is_complete());
    }

    #[test]
    fn test_default_summary_placeholders() {
        let summary = ProfileSummary::default();
        assert_eq!(summary.gender, "Misteri");
        assert_eq!(summary.age, "??");
        assert_eq!(summary.bio, "-");
    }
}
