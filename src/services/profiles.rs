use sqlx::{Row, SqlitePool};
use thiserror::Error;

use crate::models::{Gender, Profile, ProfileSummary, UserId};

/// Errors from profile lookups and updates.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

/// Partial profile update; `None` fields keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct ProfileFields {
    pub handle: Option<String>,
    pub gender: Option<Gender>,
    pub age: Option<u8>,
    pub bio: Option<String>,
}

/// Key-value lookup from user id to profile.
///
/// Consumed read-only by the engine to decide gender-preference matches and
/// to render pairing summaries; the write side exists so the transport's
/// profile flow has somewhere to land.
#[derive(Clone)]
pub struct ProfileStore {
    pool: SqlitePool,
}

impl ProfileStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn profile_from_row(row: &sqlx::sqlite::SqliteRow) -> Profile {
        let gender: Option<String> = row.get("gender");
        let age: Option<i64> = row.get("age");
        Profile {
            user_id: UserId(row.get("user_id")),
            handle: row.get("handle"),
            gender: gender.as_deref().and_then(|g| g.parse().ok()),
            age: age.map(|a| a as u8),
            bio: row.get("bio"),
            language: row.get("language"),
            is_pro: row.get::<i64, _>("is_pro") != 0,
        }
    }

    /// Fetch the stored row regardless of completeness.
    pub async fn get_row(&self, user_id: UserId) -> Result<Option<Profile>, ProfileError> {
        let row = sqlx::query(
            "SELECT user_id, handle, gender, age, bio, language, is_pro FROM user_profiles WHERE user_id = ?",
        )
        .bind(user_id.0)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(Self::profile_from_row))
    }

    /// Fetch a profile, but only when its core fields (gender, age, bio)
    /// are all filled in. A half-finished profile reads as absent.
    pub async fn get_profile(&self, user_id: UserId) -> Result<Option<Profile>, ProfileError> {
        Ok(self.get_row(user_id).await?.filter(Profile::is_complete))
    }

    /// Summary shown to a freshly matched partner; placeholders when the
    /// profile is absent or incomplete.
    pub async fn summary_of(&self, user_id: UserId) -> Result<ProfileSummary, ProfileError> {
        let summary = match self.get_profile(user_id).await? {
            Some(profile) => ProfileSummary {
                gender: profile
                    .gender
                    .map(|g| g.to_string())
                    .unwrap_or_else(|| "Misteri".to_string()),
                age: profile
                    .age
                    .map(|a| a.to_string())
                    .unwrap_or_else(|| "??".to_string()),
                bio: profile.bio.unwrap_or_else(|| "-".to_string()),
            },
            None => ProfileSummary::default(),
        };
        Ok(summary)
    }

    /// Resolve a handle (with or without a leading `@`) to a user id.
    pub async fn find_by_handle(&self, handle: &str) -> Result<Option<UserId>, ProfileError> {
        let clean = handle.trim_start_matches('@');
        let row = sqlx::query("SELECT user_id FROM user_profiles WHERE handle = ?")
            .bind(clean)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| UserId(r.get("user_id"))))
    }

    /// Ensure a row exists for the user and refresh their handle when one
    /// is provided. Ran on every inbound event so handles stay current.
    pub async fn touch(&self, user_id: UserId, handle: Option<&str>) -> Result<(), ProfileError> {
        sqlx::query("INSERT OR IGNORE INTO user_profiles (user_id, handle) VALUES (?, ?)")
            .bind(user_id.0)
            .bind(handle)
            .execute(&self.pool)
            .await?;

        if let Some(handle) = handle {
            sqlx::query("UPDATE user_profiles SET handle = ? WHERE user_id = ?")
                .bind(handle)
                .bind(user_id.0)
                .execute(&self.pool)
                .await?;
        }

        Ok(())
    }

    /// Merge the given fields into the stored profile, creating the row if
    /// needed. Absent fields keep their stored values.
    pub async fn upsert(&self, user_id: UserId, fields: ProfileFields) -> Result<(), ProfileError> {
        let current = self.get_row(user_id).await?.unwrap_or(Profile {
            user_id,
            handle: None,
            gender: None,
            age: None,
            bio: None,
            language: "id".to_string(),
            is_pro: false,
        });

        let handle = fields.handle.or(current.handle);
        let gender = fields.gender.or(current.gender);
        let age = fields.age.or(current.age);
        let bio = fields.bio.or(current.bio);

        sqlx::query(
            "INSERT INTO user_profiles (user_id, handle, gender, age, bio, language, is_pro) \
             VALUES (?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT(user_id) DO UPDATE SET \
               handle = excluded.handle, gender = excluded.gender, age = excluded.age, \
               bio = excluded.bio, language = excluded.language, is_pro = excluded.is_pro",
        )
        .bind(user_id.0)
        .bind(handle)
        .bind(gender.map(|g| g.as_str()))
        .bind(age.map(|a| a as i64))
        .bind(bio)
        .bind(&current.language)
        .bind(current.is_pro as i64)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Flip the pro flag, creating the row if needed.
    pub async fn set_pro(&self, user_id: UserId, is_pro: bool) -> Result<(), ProfileError> {
        self.touch(user_id, None).await?;
        sqlx::query("UPDATE user_profiles SET is_pro = ? WHERE user_id = ?")
            .bind(is_pro as i64)
            .bind(user_id.0)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn count_users(&self) -> Result<i64, ProfileError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM user_profiles")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("n"))
    }

    pub async fn count_pro(&self) -> Result<i64, ProfileError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM user_profiles WHERE is_pro = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("n"))
    }
}
