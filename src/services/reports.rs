use sqlx::{Row, SqlitePool};
use thiserror::Error;

use crate::models::UserId;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

/// Stores user reports filed against previous chat partners.
#[derive(Clone)]
pub struct ReportStore {
    pool: SqlitePool,
}

impl ReportStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn record(&self, reporter: UserId, reported: UserId) -> Result<(), ReportError> {
        sqlx::query("INSERT INTO reports (reporter_id, reported_id, reported_at) VALUES (?, ?, ?)")
            .bind(reporter.0)
            .bind(reported.0)
            .bind(chrono::Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await?;

        tracing::info!(reporter = %reporter, reported = %reported, "report recorded");
        Ok(())
    }

    pub async fn count(&self) -> Result<i64, ReportError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM reports")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("n"))
    }
}
