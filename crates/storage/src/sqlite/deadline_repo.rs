use chrono::{DateTime, Duration, Utc};
use quiz_core::model::{QuestionId, SessionId};
use sqlx::Row;

use super::SqliteRepository;
use crate::repository::{DeadlineRecord, DeadlineStore, StorageError};

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait::async_trait]
impl DeadlineStore for SqliteRepository {
    async fn resume_or_create(
        &self,
        session_id: &SessionId,
        question_id: QuestionId,
        budget_secs: u32,
        now: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, StorageError> {
        let mut tx = self.pool().begin().await.map_err(conn)?;

        let existing = sqlx::query(
            r"
                SELECT expires_at FROM deadlines
                WHERE session_id = ?1 AND question_id = ?2
            ",
        )
        .bind(session_id.as_str())
        .bind(question_id.value())
        .fetch_optional(&mut *tx)
        .await
        .map_err(conn)?;

        if let Some(row) = existing {
            let expires_at: DateTime<Utc> = row.try_get("expires_at").map_err(conn)?;
            if expires_at > now {
                tx.commit().await.map_err(conn)?;
                return Ok(expires_at);
            }
        }

        let expires_at = now + Duration::seconds(i64::from(budget_secs));
        sqlx::query(
            r"
                INSERT INTO deadlines (session_id, question_id, expires_at, created_at)
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT(session_id, question_id)
                DO UPDATE SET expires_at = excluded.expires_at,
                              created_at = excluded.created_at
            ",
        )
        .bind(session_id.as_str())
        .bind(question_id.value())
        .bind(expires_at)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(conn)?;

        tx.commit().await.map_err(conn)?;
        Ok(expires_at)
    }

    async fn get(
        &self,
        session_id: &SessionId,
        question_id: QuestionId,
    ) -> Result<Option<DeadlineRecord>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT expires_at FROM deadlines
                WHERE session_id = ?1 AND question_id = ?2
            ",
        )
        .bind(session_id.as_str())
        .bind(question_id.value())
        .fetch_optional(self.pool())
        .await
        .map_err(conn)?;

        match row {
            Some(row) => Ok(Some(DeadlineRecord {
                session_id: session_id.clone(),
                question_id,
                expires_at: row.try_get("expires_at").map_err(conn)?,
            })),
            None => Ok(None),
        }
    }

    async fn clear(
        &self,
        session_id: &SessionId,
        question_id: QuestionId,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
                DELETE FROM deadlines
                WHERE session_id = ?1 AND question_id = ?2
            ",
        )
        .bind(session_id.as_str())
        .bind(question_id.value())
        .execute(self.pool())
        .await
        .map_err(conn)?;
        Ok(())
    }
}
