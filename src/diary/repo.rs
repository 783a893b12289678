use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{DiaryEntry, EntryPatch};
use crate::db::PgStore;

/// Entry persistence. Every lookup and mutation is scoped by owner.
#[async_trait]
pub trait DiaryRepo: Send + Sync {
    async fn insert(&self, entry: &DiaryEntry) -> anyhow::Result<DiaryEntry>;
    /// Newest first.
    async fn list_by_user(&self, user_id: Uuid) -> anyhow::Result<Vec<DiaryEntry>>;
    async fn find_owned(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<DiaryEntry>>;
    /// Applies the patch and returns the updated row in one step.
    async fn update_owned(
        &self,
        user_id: Uuid,
        id: Uuid,
        patch: EntryPatch,
        updated_at: OffsetDateTime,
    ) -> anyhow::Result<Option<DiaryEntry>>;
    async fn delete_owned(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool>;
    async fn delete_all_for_user(&self, user_id: Uuid) -> anyhow::Result<u64>;
}

const ENTRY_COLUMNS: &str =
    "id, user_id, title, content, emotion, sentiment, created_at, updated_at";

#[async_trait]
impl DiaryRepo for PgStore {
    async fn insert(&self, entry: &DiaryEntry) -> anyhow::Result<DiaryEntry> {
        let row = sqlx::query_as::<_, DiaryEntry>(&format!(
            r#"
            INSERT INTO diary_entries (id, user_id, title, content, emotion, sentiment, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {ENTRY_COLUMNS}
            "#
        ))
        .bind(entry.id)
        .bind(entry.user_id)
        .bind(&entry.title)
        .bind(&entry.content)
        .bind(&entry.emotion)
        .bind(&entry.sentiment)
        .bind(entry.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_by_user(&self, user_id: Uuid) -> anyhow::Result<Vec<DiaryEntry>> {
        let rows = sqlx::query_as::<_, DiaryEntry>(&format!(
            r#"
            SELECT {ENTRY_COLUMNS}
              FROM diary_entries
             WHERE user_id = $1
             ORDER BY created_at DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_owned(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<DiaryEntry>> {
        let row = sqlx::query_as::<_, DiaryEntry>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM diary_entries WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update_owned(
        &self,
        user_id: Uuid,
        id: Uuid,
        patch: EntryPatch,
        updated_at: OffsetDateTime,
    ) -> anyhow::Result<Option<DiaryEntry>> {
        let (set_title, title) = match patch.title {
            Some(t) => (true, t),
            None => (false, None),
        };
        let (emotion, sentiment) = match patch.labels {
            Some(l) => (Some(l.emotion), Some(l.sentiment)),
            None => (None, None),
        };

        let row = sqlx::query_as::<_, DiaryEntry>(&format!(
            r#"
            UPDATE diary_entries
               SET title      = CASE WHEN $3 THEN $4 ELSE title END,
                   content    = COALESCE($5, content),
                   emotion    = COALESCE($6, emotion),
                   sentiment  = COALESCE($7, sentiment),
                   updated_at = $8
             WHERE id = $1 AND user_id = $2
            RETURNING {ENTRY_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(user_id)
        .bind(set_title)
        .bind(title)
        .bind(patch.content)
        .bind(emotion)
        .bind(sentiment)
        .bind(updated_at)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete_owned(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM diary_entries WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete_all_for_user(&self, user_id: Uuid) -> anyhow::Result<u64> {
        let res = sqlx::query("DELETE FROM diary_entries WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected())
    }
}
