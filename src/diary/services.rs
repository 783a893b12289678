use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::repo::DiaryRepo;
use super::repo_types::{DiaryEntry, EntryPatch};
use crate::analyzer::EmotionAnalyzer;
use crate::error::{AppError, AppResult, ValidationError};

/// Ownership-scoped entry lifecycle with emotion enrichment.
#[derive(Clone)]
pub struct DiaryService {
    entries: Arc<dyn DiaryRepo>,
    analyzer: EmotionAnalyzer,
}

fn clean_title(title: Option<String>) -> Option<String> {
    title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

fn require_content(content: &str) -> Result<(), ValidationError> {
    if content.trim().is_empty() {
        return Err(ValidationError::EmptyContent);
    }
    Ok(())
}

impl DiaryService {
    pub fn new(entries: Arc<dyn DiaryRepo>, analyzer: EmotionAnalyzer) -> Self {
        Self { entries, analyzer }
    }

    #[instrument(skip(self, title, content))]
    pub async fn create(
        &self,
        user_id: Uuid,
        title: Option<String>,
        content: String,
    ) -> AppResult<DiaryEntry> {
        require_content(&content)?;

        let labels = self.analyzer.analyze(&content).await.labels();
        let entry = DiaryEntry {
            id: Uuid::new_v4(),
            user_id,
            title: clean_title(title),
            content,
            emotion: labels.emotion,
            sentiment: labels.sentiment,
            created_at: OffsetDateTime::now_utc(),
            updated_at: None,
        };

        let entry = self.entries.insert(&entry).await.map_err(AppError::Store)?;
        info!(entry_id = %entry.id, emotion = %entry.emotion, "diary entry created");
        Ok(entry)
    }

    #[instrument(skip(self))]
    pub async fn list(&self, user_id: Uuid) -> AppResult<Vec<DiaryEntry>> {
        self.entries
            .list_by_user(user_id)
            .await
            .map_err(AppError::Store)
    }

    #[instrument(skip(self))]
    pub async fn get_by_id(&self, user_id: Uuid, entry_id: Uuid) -> AppResult<DiaryEntry> {
        self.entries
            .find_owned(user_id, entry_id)
            .await
            .map_err(AppError::Store)?
            .ok_or(AppError::NotFoundOrUnauthorized)
    }

    /// Labels are recomputed only when the content actually changes.
    #[instrument(skip(self, title, content))]
    pub async fn update(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
        title: Option<String>,
        content: Option<String>,
    ) -> AppResult<DiaryEntry> {
        if title.is_none() && content.is_none() {
            return Err(ValidationError::NoFieldsProvided.into());
        }
        if let Some(content) = &content {
            require_content(content)?;
        }

        let current = self.get_by_id(user_id, entry_id).await?;

        let mut patch = EntryPatch {
            title: title.map(|t| clean_title(Some(t))),
            ..EntryPatch::default()
        };
        match content {
            Some(content) if content != current.content => {
                patch.labels = Some(self.analyzer.analyze(&content).await.labels());
                patch.content = Some(content);
            }
            Some(_) => debug!("content unchanged; keeping labels"),
            None => {}
        }

        self.entries
            .update_owned(user_id, entry_id, patch, OffsetDateTime::now_utc())
            .await
            .map_err(AppError::Store)?
            .ok_or(AppError::NotFoundOrUnauthorized)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, user_id: Uuid, entry_id: Uuid) -> AppResult<()> {
        let deleted = self
            .entries
            .delete_owned(user_id, entry_id)
            .await
            .map_err(AppError::Store)?;
        if !deleted {
            return Err(AppError::NotFoundOrUnauthorized);
        }
        info!(%entry_id, "diary entry deleted");
        Ok(())
    }
}
