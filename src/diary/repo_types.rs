use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::analyzer::Labels;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct DiaryEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: Option<String>,
    pub content: String,
    pub emotion: String,
    pub sentiment: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

/// Changes to apply to an owned entry. `title: Some(None)` clears the title.
#[derive(Debug, Clone, Default)]
pub struct EntryPatch {
    pub title: Option<Option<String>>,
    pub content: Option<String>,
    pub labels: Option<Labels>,
}
