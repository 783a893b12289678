use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::{
    repo::UserRepo,
    repo_types::{User, UserPatch},
};
use crate::diary::{
    repo::DiaryRepo,
    repo_types::{DiaryEntry, EntryPatch},
};

/// In-process store with the same contract as `PgStore`, for tests and
/// `AppState::fake()`.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    entries: RwLock<HashMap<Uuid, DiaryEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn create(&self, user: &User) -> anyhow::Result<User> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            anyhow::bail!("duplicate key value violates unique constraint on email");
        }
        users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn update(
        &self,
        id: Uuid,
        patch: UserPatch,
        updated_at: OffsetDateTime,
    ) -> anyhow::Result<Option<User>> {
        let mut users = self.users.write().await;
        let Some(user) = users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(username) = patch.username {
            user.username = username;
        }
        if let Some(email) = patch.email {
            user.email = email;
        }
        if let Some(hash) = patch.password_hash {
            user.password_hash = hash;
        }
        user.updated_at = Some(updated_at);
        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        Ok(self.users.write().await.remove(&id).is_some())
    }
}

#[async_trait]
impl DiaryRepo for MemoryStore {
    async fn insert(&self, entry: &DiaryEntry) -> anyhow::Result<DiaryEntry> {
        self.entries.write().await.insert(entry.id, entry.clone());
        Ok(entry.clone())
    }

    async fn list_by_user(&self, user_id: Uuid) -> anyhow::Result<Vec<DiaryEntry>> {
        let entries = self.entries.read().await;
        let mut owned: Vec<DiaryEntry> = entries
            .values()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn find_owned(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<DiaryEntry>> {
        let entries = self.entries.read().await;
        Ok(entries.get(&id).filter(|e| e.user_id == user_id).cloned())
    }

    async fn update_owned(
        &self,
        user_id: Uuid,
        id: Uuid,
        patch: EntryPatch,
        updated_at: OffsetDateTime,
    ) -> anyhow::Result<Option<DiaryEntry>> {
        let mut entries = self.entries.write().await;
        let Some(entry) = entries.get_mut(&id).filter(|e| e.user_id == user_id) else {
            return Ok(None);
        };
        if let Some(title) = patch.title {
            entry.title = title;
        }
        if let Some(content) = patch.content {
            entry.content = content;
        }
        if let Some(labels) = patch.labels {
            entry.emotion = labels.emotion;
            entry.sentiment = labels.sentiment;
        }
        entry.updated_at = Some(updated_at);
        Ok(Some(entry.clone()))
    }

    async fn delete_owned(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let mut entries = self.entries.write().await;
        if entries.get(&id).is_some_and(|e| e.user_id == user_id) {
            entries.remove(&id);
            return Ok(true);
        }
        Ok(false)
    }

    async fn delete_all_for_user(&self, user_id: Uuid) -> anyhow::Result<u64> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, e| e.user_id != user_id);
        Ok((before - entries.len()) as u64)
    }
}
