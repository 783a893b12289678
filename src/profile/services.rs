use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::UpdateProfileRequest;
use crate::auth::{
    password::{check_password_policy, hash_password},
    repo::UserRepo,
    repo_types::{UserPatch, UserProfile},
    services::normalize_email,
};
use crate::diary::repo::DiaryRepo;
use crate::error::{AppError, AppResult, ValidationError};

/// The caller's own account: read, partial update, delete with cascade.
#[derive(Clone)]
pub struct ProfileService {
    users: Arc<dyn UserRepo>,
    entries: Arc<dyn DiaryRepo>,
}

impl ProfileService {
    pub fn new(users: Arc<dyn UserRepo>, entries: Arc<dyn DiaryRepo>) -> Self {
        Self { users, entries }
    }

    #[instrument(skip(self))]
    pub async fn get_self(&self, user_id: Uuid) -> AppResult<UserProfile> {
        self.users
            .find_by_id(user_id)
            .await
            .map_err(AppError::Store)?
            .map(UserProfile::from)
            .ok_or(AppError::NotFound)
    }

    #[instrument(skip(self, req))]
    pub async fn update_self(
        &self,
        user_id: Uuid,
        req: UpdateProfileRequest,
    ) -> AppResult<UserProfile> {
        if req.is_empty() {
            return Err(ValidationError::NoFieldsProvided.into());
        }

        let mut patch = UserPatch::default();

        if let Some(username) = req.username {
            let username = username.trim();
            if username.is_empty() {
                return Err(ValidationError::EmptyField("username").into());
            }
            patch.username = Some(username.to_string());
        }

        if let Some(email) = req.email {
            let email = normalize_email(&email)?;
            let holder = self
                .users
                .find_by_email(&email)
                .await
                .map_err(AppError::Store)?;
            if holder.is_some_and(|u| u.id != user_id) {
                warn!(%email, "email already in use");
                return Err(ValidationError::EmailTaken.into());
            }
            patch.email = Some(email);
        }

        if let Some(password) = req.password {
            check_password_policy(&password)?;
            patch.password_hash = Some(hash_password(&password).map_err(AppError::Internal)?);
        }

        let user = self
            .users
            .update(user_id, patch, OffsetDateTime::now_utc())
            .await
            .map_err(AppError::Store)?
            .ok_or(AppError::NotFound)?;
        info!(%user_id, "profile updated");
        Ok(user.into())
    }

    /// Entries go first so none are left behind under a deleted id.
    #[instrument(skip(self))]
    pub async fn delete_self(&self, user_id: Uuid) -> AppResult<()> {
        let removed = self
            .entries
            .delete_all_for_user(user_id)
            .await
            .map_err(AppError::Store)?;

        if !self.users.delete(user_id).await.map_err(AppError::Store)? {
            return Err(AppError::NotFound);
        }
        info!(%user_id, entries = removed, "account deleted");
        Ok(())
    }
}
