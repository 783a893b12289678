use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use time::OffsetDateTime;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::jwt::JwtKeys;
use super::password::{check_password_policy, hash_password, verify_password};
use super::repo::UserRepo;
use super::repo_types::User;
use crate::error::{AppError, AppResult, ValidationError};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Trims and lower-cases, then rejects blank or malformed addresses.
pub(crate) fn normalize_email(raw: &str) -> Result<String, ValidationError> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() {
        return Err(ValidationError::EmptyField("email"));
    }
    if !is_valid_email(&email) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(email)
}

/// Registration and login against the user store.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepo>,
    keys: JwtKeys,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepo>, keys: JwtKeys) -> Self {
        Self { users, keys }
    }

    #[instrument(skip(self, password))]
    pub async fn register(&self, username: &str, email: &str, password: &str) -> AppResult<User> {
        let username = username.trim();
        if username.is_empty() {
            return Err(ValidationError::EmptyField("username").into());
        }
        let email = normalize_email(email)?;
        check_password_policy(password)?;

        if self
            .users
            .find_by_email(&email)
            .await
            .map_err(AppError::Store)?
            .is_some()
        {
            warn!(%email, "email already registered");
            return Err(ValidationError::EmailTaken.into());
        }

        let password_hash = hash_password(password).map_err(AppError::Internal)?;
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email,
            password_hash,
            created_at: OffsetDateTime::now_utc(),
            updated_at: None,
        };
        let user = self.users.create(&user).await.map_err(AppError::Store)?;
        info!(user_id = %user.id, email = %user.email, "user registered");
        Ok(user)
    }

    /// Returns a bearer token for valid credentials.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> AppResult<String> {
        let email = email.trim().to_lowercase();
        let user = self
            .users
            .find_by_email(&email)
            .await
            .map_err(AppError::Store)?
            .ok_or_else(|| {
                warn!(%email, "login unknown email");
                ValidationError::EmailNotFound
            })?;

        if !verify_password(password, &user.password_hash).map_err(AppError::Internal)? {
            warn!(user_id = %user.id, "login invalid password");
            return Err(ValidationError::WrongPassword.into());
        }

        let token = self.keys.issue(user.id).map_err(AppError::Internal)?;
        info!(user_id = %user.id, "user logged in");
        Ok(token)
    }
}
