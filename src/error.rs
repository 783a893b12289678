use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Input that was missing, empty or malformed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Diary content cannot be empty")]
    EmptyContent,
    #[error("no updatable fields provided")]
    NoFieldsProvided,
    #[error("{0} cannot be empty")]
    EmptyField(&'static str),
    #[error("password must be at least {0} characters")]
    PasswordTooShort(usize),
    #[error("Invalid email")]
    InvalidEmail,
    #[error("Email already exists")]
    EmailTaken,
    #[error("Email not found")]
    EmailNotFound,
    #[error("Wrong password")]
    WrongPassword,
    #[error("Invalid ID format")]
    InvalidId,
    #[error("Invalid request body")]
    InvalidBody(String),
}

/// Bearer token problems and identity mismatches.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Missing or invalid token")]
    MissingOrMalformed,
    #[error("Invalid or expired token")]
    InvalidOrExpired,
    #[error("user_id not found in token")]
    ClaimMissing,
    #[error("token does not match the requested account")]
    IdentityMismatch,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("Diary entry not found or not authorized")]
    NotFoundOrUnauthorized,
    #[error("user not found")]
    NotFound,
    #[error("store error: {0}")]
    Store(#[source] anyhow::Error),
    #[error("internal error: {0}")]
    Internal(#[source] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFoundOrUnauthorized | AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Store(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(ValidationError::InvalidBody(rejection.body_text()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AppError::Validation(ValidationError::InvalidBody(detail)) => json!({
                "message": self.to_string(),
                "error": detail,
            }),
            AppError::Store(e) => {
                error!(error = %e, "store failure");
                json!({ "message": "Database operation failed", "error": "internal error" })
            }
            AppError::Internal(e) => {
                error!(error = %e, "internal failure");
                json!({ "message": "Internal server error", "error": "internal error" })
            }
            _ => json!({ "message": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_taxonomy_to_status_codes() {
        assert_eq!(
            AppError::from(ValidationError::EmptyContent).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(AuthError::ClaimMissing).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AppError::NotFoundOrUnauthorized.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::Store(anyhow::anyhow!("connection reset")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn store_errors_do_not_leak_details() {
        let resp = AppError::Store(anyhow::anyhow!("relation users does not exist")).into_response();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(!text.contains("relation users"));
        assert!(text.contains("message"));
    }
}
