use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, warn};
use uuid::Uuid;

use super::claims::{Claims, DecodedClaims};
use crate::{config::JwtConfig, error::AuthError, state::AppState};

/// HS256 signing and verification keys plus token lifetime.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.jwt.clone()
    }
}

impl JwtKeys {
    pub fn from_config(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            ttl: Duration::from_secs((cfg.ttl_hours.max(0) as u64) * 60 * 60),
        }
    }

    pub fn issue(&self, user_id: Uuid) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = Claims {
            user_id: user_id.to_string(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(%user_id, "jwt signed");
        Ok(token)
    }

    /// Checks signature and expiry, then pulls the owning user out of the
    /// `user_id` claim.
    pub fn verify(&self, token: &str) -> Result<Uuid, AuthError> {
        let data = decode::<DecodedClaims>(token, &self.decoding, &Validation::default())
            .map_err(|e| {
                warn!(error = %e, "invalid or expired token");
                AuthError::InvalidOrExpired
            })?;

        let user_id = data
            .claims
            .user_id
            .as_ref()
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .ok_or(AuthError::ClaimMissing)?;

        let user_id = Uuid::parse_str(user_id).map_err(|_| AuthError::ClaimMissing)?;
        debug!(%user_id, "jwt verified");
        Ok(user_id)
    }
}
