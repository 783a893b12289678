use serde::{Deserialize, Serialize};

/// JWT payload minted at login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: String, // user ID (uuid, hyphenated)
    pub iat: usize,      // issued at (unix timestamp)
    pub exp: usize,      // expires at (unix timestamp)
}

/// Decoding view of the payload. `user_id` stays loosely typed so a token
/// with a missing or non-string claim is told apart from a bad signature.
#[derive(Debug, Deserialize)]
pub(crate) struct DecodedClaims {
    #[serde(default)]
    pub user_id: Option<serde_json::Value>,
}
