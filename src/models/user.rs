use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::errors::FileClientError;

/// A signed-in user: whose files to browse and the bearer token to send.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub token: String,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Claims read from the bearer token when no user id is configured.
#[derive(Debug, Deserialize)]
pub struct TokenClaims {
    pub sub: Option<String>,
    pub uid: Option<String>,
}

impl Session {
    pub fn new(user_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            token: token.into(),
        }
    }

    /// Derives the session from a JWT bearer token, taking the user id from the
    /// `uid` claim or, failing that, `sub`. The signature is not checked here;
    /// the file server verifies the token on every request.
    pub fn from_token(token: &str) -> Result<Self, FileClientError> {
        let mut validation = Validation::default();
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let data = decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)
            .map_err(|e| FileClientError::configuration(format!("Unreadable bearer token: {}", e)))?;

        let user_id = data
            .claims
            .uid
            .or(data.claims.sub)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| FileClientError::configuration("Bearer token carries no user id"))?;

        Ok(Self::new(user_id, token))
    }
}

/// User details posted to the account registration endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetails {
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}
