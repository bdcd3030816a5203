//! Bearer token minting and verification (HS256).
//!
//! Access tokens authenticate requests; refresh tokens only mint new pairs.
//! The two are distinguished by a `kind` claim so one can never stand in for
//! the other.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use timefold_core::error::TimefoldError;
use timefold_core::types::UserId;
use timefold_service::Settings;

pub const KIND_ACCESS: &str = "access";
pub const KIND_REFRESH: &str = "refresh";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Principal id (UUID).
    pub sub: String,
    pub username: String,
    /// Expiry, Unix seconds.
    pub exp: i64,
    /// `access` or `refresh`.
    pub kind: String,
}

pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
}

impl TokenKeys {
    pub fn new(settings: &Settings) -> Self {
        Self {
            encoding: EncodingKey::from_secret(settings.secret_key.as_bytes()),
            decoding: DecodingKey::from_secret(settings.secret_key.as_bytes()),
            access_ttl_secs: settings.access_token_expire_minutes * 60,
            refresh_ttl_secs: settings.refresh_token_expire_days * 86_400,
        }
    }

    pub fn mint_access(&self, user_id: UserId, username: &str) -> Result<String, TimefoldError> {
        self.mint(user_id, username, KIND_ACCESS, self.access_ttl_secs)
    }

    pub fn mint_refresh(&self, user_id: UserId, username: &str) -> Result<String, TimefoldError> {
        self.mint(user_id, username, KIND_REFRESH, self.refresh_ttl_secs)
    }

    fn mint(
        &self,
        user_id: UserId,
        username: &str,
        kind: &str,
        ttl_secs: i64,
    ) -> Result<String, TimefoldError> {
        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            exp: chrono::Utc::now().timestamp() + ttl_secs,
            kind: kind.to_string(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| TimefoldError::Internal(format!("token encoding failed: {e}")))
    }

    /// Decode and validate a token of the expected kind, returning the
    /// principal id it names.
    pub fn verify(&self, token: &str, expected_kind: &str) -> Result<Claims, TimefoldError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(|_| TimefoldError::Unauthorized("Invalid authentication credentials".into()))?;
        if data.claims.kind != expected_kind {
            return Err(TimefoldError::Unauthorized("Invalid token type".into()));
        }
        Ok(data.claims)
    }

    pub fn principal_of(claims: &Claims) -> Result<UserId, TimefoldError> {
        claims
            .sub
            .parse()
            .map_err(|_| TimefoldError::Unauthorized("Invalid token payload".into()))
    }
}
