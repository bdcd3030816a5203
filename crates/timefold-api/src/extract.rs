use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use timefold_core::error::TimefoldError;
use timefold_core::user::User;

use crate::error::ApiError;
use crate::state::AppState;
use crate::token::{TokenKeys, KIND_ACCESS};

/// The authenticated, active account behind a request. Extracting this from
/// a request performs the full bearer-token check: header shape, signature,
/// expiry, token kind, account existence and `is_active` — all before any
/// handler logic runs.
pub struct Principal(pub User);

impl FromRequestParts<AppState> for Principal {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                ApiError(TimefoldError::Unauthorized(
                    "Missing authorization header".into(),
                ))
            })?;

        let token = header.strip_prefix("Bearer ").ok_or_else(|| {
            ApiError(TimefoldError::Unauthorized(
                "Authorization header must be a bearer token".into(),
            ))
        })?;

        let claims = state.tokens.verify(token, KIND_ACCESS)?;
        let principal = TokenKeys::principal_of(&claims)?;
        let user = state.accounts.require_active(principal)?;
        Ok(Principal(user))
    }
}
