//! Authentication endpoints: signup, login, token refresh, whoami.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use timefold_core::user::User;
use timefold_service::Signup;

use crate::error::ApiError;
use crate::extract::Principal;
use crate::schemas::{
    LoginRequest, RefreshRequest, SignupRequest, TokenResponse, UserResponse,
};
use crate::state::AppState;
use crate::token::{TokenKeys, KIND_REFRESH};

fn token_pair(state: &AppState, user: &User) -> Result<TokenResponse, ApiError> {
    let access = state.tokens.mint_access(user.id, &user.username)?;
    let refresh = state.tokens.mint_refresh(user.id, &user.username)?;
    Ok(TokenResponse::bearer(access, refresh))
}

/// `POST /auth/signup` — register an account, returning a token pair.
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.accounts.signup(Signup {
        email: request.email,
        username: request.username,
        password: request.password,
        full_name: request.full_name,
    })?;
    Ok((StatusCode::CREATED, Json(token_pair(&state, &user)?)))
}

/// `POST /auth/login` — exchange credentials (username or email) for tokens.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = state.accounts.login(&request.username, &request.password)?;
    Ok(Json(token_pair(&state, &user)?))
}

/// `POST /auth/refresh` — exchange a refresh token for a new pair.
pub async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let claims = state.tokens.verify(&request.refresh_token, KIND_REFRESH)?;
    let principal = TokenKeys::principal_of(&claims)?;
    let user = state.accounts.require_active(principal)?;
    Ok(Json(token_pair(&state, &user)?))
}

/// `GET /auth/me` — the authenticated principal's profile.
pub async fn me(Principal(user): Principal) -> Json<UserResponse> {
    Json(UserResponse::from(&user))
}
