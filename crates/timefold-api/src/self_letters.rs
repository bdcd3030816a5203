//! Self letter endpoints: sealed-on-create notes to one's future self.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use timefold_core::types::SelfLetterId;
use timefold_service::{NewSelfLetter, PageParams};

use crate::error::ApiError;
use crate::extract::Principal;
use crate::schemas::{
    parse_instant, SelfLetterCreateRequest, SelfLetterListResponse, SelfLetterReflectionRequest,
    SelfLetterResponse,
};
use crate::state::AppState;

/// `POST /self-letters` — write a letter; it is sealed immediately and can
/// never be edited or deleted.
pub async fn create(
    State(state): State<AppState>,
    Principal(user): Principal,
    Json(request): Json<SelfLetterCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let scheduled_open_at = parse_instant(&request.scheduled_open_at)?;
    let view = state.self_letters.create(
        user.id,
        NewSelfLetter {
            title: request.title,
            content: request.content,
            mood: request.mood,
            life_area: request.life_area,
            city: request.city,
            scheduled_open_at,
        },
    )?;
    Ok((StatusCode::CREATED, Json(SelfLetterResponse::from(&view))))
}

#[derive(Debug, Deserialize)]
pub struct SelfLetterListQuery {
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

/// `GET /self-letters` — the owner's letters, newest first, contents gated
/// per letter by its scheduled open instant.
pub async fn list(
    State(state): State<AppState>,
    Principal(user): Principal,
    Query(query): Query<SelfLetterListQuery>,
) -> Result<Json<SelfLetterListResponse>, ApiError> {
    let params = PageParams::resolve(query.page, query.page_size, &state.settings)?;
    let page = state.self_letters.list(user.id, params)?;
    Ok(Json(SelfLetterListResponse {
        letters: page.items.iter().map(SelfLetterResponse::from).collect(),
        total: page.total,
        page: page.page,
        page_size: page.page_size,
    }))
}

/// `GET /self-letters/{id}`
pub async fn get(
    State(state): State<AppState>,
    Principal(user): Principal,
    Path(letter_id): Path<SelfLetterId>,
) -> Result<Json<SelfLetterResponse>, ApiError> {
    let view = state.self_letters.get(user.id, letter_id)?;
    Ok(Json(SelfLetterResponse::from(&view)))
}

/// `POST /self-letters/{id}/open` — only after the scheduled instant.
pub async fn open(
    State(state): State<AppState>,
    Principal(user): Principal,
    Path(letter_id): Path<SelfLetterId>,
) -> Result<Json<SelfLetterResponse>, ApiError> {
    let view = state.self_letters.open(user.id, letter_id)?;
    Ok(Json(SelfLetterResponse::from(&view)))
}

/// `POST /self-letters/{id}/reflection` — one-time, after opening.
pub async fn reflect(
    State(state): State<AppState>,
    Principal(user): Principal,
    Path(letter_id): Path<SelfLetterId>,
    Json(request): Json<SelfLetterReflectionRequest>,
) -> Result<Json<SelfLetterResponse>, ApiError> {
    let view = state
        .self_letters
        .reflect(user.id, letter_id, request.answer)?;
    Ok(Json(SelfLetterResponse::from(&view)))
}
