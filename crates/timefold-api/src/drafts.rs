//! Draft endpoints: owner-private scratchpads.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use timefold_core::types::DraftId;
use timefold_service::{DraftPatch, NewDraft, PageParams};

use crate::error::ApiError;
use crate::extract::Principal;
use crate::schemas::{
    DraftCreateRequest, DraftListResponse, DraftResponse, DraftUpdateRequest, MessageResponse,
};
use crate::state::AppState;

/// `POST /drafts`
pub async fn create(
    State(state): State<AppState>,
    Principal(user): Principal,
    Json(request): Json<DraftCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let draft = state.drafts.create(
        user.id,
        NewDraft {
            title: request.title,
            body: request.body,
            media_urls: request.media_urls,
            theme: request.theme,
            recipient_id: request.recipient_id,
        },
    )?;
    Ok((StatusCode::CREATED, Json(DraftResponse::from(&draft))))
}

#[derive(Debug, Deserialize)]
pub struct DraftListQuery {
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

/// `GET /drafts` — the owner's drafts, most recently updated first.
pub async fn list(
    State(state): State<AppState>,
    Principal(user): Principal,
    Query(query): Query<DraftListQuery>,
) -> Result<Json<DraftListResponse>, ApiError> {
    let params = PageParams::resolve(query.page, query.page_size, &state.settings)?;
    let page = state.drafts.list(user.id, params)?;
    Ok(Json(DraftListResponse {
        drafts: page.items.iter().map(DraftResponse::from).collect(),
        total: page.total,
        page: page.page,
        page_size: page.page_size,
    }))
}

/// `GET /drafts/{id}`
pub async fn get(
    State(state): State<AppState>,
    Principal(user): Principal,
    Path(draft_id): Path<DraftId>,
) -> Result<Json<DraftResponse>, ApiError> {
    let draft = state.drafts.get(user.id, draft_id)?;
    Ok(Json(DraftResponse::from(&draft)))
}

/// `PUT /drafts/{id}`
pub async fn update(
    State(state): State<AppState>,
    Principal(user): Principal,
    Path(draft_id): Path<DraftId>,
    Json(request): Json<DraftUpdateRequest>,
) -> Result<Json<DraftResponse>, ApiError> {
    let patch = DraftPatch {
        title: request.title,
        body: request.body,
        media_urls: request.media_urls,
        theme: request
            .theme
            .map(|t| if t.is_empty() { None } else { Some(t) }),
        recipient_id: request
            .recipient_id
            .map(|id| if id.0.is_nil() { None } else { Some(id) }),
    };
    let draft = state.drafts.update(user.id, draft_id, patch)?;
    Ok(Json(DraftResponse::from(&draft)))
}

/// `DELETE /drafts/{id}`
pub async fn delete(
    State(state): State<AppState>,
    Principal(user): Principal,
    Path(draft_id): Path<DraftId>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.drafts.delete(user.id, draft_id)?;
    Ok(Json(MessageResponse {
        message: "Draft deleted successfully".to_string(),
    }))
}
