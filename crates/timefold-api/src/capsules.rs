//! Capsule endpoints: the HTTP face of the capsule facade.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use timefold_core::capsule::CapsuleState;
use timefold_core::error::TimefoldError;
use timefold_core::types::CapsuleId;
use timefold_service::{CapsulePatch, ListBox, NewCapsule, PageParams};

use crate::error::ApiError;
use crate::extract::Principal;
use crate::schemas::{
    parse_instant, CapsuleCreateRequest, CapsuleListResponse, CapsuleResponse, CapsuleSealRequest,
    CapsuleUpdateRequest, MessageResponse,
};
use crate::state::AppState;

/// `POST /capsules` — create a draft capsule.
pub async fn create(
    State(state): State<AppState>,
    Principal(user): Principal,
    Json(request): Json<CapsuleCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let capsule = state.capsules.create_capsule(
        user.id,
        NewCapsule {
            receiver_id: request.receiver_id,
            title: request.title,
            body: request.body,
            media_urls: request.media_urls,
            theme: request.theme,
            allow_early_view: request.allow_early_view,
            allow_receiver_reply: request.allow_receiver_reply,
        },
    )?;
    Ok((StatusCode::CREATED, Json(CapsuleResponse::from(&capsule))))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(rename = "box", default)]
    pub list_box: Option<String>,
    pub state: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

/// `GET /capsules?box=inbox|outbox&state=…&page=…&page_size=…`
pub async fn list(
    State(state): State<AppState>,
    Principal(user): Principal,
    Query(query): Query<ListQuery>,
) -> Result<Json<CapsuleListResponse>, ApiError> {
    let list_box = match query.list_box.as_deref() {
        None | Some("inbox") => ListBox::Inbox,
        Some("outbox") => ListBox::Outbox,
        Some(other) => {
            return Err(ApiError(TimefoldError::invalid_input(format!(
                "Unknown box: {other} (expected inbox or outbox)"
            ))))
        }
    };

    let state_filter = query
        .state
        .as_deref()
        .map(|raw| {
            raw.parse::<CapsuleState>()
                .map_err(TimefoldError::InvalidInput)
        })
        .transpose()?;

    let params = PageParams::resolve(query.page, query.page_size, &state.settings)?;
    let page = state
        .capsules
        .list_capsules(user.id, list_box, state_filter, params)?;
    Ok(Json(CapsuleListResponse::from(page)))
}

/// `GET /capsules/{id}` — view one capsule; contents are gated.
pub async fn get(
    State(state): State<AppState>,
    Principal(user): Principal,
    Path(capsule_id): Path<CapsuleId>,
) -> Result<Json<CapsuleResponse>, ApiError> {
    let view = state.capsules.get_capsule(user.id, capsule_id)?;
    Ok(Json(CapsuleResponse::from(&view)))
}

/// `PUT /capsules/{id}` — patch a draft.
pub async fn update(
    State(state): State<AppState>,
    Principal(user): Principal,
    Path(capsule_id): Path<CapsuleId>,
    Json(request): Json<CapsuleUpdateRequest>,
) -> Result<Json<CapsuleResponse>, ApiError> {
    let patch = CapsulePatch {
        title: request.title,
        body: request.body,
        media_urls: request.media_urls,
        theme: request
            .theme
            .map(|t| if t.is_empty() { None } else { Some(t) }),
        allow_early_view: request.allow_early_view,
        allow_receiver_reply: request.allow_receiver_reply,
    };
    let capsule = state.capsules.update_capsule(user.id, capsule_id, patch)?;
    Ok(Json(CapsuleResponse::from(&capsule)))
}

/// `POST /capsules/{id}/seal` — bind the unlock instant.
pub async fn seal(
    State(state): State<AppState>,
    Principal(user): Principal,
    Path(capsule_id): Path<CapsuleId>,
    Json(request): Json<CapsuleSealRequest>,
) -> Result<Json<CapsuleResponse>, ApiError> {
    let unlock_at = parse_instant(&request.scheduled_unlock_at)?;
    let capsule = state.capsules.seal_capsule(user.id, capsule_id, unlock_at)?;
    Ok(Json(CapsuleResponse::from(&capsule)))
}

/// `POST /capsules/{id}/open` — the receiver's irreversible open.
pub async fn open(
    State(state): State<AppState>,
    Principal(user): Principal,
    Path(capsule_id): Path<CapsuleId>,
) -> Result<Json<CapsuleResponse>, ApiError> {
    let capsule = state.capsules.open_capsule(user.id, capsule_id)?;
    Ok(Json(CapsuleResponse::from(&capsule)))
}

/// `DELETE /capsules/{id}` — drafts only.
pub async fn delete(
    State(state): State<AppState>,
    Principal(user): Principal,
    Path(capsule_id): Path<CapsuleId>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.capsules.delete_capsule(user.id, capsule_id)?;
    Ok(Json(MessageResponse {
        message: "Capsule deleted successfully".to_string(),
    }))
}
