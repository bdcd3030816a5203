//! Recipient endpoints: the owner's contact book.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use timefold_core::types::RecipientId;
use timefold_service::NewRecipient;

use crate::error::ApiError;
use crate::extract::Principal;
use crate::schemas::{MessageResponse, RecipientCreateRequest, RecipientResponse};
use crate::state::AppState;

/// `POST /recipients`
pub async fn create(
    State(state): State<AppState>,
    Principal(user): Principal,
    Json(request): Json<RecipientCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let recipient = state.recipients.create(
        user.id,
        NewRecipient {
            name: request.name,
            email: request.email,
            user_id: request.user_id,
        },
    )?;
    Ok((StatusCode::CREATED, Json(RecipientResponse::from(&recipient))))
}

/// `GET /recipients`
pub async fn list(
    State(state): State<AppState>,
    Principal(user): Principal,
) -> Result<Json<Vec<RecipientResponse>>, ApiError> {
    let recipients = state.recipients.list(user.id)?;
    Ok(Json(recipients.iter().map(RecipientResponse::from).collect()))
}

/// `GET /recipients/{id}`
pub async fn get(
    State(state): State<AppState>,
    Principal(user): Principal,
    Path(recipient_id): Path<RecipientId>,
) -> Result<Json<RecipientResponse>, ApiError> {
    let recipient = state.recipients.get(user.id, recipient_id)?;
    Ok(Json(RecipientResponse::from(&recipient)))
}

/// `DELETE /recipients/{id}`
pub async fn delete(
    State(state): State<AppState>,
    Principal(user): Principal,
    Path(recipient_id): Path<RecipientId>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.recipients.delete(user.id, recipient_id)?;
    Ok(Json(MessageResponse {
        message: "Recipient deleted successfully".to_string(),
    }))
}
