use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use timefold_core::error::TimefoldError;

/// JSON error body: `{ "error": "<reason>" }`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Transport wrapper around the domain error taxonomy. Every handler
/// returns `Result<_, ApiError>`; the mapping below is the single place
/// where domain errors become wire status codes.
#[derive(Debug)]
pub struct ApiError(pub TimefoldError);

impl From<TimefoldError> for ApiError {
    fn from(err: TimefoldError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            TimefoldError::NotFound { .. } => (StatusCode::NOT_FOUND, self.0.to_string()),
            TimefoldError::Forbidden(_) => (StatusCode::FORBIDDEN, self.0.to_string()),
            TimefoldError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, self.0.to_string()),
            TimefoldError::IllegalTransition(_)
            | TimefoldError::InvalidUnlockTime(_)
            | TimefoldError::InvalidInput(_) => (StatusCode::BAD_REQUEST, self.0.to_string()),
            TimefoldError::Conflict(_) => (StatusCode::CONFLICT, self.0.to_string()),
            TimefoldError::RateLimited => (StatusCode::TOO_MANY_REQUESTS, self.0.to_string()),
            TimefoldError::Serialization(_)
            | TimefoldError::Storage(_)
            | TimefoldError::Internal(_) => {
                error!(error = %self.0, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorBody { error: message });
        if status == StatusCode::UNAUTHORIZED {
            (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_covers_the_taxonomy() {
        let cases: Vec<(TimefoldError, StatusCode)> = vec![
            (TimefoldError::not_found("capsule"), StatusCode::NOT_FOUND),
            (TimefoldError::forbidden("no"), StatusCode::FORBIDDEN),
            (
                TimefoldError::Unauthorized("bad token".into()),
                StatusCode::UNAUTHORIZED,
            ),
            (
                TimefoldError::IllegalTransition("nope".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                TimefoldError::InvalidUnlockTime("too soon".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                TimefoldError::invalid_input("bad"),
                StatusCode::BAD_REQUEST,
            ),
            (TimefoldError::conflict("dup"), StatusCode::CONFLICT),
            (TimefoldError::RateLimited, StatusCode::TOO_MANY_REQUESTS),
            (
                TimefoldError::Storage("disk".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            let response = ApiError(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }
}
