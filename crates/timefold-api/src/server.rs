use std::future::Future;
use std::net::SocketAddr;

use axum::routing::{get, post};
use axum::{middleware, Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::rate_limit::rate_limit;
use crate::schemas::HealthResponse;
use crate::state::AppState;
use crate::{auth, capsules, drafts, recipients, self_letters};

/// `GET /healthz` — liveness probe.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Assemble the full application router with permissive CORS, request
/// tracing and rate limiting.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    Router::new()
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/me", get(auth::me))
        .route("/capsules", post(capsules::create).get(capsules::list))
        .route(
            "/capsules/{id}",
            get(capsules::get)
                .put(capsules::update)
                .delete(capsules::delete),
        )
        .route("/capsules/{id}/seal", post(capsules::seal))
        .route("/capsules/{id}/open", post(capsules::open))
        .route("/drafts", post(drafts::create).get(drafts::list))
        .route(
            "/drafts/{id}",
            get(drafts::get).put(drafts::update).delete(drafts::delete),
        )
        .route("/recipients", post(recipients::create).get(recipients::list))
        .route(
            "/recipients/{id}",
            get(recipients::get).delete(recipients::delete),
        )
        .route(
            "/self-letters",
            post(self_letters::create).get(self_letters::list),
        )
        .route("/self-letters/{id}", get(self_letters::get))
        .route("/self-letters/{id}/open", post(self_letters::open))
        .route(
            "/self-letters/{id}/reflection",
            post(self_letters::reflect),
        )
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit))
        // Liveness probes sit outside the rate limiter.
        .route("/healthz", get(health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the API on an already-bound listener until `shutdown` resolves.
pub async fn serve(
    listener: tokio::net::TcpListener,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    info!(%addr, "HTTP server started");
    axum::serve(
        listener,
        router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await
}
