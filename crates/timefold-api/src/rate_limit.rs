//! Per-client sliding-window rate limiting.
//!
//! In-memory, one window per client address. Suitable for a single-process
//! deployment, which is the only deployment shape the state machine supports
//! anyway (the store is exclusively locked by one process).

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::Response;

use timefold_core::error::TimefoldError;

use crate::error::ApiError;
use crate::state::AppState;

const WINDOW: Duration = Duration::from_secs(60);

/// How many requests each client may make per minute.
pub struct RateLimiter {
    limit: u32,
    windows: Mutex<HashMap<IpAddr, Vec<Instant>>>,
}

impl RateLimiter {
    pub fn new(limit_per_minute: u32) -> Self {
        Self {
            limit: limit_per_minute,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Record one request from `client` and decide whether it is allowed.
    pub fn check(&self, client: IpAddr) -> bool {
        let now = Instant::now();
        let mut windows = self.windows.lock().expect("rate limiter lock");

        // Drop clients whose whole window has aged out so the map cannot
        // grow without bound.
        windows.retain(|_, hits| hits.iter().any(|t| now.duration_since(*t) < WINDOW));

        let hits = windows.entry(client).or_default();
        hits.retain(|t| now.duration_since(*t) < WINDOW);
        if hits.len() >= self.limit as usize {
            return false;
        }
        hits.push(now);
        true
    }
}

/// Axum middleware enforcing the limiter. Clients without a resolvable peer
/// address (e.g. in-process test harnesses) share one bucket.
pub async fn rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));

    if !state.limiter.check(client) {
        return Err(ApiError(TimefoldError::RateLimited));
    }
    Ok(next.run(request).await)
}
