use thiserror::Error;

/// Domain error taxonomy. Every failure crossing a service boundary is one
/// of these variants; the HTTP gateway maps them onto wire status codes and
/// no storage- or framework-level error type leaks past this enum.
#[derive(Debug, Error)]
pub enum TimefoldError {
    // ── Lookup ───────────────────────────────────────────────────────────────
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    // ── Authorization ────────────────────────────────────────────────────────
    /// Principal failed an authorization gate. The message is the gate's
    /// reason text and is safe to surface to the caller.
    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Unauthorized(String),

    // ── Capsule lifecycle ────────────────────────────────────────────────────
    /// Attempted edge absent from the lifecycle DAG.
    #[error("{0}")]
    IllegalTransition(String),

    #[error("{0}")]
    InvalidUnlockTime(String),

    // ── Input validation ─────────────────────────────────────────────────────
    #[error("{0}")]
    InvalidInput(String),

    // ── Uniqueness / concurrent modification ─────────────────────────────────
    #[error("{0}")]
    Conflict(String),

    // ── Throttling ───────────────────────────────────────────────────────────
    #[error("too many requests")]
    RateLimited,

    // ── Serialization / storage ──────────────────────────────────────────────
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl TimefoldError {
    pub fn not_found(entity: &'static str) -> Self {
        TimefoldError::NotFound { entity }
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        TimefoldError::Forbidden(reason.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        TimefoldError::InvalidInput(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        TimefoldError::Conflict(msg.into())
    }
}
