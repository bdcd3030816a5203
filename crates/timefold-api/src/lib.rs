//! timefold-api
//!
//! The HTTP gateway: an axum router over the service layer. This crate owns
//! everything wire-shaped — bearer-token parsing, JSON schemas, RFC 3339
//! timestamp conversion, status-code mapping and rate limiting — and keeps
//! the service layer free of transport concerns.

pub mod auth;
pub mod capsules;
pub mod drafts;
pub mod error;
pub mod extract;
pub mod rate_limit;
pub mod recipients;
pub mod schemas;
pub mod self_letters;
pub mod server;
pub mod state;
pub mod token;

pub use error::ApiError;
pub use server::router;
pub use state::AppState;
