//! ─── Timefold service constants ─────────────────────────────────────────────
//!
//! Defaults for the unlock windows, content limits, pagination and token
//! lifetimes. Runtime configuration (`timefold-service::Settings`) starts
//! from these values and may override them from the environment.

// ── Time units ───────────────────────────────────────────────────────────────

pub const SECS_PER_MINUTE: i64 = 60;
pub const SECS_PER_DAY: i64 = 86_400;

/// Calendar-free year used for the maximum-unlock horizon (365 days).
pub const SECS_PER_YEAR: i64 = 365 * SECS_PER_DAY;

// ── Unlock windows ───────────────────────────────────────────────────────────

/// Minimum distance of an unlock instant from "now" at seal time (T_min).
pub const DEFAULT_MIN_UNLOCK_MINUTES: i64 = 1;

/// Maximum distance of an unlock instant from "now" at seal time (T_max).
pub const DEFAULT_MAX_UNLOCK_YEARS: i64 = 5;

/// Interval before the unlock instant during which a sealed capsule enters
/// the `unfolding` teaser phase (T_early).
pub const DEFAULT_EARLY_VIEW_THRESHOLD_DAYS: i64 = 3;

/// Period of the background unlock sweep.
pub const DEFAULT_WORKER_CHECK_INTERVAL_SECS: u64 = 60;

// ── Content limits ───────────────────────────────────────────────────────────

pub const MAX_TITLE_LENGTH: usize = 255;
pub const MAX_CONTENT_LENGTH: usize = 10_000;
pub const MAX_THEME_LENGTH: usize = 50;
pub const MAX_NAME_LENGTH: usize = 255;
pub const MAX_EMAIL_LENGTH: usize = 254;
pub const MAX_URL_LENGTH: usize = 500;

/// Content bounds for the short self-letter format.
pub const MIN_SELF_LETTER_CHARS: usize = 20;
pub const MAX_SELF_LETTER_CHARS: usize = 500;

// ── Credentials ──────────────────────────────────────────────────────────────

pub const MIN_USERNAME_LENGTH: usize = 3;
pub const MAX_USERNAME_LENGTH: usize = 100;
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Upper bound on password length in bytes (hash input cap).
pub const MAX_PASSWORD_BYTES: usize = 72;

// ── Pagination ───────────────────────────────────────────────────────────────

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: usize = 100;
pub const MIN_PAGE_SIZE: usize = 1;

// ── Tokens / rate limiting ───────────────────────────────────────────────────

pub const DEFAULT_ACCESS_TOKEN_EXPIRE_MINUTES: i64 = 30;
pub const DEFAULT_REFRESH_TOKEN_EXPIRE_DAYS: i64 = 7;
pub const DEFAULT_RATE_LIMIT_PER_MINUTE: u32 = 60;
