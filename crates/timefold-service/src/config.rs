use tracing::warn;

use timefold_core::constants::{
    DEFAULT_ACCESS_TOKEN_EXPIRE_MINUTES, DEFAULT_EARLY_VIEW_THRESHOLD_DAYS, DEFAULT_MAX_UNLOCK_YEARS,
    DEFAULT_MIN_UNLOCK_MINUTES, DEFAULT_PAGE_SIZE, DEFAULT_RATE_LIMIT_PER_MINUTE,
    DEFAULT_REFRESH_TOKEN_EXPIRE_DAYS, DEFAULT_WORKER_CHECK_INTERVAL_SECS, MAX_CONTENT_LENGTH,
    MAX_PAGE_SIZE, MAX_THEME_LENGTH, MAX_TITLE_LENGTH, MIN_PAGE_SIZE, SECS_PER_DAY,
    SECS_PER_MINUTE, SECS_PER_YEAR,
};
use timefold_lifecycle::UnlockWindows;

const DEV_SECRET_KEY: &str = "timefold-dev-secret-change-me";

/// Runtime configuration. Starts from the compiled defaults; every field can
/// be overridden through a `TIMEFOLD_`-prefixed environment variable of the
/// same name (e.g. `TIMEFOLD_MAX_UNLOCK_YEARS=10`).
#[derive(Clone, Debug)]
pub struct Settings {
    // Unlock windows
    pub min_unlock_minutes: i64,
    pub max_unlock_years: i64,
    pub early_view_threshold_days: i64,

    // Background worker
    pub worker_check_interval_seconds: u64,

    // Pagination
    pub default_page_size: usize,
    pub max_page_size: usize,
    pub min_page_size: usize,

    // Content limits
    pub max_title_length: usize,
    pub max_content_length: usize,
    pub max_theme_length: usize,

    // Tokens / throttling
    pub access_token_expire_minutes: i64,
    pub refresh_token_expire_days: i64,
    pub rate_limit_per_minute: u32,
    pub secret_key: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            min_unlock_minutes: DEFAULT_MIN_UNLOCK_MINUTES,
            max_unlock_years: DEFAULT_MAX_UNLOCK_YEARS,
            early_view_threshold_days: DEFAULT_EARLY_VIEW_THRESHOLD_DAYS,
            worker_check_interval_seconds: DEFAULT_WORKER_CHECK_INTERVAL_SECS,
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
            min_page_size: MIN_PAGE_SIZE,
            max_title_length: MAX_TITLE_LENGTH,
            max_content_length: MAX_CONTENT_LENGTH,
            max_theme_length: MAX_THEME_LENGTH,
            access_token_expire_minutes: DEFAULT_ACCESS_TOKEN_EXPIRE_MINUTES,
            refresh_token_expire_days: DEFAULT_REFRESH_TOKEN_EXPIRE_DAYS,
            rate_limit_per_minute: DEFAULT_RATE_LIMIT_PER_MINUTE,
            secret_key: DEV_SECRET_KEY.to_string(),
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!(var = name, value = %raw, "unparseable environment override ignored");
            default
        }),
        Err(_) => default,
    }
}

impl Settings {
    /// Defaults overlaid with `TIMEFOLD_*` environment variables.
    pub fn from_env() -> Self {
        let d = Settings::default();
        let settings = Self {
            min_unlock_minutes: env_parse("TIMEFOLD_MIN_UNLOCK_MINUTES", d.min_unlock_minutes),
            max_unlock_years: env_parse("TIMEFOLD_MAX_UNLOCK_YEARS", d.max_unlock_years),
            early_view_threshold_days: env_parse(
                "TIMEFOLD_EARLY_VIEW_THRESHOLD_DAYS",
                d.early_view_threshold_days,
            ),
            worker_check_interval_seconds: env_parse(
                "TIMEFOLD_WORKER_CHECK_INTERVAL_SECONDS",
                d.worker_check_interval_seconds,
            ),
            default_page_size: env_parse("TIMEFOLD_DEFAULT_PAGE_SIZE", d.default_page_size),
            max_page_size: env_parse("TIMEFOLD_MAX_PAGE_SIZE", d.max_page_size),
            min_page_size: env_parse("TIMEFOLD_MIN_PAGE_SIZE", d.min_page_size),
            max_title_length: env_parse("TIMEFOLD_MAX_TITLE_LENGTH", d.max_title_length),
            max_content_length: env_parse("TIMEFOLD_MAX_CONTENT_LENGTH", d.max_content_length),
            max_theme_length: env_parse("TIMEFOLD_MAX_THEME_LENGTH", d.max_theme_length),
            access_token_expire_minutes: env_parse(
                "TIMEFOLD_ACCESS_TOKEN_EXPIRE_MINUTES",
                d.access_token_expire_minutes,
            ),
            refresh_token_expire_days: env_parse(
                "TIMEFOLD_REFRESH_TOKEN_EXPIRE_DAYS",
                d.refresh_token_expire_days,
            ),
            rate_limit_per_minute: env_parse(
                "TIMEFOLD_RATE_LIMIT_PER_MINUTE",
                d.rate_limit_per_minute,
            ),
            secret_key: std::env::var("TIMEFOLD_SECRET_KEY").unwrap_or(d.secret_key),
        };

        if settings.secret_key == DEV_SECRET_KEY {
            warn!("using the development secret key — set TIMEFOLD_SECRET_KEY in production");
        }
        settings
    }

    /// The lifecycle windows derived from this configuration.
    pub fn unlock_windows(&self) -> UnlockWindows {
        UnlockWindows {
            min_unlock_secs: self.min_unlock_minutes * SECS_PER_MINUTE,
            max_unlock_secs: self.max_unlock_years * SECS_PER_YEAR,
            early_view_threshold_secs: self.early_view_threshold_days * SECS_PER_DAY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_windows() {
        let s = Settings::default();
        let w = s.unlock_windows();
        assert_eq!(w.min_unlock_secs, 60);
        assert_eq!(w.max_unlock_secs, 5 * 365 * 86_400);
        assert_eq!(w.early_view_threshold_secs, 3 * 86_400);
        assert_eq!(s.default_page_size, 20);
        assert_eq!(s.max_page_size, 100);
    }
}
