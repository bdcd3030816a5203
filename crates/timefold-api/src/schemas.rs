//! Wire schemas and timestamp conversion.
//!
//! Instants travel as RFC 3339 strings. Inputs with a UTC offset are
//! converted; inputs without one are interpreted as UTC.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use timefold_core::capsule::{Capsule, CapsuleState, Draft, Recipient};
use timefold_core::error::TimefoldError;
use timefold_core::self_letter::{LifeArea, ReflectionAnswer};
use timefold_core::types::{CapsuleId, DraftId, RecipientId, SelfLetterId, Timestamp, UserId};
use timefold_core::user::User;
use timefold_service::{CapsuleView, Page, SelfLetterView};

// ── Instant conversion ───────────────────────────────────────────────────────

pub fn parse_instant(raw: &str) -> Result<Timestamp, TimefoldError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc).timestamp());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc().timestamp());
        }
    }
    Err(TimefoldError::invalid_input(format!(
        "Invalid datetime: {raw} (expected RFC 3339, e.g. 2030-01-01T00:00:00Z)"
    )))
}

pub fn format_instant(t: Timestamp) -> String {
    DateTime::<Utc>::from_timestamp(t, 0)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_default()
}

fn format_opt(t: Option<Timestamp>) -> Option<String> {
    t.map(format_instant)
}

fn default_true() -> bool {
    true
}

// ── Auth ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    pub full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username or email address.
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String, refresh_token: String) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: "bearer".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: UserId,
    pub email: String,
    pub username: String,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub created_at: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            is_active: user.is_active,
            created_at: format_instant(user.created_at),
        }
    }
}

// ── Capsules ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CapsuleCreateRequest {
    pub receiver_id: UserId,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub media_urls: Vec<String>,
    pub theme: Option<String>,
    #[serde(default)]
    pub allow_early_view: bool,
    #[serde(default = "default_true")]
    pub allow_receiver_reply: bool,
}

/// Absent fields are left untouched; an empty-string theme clears it.
#[derive(Debug, Default, Deserialize)]
pub struct CapsuleUpdateRequest {
    pub title: Option<String>,
    pub body: Option<String>,
    pub media_urls: Option<Vec<String>>,
    pub theme: Option<String>,
    pub allow_early_view: Option<bool>,
    pub allow_receiver_reply: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct CapsuleSealRequest {
    /// The unlock instant (RFC 3339; offset-free values are UTC).
    pub scheduled_unlock_at: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CapsuleResponse {
    pub id: CapsuleId,
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub title: String,
    pub theme: Option<String>,
    pub state: CapsuleState,
    pub created_at: String,
    pub sealed_at: Option<String>,
    pub scheduled_unlock_at: Option<String>,
    pub opened_at: Option<String>,
    pub allow_early_view: bool,
    pub allow_receiver_reply: bool,
    /// Absent entirely when the projection is metadata-only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_urls: Option<Vec<String>>,
}

impl From<&Capsule> for CapsuleResponse {
    /// Full projection — used on mutation responses, which only ever go to
    /// a principal allowed to see the contents.
    fn from(c: &Capsule) -> Self {
        Self {
            id: c.id,
            sender_id: c.sender_id,
            receiver_id: c.receiver_id,
            title: c.title.clone(),
            theme: c.theme.clone(),
            state: c.state,
            created_at: format_instant(c.created_at),
            sealed_at: format_opt(c.sealed_at),
            scheduled_unlock_at: format_opt(c.scheduled_unlock_at),
            opened_at: format_opt(c.opened_at),
            allow_early_view: c.allow_early_view,
            allow_receiver_reply: c.allow_receiver_reply,
            body: Some(c.body.clone()),
            media_urls: Some(c.media_urls.clone()),
        }
    }
}

impl From<&CapsuleView> for CapsuleResponse {
    fn from(v: &CapsuleView) -> Self {
        Self {
            id: v.id,
            sender_id: v.sender_id,
            receiver_id: v.receiver_id,
            title: v.title.clone(),
            theme: v.theme.clone(),
            state: v.state,
            created_at: format_instant(v.created_at),
            sealed_at: format_opt(v.sealed_at),
            scheduled_unlock_at: format_opt(v.scheduled_unlock_at),
            opened_at: format_opt(v.opened_at),
            allow_early_view: v.allow_early_view,
            allow_receiver_reply: v.allow_receiver_reply,
            body: v.body.clone(),
            media_urls: v.media_urls.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CapsuleListResponse {
    pub capsules: Vec<CapsuleResponse>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}

impl From<Page<CapsuleView>> for CapsuleListResponse {
    fn from(page: Page<CapsuleView>) -> Self {
        Self {
            capsules: page.items.iter().map(CapsuleResponse::from).collect(),
            total: page.total,
            page: page.page,
            page_size: page.page_size,
        }
    }
}

// ── Drafts ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DraftCreateRequest {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub media_urls: Vec<String>,
    pub theme: Option<String>,
    pub recipient_id: Option<RecipientId>,
}

/// Absent fields are left untouched; an empty-string theme clears it and the
/// nil UUID detaches the recipient.
#[derive(Debug, Default, Deserialize)]
pub struct DraftUpdateRequest {
    pub title: Option<String>,
    pub body: Option<String>,
    pub media_urls: Option<Vec<String>>,
    pub theme: Option<String>,
    pub recipient_id: Option<RecipientId>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DraftResponse {
    pub id: DraftId,
    pub title: String,
    pub body: String,
    pub media_urls: Vec<String>,
    pub theme: Option<String>,
    pub recipient_id: Option<RecipientId>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Draft> for DraftResponse {
    fn from(d: &Draft) -> Self {
        Self {
            id: d.id,
            title: d.title.clone(),
            body: d.body.clone(),
            media_urls: d.media_urls.clone(),
            theme: d.theme.clone(),
            recipient_id: d.recipient_id,
            created_at: format_instant(d.created_at),
            updated_at: format_instant(d.updated_at),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DraftListResponse {
    pub drafts: Vec<DraftResponse>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}

// ── Recipients ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RecipientCreateRequest {
    pub name: String,
    pub email: Option<String>,
    pub user_id: Option<UserId>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecipientResponse {
    pub id: RecipientId,
    pub name: String,
    pub email: Option<String>,
    pub user_id: Option<UserId>,
    pub created_at: String,
}

impl From<&Recipient> for RecipientResponse {
    fn from(r: &Recipient) -> Self {
        Self {
            id: r.id,
            name: r.name.clone(),
            email: r.email.clone(),
            user_id: r.user_id,
            created_at: format_instant(r.created_at),
        }
    }
}

// ── Self letters ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SelfLetterCreateRequest {
    pub title: Option<String>,
    pub content: String,
    pub mood: Option<String>,
    pub life_area: Option<LifeArea>,
    pub city: Option<String>,
    /// The instant the content becomes readable again (RFC 3339).
    pub scheduled_open_at: String,
}

#[derive(Debug, Deserialize)]
pub struct SelfLetterReflectionRequest {
    pub answer: ReflectionAnswer,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SelfLetterResponse {
    pub id: SelfLetterId,
    pub title: Option<String>,
    /// Absent until the scheduled open instant passes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub char_count: usize,
    pub mood: Option<String>,
    pub life_area: Option<LifeArea>,
    pub city: Option<String>,
    pub scheduled_open_at: String,
    pub opened_at: Option<String>,
    pub reflection_answer: Option<ReflectionAnswer>,
    pub reflected_at: Option<String>,
    pub created_at: String,
}

impl From<&SelfLetterView> for SelfLetterResponse {
    fn from(view: &SelfLetterView) -> Self {
        let letter = &view.letter;
        Self {
            id: letter.id,
            title: letter.title.clone(),
            content: view.content_visible.then(|| letter.content.clone()),
            char_count: letter.char_count,
            mood: letter.mood.clone(),
            life_area: letter.life_area,
            city: letter.city.clone(),
            scheduled_open_at: format_instant(letter.scheduled_open_at),
            opened_at: format_opt(letter.opened_at),
            reflection_answer: letter.reflection_answer,
            reflected_at: format_opt(letter.reflected_at),
            created_at: format_instant(letter.created_at),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SelfLetterListResponse {
    pub letters: Vec<SelfLetterResponse>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}

// ── Misc ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc3339_with_offset_converts_to_utc() {
        let t = parse_instant("2030-01-01T02:00:00+02:00").unwrap();
        assert_eq!(t, parse_instant("2030-01-01T00:00:00Z").unwrap());
    }

    #[test]
    fn naive_instants_are_read_as_utc() {
        let naive = parse_instant("2030-01-01T00:00:00").unwrap();
        let aware = parse_instant("2030-01-01T00:00:00Z").unwrap();
        assert_eq!(naive, aware);
    }

    #[test]
    fn nonsense_instants_are_invalid_input() {
        assert!(matches!(
            parse_instant("next tuesday"),
            Err(TimefoldError::InvalidInput(_))
        ));
    }

    #[test]
    fn format_and_parse_roundtrip() {
        let t = 1_893_456_000; // 2030-01-01T00:00:00Z
        assert_eq!(parse_instant(&format_instant(t)).unwrap(), t);
    }

    #[test]
    fn metadata_only_projection_omits_content_keys() {
        let response = CapsuleResponse {
            id: CapsuleId::generate(),
            sender_id: UserId::generate(),
            receiver_id: UserId::generate(),
            title: "t".into(),
            theme: None,
            state: CapsuleState::Unfolding,
            created_at: format_instant(0),
            sealed_at: None,
            scheduled_unlock_at: None,
            opened_at: None,
            allow_early_view: false,
            allow_receiver_reply: true,
            body: None,
            media_urls: None,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("body").is_none());
        assert!(json.get("media_urls").is_none());
        assert_eq!(json["state"], "unfolding");
    }
}
