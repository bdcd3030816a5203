//! Capsule, draft and recipient entities.
//!
//! A [`Capsule`] is a time-locked letter from a sender to a receiver. Its
//! [`CapsuleState`] walks a strict one-way path:
//!
//! ```text
//! draft → sealed → unfolding → ready → opened
//! ```
//!
//! `draft` is freely editable by the sender; sealing binds an unlock instant
//! that can never change afterwards; the background sweep advances sealed
//! capsules through `unfolding` into `ready`; only the receiver performs the
//! final `ready → opened` step. A [`Draft`] is a private scratchpad that has
//! not yet become a capsule; a [`Recipient`] is a contact-book entry.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::{CapsuleId, DraftId, RecipientId, Timestamp, UserId};

// ── CapsuleState ─────────────────────────────────────────────────────────────

/// Closed state enumeration for the capsule lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapsuleState {
    /// Editable by the sender; no unlock instant bound yet.
    Draft,
    /// Unlock instant bound; contents locked away until it nears.
    Sealed,
    /// Teaser phase: the unlock instant is at most T_early away.
    Unfolding,
    /// The unlock instant has passed; the receiver may open.
    Ready,
    /// Terminal. The receiver has opened the capsule.
    Opened,
}

impl CapsuleState {
    /// True if no further transitions are possible from this state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, CapsuleState::Opened)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CapsuleState::Draft => "draft",
            CapsuleState::Sealed => "sealed",
            CapsuleState::Unfolding => "unfolding",
            CapsuleState::Ready => "ready",
            CapsuleState::Opened => "opened",
        }
    }
}

impl fmt::Display for CapsuleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CapsuleState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(CapsuleState::Draft),
            "sealed" => Ok(CapsuleState::Sealed),
            "unfolding" => Ok(CapsuleState::Unfolding),
            "ready" => Ok(CapsuleState::Ready),
            "opened" => Ok(CapsuleState::Opened),
            other => Err(format!("unknown capsule state: {other}")),
        }
    }
}

// ── Capsule ──────────────────────────────────────────────────────────────────

/// A time-locked letter as stored in the state DB.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Capsule {
    pub id: CapsuleId,
    pub sender_id: UserId,
    /// May equal `sender_id`; self-addressed capsules are legal.
    pub receiver_id: UserId,

    pub title: String,
    pub body: String,
    /// Ordered media attachment URLs.
    pub media_urls: Vec<String>,
    /// Optional presentation theme name.
    pub theme: Option<String>,

    pub state: CapsuleState,

    pub created_at: Timestamp,
    /// Set exactly once, at the draft → sealed transition.
    pub sealed_at: Option<Timestamp>,
    /// Immutable once the capsule leaves `draft`.
    pub scheduled_unlock_at: Option<Timestamp>,
    /// Set exactly once, at the ready → opened transition.
    pub opened_at: Option<Timestamp>,

    /// Receiver may view contents during `unfolding`/`ready`.
    pub allow_early_view: bool,
    /// Off-service hint for reply features; does not gate anything here.
    pub allow_receiver_reply: bool,
}

impl Capsule {
    /// Create a fresh draft capsule. No unlock instant, no seal timestamp.
    #[allow(clippy::too_many_arguments)]
    pub fn new_draft(
        sender_id: UserId,
        receiver_id: UserId,
        title: String,
        body: String,
        media_urls: Vec<String>,
        theme: Option<String>,
        allow_early_view: bool,
        allow_receiver_reply: bool,
        now: Timestamp,
    ) -> Self {
        Self {
            id: CapsuleId::generate(),
            sender_id,
            receiver_id,
            title,
            body,
            media_urls,
            theme,
            state: CapsuleState::Draft,
            created_at: now,
            sealed_at: None,
            scheduled_unlock_at: None,
            opened_at: None,
            allow_early_view,
            allow_receiver_reply,
        }
    }
}

// ── Draft ────────────────────────────────────────────────────────────────────

/// An unsent scratchpad letter, private to its owner.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Draft {
    pub id: DraftId,
    pub owner_id: UserId,

    pub title: String,
    pub body: String,
    pub media_urls: Vec<String>,
    pub theme: Option<String>,
    /// Intended recipient, if the owner has picked one.
    pub recipient_id: Option<RecipientId>,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

// ── Recipient ────────────────────────────────────────────────────────────────

/// A contact-book entry owned by one user. Not an access-control entity:
/// capsules address receivers by their `UserId` directly.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Recipient {
    pub id: RecipientId,
    pub owner_id: UserId,

    pub name: String,
    pub email: Option<String>,
    /// Back-reference to a registered account, when known.
    pub user_id: Option<UserId>,

    pub created_at: Timestamp,
}
