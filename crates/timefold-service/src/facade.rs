//! The capsule facade: every capsule operation the gateway exposes.
//!
//! Authorization runs through the lifecycle gates before any write; all
//! temporal decisions use a single clock reading per operation. Methods are
//! synchronous compute over the embedded store and are invoked from async
//! request handlers.

use std::sync::Arc;

use tracing::info;

use timefold_core::capsule::{Capsule, CapsuleState};
use timefold_core::clock::Clock;
use timefold_core::constants::MAX_URL_LENGTH;
use timefold_core::error::TimefoldError;
use timefold_core::sanitize::sanitize_text;
use timefold_core::types::{CapsuleId, Timestamp, UserId};
use timefold_lifecycle::{can_edit, can_open, can_seal, can_view, seal};
use timefold_store::{StateWrite, Store};

use crate::config::Settings;
use crate::pagination::{Page, PageParams};

// ── Inputs ───────────────────────────────────────────────────────────────────

/// Payload for creating a draft capsule.
#[derive(Clone, Debug)]
pub struct NewCapsule {
    pub receiver_id: UserId,
    pub title: String,
    pub body: String,
    pub media_urls: Vec<String>,
    pub theme: Option<String>,
    pub allow_early_view: bool,
    pub allow_receiver_reply: bool,
}

/// Partial update applied to a draft capsule. `None` leaves a field alone;
/// `theme: Some(None)` clears the theme.
#[derive(Clone, Debug, Default)]
pub struct CapsulePatch {
    pub title: Option<String>,
    pub body: Option<String>,
    pub media_urls: Option<Vec<String>>,
    pub theme: Option<Option<String>>,
    pub allow_early_view: Option<bool>,
    pub allow_receiver_reply: Option<bool>,
}

/// Which listing a principal is asking for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListBox {
    /// Capsules addressed to the principal.
    Inbox,
    /// Capsules the principal sent.
    Outbox,
}

// ── Projection ───────────────────────────────────────────────────────────────

/// What a principal is allowed to see of one capsule. Metadata is always
/// present; `body` and `media_urls` only when the view gate allows.
#[derive(Clone, Debug)]
pub struct CapsuleView {
    pub id: CapsuleId,
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub title: String,
    pub theme: Option<String>,
    pub state: CapsuleState,
    pub created_at: Timestamp,
    pub sealed_at: Option<Timestamp>,
    pub scheduled_unlock_at: Option<Timestamp>,
    pub opened_at: Option<Timestamp>,
    pub allow_early_view: bool,
    pub allow_receiver_reply: bool,
    pub body: Option<String>,
    pub media_urls: Option<Vec<String>>,
}

impl CapsuleView {
    /// Project a capsule for `principal`, consulting the view gate to decide
    /// whether contents are included.
    pub fn for_principal(capsule: &Capsule, principal: UserId) -> Self {
        let include_content = can_view(capsule, principal).allowed;
        Self {
            id: capsule.id,
            sender_id: capsule.sender_id,
            receiver_id: capsule.receiver_id,
            title: capsule.title.clone(),
            theme: capsule.theme.clone(),
            state: capsule.state,
            created_at: capsule.created_at,
            sealed_at: capsule.sealed_at,
            scheduled_unlock_at: capsule.scheduled_unlock_at,
            opened_at: capsule.opened_at,
            allow_early_view: capsule.allow_early_view,
            allow_receiver_reply: capsule.allow_receiver_reply,
            body: include_content.then(|| capsule.body.clone()),
            media_urls: include_content.then(|| capsule.media_urls.clone()),
        }
    }
}

// ── Facade ───────────────────────────────────────────────────────────────────

pub struct CapsuleFacade {
    store: Arc<Store>,
    clock: Arc<dyn Clock>,
    settings: Settings,
}

impl CapsuleFacade {
    pub fn new(store: Arc<Store>, clock: Arc<dyn Clock>, settings: Settings) -> Self {
        Self {
            store,
            clock,
            settings,
        }
    }

    /// Create a draft capsule addressed to an existing user.
    pub fn create_capsule(
        &self,
        sender: UserId,
        payload: NewCapsule,
    ) -> Result<Capsule, TimefoldError> {
        let title = sanitize_text(&payload.title, Some(self.settings.max_title_length));
        if title.is_empty() {
            return Err(TimefoldError::invalid_input("Title is required"));
        }
        let body = sanitize_text(&payload.body, Some(self.settings.max_content_length));
        if body.is_empty() {
            return Err(TimefoldError::invalid_input("Body is required"));
        }
        let theme = self.sanitize_theme(payload.theme);
        let media_urls = sanitize_media_urls(payload.media_urls)?;

        if self.store.get_user(&payload.receiver_id)?.is_none() {
            return Err(TimefoldError::invalid_input("Receiver does not exist"));
        }

        let capsule = Capsule::new_draft(
            sender,
            payload.receiver_id,
            title,
            body,
            media_urls,
            theme,
            payload.allow_early_view,
            payload.allow_receiver_reply,
            self.clock.now(),
        );
        self.store.put_capsule(&capsule)?;

        info!(
            capsule_id = %capsule.id,
            sender_id = %sender,
            receiver_id = %capsule.receiver_id,
            "capsule created"
        );
        Ok(capsule)
    }

    /// Apply a patch to a draft. Only the sender, only while editable.
    pub fn update_capsule(
        &self,
        principal: UserId,
        capsule_id: CapsuleId,
        patch: CapsulePatch,
    ) -> Result<Capsule, TimefoldError> {
        let mut capsule = self.fetch(capsule_id)?;
        can_edit(&capsule, principal).require()?;

        if let Some(title) = patch.title {
            let title = sanitize_text(&title, Some(self.settings.max_title_length));
            if title.is_empty() {
                return Err(TimefoldError::invalid_input("Title cannot be empty"));
            }
            capsule.title = title;
        }
        if let Some(body) = patch.body {
            let body = sanitize_text(&body, Some(self.settings.max_content_length));
            if body.is_empty() {
                return Err(TimefoldError::invalid_input("Body cannot be empty"));
            }
            capsule.body = body;
        }
        if let Some(media_urls) = patch.media_urls {
            capsule.media_urls = sanitize_media_urls(media_urls)?;
        }
        if let Some(theme) = patch.theme {
            capsule.theme = self.sanitize_theme(theme);
        }
        if let Some(flag) = patch.allow_early_view {
            capsule.allow_early_view = flag;
        }
        if let Some(flag) = patch.allow_receiver_reply {
            capsule.allow_receiver_reply = flag;
        }

        self.store.put_capsule(&capsule)?;
        info!(capsule_id = %capsule.id, principal = %principal, "capsule updated");
        Ok(capsule)
    }

    /// Bind an unlock instant: the draft → sealed transition. `unlock_at`
    /// must already be UTC-normalized by the gateway.
    pub fn seal_capsule(
        &self,
        principal: UserId,
        capsule_id: CapsuleId,
        unlock_at: Timestamp,
    ) -> Result<Capsule, TimefoldError> {
        let capsule = self.fetch(capsule_id)?;
        can_seal(&capsule, principal).require()?;

        let params = seal(unlock_at, self.clock.now(), &self.settings.unlock_windows())?;
        let sealed = self.store.transition_state(
            &capsule_id,
            params.state,
            StateWrite {
                sealed_at: Some(params.sealed_at),
                scheduled_unlock_at: Some(params.scheduled_unlock_at),
                opened_at: None,
            },
        )?;

        info!(
            capsule_id = %capsule_id,
            principal = %principal,
            unlock_at = params.scheduled_unlock_at,
            "capsule sealed"
        );
        Ok(sealed)
    }

    /// The receiver's ready → opened transition. Irreversible.
    pub fn open_capsule(
        &self,
        principal: UserId,
        capsule_id: CapsuleId,
    ) -> Result<Capsule, TimefoldError> {
        let capsule = self.fetch(capsule_id)?;

        let verdict = can_open(&capsule, principal);
        if !verdict.allowed {
            // A repeat open by the rightful receiver is a lifecycle fault,
            // not a permission fault.
            if capsule.state == CapsuleState::Opened && capsule.receiver_id == principal {
                return Err(TimefoldError::IllegalTransition(verdict.reason));
            }
            return Err(TimefoldError::Forbidden(verdict.reason));
        }

        let opened = self.store.transition_state(
            &capsule_id,
            CapsuleState::Opened,
            StateWrite {
                sealed_at: None,
                scheduled_unlock_at: None,
                opened_at: Some(self.clock.now()),
            },
        )?;

        info!(capsule_id = %capsule_id, principal = %principal, "capsule opened");
        Ok(opened)
    }

    /// Fetch one capsule as seen by `principal`. The view gate decides what
    /// the projection carries: a denied principal — receiver before the
    /// teaser phase, or anyone unrelated — gets metadata only, never `body`
    /// or `media_urls`.
    pub fn get_capsule(
        &self,
        principal: UserId,
        capsule_id: CapsuleId,
    ) -> Result<CapsuleView, TimefoldError> {
        let capsule = self.fetch(capsule_id)?;
        Ok(CapsuleView::for_principal(&capsule, principal))
    }

    /// List the principal's inbox or outbox, newest first, with an optional
    /// state filter.
    pub fn list_capsules(
        &self,
        principal: UserId,
        list_box: ListBox,
        state: Option<CapsuleState>,
        params: PageParams,
    ) -> Result<Page<CapsuleView>, TimefoldError> {
        let (items, total) = match list_box {
            ListBox::Inbox => (
                self.store
                    .list_by_receiver(&principal, state, params.skip(), params.page_size)?,
                self.store.count_by_receiver(&principal, state)?,
            ),
            ListBox::Outbox => (
                self.store
                    .list_by_sender(&principal, state, params.skip(), params.page_size)?,
                self.store.count_by_sender(&principal, state)?,
            ),
        };

        Ok(Page {
            items: items
                .iter()
                .map(|c| CapsuleView::for_principal(c, principal))
                .collect(),
            total,
            page: params.page,
            page_size: params.page_size,
        })
    }

    /// Remove a draft. Sealed capsules are immutable history and cannot be
    /// deleted.
    pub fn delete_capsule(
        &self,
        principal: UserId,
        capsule_id: CapsuleId,
    ) -> Result<(), TimefoldError> {
        let capsule = self.fetch(capsule_id)?;

        if capsule.sender_id != principal {
            return Err(TimefoldError::forbidden(
                "Only the sender can delete this capsule",
            ));
        }
        if capsule.state != CapsuleState::Draft {
            return Err(TimefoldError::IllegalTransition(format!(
                "Cannot delete capsule in {} state",
                capsule.state
            )));
        }

        self.store.delete_capsule(&capsule_id)?;
        info!(capsule_id = %capsule_id, principal = %principal, "capsule deleted");
        Ok(())
    }

    fn fetch(&self, capsule_id: CapsuleId) -> Result<Capsule, TimefoldError> {
        self.store
            .get_capsule(&capsule_id)?
            .ok_or(TimefoldError::NotFound { entity: "capsule" })
    }

    fn sanitize_theme(&self, theme: Option<String>) -> Option<String> {
        theme
            .map(|t| sanitize_text(&t, Some(self.settings.max_theme_length)))
            .filter(|t| !t.is_empty())
    }
}

fn sanitize_media_urls(urls: Vec<String>) -> Result<Vec<String>, TimefoldError> {
    urls.into_iter()
        .map(|url| {
            let url = sanitize_text(&url, None);
            if url.is_empty() || url.len() > MAX_URL_LENGTH {
                Err(TimefoldError::invalid_input(format!(
                    "Media URLs must be 1..{MAX_URL_LENGTH} characters"
                )))
            } else {
                Ok(url)
            }
        })
        .collect()
}
