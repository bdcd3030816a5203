//! Draft scratchpads: owner-private, freely mutable, no lifecycle.

use std::sync::Arc;

use tracing::info;

use timefold_core::capsule::Draft;
use timefold_core::clock::Clock;
use timefold_core::error::TimefoldError;
use timefold_core::sanitize::sanitize_text;
use timefold_core::types::{DraftId, RecipientId, UserId};
use timefold_store::Store;

use crate::config::Settings;
use crate::pagination::{Page, PageParams};

#[derive(Clone, Debug)]
pub struct NewDraft {
    pub title: String,
    pub body: String,
    pub media_urls: Vec<String>,
    pub theme: Option<String>,
    pub recipient_id: Option<RecipientId>,
}

/// Partial update; `None` leaves a field alone, `recipient_id: Some(None)`
/// detaches the recipient.
#[derive(Clone, Debug, Default)]
pub struct DraftPatch {
    pub title: Option<String>,
    pub body: Option<String>,
    pub media_urls: Option<Vec<String>>,
    pub theme: Option<Option<String>>,
    pub recipient_id: Option<Option<RecipientId>>,
}

pub struct DraftService {
    store: Arc<Store>,
    clock: Arc<dyn Clock>,
    settings: Settings,
}

impl DraftService {
    pub fn new(store: Arc<Store>, clock: Arc<dyn Clock>, settings: Settings) -> Self {
        Self {
            store,
            clock,
            settings,
        }
    }

    pub fn create(&self, owner: UserId, new: NewDraft) -> Result<Draft, TimefoldError> {
        let now = self.clock.now();
        let draft = Draft {
            id: DraftId::generate(),
            owner_id: owner,
            title: sanitize_text(&new.title, Some(self.settings.max_title_length)),
            body: sanitize_text(&new.body, Some(self.settings.max_content_length)),
            media_urls: new.media_urls,
            theme: new
                .theme
                .map(|t| sanitize_text(&t, Some(self.settings.max_theme_length)))
                .filter(|t| !t.is_empty()),
            recipient_id: new.recipient_id,
            created_at: now,
            updated_at: now,
        };
        self.store.put_draft(&draft)?;
        info!(draft_id = %draft.id, owner_id = %owner, "draft created");
        Ok(draft)
    }

    /// Drafts are invisible to anyone but their owner: a foreign id reads as
    /// missing, never as forbidden.
    pub fn get(&self, owner: UserId, id: DraftId) -> Result<Draft, TimefoldError> {
        match self.store.get_draft(&id)? {
            Some(draft) if draft.owner_id == owner => Ok(draft),
            _ => Err(TimefoldError::not_found("draft")),
        }
    }

    pub fn update(
        &self,
        owner: UserId,
        id: DraftId,
        patch: DraftPatch,
    ) -> Result<Draft, TimefoldError> {
        let mut draft = self.get(owner, id)?;

        if let Some(title) = patch.title {
            draft.title = sanitize_text(&title, Some(self.settings.max_title_length));
        }
        if let Some(body) = patch.body {
            draft.body = sanitize_text(&body, Some(self.settings.max_content_length));
        }
        if let Some(media_urls) = patch.media_urls {
            draft.media_urls = media_urls;
        }
        if let Some(theme) = patch.theme {
            draft.theme = theme
                .map(|t| sanitize_text(&t, Some(self.settings.max_theme_length)))
                .filter(|t| !t.is_empty());
        }
        if let Some(recipient_id) = patch.recipient_id {
            draft.recipient_id = recipient_id;
        }
        draft.updated_at = self.clock.now();

        self.store.put_draft(&draft)?;
        Ok(draft)
    }

    pub fn delete(&self, owner: UserId, id: DraftId) -> Result<(), TimefoldError> {
        let draft = self.get(owner, id)?;
        self.store.delete_draft(&draft.id)?;
        info!(draft_id = %id, owner_id = %owner, "draft deleted");
        Ok(())
    }

    pub fn list(&self, owner: UserId, params: PageParams) -> Result<Page<Draft>, TimefoldError> {
        let items = self
            .store
            .list_drafts_by_owner(&owner, params.skip(), params.page_size)?;
        let total = self.store.count_drafts_by_owner(&owner)?;
        Ok(Page {
            items,
            total,
            page: params.page,
            page_size: params.page_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use timefold_core::clock::ManualClock;

    fn service() -> (TempDir, ManualClock, DraftService) {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(Store::open(dir.path()).unwrap());
        let clock = ManualClock::new(1_000);
        let svc = DraftService::new(store, Arc::new(clock.clone()), Settings::default());
        (dir, clock, svc)
    }

    fn new_draft(title: &str) -> NewDraft {
        NewDraft {
            title: title.into(),
            body: "dear future".into(),
            media_urls: vec![],
            theme: None,
            recipient_id: None,
        }
    }

    #[test]
    fn owner_roundtrip() {
        let (_dir, _clock, svc) = service();
        let owner = UserId::generate();
        let draft = svc.create(owner, new_draft("note")).unwrap();
        assert_eq!(svc.get(owner, draft.id).unwrap().title, "note");
    }

    #[test]
    fn foreign_drafts_read_as_missing() {
        let (_dir, _clock, svc) = service();
        let owner = UserId::generate();
        let stranger = UserId::generate();
        let draft = svc.create(owner, new_draft("private")).unwrap();

        assert!(matches!(
            svc.get(stranger, draft.id),
            Err(TimefoldError::NotFound { .. })
        ));
        assert!(svc.delete(stranger, draft.id).is_err());
        // Still there for the owner.
        assert!(svc.get(owner, draft.id).is_ok());
    }

    #[test]
    fn update_moves_updated_at_forward_even_when_content_is_unchanged() {
        let (_dir, clock, svc) = service();
        let owner = UserId::generate();
        let draft = svc.create(owner, new_draft("same")).unwrap();

        clock.advance(60);
        let updated = svc
            .update(
                owner,
                draft.id,
                DraftPatch {
                    title: Some("same".into()),
                    ..DraftPatch::default()
                },
            )
            .unwrap();

        assert_eq!(updated.title, draft.title);
        assert_eq!(updated.created_at, draft.created_at);
        assert!(updated.updated_at > draft.updated_at);
    }

    #[test]
    fn list_is_paginated_newest_update_first() {
        let (_dir, clock, svc) = service();
        let owner = UserId::generate();
        for i in 0..3 {
            clock.advance(10);
            svc.create(owner, new_draft(&format!("d{i}"))).unwrap();
        }

        let page = svc
            .list(owner, PageParams { page: 1, page_size: 2 })
            .unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].title, "d2");
    }
}
