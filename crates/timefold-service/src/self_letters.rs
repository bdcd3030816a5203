//! Self letters: sealed the instant they are written.
//!
//! There is no draft phase and no teaser phase. Content hides from everyone
//! — the author included — until the scheduled open instant, then the
//! author opens the letter and may record a one-time reflection. Letters
//! are never editable or deletable.

use std::sync::Arc;

use tracing::info;

use timefold_core::clock::Clock;
use timefold_core::constants::{
    MAX_NAME_LENGTH, MAX_SELF_LETTER_CHARS, MAX_TITLE_LENGTH, MIN_SELF_LETTER_CHARS,
};
use timefold_core::error::TimefoldError;
use timefold_core::sanitize::sanitize_text;
use timefold_core::self_letter::{LifeArea, ReflectionAnswer, SelfLetter};
use timefold_core::types::{SelfLetterId, Timestamp, UserId};
use timefold_store::Store;

use crate::pagination::{Page, PageParams};

#[derive(Clone, Debug)]
pub struct NewSelfLetter {
    pub title: Option<String>,
    pub content: String,
    pub mood: Option<String>,
    pub life_area: Option<LifeArea>,
    pub city: Option<String>,
    pub scheduled_open_at: Timestamp,
}

/// What the owner sees of one letter. `content` is present only once the
/// scheduled open instant has passed.
#[derive(Clone, Debug)]
pub struct SelfLetterView {
    pub letter: SelfLetter,
    pub content_visible: bool,
}

impl SelfLetterView {
    fn at(letter: SelfLetter, now: Timestamp) -> Self {
        let content_visible = letter.is_openable(now);
        Self {
            letter,
            content_visible,
        }
    }
}

pub struct SelfLetterService {
    store: Arc<Store>,
    clock: Arc<dyn Clock>,
}

impl SelfLetterService {
    pub fn new(store: Arc<Store>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Write a letter. It is sealed immediately; the only future writes are
    /// the open timestamp and the one-time reflection.
    pub fn create(&self, owner: UserId, new: NewSelfLetter) -> Result<SelfLetterView, TimefoldError> {
        let now = self.clock.now();

        let content = sanitize_text(&new.content, Some(MAX_SELF_LETTER_CHARS));
        let char_count = content.chars().count();
        if char_count < MIN_SELF_LETTER_CHARS {
            return Err(TimefoldError::invalid_input(format!(
                "Content must be at least {MIN_SELF_LETTER_CHARS} characters (currently {char_count})"
            )));
        }

        if new.scheduled_open_at <= now {
            return Err(TimefoldError::invalid_input(
                "scheduled_open_at must be in the future",
            ));
        }

        let letter = SelfLetter {
            id: SelfLetterId::generate(),
            owner_id: owner,
            title: new
                .title
                .map(|t| sanitize_text(&t, Some(MAX_TITLE_LENGTH)))
                .filter(|t| !t.is_empty()),
            content,
            char_count,
            mood: new
                .mood
                .map(|m| sanitize_text(&m, Some(MAX_NAME_LENGTH)))
                .filter(|m| !m.is_empty()),
            life_area: new.life_area,
            city: new
                .city
                .map(|c| sanitize_text(&c, Some(MAX_NAME_LENGTH)))
                .filter(|c| !c.is_empty()),
            scheduled_open_at: new.scheduled_open_at,
            opened_at: None,
            reflection_answer: None,
            reflected_at: None,
            created_at: now,
        };
        self.store.put_self_letter(&letter)?;

        info!(
            letter_id = %letter.id,
            owner_id = %owner,
            scheduled_open_at = letter.scheduled_open_at,
            "self letter sealed"
        );
        Ok(SelfLetterView::at(letter, now))
    }

    /// Letters are invisible to anyone but their owner: a foreign id reads
    /// as missing.
    pub fn get(&self, owner: UserId, id: SelfLetterId) -> Result<SelfLetterView, TimefoldError> {
        Ok(SelfLetterView::at(self.fetch(owner, id)?, self.clock.now()))
    }

    pub fn list(
        &self,
        owner: UserId,
        params: PageParams,
    ) -> Result<Page<SelfLetterView>, TimefoldError> {
        let now = self.clock.now();
        let items = self
            .store
            .list_self_letters_by_owner(&owner, params.skip(), params.page_size)?;
        let total = self.store.count_self_letters_by_owner(&owner)?;
        Ok(Page {
            items: items
                .into_iter()
                .map(|letter| SelfLetterView::at(letter, now))
                .collect(),
            total,
            page: params.page,
            page_size: params.page_size,
        })
    }

    /// First open stamps `opened_at`; opening again is a no-op that returns
    /// the letter as it stands.
    pub fn open(&self, owner: UserId, id: SelfLetterId) -> Result<SelfLetterView, TimefoldError> {
        let mut letter = self.fetch(owner, id)?;
        let now = self.clock.now();

        if !letter.is_openable(now) {
            return Err(TimefoldError::IllegalTransition(
                "Letter cannot be opened before its scheduled time".into(),
            ));
        }

        if letter.opened_at.is_none() {
            letter.opened_at = Some(now);
            self.store.put_self_letter(&letter)?;
            info!(letter_id = %letter.id, owner_id = %owner, "self letter opened");
        }
        Ok(SelfLetterView::at(letter, now))
    }

    /// Record the one-time reflection. Requires an opened letter and no
    /// prior answer.
    pub fn reflect(
        &self,
        owner: UserId,
        id: SelfLetterId,
        answer: ReflectionAnswer,
    ) -> Result<SelfLetterView, TimefoldError> {
        let mut letter = self.fetch(owner, id)?;

        if letter.opened_at.is_none() {
            return Err(TimefoldError::IllegalTransition(
                "Letter must be opened before submitting a reflection".into(),
            ));
        }
        if letter.reflection_answer.is_some() {
            return Err(TimefoldError::conflict(
                "Reflection already submitted and cannot be changed",
            ));
        }

        let now = self.clock.now();
        letter.reflection_answer = Some(answer);
        letter.reflected_at = Some(now);
        self.store.put_self_letter(&letter)?;

        info!(letter_id = %letter.id, owner_id = %owner, answer = %answer, "reflection recorded");
        Ok(SelfLetterView::at(letter, now))
    }

    fn fetch(&self, owner: UserId, id: SelfLetterId) -> Result<SelfLetter, TimefoldError> {
        match self.store.get_self_letter(&id)? {
            Some(letter) if letter.owner_id == owner => Ok(letter),
            _ => Err(TimefoldError::not_found("letter")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use timefold_core::clock::ManualClock;

    const T0: Timestamp = 1_000_000;

    fn service() -> (TempDir, ManualClock, SelfLetterService) {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(Store::open(dir.path()).unwrap());
        let clock = ManualClock::new(T0);
        let svc = SelfLetterService::new(store, Arc::new(clock.clone()));
        (dir, clock, svc)
    }

    fn note(open_at: Timestamp) -> NewSelfLetter {
        NewSelfLetter {
            title: Some("to me, next year".into()),
            content: "remember how this year felt and be kind to yourself".into(),
            mood: Some("hopeful".into()),
            life_area: Some(LifeArea::Myself),
            city: Some("Lisbon".into()),
            scheduled_open_at: open_at,
        }
    }

    #[test]
    fn create_seals_immediately_and_hides_content() {
        let (_dir, _clock, svc) = service();
        let owner = UserId::generate();

        let view = svc.create(owner, note(T0 + 86_400)).unwrap();
        assert!(!view.content_visible);
        assert_eq!(view.letter.char_count, view.letter.content.chars().count());
        assert!(view.letter.opened_at.is_none());
    }

    #[test]
    fn create_rejects_short_content_and_past_instants() {
        let (_dir, _clock, svc) = service();
        let owner = UserId::generate();

        let mut short = note(T0 + 86_400);
        short.content = "too short".into();
        assert!(matches!(
            svc.create(owner, short),
            Err(TimefoldError::InvalidInput(_))
        ));

        assert!(matches!(
            svc.create(owner, note(T0)),
            Err(TimefoldError::InvalidInput(_))
        ));
    }

    #[test]
    fn content_becomes_visible_once_the_instant_passes() {
        let (_dir, clock, svc) = service();
        let owner = UserId::generate();
        let view = svc.create(owner, note(T0 + 100)).unwrap();

        clock.set(T0 + 100);
        let later = svc.get(owner, view.letter.id).unwrap();
        assert!(later.content_visible);
    }

    #[test]
    fn open_before_time_is_rejected_then_idempotent_after() {
        let (_dir, clock, svc) = service();
        let owner = UserId::generate();
        let view = svc.create(owner, note(T0 + 100)).unwrap();

        assert!(matches!(
            svc.open(owner, view.letter.id),
            Err(TimefoldError::IllegalTransition(_))
        ));

        clock.set(T0 + 100);
        let opened = svc.open(owner, view.letter.id).unwrap();
        assert_eq!(opened.letter.opened_at, Some(T0 + 100));

        // A second open leaves the first timestamp in place.
        clock.advance(50);
        let again = svc.open(owner, view.letter.id).unwrap();
        assert_eq!(again.letter.opened_at, Some(T0 + 100));
    }

    #[test]
    fn reflection_requires_open_and_happens_once() {
        let (_dir, clock, svc) = service();
        let owner = UserId::generate();
        let view = svc.create(owner, note(T0 + 100)).unwrap();

        assert!(matches!(
            svc.reflect(owner, view.letter.id, ReflectionAnswer::Yes),
            Err(TimefoldError::IllegalTransition(_))
        ));

        clock.set(T0 + 100);
        svc.open(owner, view.letter.id).unwrap();

        let reflected = svc
            .reflect(owner, view.letter.id, ReflectionAnswer::Yes)
            .unwrap();
        assert_eq!(
            reflected.letter.reflection_answer,
            Some(ReflectionAnswer::Yes)
        );
        assert_eq!(reflected.letter.reflected_at, Some(T0 + 100));

        assert!(matches!(
            svc.reflect(owner, view.letter.id, ReflectionAnswer::No),
            Err(TimefoldError::Conflict(_))
        ));
    }

    #[test]
    fn letters_are_owner_scoped_and_listed_newest_first() {
        let (_dir, clock, svc) = service();
        let owner = UserId::generate();
        let stranger = UserId::generate();

        let first = svc.create(owner, note(T0 + 1_000)).unwrap();
        clock.advance(10);
        let second = svc.create(owner, note(T0 + 1_000)).unwrap();

        assert!(svc.get(stranger, first.letter.id).is_err());

        let page = svc
            .list(owner, PageParams { page: 1, page_size: 10 })
            .unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.items[0].letter.id, second.letter.id);
        assert!(svc
            .list(stranger, PageParams { page: 1, page_size: 10 })
            .unwrap()
            .items
            .is_empty());
    }
}
