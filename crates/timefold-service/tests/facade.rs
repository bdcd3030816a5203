//! End-to-end facade scenarios: the full life of a capsule from draft to
//! opened, driven through the facade with sweeps from the unlock engine in
//! between, all on a hand-cranked clock.

use std::sync::Arc;

use tempfile::TempDir;

use timefold_core::capsule::CapsuleState;
use timefold_core::clock::ManualClock;
use timefold_core::constants::{SECS_PER_DAY, SECS_PER_MINUTE};
use timefold_core::error::TimefoldError;
use timefold_core::types::{Timestamp, UserId};
use timefold_core::user::User;
use timefold_service::{
    CapsuleFacade, CapsulePatch, ListBox, NewCapsule, PageParams, Settings,
};
use timefold_store::Store;
use timefold_unlock::{LogNotifier, UnlockService};

const T0: Timestamp = 1_735_689_600; // 2025-01-01T00:00:00Z

struct World {
    _dir: TempDir,
    clock: ManualClock,
    facade: CapsuleFacade,
    unlock: UnlockService,
    alice: UserId,
    bob: UserId,
}

fn world() -> World {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(Store::open(dir.path()).unwrap());
    let clock = ManualClock::new(T0);
    let settings = Settings::default();

    let alice = register(&store, "alice@example.com", "alice");
    let bob = register(&store, "bob@example.com", "bob");

    let facade = CapsuleFacade::new(
        Arc::clone(&store),
        Arc::new(clock.clone()),
        settings.clone(),
    );
    let unlock = UnlockService::new(
        Arc::clone(&store),
        Arc::new(clock.clone()),
        Arc::new(LogNotifier),
        settings.unlock_windows(),
    );

    World {
        _dir: dir,
        clock,
        facade,
        unlock,
        alice,
        bob,
    }
}

fn register(store: &Store, email: &str, username: &str) -> UserId {
    let user = User::new(
        email.to_string(),
        username.to_string(),
        "$argon2id$stub".to_string(),
        None,
        T0,
    );
    store.create_user(&user).unwrap();
    user.id
}

fn letter_to(receiver: UserId) -> NewCapsule {
    NewCapsule {
        receiver_id: receiver,
        title: "open on new year".into(),
        body: "hi".into(),
        media_urls: vec![],
        theme: None,
        allow_early_view: false,
        allow_receiver_reply: true,
    }
}

#[tokio::test]
async fn capsule_walks_the_whole_lifecycle() {
    let w = world();
    let unlock_at = T0 + 10 * SECS_PER_DAY;

    // Create and seal at t0.
    let capsule = w.facade.create_capsule(w.alice, letter_to(w.bob)).unwrap();
    assert_eq!(capsule.state, CapsuleState::Draft);

    let sealed = w.facade.seal_capsule(w.alice, capsule.id, unlock_at).unwrap();
    assert_eq!(sealed.state, CapsuleState::Sealed);
    assert_eq!(sealed.sealed_at, Some(T0));
    assert_eq!(sealed.scheduled_unlock_at, Some(unlock_at));

    // Seven days and a minute later, a sweep starts the teaser phase.
    w.clock.set(T0 + 7 * SECS_PER_DAY + SECS_PER_MINUTE);
    let stats = w.unlock.sweep().await.unwrap();
    assert_eq!(stats.sealed_to_unfolding, 1);
    let view = w.facade.get_capsule(w.alice, capsule.id).unwrap();
    assert_eq!(view.state, CapsuleState::Unfolding);

    // At the unlock instant it becomes ready.
    w.clock.set(unlock_at);
    let stats = w.unlock.sweep().await.unwrap();
    assert_eq!(stats.unfolding_to_ready, 1);

    // Bob opens five minutes past the unlock instant.
    w.clock.set(unlock_at + 5 * SECS_PER_MINUTE);
    let opened = w.facade.open_capsule(w.bob, capsule.id).unwrap();
    assert_eq!(opened.state, CapsuleState::Opened);
    assert_eq!(opened.opened_at, Some(unlock_at + 5 * SECS_PER_MINUTE));

    // A second open is a lifecycle fault with a precise reason.
    let err = w.facade.open_capsule(w.bob, capsule.id).unwrap_err();
    match err {
        TimefoldError::IllegalTransition(reason) => {
            assert_eq!(reason, "Capsule is already opened")
        }
        other => panic!("expected IllegalTransition, got {other:?}"),
    }
}

#[tokio::test]
async fn sealed_capsules_reject_edits() {
    let w = world();
    let capsule = w.facade.create_capsule(w.alice, letter_to(w.bob)).unwrap();
    w.facade
        .seal_capsule(w.alice, capsule.id, T0 + 10 * SECS_PER_DAY)
        .unwrap();

    w.clock.set(T0 + 3_600);
    let err = w
        .facade
        .update_capsule(
            w.alice,
            capsule.id,
            CapsulePatch {
                body: Some("rewritten".into()),
                ..CapsulePatch::default()
            },
        )
        .unwrap_err();
    match err {
        TimefoldError::Forbidden(reason) => {
            assert_eq!(reason, "Cannot edit capsule in sealed state")
        }
        other => panic!("expected Forbidden, got {other:?}"),
    }
}

#[test]
fn seal_rejects_an_unlock_instant_thirty_seconds_out() {
    let w = world();
    let capsule = w.facade.create_capsule(w.alice, letter_to(w.bob)).unwrap();
    let err = w
        .facade
        .seal_capsule(w.alice, capsule.id, T0 + 30)
        .unwrap_err();
    assert!(matches!(err, TimefoldError::InvalidUnlockTime(_)));

    // The capsule is untouched by the failed seal.
    let view = w.facade.get_capsule(w.alice, capsule.id).unwrap();
    assert_eq!(view.state, CapsuleState::Draft);
    assert_eq!(view.scheduled_unlock_at, None);
}

#[tokio::test]
async fn receiver_without_early_view_sees_metadata_only_while_unfolding() {
    let w = world();
    let capsule = w.facade.create_capsule(w.alice, letter_to(w.bob)).unwrap();
    w.facade
        .seal_capsule(w.alice, capsule.id, T0 + 2 * SECS_PER_DAY)
        .unwrap();

    w.clock.advance(SECS_PER_MINUTE);
    w.unlock.sweep().await.unwrap();

    let view = w.facade.get_capsule(w.bob, capsule.id).unwrap();
    assert_eq!(view.state, CapsuleState::Unfolding);
    assert_eq!(view.title, "open on new year");
    assert!(view.body.is_none());
    assert!(view.media_urls.is_none());

    // The sender still sees everything.
    let view = w.facade.get_capsule(w.alice, capsule.id).unwrap();
    assert_eq!(view.body.as_deref(), Some("hi"));
}

#[tokio::test]
async fn early_view_reveals_content_during_the_teaser_phase() {
    let w = world();
    let mut payload = letter_to(w.bob);
    payload.allow_early_view = true;
    payload.media_urls = vec!["https://cdn.example/polaroid.jpg".into()];
    let capsule = w.facade.create_capsule(w.alice, payload).unwrap();
    w.facade
        .seal_capsule(w.alice, capsule.id, T0 + 2 * SECS_PER_DAY)
        .unwrap();

    // Still sealed: nothing to see yet even with early view.
    let view = w.facade.get_capsule(w.bob, capsule.id).unwrap();
    assert!(view.body.is_none());

    w.clock.advance(SECS_PER_MINUTE);
    w.unlock.sweep().await.unwrap();

    let view = w.facade.get_capsule(w.bob, capsule.id).unwrap();
    assert_eq!(view.state, CapsuleState::Unfolding);
    assert_eq!(view.body.as_deref(), Some("hi"));
    assert_eq!(
        view.media_urls.as_deref(),
        Some(&["https://cdn.example/polaroid.jpg".to_string()][..])
    );
}

#[test]
fn any_principal_failing_the_view_gate_gets_metadata_only() {
    let w = world();
    let capsule = w.facade.create_capsule(w.alice, letter_to(w.bob)).unwrap();

    // A principal unrelated to the capsule sees the same metadata-only
    // projection a not-yet-allowed receiver would.
    let mallory = UserId::generate();
    let view = w.facade.get_capsule(mallory, capsule.id).unwrap();
    assert_eq!(view.title, "open on new year");
    assert_eq!(view.state, CapsuleState::Draft);
    assert_eq!(view.created_at, T0);
    assert!(view.body.is_none());
    assert!(view.media_urls.is_none());
}

#[test]
fn receiver_cannot_open_before_ready_and_cannot_seal_or_edit() {
    let w = world();
    let capsule = w.facade.create_capsule(w.alice, letter_to(w.bob)).unwrap();
    w.facade
        .seal_capsule(w.alice, capsule.id, T0 + 10 * SECS_PER_DAY)
        .unwrap();

    let err = w.facade.open_capsule(w.bob, capsule.id).unwrap_err();
    match err {
        TimefoldError::Forbidden(reason) => assert!(reason.contains("not ready yet")),
        other => panic!("expected Forbidden, got {other:?}"),
    }

    assert!(w
        .facade
        .seal_capsule(w.bob, capsule.id, T0 + 20 * SECS_PER_DAY)
        .is_err());
    assert!(w
        .facade
        .update_capsule(w.bob, capsule.id, CapsulePatch::default())
        .is_err());
}

#[test]
fn unlock_instant_is_immutable_after_sealing() {
    let w = world();
    let capsule = w.facade.create_capsule(w.alice, letter_to(w.bob)).unwrap();
    let unlock_at = T0 + 10 * SECS_PER_DAY;
    w.facade.seal_capsule(w.alice, capsule.id, unlock_at).unwrap();

    // A second seal attempt fails the gate and leaves the instant alone.
    let err = w
        .facade
        .seal_capsule(w.alice, capsule.id, T0 + 20 * SECS_PER_DAY)
        .unwrap_err();
    assert!(matches!(err, TimefoldError::Forbidden(_)));

    let view = w.facade.get_capsule(w.alice, capsule.id).unwrap();
    assert_eq!(view.scheduled_unlock_at, Some(unlock_at));
}

#[test]
fn listing_splits_inbox_and_outbox_and_filters_by_state() {
    let w = world();
    let first = w.facade.create_capsule(w.alice, letter_to(w.bob)).unwrap();
    w.clock.advance(10);
    let _second = w.facade.create_capsule(w.alice, letter_to(w.bob)).unwrap();
    w.facade
        .seal_capsule(w.alice, first.id, T0 + 10 * SECS_PER_DAY)
        .unwrap();

    let params = PageParams { page: 1, page_size: 20 };

    let outbox = w
        .facade
        .list_capsules(w.alice, ListBox::Outbox, None, params)
        .unwrap();
    assert_eq!(outbox.total, 2);
    // Sender projections always carry contents.
    assert!(outbox.items.iter().all(|v| v.body.is_some()));

    let inbox = w
        .facade
        .list_capsules(w.bob, ListBox::Inbox, None, params)
        .unwrap();
    assert_eq!(inbox.total, 2);
    // Nothing is open yet, so the receiver sees metadata only.
    assert!(inbox.items.iter().all(|v| v.body.is_none()));

    let sealed_only = w
        .facade
        .list_capsules(w.alice, ListBox::Outbox, Some(CapsuleState::Sealed), params)
        .unwrap();
    assert_eq!(sealed_only.total, 1);
    assert_eq!(sealed_only.items[0].id, first.id);

    // Bob sent nothing.
    let bob_outbox = w
        .facade
        .list_capsules(w.bob, ListBox::Outbox, None, params)
        .unwrap();
    assert_eq!(bob_outbox.total, 0);
}

#[test]
fn drafts_delete_but_sealed_capsules_do_not() {
    let w = world();
    let draft = w.facade.create_capsule(w.alice, letter_to(w.bob)).unwrap();
    let sealed = w.facade.create_capsule(w.alice, letter_to(w.bob)).unwrap();
    w.facade
        .seal_capsule(w.alice, sealed.id, T0 + 10 * SECS_PER_DAY)
        .unwrap();

    // Receivers cannot delete at all.
    assert!(matches!(
        w.facade.delete_capsule(w.bob, draft.id),
        Err(TimefoldError::Forbidden(_))
    ));

    w.facade.delete_capsule(w.alice, draft.id).unwrap();
    assert!(matches!(
        w.facade.get_capsule(w.alice, draft.id),
        Err(TimefoldError::NotFound { .. })
    ));

    assert!(matches!(
        w.facade.delete_capsule(w.alice, sealed.id),
        Err(TimefoldError::IllegalTransition(_))
    ));
}

#[test]
fn create_validates_inputs() {
    let w = world();

    // Unknown receiver.
    let mut payload = letter_to(UserId::generate());
    assert!(w.facade.create_capsule(w.alice, payload.clone()).is_err());

    // Empty title after sanitation.
    payload = letter_to(w.bob);
    payload.title = "   ".into();
    assert!(w.facade.create_capsule(w.alice, payload).is_err());

    // Empty body.
    let mut payload = letter_to(w.bob);
    payload.body = "\u{0000}".into();
    assert!(w.facade.create_capsule(w.alice, payload).is_err());

    // Oversized media URL.
    let mut payload = letter_to(w.bob);
    payload.media_urls = vec!["x".repeat(600)];
    assert!(w.facade.create_capsule(w.alice, payload).is_err());
}

#[tokio::test]
async fn self_addressed_capsules_are_legal_end_to_end() {
    let w = world();
    let capsule = w.facade.create_capsule(w.alice, letter_to(w.alice)).unwrap();
    w.facade
        .seal_capsule(w.alice, capsule.id, T0 + 2 * SECS_PER_DAY)
        .unwrap();

    w.clock.set(T0 + 2 * SECS_PER_DAY);
    w.unlock.sweep().await.unwrap(); // sealed → unfolding
    w.unlock.sweep().await.unwrap(); // unfolding → ready

    let opened = w.facade.open_capsule(w.alice, capsule.id).unwrap();
    assert_eq!(opened.state, CapsuleState::Opened);
}
