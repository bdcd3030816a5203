//! Integration tests for the sled-backed store.
//!
//! Every test opens a fresh database in a temporary directory that is
//! removed when the test ends.

use tempfile::TempDir;

use timefold_core::capsule::{Capsule, CapsuleState, Draft, Recipient};
use timefold_core::error::TimefoldError;
use timefold_core::types::{CapsuleId, DraftId, RecipientId, UserId};
use timefold_core::user::User;
use timefold_store::{StateWrite, Store};

fn open_store() -> (TempDir, Store) {
    let dir = TempDir::new().expect("tempdir");
    let store = Store::open(dir.path()).expect("open store");
    (dir, store)
}

fn test_user(email: &str, username: &str) -> User {
    User::new(
        email.to_string(),
        username.to_string(),
        "$argon2id$stub".to_string(),
        Some("Test User".to_string()),
        1_700_000_000,
    )
}

fn test_capsule(sender: UserId, receiver: UserId, created_at: i64) -> Capsule {
    Capsule::new_draft(
        sender,
        receiver,
        "title".into(),
        "body".into(),
        vec!["https://cdn.example/a.jpg".into()],
        Some("sunset".into()),
        false,
        true,
        created_at,
    )
}

// ── Users ────────────────────────────────────────────────────────────────────

#[test]
fn user_roundtrip_and_index_lookups() {
    let (_dir, store) = open_store();
    let user = test_user("ada@example.com", "ada");
    store.create_user(&user).unwrap();

    let by_id = store.get_user(&user.id).unwrap().unwrap();
    assert_eq!(by_id.email, "ada@example.com");

    let by_email = store.get_user_by_email("ada@example.com").unwrap().unwrap();
    assert_eq!(by_email.id, user.id);

    let by_username = store.get_user_by_username("ada").unwrap().unwrap();
    assert_eq!(by_username.id, user.id);

    assert!(store.get_user_by_email("nobody@example.com").unwrap().is_none());
}

#[test]
fn duplicate_email_is_a_conflict() {
    let (_dir, store) = open_store();
    store.create_user(&test_user("dup@example.com", "first")).unwrap();

    let err = store
        .create_user(&test_user("dup@example.com", "second"))
        .unwrap_err();
    assert!(matches!(err, TimefoldError::Conflict(_)));
    assert_eq!(err.to_string(), "Email already registered");
}

#[test]
fn duplicate_username_is_a_conflict() {
    let (_dir, store) = open_store();
    store.create_user(&test_user("a@example.com", "taken")).unwrap();

    let err = store
        .create_user(&test_user("b@example.com", "taken"))
        .unwrap_err();
    assert_eq!(err.to_string(), "Username already taken");
}

// ── Capsules ─────────────────────────────────────────────────────────────────

#[test]
fn capsule_roundtrip_preserves_media_urls() {
    let (_dir, store) = open_store();
    let capsule = test_capsule(UserId::generate(), UserId::generate(), 100);
    store.put_capsule(&capsule).unwrap();

    let loaded = store.get_capsule(&capsule.id).unwrap().unwrap();
    assert_eq!(loaded.media_urls, vec!["https://cdn.example/a.jpg"]);
    assert_eq!(loaded.theme.as_deref(), Some("sunset"));
    assert_eq!(loaded.state, CapsuleState::Draft);
}

#[test]
fn missing_capsule_is_none_and_delete_reports_absence() {
    let (_dir, store) = open_store();
    let id = CapsuleId::generate();
    assert!(store.get_capsule(&id).unwrap().is_none());
    assert!(!store.delete_capsule(&id).unwrap());
}

#[test]
fn transition_state_applies_only_given_fields() {
    let (_dir, store) = open_store();
    let capsule = test_capsule(UserId::generate(), UserId::generate(), 100);
    store.put_capsule(&capsule).unwrap();

    let sealed = store
        .transition_state(
            &capsule.id,
            CapsuleState::Sealed,
            StateWrite {
                sealed_at: Some(200),
                scheduled_unlock_at: Some(1_000_000),
                opened_at: None,
            },
        )
        .unwrap();
    assert_eq!(sealed.state, CapsuleState::Sealed);
    assert_eq!(sealed.sealed_at, Some(200));
    assert_eq!(sealed.scheduled_unlock_at, Some(1_000_000));
    assert!(sealed.opened_at.is_none());

    // A bare state hop leaves every timestamp as it was.
    let unfolding = store
        .transition_state(&capsule.id, CapsuleState::Unfolding, StateWrite::default())
        .unwrap();
    assert_eq!(unfolding.sealed_at, Some(200));
    assert_eq!(unfolding.scheduled_unlock_at, Some(1_000_000));
}

#[test]
fn transition_state_on_missing_row_is_not_found() {
    let (_dir, store) = open_store();
    let err = store
        .transition_state(&CapsuleId::generate(), CapsuleState::Sealed, StateWrite::default())
        .unwrap_err();
    assert!(matches!(err, TimefoldError::NotFound { .. }));
}

#[test]
fn sender_listing_is_newest_first_and_paginated() {
    let (_dir, store) = open_store();
    let sender = UserId::generate();
    let receiver = UserId::generate();

    for i in 0..5 {
        store
            .put_capsule(&test_capsule(sender, receiver, 100 + i))
            .unwrap();
    }
    // A capsule from someone else must not appear.
    store
        .put_capsule(&test_capsule(UserId::generate(), receiver, 999))
        .unwrap();

    let page = store.list_by_sender(&sender, None, 0, 3).unwrap();
    assert_eq!(page.len(), 3);
    assert_eq!(page[0].created_at, 104);
    assert_eq!(page[2].created_at, 102);

    let rest = store.list_by_sender(&sender, None, 3, 3).unwrap();
    assert_eq!(rest.len(), 2);
    assert_eq!(rest[1].created_at, 100);

    assert_eq!(store.count_by_sender(&sender, None).unwrap(), 5);
}

#[test]
fn state_filter_applies_to_listing_and_count() {
    let (_dir, store) = open_store();
    let sender = UserId::generate();
    let receiver = UserId::generate();

    let mut sealed = test_capsule(sender, receiver, 10);
    sealed.state = CapsuleState::Sealed;
    sealed.sealed_at = Some(10);
    sealed.scheduled_unlock_at = Some(100);
    store.put_capsule(&sealed).unwrap();
    store.put_capsule(&test_capsule(sender, receiver, 20)).unwrap();

    let drafts = store
        .list_by_sender(&sender, Some(CapsuleState::Draft), 0, 10)
        .unwrap();
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].created_at, 20);

    assert_eq!(
        store
            .count_by_receiver(&receiver, Some(CapsuleState::Sealed))
            .unwrap(),
        1
    );
}

#[test]
fn due_scan_returns_only_lockable_states_with_unlock_instant() {
    let (_dir, store) = open_store();
    let sender = UserId::generate();
    let receiver = UserId::generate();

    let draft = test_capsule(sender, receiver, 1);
    store.put_capsule(&draft).unwrap();

    let mut sealed = test_capsule(sender, receiver, 2);
    sealed.state = CapsuleState::Sealed;
    sealed.scheduled_unlock_at = Some(500);
    store.put_capsule(&sealed).unwrap();

    let mut unfolding = test_capsule(sender, receiver, 3);
    unfolding.state = CapsuleState::Unfolding;
    unfolding.scheduled_unlock_at = Some(600);
    store.put_capsule(&unfolding).unwrap();

    let mut opened = test_capsule(sender, receiver, 4);
    opened.state = CapsuleState::Opened;
    opened.scheduled_unlock_at = Some(700);
    opened.opened_at = Some(800);
    store.put_capsule(&opened).unwrap();

    // Sealed but missing its unlock instant: skipped by the scan.
    let mut no_unlock = test_capsule(sender, receiver, 5);
    no_unlock.state = CapsuleState::Sealed;
    store.put_capsule(&no_unlock).unwrap();

    let due = store.due().unwrap();
    let mut ids: Vec<_> = due.iter().map(|c| c.id).collect();
    ids.sort();
    let mut expected = vec![sealed.id, unfolding.id];
    expected.sort();
    assert_eq!(ids, expected);
}

// ── Drafts ───────────────────────────────────────────────────────────────────

#[test]
fn drafts_list_by_recency_of_update() {
    let (_dir, store) = open_store();
    let owner = UserId::generate();

    for (i, title) in ["first", "second", "third"].iter().enumerate() {
        let draft = Draft {
            id: DraftId::generate(),
            owner_id: owner,
            title: title.to_string(),
            body: "…".into(),
            media_urls: vec![],
            theme: None,
            recipient_id: None,
            created_at: 10 + i as i64,
            updated_at: 10 + i as i64,
        };
        store.put_draft(&draft).unwrap();
    }

    let listed = store.list_drafts_by_owner(&owner, 0, 10).unwrap();
    assert_eq!(listed.len(), 3);
    assert_eq!(listed[0].title, "third");
    assert_eq!(listed[2].title, "first");
    assert_eq!(store.count_drafts_by_owner(&owner).unwrap(), 3);

    assert!(store.delete_draft(&listed[0].id).unwrap());
    assert_eq!(store.count_drafts_by_owner(&owner).unwrap(), 2);
}

// ── Recipients ───────────────────────────────────────────────────────────────

#[test]
fn recipients_are_scoped_to_their_owner() {
    let (_dir, store) = open_store();
    let owner = UserId::generate();
    let other = UserId::generate();

    let mine = Recipient {
        id: RecipientId::generate(),
        owner_id: owner,
        name: "Grandma".into(),
        email: Some("gran@example.com".into()),
        user_id: None,
        created_at: 50,
    };
    let theirs = Recipient {
        id: RecipientId::generate(),
        owner_id: other,
        name: "Stranger".into(),
        email: None,
        user_id: None,
        created_at: 60,
    };
    store.put_recipient(&mine).unwrap();
    store.put_recipient(&theirs).unwrap();

    let listed = store.list_recipients_by_owner(&owner).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "Grandma");

    assert!(store.delete_recipient(&mine.id).unwrap());
    assert!(store.list_recipients_by_owner(&owner).unwrap().is_empty());
}

// ── Persistence across reopen ────────────────────────────────────────────────

#[test]
fn rows_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let sender = UserId::generate();
    let receiver = UserId::generate();
    let capsule = test_capsule(sender, receiver, 123);

    {
        let store = Store::open(dir.path()).unwrap();
        store.put_capsule(&capsule).unwrap();
        store.flush().unwrap();
    }

    let reopened = Store::open(dir.path()).unwrap();
    let loaded = reopened.get_capsule(&capsule.id).unwrap().unwrap();
    assert_eq!(loaded.created_at, 123);
}
