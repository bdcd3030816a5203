//! Recipient contact book: private per-owner entries, not access control.

use std::sync::Arc;

use tracing::info;

use timefold_core::capsule::Recipient;
use timefold_core::clock::Clock;
use timefold_core::constants::MAX_NAME_LENGTH;
use timefold_core::error::TimefoldError;
use timefold_core::sanitize::{sanitize_text, validate_email};
use timefold_core::types::{RecipientId, UserId};
use timefold_store::Store;

#[derive(Clone, Debug)]
pub struct NewRecipient {
    pub name: String,
    pub email: Option<String>,
    /// Link to a registered account, when the owner knows it.
    pub user_id: Option<UserId>,
}

pub struct RecipientService {
    store: Arc<Store>,
    clock: Arc<dyn Clock>,
}

impl RecipientService {
    pub fn new(store: Arc<Store>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn create(&self, owner: UserId, new: NewRecipient) -> Result<Recipient, TimefoldError> {
        let name = sanitize_text(&new.name, Some(MAX_NAME_LENGTH));
        if name.is_empty() {
            return Err(TimefoldError::invalid_input("Recipient name is required"));
        }

        let email = match new.email {
            Some(raw) => {
                let email = sanitize_text(&raw, None).to_lowercase();
                if !validate_email(&email) {
                    return Err(TimefoldError::invalid_input("Invalid email format"));
                }
                Some(email)
            }
            None => None,
        };

        if let Some(user_id) = new.user_id {
            if self.store.get_user(&user_id)?.is_none() {
                return Err(TimefoldError::invalid_input(
                    "Linked user account does not exist",
                ));
            }
        }

        let recipient = Recipient {
            id: RecipientId::generate(),
            owner_id: owner,
            name,
            email,
            user_id: new.user_id,
            created_at: self.clock.now(),
        };
        self.store.put_recipient(&recipient)?;
        info!(recipient_id = %recipient.id, owner_id = %owner, "recipient created");
        Ok(recipient)
    }

    /// Like drafts, contact entries are invisible to anyone but their owner.
    pub fn get(&self, owner: UserId, id: RecipientId) -> Result<Recipient, TimefoldError> {
        match self.store.get_recipient(&id)? {
            Some(r) if r.owner_id == owner => Ok(r),
            _ => Err(TimefoldError::not_found("recipient")),
        }
    }

    pub fn delete(&self, owner: UserId, id: RecipientId) -> Result<(), TimefoldError> {
        let recipient = self.get(owner, id)?;
        self.store.delete_recipient(&recipient.id)?;
        info!(recipient_id = %id, owner_id = %owner, "recipient deleted");
        Ok(())
    }

    pub fn list(&self, owner: UserId) -> Result<Vec<Recipient>, TimefoldError> {
        self.store.list_recipients_by_owner(&owner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use timefold_core::clock::ManualClock;
    use timefold_core::user::User;

    fn service() -> (TempDir, Arc<Store>, RecipientService) {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(Store::open(dir.path()).unwrap());
        let svc = RecipientService::new(Arc::clone(&store), Arc::new(ManualClock::new(500)));
        (dir, store, svc)
    }

    #[test]
    fn create_lowercases_email_and_requires_name() {
        let (_dir, _store, svc) = service();
        let owner = UserId::generate();

        let r = svc
            .create(
                owner,
                NewRecipient {
                    name: "  Gran  ".into(),
                    email: Some("Gran@Example.COM".into()),
                    user_id: None,
                },
            )
            .unwrap();
        assert_eq!(r.name, "Gran");
        assert_eq!(r.email.as_deref(), Some("gran@example.com"));

        assert!(svc
            .create(
                owner,
                NewRecipient {
                    name: "  ".into(),
                    email: None,
                    user_id: None,
                },
            )
            .is_err());
    }

    #[test]
    fn linked_user_must_exist() {
        let (_dir, store, svc) = service();
        let owner = UserId::generate();

        assert!(svc
            .create(
                owner,
                NewRecipient {
                    name: "Ghost".into(),
                    email: None,
                    user_id: Some(UserId::generate()),
                },
            )
            .is_err());

        let user = User::new(
            "real@example.com".into(),
            "real".into(),
            "$argon2id$stub".into(),
            None,
            1,
        );
        store.create_user(&user).unwrap();
        assert!(svc
            .create(
                owner,
                NewRecipient {
                    name: "Real".into(),
                    email: None,
                    user_id: Some(user.id),
                },
            )
            .is_ok());
    }

    #[test]
    fn entries_are_owner_scoped() {
        let (_dir, _store, svc) = service();
        let owner = UserId::generate();
        let stranger = UserId::generate();

        let r = svc
            .create(
                owner,
                NewRecipient {
                    name: "Friend".into(),
                    email: None,
                    user_id: None,
                },
            )
            .unwrap();

        assert!(svc.get(stranger, r.id).is_err());
        assert!(svc.delete(stranger, r.id).is_err());
        assert_eq!(svc.list(owner).unwrap().len(), 1);
        assert!(svc.list(stranger).unwrap().is_empty());
    }
}
