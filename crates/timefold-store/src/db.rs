use std::path::Path;

use timefold_core::capsule::{Capsule, CapsuleState, Draft, Recipient};
use timefold_core::error::TimefoldError;
use timefold_core::self_letter::SelfLetter;
use timefold_core::types::{CapsuleId, DraftId, RecipientId, SelfLetterId, Timestamp, UserId};
use timefold_core::user::User;

/// Persistent state database backed by sled.
///
/// Named trees:
///   users             — UserId bytes       → bincode(User)
///   users_by_email    — lowercase utf8     → UserId bytes
///   users_by_username — utf8 bytes         → UserId bytes
///   capsules          — CapsuleId bytes    → bincode(Capsule)
///   drafts            — DraftId bytes      → bincode(Draft)
///   recipients        — RecipientId bytes  → bincode(Recipient)
///   self_letters      — SelfLetterId bytes → bincode(SelfLetter)
///
/// One process owns the database at a time (sled holds an exclusive file
/// lock), which is what makes the read-modify-write sequences below safe
/// without storage-level transactions.
pub struct Store {
    _db: sled::Db,
    users: sled::Tree,
    users_by_email: sled::Tree,
    users_by_username: sled::Tree,
    capsules: sled::Tree,
    drafts: sled::Tree,
    recipients: sled::Tree,
    self_letters: sled::Tree,
}

/// Field values applied by a single-row state transition. `None` fields are
/// left untouched; the state itself always changes.
#[derive(Clone, Copy, Debug, Default)]
pub struct StateWrite {
    pub sealed_at: Option<Timestamp>,
    pub scheduled_unlock_at: Option<Timestamp>,
    pub opened_at: Option<Timestamp>,
}

fn storage_err(e: sled::Error) -> TimefoldError {
    TimefoldError::Storage(e.to_string())
}

fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, TimefoldError> {
    bincode::serialize(value).map_err(|e| TimefoldError::Serialization(e.to_string()))
}

fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T, TimefoldError> {
    bincode::deserialize(bytes).map_err(|e| TimefoldError::Serialization(e.to_string()))
}

impl Store {
    /// Open or create the state database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, TimefoldError> {
        let db = sled::open(path).map_err(storage_err)?;
        let users             = db.open_tree("users").map_err(storage_err)?;
        let users_by_email    = db.open_tree("users_by_email").map_err(storage_err)?;
        let users_by_username = db.open_tree("users_by_username").map_err(storage_err)?;
        let capsules          = db.open_tree("capsules").map_err(storage_err)?;
        let drafts            = db.open_tree("drafts").map_err(storage_err)?;
        let recipients        = db.open_tree("recipients").map_err(storage_err)?;
        let self_letters      = db.open_tree("self_letters").map_err(storage_err)?;
        Ok(Self {
            _db: db,
            users,
            users_by_email,
            users_by_username,
            capsules,
            drafts,
            recipients,
            self_letters,
        })
    }

    /// Flush all pending writes to disk.
    pub fn flush(&self) -> Result<(), TimefoldError> {
        self._db.flush().map_err(storage_err)?;
        Ok(())
    }

    // ── Users ────────────────────────────────────────────────────────────────

    /// Insert a new user, enforcing email and username uniqueness.
    pub fn create_user(&self, user: &User) -> Result<(), TimefoldError> {
        if self
            .users_by_email
            .contains_key(user.email.as_bytes())
            .map_err(storage_err)?
        {
            return Err(TimefoldError::Conflict("Email already registered".into()));
        }
        if self
            .users_by_username
            .contains_key(user.username.as_bytes())
            .map_err(storage_err)?
        {
            return Err(TimefoldError::Conflict("Username already taken".into()));
        }

        self.users
            .insert(user.id.as_bytes(), encode(user)?)
            .map_err(storage_err)?;
        self.users_by_email
            .insert(user.email.as_bytes(), user.id.as_bytes().as_ref())
            .map_err(storage_err)?;
        self.users_by_username
            .insert(user.username.as_bytes(), user.id.as_bytes().as_ref())
            .map_err(storage_err)?;
        Ok(())
    }

    pub fn get_user(&self, id: &UserId) -> Result<Option<User>, TimefoldError> {
        match self.users.get(id.as_bytes()).map_err(storage_err)? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>, TimefoldError> {
        match self.users_by_email.get(email.as_bytes()).map_err(storage_err)? {
            Some(id_bytes) => {
                let mut arr = [0u8; 16];
                arr.copy_from_slice(&id_bytes);
                self.get_user(&UserId::from_bytes(arr))
            }
            None => Ok(None),
        }
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<User>, TimefoldError> {
        match self
            .users_by_username
            .get(username.as_bytes())
            .map_err(storage_err)?
        {
            Some(id_bytes) => {
                let mut arr = [0u8; 16];
                arr.copy_from_slice(&id_bytes);
                self.get_user(&UserId::from_bytes(arr))
            }
            None => Ok(None),
        }
    }

    // ── Capsules ─────────────────────────────────────────────────────────────

    pub fn put_capsule(&self, capsule: &Capsule) -> Result<(), TimefoldError> {
        self.capsules
            .insert(capsule.id.as_bytes(), encode(capsule)?)
            .map_err(storage_err)?;
        Ok(())
    }

    pub fn get_capsule(&self, id: &CapsuleId) -> Result<Option<Capsule>, TimefoldError> {
        match self.capsules.get(id.as_bytes()).map_err(storage_err)? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Remove a capsule row. Returns true if a row existed.
    pub fn delete_capsule(&self, id: &CapsuleId) -> Result<bool, TimefoldError> {
        Ok(self
            .capsules
            .remove(id.as_bytes())
            .map_err(storage_err)?
            .is_some())
    }

    /// Single-row state transition: sets `state` plus whichever timestamp
    /// fields the write carries, and returns the refreshed row.
    pub fn transition_state(
        &self,
        id: &CapsuleId,
        new_state: CapsuleState,
        write: StateWrite,
    ) -> Result<Capsule, TimefoldError> {
        let mut capsule = self
            .get_capsule(id)?
            .ok_or(TimefoldError::NotFound { entity: "capsule" })?;

        capsule.state = new_state;
        if let Some(t) = write.sealed_at {
            capsule.sealed_at = Some(t);
        }
        if let Some(t) = write.scheduled_unlock_at {
            capsule.scheduled_unlock_at = Some(t);
        }
        if let Some(t) = write.opened_at {
            capsule.opened_at = Some(t);
        }

        self.put_capsule(&capsule)?;
        Ok(capsule)
    }

    /// Capsules sent by `sender_id`, newest first, with an optional state
    /// filter and skip/limit pagination.
    pub fn list_by_sender(
        &self,
        sender_id: &UserId,
        state: Option<CapsuleState>,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<Capsule>, TimefoldError> {
        let mut matched = self.filter_capsules(|c| {
            c.sender_id == *sender_id && state.map_or(true, |s| c.state == s)
        })?;
        sort_newest_first(&mut matched);
        Ok(matched.into_iter().skip(skip).take(limit).collect())
    }

    pub fn count_by_sender(
        &self,
        sender_id: &UserId,
        state: Option<CapsuleState>,
    ) -> Result<usize, TimefoldError> {
        Ok(self
            .filter_capsules(|c| c.sender_id == *sender_id && state.map_or(true, |s| c.state == s))?
            .len())
    }

    /// Capsules addressed to `receiver_id`, newest first.
    pub fn list_by_receiver(
        &self,
        receiver_id: &UserId,
        state: Option<CapsuleState>,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<Capsule>, TimefoldError> {
        let mut matched = self.filter_capsules(|c| {
            c.receiver_id == *receiver_id && state.map_or(true, |s| c.state == s)
        })?;
        sort_newest_first(&mut matched);
        Ok(matched.into_iter().skip(skip).take(limit).collect())
    }

    pub fn count_by_receiver(
        &self,
        receiver_id: &UserId,
        state: Option<CapsuleState>,
    ) -> Result<usize, TimefoldError> {
        Ok(self
            .filter_capsules(|c| {
                c.receiver_id == *receiver_id && state.map_or(true, |s| c.state == s)
            })?
            .len())
    }

    /// Capsules the unlock sweep must look at: sealed or unfolding rows with
    /// a bound unlock instant.
    pub fn due(&self) -> Result<Vec<Capsule>, TimefoldError> {
        self.filter_capsules(|c| {
            matches!(c.state, CapsuleState::Sealed | CapsuleState::Unfolding)
                && c.scheduled_unlock_at.is_some()
        })
    }

    fn filter_capsules<F>(&self, keep: F) -> Result<Vec<Capsule>, TimefoldError>
    where
        F: Fn(&Capsule) -> bool,
    {
        let mut result = Vec::new();
        for item in self.capsules.iter() {
            let (_, bytes) = item.map_err(storage_err)?;
            let capsule: Capsule = decode(&bytes)?;
            if keep(&capsule) {
                result.push(capsule);
            }
        }
        Ok(result)
    }

    // ── Drafts ───────────────────────────────────────────────────────────────

    pub fn put_draft(&self, draft: &Draft) -> Result<(), TimefoldError> {
        self.drafts
            .insert(draft.id.as_bytes(), encode(draft)?)
            .map_err(storage_err)?;
        Ok(())
    }

    pub fn get_draft(&self, id: &DraftId) -> Result<Option<Draft>, TimefoldError> {
        match self.drafts.get(id.as_bytes()).map_err(storage_err)? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn delete_draft(&self, id: &DraftId) -> Result<bool, TimefoldError> {
        Ok(self
            .drafts
            .remove(id.as_bytes())
            .map_err(storage_err)?
            .is_some())
    }

    /// Drafts owned by `owner_id`, most recently updated first.
    pub fn list_drafts_by_owner(
        &self,
        owner_id: &UserId,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<Draft>, TimefoldError> {
        let mut result = Vec::new();
        for item in self.drafts.iter() {
            let (_, bytes) = item.map_err(storage_err)?;
            let draft: Draft = decode(&bytes)?;
            if draft.owner_id == *owner_id {
                result.push(draft);
            }
        }
        result.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| b.id.as_bytes().cmp(a.id.as_bytes()))
        });
        Ok(result.into_iter().skip(skip).take(limit).collect())
    }

    pub fn count_drafts_by_owner(&self, owner_id: &UserId) -> Result<usize, TimefoldError> {
        let mut count = 0;
        for item in self.drafts.iter() {
            let (_, bytes) = item.map_err(storage_err)?;
            let draft: Draft = decode(&bytes)?;
            if draft.owner_id == *owner_id {
                count += 1;
            }
        }
        Ok(count)
    }

    // ── Recipients ───────────────────────────────────────────────────────────

    pub fn put_recipient(&self, recipient: &Recipient) -> Result<(), TimefoldError> {
        self.recipients
            .insert(recipient.id.as_bytes(), encode(recipient)?)
            .map_err(storage_err)?;
        Ok(())
    }

    pub fn get_recipient(&self, id: &RecipientId) -> Result<Option<Recipient>, TimefoldError> {
        match self.recipients.get(id.as_bytes()).map_err(storage_err)? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn delete_recipient(&self, id: &RecipientId) -> Result<bool, TimefoldError> {
        Ok(self
            .recipients
            .remove(id.as_bytes())
            .map_err(storage_err)?
            .is_some())
    }

    /// Contact entries owned by `owner_id`, newest first.
    pub fn list_recipients_by_owner(
        &self,
        owner_id: &UserId,
    ) -> Result<Vec<Recipient>, TimefoldError> {
        let mut result = Vec::new();
        for item in self.recipients.iter() {
            let (_, bytes) = item.map_err(storage_err)?;
            let recipient: Recipient = decode(&bytes)?;
            if recipient.owner_id == *owner_id {
                result.push(recipient);
            }
        }
        result.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.as_bytes().cmp(a.id.as_bytes()))
        });
        Ok(result)
    }

    // ── Self letters ─────────────────────────────────────────────────────────

    pub fn put_self_letter(&self, letter: &SelfLetter) -> Result<(), TimefoldError> {
        self.self_letters
            .insert(letter.id.as_bytes(), encode(letter)?)
            .map_err(storage_err)?;
        Ok(())
    }

    pub fn get_self_letter(&self, id: &SelfLetterId) -> Result<Option<SelfLetter>, TimefoldError> {
        match self.self_letters.get(id.as_bytes()).map_err(storage_err)? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Self letters owned by `owner_id`, newest first.
    pub fn list_self_letters_by_owner(
        &self,
        owner_id: &UserId,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<SelfLetter>, TimefoldError> {
        let mut result = Vec::new();
        for item in self.self_letters.iter() {
            let (_, bytes) = item.map_err(storage_err)?;
            let letter: SelfLetter = decode(&bytes)?;
            if letter.owner_id == *owner_id {
                result.push(letter);
            }
        }
        result.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.as_bytes().cmp(a.id.as_bytes()))
        });
        Ok(result.into_iter().skip(skip).take(limit).collect())
    }

    pub fn count_self_letters_by_owner(&self, owner_id: &UserId) -> Result<usize, TimefoldError> {
        let mut count = 0;
        for item in self.self_letters.iter() {
            let (_, bytes) = item.map_err(storage_err)?;
            let letter: SelfLetter = decode(&bytes)?;
            if letter.owner_id == *owner_id {
                count += 1;
            }
        }
        Ok(count)
    }
}

/// Newest first by creation instant; id bytes break ties so pagination is
/// stable across calls.
fn sort_newest_first(capsules: &mut [Capsule]) {
    capsules.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.as_bytes().cmp(a.id.as_bytes()))
    });
}
