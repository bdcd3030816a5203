use serde::{Deserialize, Serialize};

use crate::types::{Timestamp, UserId};

/// A registered account as stored in the state DB.
///
/// `email` is canonicalized to lowercase before storage; `email` and
/// `username` are unique across the service (enforced by the store's index
/// trees).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub username: String,
    /// Argon2 PHC string. Never serialized onto the wire.
    pub hashed_password: String,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
}

impl User {
    pub fn new(
        email: String,
        username: String,
        hashed_password: String,
        full_name: Option<String>,
        now: Timestamp,
    ) -> Self {
        Self {
            id: UserId::generate(),
            email,
            username,
            hashed_password,
            full_name,
            is_active: true,
            created_at: now,
        }
    }
}
