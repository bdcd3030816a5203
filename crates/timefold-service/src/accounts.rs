//! Account registration and credential verification.
//!
//! Passwords are stored as Argon2id PHC strings. The gateway mints bearer
//! tokens; this service only establishes who the principal is.

use std::sync::Arc;

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use tracing::info;

use timefold_core::clock::Clock;
use timefold_core::constants::MAX_EMAIL_LENGTH;
use timefold_core::error::TimefoldError;
use timefold_core::sanitize::{sanitize_text, validate_email, validate_password, validate_username};
use timefold_core::types::UserId;
use timefold_core::user::User;
use timefold_store::Store;

/// Validated-at-the-edge signup payload.
#[derive(Clone, Debug)]
pub struct Signup {
    pub email: String,
    pub username: String,
    pub password: String,
    pub full_name: Option<String>,
}

pub struct AccountService {
    store: Arc<Store>,
    clock: Arc<dyn Clock>,
}

impl AccountService {
    pub fn new(store: Arc<Store>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Register a new account. Email is canonicalized to lowercase; email
    /// and username uniqueness is enforced by the store.
    pub fn signup(&self, signup: Signup) -> Result<User, TimefoldError> {
        let email = sanitize_text(&signup.email, Some(MAX_EMAIL_LENGTH)).to_lowercase();
        let username = sanitize_text(&signup.username, None);

        if !validate_email(&email) {
            return Err(TimefoldError::invalid_input("Invalid email format"));
        }
        let (ok, reason) = validate_username(&username);
        if !ok {
            return Err(TimefoldError::InvalidInput(reason));
        }
        let (ok, reason) = validate_password(&signup.password);
        if !ok {
            return Err(TimefoldError::InvalidInput(reason));
        }

        let full_name = signup
            .full_name
            .map(|n| sanitize_text(&n, Some(timefold_core::constants::MAX_NAME_LENGTH)))
            .filter(|n| !n.is_empty());

        let user = User::new(
            email,
            username,
            hash_password(&signup.password)?,
            full_name,
            self.clock.now(),
        );
        self.store.create_user(&user)?;

        info!(user_id = %user.id, username = %user.username, "account created");
        Ok(user)
    }

    /// Verify credentials. `identifier` may be a username or an email
    /// address. The same error covers unknown identifiers and wrong
    /// passwords.
    pub fn login(&self, identifier: &str, password: &str) -> Result<User, TimefoldError> {
        let identifier = identifier.trim();
        let user = match self.store.get_user_by_username(identifier)? {
            Some(u) => Some(u),
            None => self.store.get_user_by_email(&identifier.to_lowercase())?,
        };

        let user = match user {
            Some(u) if verify_password(password, &u.hashed_password) => u,
            _ => {
                return Err(TimefoldError::Unauthorized(
                    "Incorrect username or password".into(),
                ))
            }
        };

        if !user.is_active {
            return Err(TimefoldError::forbidden("User account is inactive"));
        }
        Ok(user)
    }

    /// Resolve a principal id to its account, rejecting inactive accounts
    /// before any business logic runs.
    pub fn require_active(&self, principal: UserId) -> Result<User, TimefoldError> {
        let user = self
            .store
            .get_user(&principal)?
            .ok_or(TimefoldError::Unauthorized("Unknown principal".into()))?;
        if !user.is_active {
            return Err(TimefoldError::forbidden("User account is inactive"));
        }
        Ok(user)
    }
}

fn hash_password(password: &str) -> Result<String, TimefoldError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| TimefoldError::Internal(format!("password hashing failed: {e}")))
}

fn verify_password(password: &str, phc: &str) -> bool {
    PasswordHash::new(phc)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}
