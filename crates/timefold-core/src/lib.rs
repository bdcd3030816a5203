//! timefold-core
//!
//! Core domain types for the Timefold capsule service:
//! - [`types`] — id newtypes and the `Timestamp` alias
//! - [`capsule`] — the capsule entity, its closed state enumeration, drafts
//!   and recipient contact entries
//! - [`self_letter`] — short time-locked notes to one's future self
//! - [`user`] — the account entity
//! - [`error`] — the domain error taxonomy shared by every layer
//! - [`clock`] — the injectable UTC time source
//! - [`sanitize`] — text cleanup and credential validation helpers

pub mod capsule;
pub mod clock;
pub mod constants;
pub mod error;
pub mod sanitize;
pub mod self_letter;
pub mod types;
pub mod user;

pub use capsule::{Capsule, CapsuleState, Draft, Recipient};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::TimefoldError;
pub use self_letter::{LifeArea, ReflectionAnswer, SelfLetter};
pub use types::{CapsuleId, DraftId, RecipientId, SelfLetterId, Timestamp, UserId};
pub use user::User;
