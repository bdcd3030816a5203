//! timefold-service
//!
//! The synchronous request-handling core consumed by the HTTP gateway.
//! [`CapsuleFacade`] enforces authorization through the lifecycle gates and
//! delegates persistence to the store; [`AccountService`], [`DraftService`],
//! [`RecipientService`] and [`SelfLetterService`] cover the remaining
//! surfaces.
//! Everything here takes an already-authenticated principal id — token
//! parsing lives in the gateway.

pub mod accounts;
pub mod config;
pub mod drafts;
pub mod facade;
pub mod pagination;
pub mod recipients;
pub mod self_letters;

pub use accounts::{AccountService, Signup};
pub use config::Settings;
pub use drafts::{DraftPatch, DraftService, NewDraft};
pub use facade::{CapsuleFacade, CapsulePatch, CapsuleView, ListBox, NewCapsule};
pub use pagination::{Page, PageParams};
pub use recipients::{NewRecipient, RecipientService};
pub use self_letters::{NewSelfLetter, SelfLetterService, SelfLetterView};
