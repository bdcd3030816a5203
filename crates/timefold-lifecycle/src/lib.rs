//! timefold-lifecycle
//!
//! Pure decision logic for the capsule lifecycle. Nothing in this crate
//! performs I/O or reads a clock: time-driven functions take `now` as a
//! parameter, injected by the caller. The unlock engine and the request
//! facade both consult this crate and then write whatever it decides.

pub mod gates;
pub mod machine;

pub use gates::{can_edit, can_open, can_seal, can_view, Verdict};
pub use machine::{can_transition, next_state, seal, validate_transition, SealParams, UnlockWindows};
