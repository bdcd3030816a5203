//! timefold-store
//!
//! Persistent storage for users, capsules, drafts and recipient contacts,
//! backed by sled (pure-Rust, no C dependencies). This crate is mechanism
//! only: it never decides whether a write is allowed — the lifecycle crate
//! and the facade do — it just reads and writes rows and keeps the
//! uniqueness indexes consistent.

pub mod db;

pub use db::{StateWrite, Store};
