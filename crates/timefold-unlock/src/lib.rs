//! timefold-unlock
//!
//! The time-lock engine. [`UnlockService`] performs one sweep over due
//! capsules, advancing each at most one hop along the lifecycle and firing
//! notifications on phase entry. [`UnlockWorker`] is the long-lived driver
//! that runs sweeps on a fixed period with no overlap, and cooperates with
//! process start/stop.

pub mod notify;
pub mod service;
pub mod worker;

pub use notify::{LogNotifier, Notifier};
pub use service::{SweepStats, UnlockService};
pub use worker::UnlockWorker;
