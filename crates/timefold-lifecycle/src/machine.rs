//! The capsule state machine.
//!
//! Legal transitions:
//!
//! ```text
//! draft     → sealed      (sender action, binds the unlock instant)
//! sealed    → unfolding   (now ≥ unlock − T_early)
//! unfolding → ready       (now ≥ unlock)
//! ready     → opened      (receiver action)
//! opened    → ∅           (terminal)
//! ```
//!
//! States never move backwards and the unlock instant never changes after
//! sealing. Within one sweep a capsule advances at most one hop, so the
//! `unfolding` phase stays observable even when a capsule's unlock instant
//! is long past (catch-up after downtime takes two sweeps).

use timefold_core::capsule::{Capsule, CapsuleState};
use timefold_core::constants::{
    DEFAULT_EARLY_VIEW_THRESHOLD_DAYS, DEFAULT_MAX_UNLOCK_YEARS, DEFAULT_MIN_UNLOCK_MINUTES,
    SECS_PER_DAY, SECS_PER_MINUTE, SECS_PER_YEAR,
};
use timefold_core::error::TimefoldError;
use timefold_core::types::Timestamp;
use tracing::debug;

// ── Unlock windows ───────────────────────────────────────────────────────────

/// Temporal parameters of the lifecycle, all in seconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnlockWindows {
    /// T_min: minimum distance of the unlock instant from seal time.
    pub min_unlock_secs: i64,
    /// T_max: maximum distance of the unlock instant from seal time.
    pub max_unlock_secs: i64,
    /// T_early: how long before the unlock instant the teaser phase begins.
    pub early_view_threshold_secs: i64,
}

impl Default for UnlockWindows {
    fn default() -> Self {
        Self {
            min_unlock_secs: DEFAULT_MIN_UNLOCK_MINUTES * SECS_PER_MINUTE,
            max_unlock_secs: DEFAULT_MAX_UNLOCK_YEARS * SECS_PER_YEAR,
            early_view_threshold_secs: DEFAULT_EARLY_VIEW_THRESHOLD_DAYS * SECS_PER_DAY,
        }
    }
}

// ── Transition table ─────────────────────────────────────────────────────────

/// True if `from → to` is an edge of the lifecycle DAG.
pub fn can_transition(from: CapsuleState, to: CapsuleState) -> bool {
    matches!(
        (from, to),
        (CapsuleState::Draft, CapsuleState::Sealed)
            | (CapsuleState::Sealed, CapsuleState::Unfolding)
            | (CapsuleState::Unfolding, CapsuleState::Ready)
            | (CapsuleState::Ready, CapsuleState::Opened)
    )
}

/// Reject any edge absent from the lifecycle DAG.
pub fn validate_transition(from: CapsuleState, to: CapsuleState) -> Result<(), TimefoldError> {
    if can_transition(from, to) {
        Ok(())
    } else {
        Err(TimefoldError::IllegalTransition(format!(
            "Invalid state transition: {from} → {to}"
        )))
    }
}

// ── Time-driven transitions ──────────────────────────────────────────────────

/// The next automatic state for a capsule at instant `now`, or `None` when
/// no transition is due. Only `sealed` and `unfolding` ever advance on the
/// clock; everything else is driven by principals.
pub fn next_state(capsule: &Capsule, now: Timestamp, windows: &UnlockWindows) -> Option<CapsuleState> {
    if matches!(capsule.state, CapsuleState::Draft | CapsuleState::Opened) {
        return None;
    }

    let unlock_at = capsule.scheduled_unlock_at?;

    match capsule.state {
        CapsuleState::Sealed => {
            if unlock_at - now <= windows.early_view_threshold_secs {
                debug!(capsule_id = %capsule.id, "capsule entering unfolding phase");
                Some(CapsuleState::Unfolding)
            } else {
                None
            }
        }
        CapsuleState::Unfolding => {
            if now >= unlock_at {
                debug!(capsule_id = %capsule.id, "capsule is now ready");
                Some(CapsuleState::Ready)
            } else {
                None
            }
        }
        _ => None,
    }
}

// ── Sealing ──────────────────────────────────────────────────────────────────

/// Field values to persist for a draft → sealed transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SealParams {
    pub state: CapsuleState,
    pub sealed_at: Timestamp,
    pub scheduled_unlock_at: Timestamp,
}

/// Validate the unlock instant against the seal windows and produce the
/// fields of the sealed row. `unlock_at` must already be UTC-normalized.
pub fn seal(
    unlock_at: Timestamp,
    now: Timestamp,
    windows: &UnlockWindows,
) -> Result<SealParams, TimefoldError> {
    if unlock_at <= now + windows.min_unlock_secs {
        return Err(TimefoldError::InvalidUnlockTime(format!(
            "Unlock time must be at least {} minute(s) in the future",
            windows.min_unlock_secs / SECS_PER_MINUTE
        )));
    }
    if unlock_at > now + windows.max_unlock_secs {
        return Err(TimefoldError::InvalidUnlockTime(format!(
            "Unlock time cannot be more than {} years in the future",
            windows.max_unlock_secs / SECS_PER_YEAR
        )));
    }

    Ok(SealParams {
        state: CapsuleState::Sealed,
        sealed_at: now,
        scheduled_unlock_at: unlock_at,
    })
}
