use std::sync::Arc;

use tracing::{info, warn};

use timefold_core::capsule::{Capsule, CapsuleState};
use timefold_core::clock::Clock;
use timefold_core::constants::SECS_PER_DAY;
use timefold_core::error::TimefoldError;
use timefold_core::types::Timestamp;
use timefold_lifecycle::{next_state, validate_transition, UnlockWindows};
use timefold_store::{StateWrite, Store};

use crate::notify::Notifier;

/// Counters returned by one sweep.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SweepStats {
    /// Due capsules examined.
    pub checked: usize,
    pub sealed_to_unfolding: usize,
    pub unfolding_to_ready: usize,
    /// Per-capsule failures (transition writes or notification delivery).
    pub errors: usize,
}

/// The unlock engine: advances due capsules through their time-driven
/// transitions. One instance exists per process and only the worker drives
/// it, so sweeps never overlap.
pub struct UnlockService {
    store: Arc<Store>,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
    windows: UnlockWindows,
}

impl UnlockService {
    pub fn new(
        store: Arc<Store>,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn Notifier>,
        windows: UnlockWindows,
    ) -> Self {
        Self {
            store,
            clock,
            notifier,
            windows,
        }
    }

    /// Run one sweep over the due capsules.
    ///
    /// The clock is read once at sweep start and that instant governs every
    /// decision in the sweep. Each capsule advances at most one hop; a
    /// capsule whose unlock instant is long past still walks
    /// `sealed → unfolding` now and `unfolding → ready` on a later sweep.
    /// Per-capsule failures are logged and counted without aborting the
    /// remaining work.
    pub async fn sweep(&self) -> Result<SweepStats, TimefoldError> {
        let now = self.clock.now();
        let due = self.store.due()?;

        let mut stats = SweepStats {
            checked: due.len(),
            ..SweepStats::default()
        };

        for capsule in &due {
            let Some(next) = next_state(capsule, now, &self.windows) else {
                continue;
            };

            let updated = match self.transition(capsule, next) {
                Ok(updated) => updated,
                Err(e) => {
                    warn!(capsule_id = %capsule.id, error = %e, "sweep: transition failed");
                    stats.errors += 1;
                    continue;
                }
            };

            match next {
                CapsuleState::Unfolding => stats.sealed_to_unfolding += 1,
                CapsuleState::Ready => stats.unfolding_to_ready += 1,
                _ => {}
            }

            // Notification is best-effort: the transition above stands even
            // if delivery fails.
            if let Err(e) = self.notify(&updated, next, now).await {
                warn!(capsule_id = %capsule.id, error = %e, "sweep: notification failed");
                stats.errors += 1;
            }
        }

        self.store.flush()?;

        info!(
            checked = stats.checked,
            sealed_to_unfolding = stats.sealed_to_unfolding,
            unfolding_to_ready = stats.unfolding_to_ready,
            errors = stats.errors,
            "unlock sweep complete"
        );
        Ok(stats)
    }

    fn transition(&self, capsule: &Capsule, next: CapsuleState) -> Result<Capsule, TimefoldError> {
        validate_transition(capsule.state, next)?;
        let updated = self
            .store
            .transition_state(&capsule.id, next, StateWrite::default())?;
        info!(
            capsule_id = %capsule.id,
            from = %capsule.state,
            to = %next,
            unlock_at = ?capsule.scheduled_unlock_at,
            "capsule transitioned"
        );
        Ok(updated)
    }

    async fn notify(
        &self,
        capsule: &Capsule,
        entered: CapsuleState,
        now: Timestamp,
    ) -> Result<(), TimefoldError> {
        match entered {
            CapsuleState::Unfolding => {
                let unlock_at = capsule.scheduled_unlock_at.unwrap_or(now);
                let days_remaining =
                    (unlock_at - now + SECS_PER_DAY - 1).div_euclid(SECS_PER_DAY);
                self.notifier
                    .capsule_unfolding(capsule, days_remaining.max(0))
                    .await
            }
            CapsuleState::Ready => self.notifier.capsule_ready(capsule).await,
            _ => Ok(()),
        }
    }
}
