use async_trait::async_trait;
use tracing::info;

use timefold_core::capsule::Capsule;
use timefold_core::error::TimefoldError;

/// Delivery interface invoked on phase entry. Implementations are
/// best-effort: a failure is logged and counted by the sweep but never rolls
/// back the transition that triggered it, and delivery is at-least-zero
/// times — exactly-once is explicitly not guaranteed.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Early warning: the capsule entered `unfolding`, `days_remaining`
    /// whole days before its unlock instant.
    async fn capsule_unfolding(
        &self,
        capsule: &Capsule,
        days_remaining: i64,
    ) -> Result<(), TimefoldError>;

    /// The capsule entered `ready` and may now be opened by its receiver.
    async fn capsule_ready(&self, capsule: &Capsule) -> Result<(), TimefoldError>;
}

/// Default implementation: writes structured log lines and nothing else.
/// Push and email transports plug in behind the same trait.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn capsule_unfolding(
        &self,
        capsule: &Capsule,
        days_remaining: i64,
    ) -> Result<(), TimefoldError> {
        info!(
            capsule_id = %capsule.id,
            receiver_id = %capsule.receiver_id,
            days_remaining,
            "capsule unfolding — early notice"
        );
        Ok(())
    }

    async fn capsule_ready(&self, capsule: &Capsule) -> Result<(), TimefoldError> {
        info!(
            capsule_id = %capsule.id,
            receiver_id = %capsule.receiver_id,
            "capsule ready to open"
        );
        Ok(())
    }
}
