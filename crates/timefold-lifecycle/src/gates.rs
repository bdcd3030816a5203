//! Authorization gates.
//!
//! Each gate takes a capsule snapshot and the acting principal and returns a
//! [`Verdict`]: allowed or denied with a human-readable reason. Reason texts
//! are user-safe and surfaced verbatim by the HTTP gateway.

use timefold_core::capsule::{Capsule, CapsuleState};
use timefold_core::error::TimefoldError;
use timefold_core::types::UserId;

/// Outcome of an authorization gate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Verdict {
    pub allowed: bool,
    pub reason: String,
}

impl Verdict {
    fn allow() -> Self {
        Self {
            allowed: true,
            reason: "OK".to_string(),
        }
    }

    fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: reason.into(),
        }
    }

    /// Map a denial onto the `Forbidden` error kind.
    pub fn require(self) -> Result<(), TimefoldError> {
        if self.allowed {
            Ok(())
        } else {
            Err(TimefoldError::Forbidden(self.reason))
        }
    }
}

/// Only the sender may edit, and only while the capsule is a draft.
pub fn can_edit(capsule: &Capsule, principal: UserId) -> Verdict {
    if capsule.sender_id != principal {
        return Verdict::deny("Only the sender can edit this capsule");
    }
    if capsule.state != CapsuleState::Draft {
        return Verdict::deny(format!("Cannot edit capsule in {} state", capsule.state));
    }
    Verdict::allow()
}

/// Only the sender may seal, and only while the capsule is a draft.
pub fn can_seal(capsule: &Capsule, principal: UserId) -> Verdict {
    if capsule.sender_id != principal {
        return Verdict::deny("Only the sender can seal this capsule");
    }
    if capsule.state != CapsuleState::Draft {
        return Verdict::deny(format!("Cannot seal capsule in {} state", capsule.state));
    }
    Verdict::allow()
}

/// Only the receiver may open, and only once the capsule is ready. An
/// already-opened capsule gets a distinguishable reason so the facade can
/// report the repeat attempt as an illegal transition rather than a
/// permission failure.
pub fn can_open(capsule: &Capsule, principal: UserId) -> Verdict {
    if capsule.receiver_id != principal {
        return Verdict::deny("Only the receiver can open this capsule");
    }
    if capsule.state == CapsuleState::Opened {
        return Verdict::deny("Capsule is already opened");
    }
    if capsule.state != CapsuleState::Ready {
        return Verdict::deny(format!(
            "Capsule is not ready yet (current state: {})",
            capsule.state
        ));
    }
    Verdict::allow()
}

/// Content visibility. The sender always sees everything it wrote. The
/// receiver sees contents once opened, or during `unfolding`/`ready` when
/// the sender granted early view. Everyone else is shut out. A denial here
/// does not fail a GET; the facade degrades to a metadata-only projection.
pub fn can_view(capsule: &Capsule, principal: UserId) -> Verdict {
    if capsule.sender_id == principal {
        return Verdict::allow();
    }

    if capsule.receiver_id == principal {
        if capsule.state == CapsuleState::Opened {
            return Verdict::allow();
        }
        if capsule.allow_early_view
            && matches!(capsule.state, CapsuleState::Unfolding | CapsuleState::Ready)
        {
            return Verdict::allow();
        }
        return Verdict::deny(format!(
            "Capsule is not ready yet (current state: {})",
            capsule.state
        ));
    }

    Verdict::deny("You do not have permission to view this capsule")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capsule(state: CapsuleState, sender: UserId, receiver: UserId) -> Capsule {
        let mut c = Capsule::new_draft(
            sender,
            receiver,
            "t".into(),
            "b".into(),
            vec![],
            None,
            false,
            true,
            0,
        );
        c.state = state;
        c
    }

    #[test]
    fn sender_edits_draft_only() {
        let sender = UserId::generate();
        let receiver = UserId::generate();

        assert!(can_edit(&capsule(CapsuleState::Draft, sender, receiver), sender).allowed);

        let sealed = capsule(CapsuleState::Sealed, sender, receiver);
        let v = can_edit(&sealed, sender);
        assert!(!v.allowed);
        assert_eq!(v.reason, "Cannot edit capsule in sealed state");

        let v = can_edit(&capsule(CapsuleState::Draft, sender, receiver), receiver);
        assert!(!v.allowed);
        assert_eq!(v.reason, "Only the sender can edit this capsule");
    }

    #[test]
    fn seal_gate_mirrors_edit_gate() {
        let sender = UserId::generate();
        let receiver = UserId::generate();

        assert!(can_seal(&capsule(CapsuleState::Draft, sender, receiver), sender).allowed);
        assert!(!can_seal(&capsule(CapsuleState::Unfolding, sender, receiver), sender).allowed);
        assert!(!can_seal(&capsule(CapsuleState::Draft, sender, receiver), receiver).allowed);
    }

    #[test]
    fn only_receiver_opens_ready_capsules() {
        let sender = UserId::generate();
        let receiver = UserId::generate();

        assert!(can_open(&capsule(CapsuleState::Ready, sender, receiver), receiver).allowed);

        let v = can_open(&capsule(CapsuleState::Ready, sender, receiver), sender);
        assert_eq!(v.reason, "Only the receiver can open this capsule");

        let v = can_open(&capsule(CapsuleState::Opened, sender, receiver), receiver);
        assert_eq!(v.reason, "Capsule is already opened");

        let v = can_open(&capsule(CapsuleState::Unfolding, sender, receiver), receiver);
        assert!(v.reason.contains("not ready yet"));
    }

    #[test]
    fn sender_always_views() {
        let sender = UserId::generate();
        let receiver = UserId::generate();
        for state in [
            CapsuleState::Draft,
            CapsuleState::Sealed,
            CapsuleState::Unfolding,
            CapsuleState::Ready,
            CapsuleState::Opened,
        ] {
            assert!(can_view(&capsule(state, sender, receiver), sender).allowed);
        }
    }

    #[test]
    fn receiver_views_after_open_or_with_early_view() {
        let sender = UserId::generate();
        let receiver = UserId::generate();

        assert!(can_view(&capsule(CapsuleState::Opened, sender, receiver), receiver).allowed);
        assert!(!can_view(&capsule(CapsuleState::Unfolding, sender, receiver), receiver).allowed);
        assert!(!can_view(&capsule(CapsuleState::Sealed, sender, receiver), receiver).allowed);

        let mut early = capsule(CapsuleState::Unfolding, sender, receiver);
        early.allow_early_view = true;
        assert!(can_view(&early, receiver).allowed);

        early.state = CapsuleState::Ready;
        assert!(can_view(&early, receiver).allowed);

        // Early view never applies before the teaser phase.
        early.state = CapsuleState::Sealed;
        assert!(!can_view(&early, receiver).allowed);
    }

    #[test]
    fn strangers_never_view() {
        let sender = UserId::generate();
        let receiver = UserId::generate();
        let stranger = UserId::generate();
        let v = can_view(&capsule(CapsuleState::Opened, sender, receiver), stranger);
        assert!(!v.allowed);
        assert_eq!(v.reason, "You do not have permission to view this capsule");
    }

    #[test]
    fn self_send_uses_sender_privileges() {
        let me = UserId::generate();
        let c = capsule(CapsuleState::Sealed, me, me);
        assert!(can_view(&c, me).allowed);

        let ready = capsule(CapsuleState::Ready, me, me);
        assert!(can_open(&ready, me).allowed);
    }
}
