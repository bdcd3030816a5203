use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unix timestamp (seconds, UTC). All temporal decisions in the service are
/// made against this representation; wire formats convert at the boundary.
pub type Timestamp = i64;

macro_rules! id_newtype {
    ($name:ident, $prefix:literal) => {
        /// UUID-backed identifier. Random (v4) at creation, stable for the
        /// lifetime of the row it names.
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn generate() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn as_bytes(&self) -> &[u8; 16] {
                self.0.as_bytes()
            }

            pub fn from_bytes(b: [u8; 16]) -> Self {
                Self(Uuid::from_bytes(b))
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "({})"), &self.0.simple().to_string()[..8])
            }
        }
    };
}

id_newtype!(UserId, "UserId");
id_newtype!(CapsuleId, "CapsuleId");
id_newtype!(DraftId, "DraftId");
id_newtype!(RecipientId, "RecipientId");
id_newtype!(SelfLetterId, "SelfLetterId");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_roundtrips_through_display() {
        let id = CapsuleId::generate();
        let parsed: CapsuleId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn id_roundtrips_through_bytes() {
        let id = UserId::generate();
        assert_eq!(UserId::from_bytes(*id.as_bytes()), id);
    }

    #[test]
    fn debug_is_abbreviated() {
        let id = DraftId::generate();
        let dbg = format!("{:?}", id);
        assert!(dbg.starts_with("DraftId("));
        assert_eq!(dbg.len(), "DraftId(".len() + 8 + 1);
    }
}
