//! Typed identifiers for events and their nested collections.
//!
//! # Responsibility
//! - Give every collection its own opaque integer ID type.
//! - Keep sequence-number conversion in one place.
//!
//! # Invariants
//! - Sub-entity IDs start at `1`; `0` is never allocated.
//! - A term ID can never be passed where a participant ID is expected.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// ID types allocated from a per-collection sequence.
pub trait SequentialId: Copy + Ord {
    /// Builds an ID from its raw sequence number.
    fn from_seq(seq: u64) -> Self;
    /// Returns the raw sequence number.
    fn seq(self) -> u64;
}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Wraps a raw integer ID.
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            /// Returns the raw integer ID.
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl SequentialId for $name {
            fn from_seq(seq: u64) -> Self {
                Self(seq)
            }

            fn seq(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Document ID of one event, assigned by the store's event sequence.
    EventId
);
define_id!(
    /// Candidate time slot ID, unique within one event.
    TermId
);
define_id!(
    /// Invitee ID, unique within one event.
    ParticipantId
);
define_id!(
    /// Comment ID, unique within one event.
    CommentId
);

#[cfg(test)]
mod tests {
    use super::{ParticipantId, SequentialId, TermId};

    #[test]
    fn ids_serialize_as_bare_integers() {
        let json = serde_json::to_string(&TermId::new(7)).unwrap();
        assert_eq!(json, "7");
    }

    #[test]
    fn ids_round_trip_through_json_map_keys() {
        let mut map = std::collections::BTreeMap::new();
        map.insert(ParticipantId::new(2), "bob".to_string());
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"2":"bob"}"#);

        let parsed: std::collections::BTreeMap<ParticipantId, String> =
            serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, map);
    }

    #[test]
    fn sequence_conversion_is_identity() {
        assert_eq!(TermId::from_seq(3).seq(), 3);
        assert_eq!(TermId::from(3).get(), 3);
    }
}
