//! Event aggregate document.
//!
//! # Responsibility
//! - Define the stored shape of one scheduling event.
//! - Check cross-collection consistency of persisted documents.
//!
//! # Invariants
//! - `record` has exactly one row per current participant and, inside each
//!   row, exactly one cell per current term.
//! - `fixed`, when set, names a current term.
//! - Term names are unique; participant names are unique.

use super::collection::Collection;
use super::ids::{CommentId, EventId, ParticipantId, SequentialId, TermId};
use super::record::AvailabilityRecord;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Free-text note attached to an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub name: String,
    pub body: String,
}

impl Comment {
    pub fn new(name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            body: body.into(),
        }
    }
}

/// Stored event aggregate, including allocation cursors and revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDocument {
    pub id: EventId,
    pub title: String,
    pub description: String,
    /// Settled term. `Some` locks terms, participants, title and description.
    pub fixed: Option<TermId>,
    pub terms: Collection<TermId, String>,
    pub participants: Collection<ParticipantId, String>,
    pub record: AvailabilityRecord,
    pub comments: Collection<CommentId, Comment>,
    /// Store-owned write counter, bumped on every successful write.
    pub revision: u64,
}

impl EventDocument {
    /// Builds a fresh, undecided event with empty collections.
    pub fn empty(id: EventId, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: description.into(),
            fixed: None,
            terms: Collection::new(),
            participants: Collection::new(),
            record: AvailabilityRecord::new(),
            comments: Collection::new(),
            revision: 0,
        }
    }

    pub fn is_fixed(&self) -> bool {
        self.fixed.is_some()
    }

    /// Validates cross-collection invariants.
    ///
    /// Used on store read paths so corrupted documents surface as errors
    /// instead of leaking into engine logic.
    pub fn validate(&self) -> Result<(), DocumentValidationError> {
        check_cursor("terms", &self.terms)?;
        check_cursor("participants", &self.participants)?;
        check_cursor("comments", &self.comments)?;

        if let Some(term) = self.fixed {
            if !self.terms.contains(term) {
                return Err(DocumentValidationError::FixedTermMissing(term));
            }
        }

        if let Some(duplicate) = first_duplicate(self.terms.entries().values()) {
            return Err(DocumentValidationError::DuplicatedTermName(duplicate));
        }
        if let Some(duplicate) = first_duplicate(self.participants.entries().values()) {
            return Err(DocumentValidationError::DuplicatedParticipantName(
                duplicate,
            ));
        }

        for participant in self.record.participants() {
            if !self.participants.contains(participant) {
                return Err(DocumentValidationError::OrphanedRow(participant));
            }
        }

        for participant in self.participants.ids() {
            let row = self
                .record
                .row(participant)
                .ok_or(DocumentValidationError::MissingRow(participant))?;
            for term in row.keys() {
                if !self.terms.contains(*term) {
                    return Err(DocumentValidationError::OrphanedCell {
                        participant,
                        term: *term,
                    });
                }
            }
            for term in self.terms.ids() {
                if !row.contains_key(&term) {
                    return Err(DocumentValidationError::MissingCell { participant, term });
                }
            }
        }

        Ok(())
    }
}

fn check_cursor<K: SequentialId, V>(
    name: &'static str,
    collection: &Collection<K, V>,
) -> Result<(), DocumentValidationError> {
    let highest = collection
        .entries()
        .keys()
        .next_back()
        .map_or(0, |id| id.seq());
    if highest > collection.counter() {
        return Err(DocumentValidationError::CounterBehindEntries(name));
    }
    Ok(())
}

fn first_duplicate<'a>(names: impl Iterator<Item = &'a String>) -> Option<String> {
    let mut seen = std::collections::HashSet::new();
    for name in names {
        if !seen.insert(name.as_str()) {
            return Some(name.clone());
        }
    }
    None
}

/// Consistency violation found in a persisted event document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentValidationError {
    /// A collection holds an ID above its allocation cursor.
    CounterBehindEntries(&'static str),
    FixedTermMissing(TermId),
    DuplicatedTermName(String),
    DuplicatedParticipantName(String),
    /// Participant exists but has no matrix row.
    MissingRow(ParticipantId),
    /// Matrix row for a participant that no longer exists.
    OrphanedRow(ParticipantId),
    MissingCell {
        participant: ParticipantId,
        term: TermId,
    },
    OrphanedCell {
        participant: ParticipantId,
        term: TermId,
    },
}

impl Display for DocumentValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CounterBehindEntries(name) => {
                write!(f, "{name} holds an id above its allocation counter")
            }
            Self::FixedTermMissing(term) => write!(f, "fixed term {term} is not a current term"),
            Self::DuplicatedTermName(_) => write!(f, "term names are not unique"),
            Self::DuplicatedParticipantName(_) => write!(f, "participant names are not unique"),
            Self::MissingRow(participant) => {
                write!(f, "participant {participant} has no availability row")
            }
            Self::OrphanedRow(participant) => {
                write!(f, "availability row for unknown participant {participant}")
            }
            Self::MissingCell { participant, term } => write!(
                f,
                "participant {participant} has no availability for term {term}"
            ),
            Self::OrphanedCell { participant, term } => write!(
                f,
                "participant {participant} has availability for unknown term {term}"
            ),
        }
    }
}

impl Error for DocumentValidationError {}
