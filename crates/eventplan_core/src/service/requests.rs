//! Typed request models for engine operations.
//!
//! Every optional field means "leave unchanged" when `None`.

use crate::model::ids::TermId;
use crate::model::record::Availability;
use std::collections::BTreeMap;

/// Content edit of an event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl EventUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none()
    }
}

/// Decision change carried by a put request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixedChange {
    /// Present-but-empty `fixed`: clear the decision.
    Unfix,
    FixTo(TermId),
}

/// Combined put request: either a decision change or a content edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPut {
    pub title: Option<String>,
    pub description: Option<String>,
    pub fixed: Option<FixedChange>,
}

impl From<EventUpdate> for EventPut {
    fn from(value: EventUpdate) -> Self {
        Self {
            title: value.title,
            description: value.description,
            fixed: None,
        }
    }
}

/// Rename of a term.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermUpdate {
    pub name: Option<String>,
}

impl TermUpdate {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
    }
}

/// Rename and/or availability edit of a participant.
///
/// Availability entries for terms that do not currently exist are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParticipantUpdate {
    pub name: Option<String>,
    pub availability: BTreeMap<TermId, Availability>,
}

impl ParticipantUpdate {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            availability: BTreeMap::new(),
        }
    }

    pub fn with_availability(mut self, term: TermId, value: impl Into<Availability>) -> Self {
        self.availability.insert(term, value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.availability.is_empty()
    }
}

/// Partial edit of a comment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentUpdate {
    pub name: Option<String>,
    pub body: Option<String>,
}

impl CommentUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.body.is_none()
    }
}
