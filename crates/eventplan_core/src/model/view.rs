//! Caller-facing event projection.
//!
//! Shaping strips allocation cursors and the store revision, and leaves only
//! the entry maps of each collection. Matrix rows without any cell (a
//! participant added before any term exists) are not rendered.

use super::event::{Comment, EventDocument};
use super::ids::{CommentId, EventId, ParticipantId, TermId};
use super::record::AvailabilityRow;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Shaped event as returned by every engine operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventView {
    pub id: EventId,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed: Option<TermId>,
    pub terms: BTreeMap<TermId, String>,
    pub participants: BTreeMap<ParticipantId, String>,
    pub record: BTreeMap<ParticipantId, AvailabilityRow>,
    pub comments: BTreeMap<CommentId, Comment>,
}

impl From<EventDocument> for EventView {
    fn from(document: EventDocument) -> Self {
        let record = document
            .record
            .into_rows()
            .into_iter()
            .filter(|(_, row)| !row.is_empty())
            .collect();

        Self {
            id: document.id,
            title: document.title,
            description: document.description,
            fixed: document.fixed,
            terms: document.terms.into_entries(),
            participants: document.participants.into_entries(),
            record,
            comments: document.comments.into_entries(),
        }
    }
}

/// Shapes a stored document for callers.
pub fn shape(document: EventDocument) -> EventView {
    EventView::from(document)
}
