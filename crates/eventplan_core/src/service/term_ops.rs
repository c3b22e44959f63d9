//! Term mutations.
//!
//! Adding a term seeds `absence` for every participant; deleting one drops
//! its column from the matrix.

use crate::model::ids::{EventId, TermId};
use crate::model::view::{shape, EventView};
use crate::repo::event_repo::{EventPatch, EventRepository};
use crate::service::error::{EngineError, EngineResult};
use crate::service::event_service::{ensure_unlocked, reject, EventService};
use crate::service::requests::TermUpdate;

impl<R: EventRepository> EventService<R> {
    /// Adds a candidate term under the next term ID.
    pub fn add_term(&self, id: EventId, name: impl Into<String>) -> EngineResult<EventView> {
        let name = name.into();
        let mut event = self.load(id, "term_add")?;
        ensure_unlocked(&event, "term_add")?;
        if event.terms.id_of(&name).is_some() {
            return Err(reject("term_add", id, EngineError::DuplicatedTerm(name)));
        }

        let term_id = event.terms.allocate(name);
        event.record.seed_term(term_id);

        let patch = EventPatch {
            terms: Some(event.terms),
            record: Some(event.record),
            ..EventPatch::at_revision(event.revision)
        };
        self.write(id, &patch, "term_add")
    }

    /// Renames a term. An empty update is a no-op success.
    pub fn update_term(
        &self,
        id: EventId,
        term_id: TermId,
        update: &TermUpdate,
    ) -> EngineResult<EventView> {
        let mut event = self.load(id, "term_update")?;
        let Some(name) = update.name.as_ref() else {
            return Ok(shape(event));
        };
        ensure_unlocked(&event, "term_update")?;
        if !event.terms.contains(term_id) {
            return Err(reject(
                "term_update",
                id,
                EngineError::TermNotFound {
                    term_id,
                    previously_allocated: event.terms.was_allocated(term_id),
                },
            ));
        }
        if let Some(existing) = event.terms.id_of(name) {
            if existing != term_id {
                return Err(reject(
                    "term_update",
                    id,
                    EngineError::DuplicatedTerm(name.clone()),
                ));
            }
        }

        if let Some(slot) = event.terms.get_mut(term_id) {
            slot.clone_from(name);
        }

        let patch = EventPatch {
            terms: Some(event.terms),
            ..EventPatch::at_revision(event.revision)
        };
        self.write(id, &patch, "term_update")
    }

    /// Deletes a term and its matrix column.
    ///
    /// Deleting an already-deleted term is an idempotent success; an ID that
    /// was never allocated is `TermNotFound`.
    pub fn delete_term(&self, id: EventId, term_id: TermId) -> EngineResult<EventView> {
        let mut event = self.load(id, "term_delete")?;
        ensure_unlocked(&event, "term_delete")?;
        if !event.terms.was_allocated(term_id) {
            return Err(reject(
                "term_delete",
                id,
                EngineError::TermNotFound {
                    term_id,
                    previously_allocated: false,
                },
            ));
        }
        if event.terms.remove(term_id).is_none() {
            return Ok(shape(event));
        }
        event.record.remove_term(term_id);

        let patch = EventPatch {
            terms: Some(event.terms),
            record: Some(event.record),
            ..EventPatch::at_revision(event.revision)
        };
        self.write(id, &patch, "term_delete")
    }
}
