//! Participant mutations.
//!
//! A new participant gets one matrix cell per current term. Availability
//! edits only touch cells of current terms; other term keys are ignored.

use crate::model::ids::{EventId, ParticipantId, TermId};
use crate::model::record::Availability;
use crate::model::view::{shape, EventView};
use crate::repo::event_repo::{EventPatch, EventRepository};
use crate::service::error::{EngineError, EngineResult};
use crate::service::event_service::{ensure_unlocked, reject, EventService};
use crate::service::requests::ParticipantUpdate;
use std::collections::BTreeMap;

impl<R: EventRepository> EventService<R> {
    /// Adds a participant under the next participant ID.
    ///
    /// `availability` pre-fills cells; terms it does not mention default to
    /// `absence`.
    pub fn add_participant(
        &self,
        id: EventId,
        name: impl Into<String>,
        availability: &BTreeMap<TermId, Availability>,
    ) -> EngineResult<EventView> {
        let name = name.into();
        let mut event = self.load(id, "participant_add")?;
        ensure_unlocked(&event, "participant_add")?;
        if event.participants.id_of(&name).is_some() {
            return Err(reject(
                "participant_add",
                id,
                EngineError::DuplicatedParticipant(name),
            ));
        }

        let participant_id = event.participants.allocate(name);
        event
            .record
            .insert_participant(participant_id, event.terms.ids(), availability);

        let patch = EventPatch {
            participants: Some(event.participants),
            record: Some(event.record),
            ..EventPatch::at_revision(event.revision)
        };
        self.write(id, &patch, "participant_add")
    }

    /// Renames a participant and/or edits their availability.
    ///
    /// An empty update short-circuits before the lock and existence checks.
    pub fn update_participant(
        &self,
        id: EventId,
        participant_id: ParticipantId,
        update: &ParticipantUpdate,
    ) -> EngineResult<EventView> {
        let mut event = self.load(id, "participant_update")?;
        if update.is_empty() {
            return Ok(shape(event));
        }
        ensure_unlocked(&event, "participant_update")?;
        if !event.participants.contains(participant_id) {
            return Err(reject(
                "participant_update",
                id,
                EngineError::ParticipantNotFound {
                    participant_id,
                    previously_allocated: event.participants.was_allocated(participant_id),
                },
            ));
        }

        if let Some(name) = update.name.as_ref() {
            if let Some(existing) = event.participants.id_of(name) {
                if existing != participant_id {
                    return Err(reject(
                        "participant_update",
                        id,
                        EngineError::DuplicatedParticipant(name.clone()),
                    ));
                }
            }
            if let Some(slot) = event.participants.get_mut(participant_id) {
                slot.clone_from(name);
            }
        }

        for (term_id, value) in &update.availability {
            if event.terms.contains(*term_id) {
                event
                    .record
                    .set_cell(participant_id, *term_id, value.clone());
            }
        }

        let patch = EventPatch {
            participants: Some(event.participants),
            record: Some(event.record),
            ..EventPatch::at_revision(event.revision)
        };
        self.write(id, &patch, "participant_update")
    }

    /// Deletes a participant and their matrix row.
    ///
    /// Same range and idempotence policy as `delete_term`.
    pub fn delete_participant(
        &self,
        id: EventId,
        participant_id: ParticipantId,
    ) -> EngineResult<EventView> {
        let mut event = self.load(id, "participant_delete")?;
        ensure_unlocked(&event, "participant_delete")?;
        if !event.participants.was_allocated(participant_id) {
            return Err(reject(
                "participant_delete",
                id,
                EngineError::ParticipantNotFound {
                    participant_id,
                    previously_allocated: false,
                },
            ));
        }
        if event.participants.remove(participant_id).is_none() {
            return Ok(shape(event));
        }
        event.record.remove_participant(participant_id);

        let patch = EventPatch {
            participants: Some(event.participants),
            record: Some(event.record),
            ..EventPatch::at_revision(event.revision)
        };
        self.write(id, &patch, "participant_delete")
    }
}
