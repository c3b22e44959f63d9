//! Event aggregate engine.
//!
//! # Responsibility
//! - Expose one operation per event mutation kind.
//! - Evaluate aggregate invariants and cascades between read and write.
//! - Shape every returned document for callers.
//!
//! # Invariants
//! - Every check runs before any write; a rejected operation writes nothing.
//! - All sub-trees touched by one operation go out in one partial write.
//! - Writes carry the revision they were computed from, so a concurrent
//!   writer on the same event is detected instead of silently clobbered.
//! - While `fixed` is set only comments and the decision itself may change.

use crate::model::event::EventDocument;
use crate::model::ids::{EventId, TermId};
use crate::model::view::{shape, EventView};
use crate::repo::event_repo::{EventField, EventPatch, EventRepository, RepoError};
use crate::service::error::{EngineError, EngineResult, StorageFault};
use crate::service::requests::{EventPut, EventUpdate, FixedChange};
use log::{debug, error, info};

/// Engine facade over a document store.
pub struct EventService<R: EventRepository> {
    repo: R,
}

impl<R: EventRepository> EventService<R> {
    /// Creates an engine using the provided store implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Read access to the underlying store.
    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Creates an empty, undecided event.
    pub fn create(
        &self,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> EngineResult<EventView> {
        let (title, description) = (title.into(), description.into());
        let created = self
            .repo
            .create_event(title.as_str(), description.as_str())
            .map_err(|err| storage_failure("event_create", None, err))?;
        info!(
            "event=event_create module=service status=ok event_id={}",
            created.id
        );
        Ok(shape(created))
    }

    /// Returns the shaped current document.
    pub fn get(&self, id: EventId) -> EngineResult<EventView> {
        self.load(id, "event_get").map(shape)
    }

    /// Applies a title/description edit.
    ///
    /// An empty edit is a successful no-op, even on a fixed event.
    pub fn update(&self, id: EventId, update: &EventUpdate) -> EngineResult<EventView> {
        let event = self.load(id, "event_update")?;
        if update.is_empty() {
            return Ok(shape(event));
        }
        ensure_unlocked(&event, "event_update")?;

        let patch = EventPatch {
            title: update.title.clone(),
            description: update.description.clone(),
            ..EventPatch::at_revision(event.revision)
        };
        self.write(id, &patch, "event_update")
    }

    /// Dispatches a combined request to `fix`, `unfix` or `update`.
    ///
    /// # Errors
    /// - `InvalidParameter` when a decision change is mixed with a content edit.
    pub fn put(&self, id: EventId, request: &EventPut) -> EngineResult<EventView> {
        match request.fixed {
            Some(_) if request.title.is_some() || request.description.is_some() => {
                Err(reject(
                    "event_put",
                    id,
                    EngineError::InvalidParameter(
                        "`fixed` cannot be combined with `title` or `description`".to_string(),
                    ),
                ))
            }
            Some(FixedChange::Unfix) => self.unfix(id),
            Some(FixedChange::FixTo(term_id)) => self.fix(id, term_id),
            None => self.update(
                id,
                &EventUpdate {
                    title: request.title.clone(),
                    description: request.description.clone(),
                },
            ),
        }
    }

    /// Settles the event on `term_id`.
    pub fn fix(&self, id: EventId, term_id: TermId) -> EngineResult<EventView> {
        let event = self.load(id, "event_fix")?;
        ensure_unlocked(&event, "event_fix")?;
        if !event.terms.contains(term_id) {
            return Err(reject(
                "event_fix",
                id,
                EngineError::TermNotFound {
                    term_id,
                    previously_allocated: event.terms.was_allocated(term_id),
                },
            ));
        }

        let patch = EventPatch {
            fixed: Some(term_id),
            ..EventPatch::at_revision(event.revision)
        };
        self.write(id, &patch, "event_fix")
    }

    /// Clears the decision. Always permitted and idempotent.
    pub fn unfix(&self, id: EventId) -> EngineResult<EventView> {
        match self.repo.unset_event(id, EventField::Fixed) {
            Ok(Some(event)) => {
                info!("event=event_unfix module=service status=ok event_id={id}");
                Ok(shape(event))
            }
            Ok(None) => Err(self.missing_event(id, "event_unfix")),
            Err(err) => Err(storage_failure("event_unfix", Some(id), err)),
        }
    }

    /// Deletes the whole event document.
    pub fn delete(&self, id: EventId) -> EngineResult<()> {
        match self.repo.delete_event(id) {
            Ok(()) => {
                info!("event=event_delete module=service status=ok event_id={id}");
                Ok(())
            }
            Err(RepoError::NotFound(_)) => Err(self.missing_event(id, "event_delete")),
            Err(err) => Err(storage_failure("event_delete", Some(id), err)),
        }
    }

    /// Reads the current document or reports the event as missing.
    pub(crate) fn load(&self, id: EventId, op: &'static str) -> EngineResult<EventDocument> {
        match self.repo.read_event(id) {
            Ok(Some(event)) => Ok(event),
            Ok(None) => Err(self.missing_event(id, op)),
            Err(err) => Err(storage_failure(op, Some(id), err)),
        }
    }

    /// Issues one partial write and shapes the post-write document.
    pub(crate) fn write(
        &self,
        id: EventId,
        patch: &EventPatch,
        op: &'static str,
    ) -> EngineResult<EventView> {
        match self.repo.set_event(id, patch) {
            Ok(Some(event)) => {
                info!(
                    "event={op} module=service status=ok event_id={id} revision={}",
                    event.revision
                );
                Ok(shape(event))
            }
            Ok(None) => {
                error!(
                    "event={op} module=service status=error event_id={id} error_code=missing_after_write"
                );
                Err(EngineError::Storage(StorageFault::MissingAfterWrite(id)))
            }
            Err(err) => Err(storage_failure(op, Some(id), err)),
        }
    }

    fn missing_event(&self, id: EventId, op: &'static str) -> EngineError {
        let last = match self.repo.last_event_id() {
            Ok(last) => last,
            Err(err) => return storage_failure(op, Some(id), err),
        };
        let deleted = id.get() >= 1 && id.get() <= last;
        reject(
            op,
            id,
            EngineError::EventNotFound {
                event_id: id,
                deleted,
            },
        )
    }
}

/// Rejects mutations of a fixed event.
pub(crate) fn ensure_unlocked(event: &EventDocument, op: &'static str) -> EngineResult<()> {
    if event.is_fixed() {
        return Err(reject(op, event.id, EngineError::FixedEvent(event.id)));
    }
    Ok(())
}

/// Logs a domain rejection and hands the error back.
pub(crate) fn reject(op: &'static str, id: EventId, err: EngineError) -> EngineError {
    debug!(
        "event={op} module=service status=rejected event_id={id} error_code={}",
        err.kind()
    );
    err
}

fn storage_failure(op: &'static str, id: Option<EventId>, err: RepoError) -> EngineError {
    match id {
        Some(id) => error!(
            "event={op} module=service status=error event_id={id} error_code=storage error={err}"
        ),
        None => error!("event={op} module=service status=error error_code=storage error={err}"),
    }
    EngineError::from(err)
}
