//! Comment mutations. Comments stay editable while the event is fixed.

use crate::model::event::Comment;
use crate::model::ids::{CommentId, EventId};
use crate::model::view::{shape, EventView};
use crate::repo::event_repo::{EventPatch, EventRepository};
use crate::service::error::{EngineError, EngineResult};
use crate::service::event_service::{reject, EventService};
use crate::service::requests::CommentUpdate;

impl<R: EventRepository> EventService<R> {
    /// Appends a comment under the next comment ID.
    pub fn add_comment(
        &self,
        id: EventId,
        name: impl Into<String>,
        body: impl Into<String>,
    ) -> EngineResult<EventView> {
        let mut event = self.load(id, "comment_add")?;
        event.comments.allocate(Comment::new(name, body));

        let patch = EventPatch {
            comments: Some(event.comments),
            ..EventPatch::at_revision(event.revision)
        };
        self.write(id, &patch, "comment_add")
    }

    /// Applies the supplied comment fields. An empty update is a no-op success.
    pub fn update_comment(
        &self,
        id: EventId,
        comment_id: CommentId,
        update: &CommentUpdate,
    ) -> EngineResult<EventView> {
        let mut event = self.load(id, "comment_update")?;
        if update.is_empty() {
            return Ok(shape(event));
        }
        let previously_allocated = event.comments.was_allocated(comment_id);
        let Some(comment) = event.comments.get_mut(comment_id) else {
            return Err(reject(
                "comment_update",
                id,
                EngineError::CommentNotFound {
                    comment_id,
                    previously_allocated,
                },
            ));
        };

        if let Some(name) = update.name.as_ref() {
            comment.name.clone_from(name);
        }
        if let Some(body) = update.body.as_ref() {
            comment.body.clone_from(body);
        }

        let patch = EventPatch {
            comments: Some(event.comments),
            ..EventPatch::at_revision(event.revision)
        };
        self.write(id, &patch, "comment_update")
    }

    /// Deletes a comment; already-deleted IDs succeed without a write.
    pub fn delete_comment(&self, id: EventId, comment_id: CommentId) -> EngineResult<EventView> {
        let mut event = self.load(id, "comment_delete")?;
        if !event.comments.was_allocated(comment_id) {
            return Err(reject(
                "comment_delete",
                id,
                EngineError::CommentNotFound {
                    comment_id,
                    previously_allocated: false,
                },
            ));
        }
        if event.comments.remove(comment_id).is_none() {
            return Ok(shape(event));
        }

        let patch = EventPatch {
            comments: Some(event.comments),
            ..EventPatch::at_revision(event.revision)
        };
        self.write(id, &patch, "comment_delete")
    }
}
