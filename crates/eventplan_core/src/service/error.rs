//! Engine error taxonomy.
//!
//! # Responsibility
//! - Name every distinguishable failure of an engine operation.
//! - Expose a stable kind and wire name per failure for transport layers.
//!
//! # Invariants
//! - The set of `ErrorKind`s is closed; transports map kinds, never messages.
//! - A failed operation has not modified the stored document, except for a
//!   `StorageFault::MissingAfterWrite`, which is reported after the write.

use crate::form::FormError;
use crate::model::ids::{CommentId, EventId, ParticipantId, TermId};
use crate::repo::event_repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type EngineResult<T> = Result<T, EngineError>;

/// Server-side failure below the engine.
#[derive(Debug)]
pub enum StorageFault {
    /// Store returned no document where a write should have produced one.
    MissingAfterWrite(EventId),
    Repo(RepoError),
}

impl Display for StorageFault {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingAfterWrite(id) => {
                write!(f, "event {id} missing from store after write")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

/// Failure of one engine operation.
#[derive(Debug)]
pub enum EngineError {
    /// Conflicting or malformed caller intent.
    InvalidParameter(String),
    /// Mutation attempted while the event is fixed.
    FixedEvent(EventId),
    DuplicatedTerm(String),
    DuplicatedParticipant(String),
    TermNotFound {
        term_id: TermId,
        /// `true` when the ID was handed out once and has since been removed.
        previously_allocated: bool,
    },
    ParticipantNotFound {
        participant_id: ParticipantId,
        previously_allocated: bool,
    },
    CommentNotFound {
        comment_id: CommentId,
        previously_allocated: bool,
    },
    EventNotFound {
        event_id: EventId,
        /// `true` when the event existed and was deleted.
        deleted: bool,
    },
    Storage(StorageFault),
}

/// Distinguishable error kinds, one per external status mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidParameter,
    FixedEvent,
    DuplicatedTerm,
    DuplicatedParticipant,
    TermNotFound,
    ParticipantNotFound,
    CommentNotFound,
    NotFound,
    ServerSide,
}

impl ErrorKind {
    /// Stable wire name used in error payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidParameter => "InvalidParameterError",
            Self::FixedEvent => "FixedEventError",
            Self::DuplicatedTerm => "DuplicatedTermError",
            Self::DuplicatedParticipant => "DuplicatedParticipantError",
            Self::TermNotFound => "TermNotFoundError",
            Self::ParticipantNotFound => "ParticipantNotFoundError",
            Self::CommentNotFound => "CommentNotFoundError",
            Self::NotFound => "NotFoundError",
            Self::ServerSide => "ServerSideError",
        }
    }

    /// HTTP-style status for this kind; `gone` selects 410 for not-found kinds.
    pub fn status_code(self, gone: bool) -> u16 {
        match self {
            Self::InvalidParameter => 400,
            Self::FixedEvent | Self::DuplicatedTerm | Self::DuplicatedParticipant => 409,
            Self::TermNotFound
            | Self::ParticipantNotFound
            | Self::CommentNotFound
            | Self::NotFound => {
                if gone {
                    410
                } else {
                    404
                }
            }
            Self::ServerSide => 500,
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidParameter(_) => ErrorKind::InvalidParameter,
            Self::FixedEvent(_) => ErrorKind::FixedEvent,
            Self::DuplicatedTerm(_) => ErrorKind::DuplicatedTerm,
            Self::DuplicatedParticipant(_) => ErrorKind::DuplicatedParticipant,
            Self::TermNotFound { .. } => ErrorKind::TermNotFound,
            Self::ParticipantNotFound { .. } => ErrorKind::ParticipantNotFound,
            Self::CommentNotFound { .. } => ErrorKind::CommentNotFound,
            Self::EventNotFound { .. } => ErrorKind::NotFound,
            Self::Storage(_) => ErrorKind::ServerSide,
        }
    }

    /// Whether the missing target existed at some point (410 rather than 404).
    pub fn is_gone(&self) -> bool {
        match self {
            Self::TermNotFound {
                previously_allocated,
                ..
            }
            | Self::ParticipantNotFound {
                previously_allocated,
                ..
            }
            | Self::CommentNotFound {
                previously_allocated,
                ..
            } => *previously_allocated,
            Self::EventNotFound { deleted, .. } => *deleted,
            _ => false,
        }
    }

    pub fn status_code(&self) -> u16 {
        self.kind().status_code(self.is_gone())
    }
}

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidParameter(message) => write!(f, "invalid parameter: {message}"),
            Self::FixedEvent(id) => write!(f, "event {id} is fixed"),
            Self::DuplicatedTerm(name) => write!(f, "term already exists: `{name}`"),
            Self::DuplicatedParticipant(name) => {
                write!(f, "participant already exists: `{name}`")
            }
            Self::TermNotFound { term_id, .. } => write!(f, "term not found: {term_id}"),
            Self::ParticipantNotFound { participant_id, .. } => {
                write!(f, "participant not found: {participant_id}")
            }
            Self::CommentNotFound { comment_id, .. } => {
                write!(f, "comment not found: {comment_id}")
            }
            Self::EventNotFound { event_id, .. } => write!(f, "event not found: {event_id}"),
            Self::Storage(fault) => write!(f, "storage failure: {fault}"),
        }
    }
}

impl Error for EngineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(StorageFault::Repo(err)) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for EngineError {
    fn from(value: RepoError) -> Self {
        Self::Storage(StorageFault::Repo(value))
    }
}

impl From<FormError> for EngineError {
    fn from(value: FormError) -> Self {
        Self::InvalidParameter(value.to_string())
    }
}
