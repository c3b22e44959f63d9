//! Core engine for event scheduling aggregates.
//! This crate is the single source of truth for aggregate invariants.

pub mod config;
pub mod db;
pub mod form;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig, DatabaseConfig, LoggingConfig};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use form::{FormError, Params};
pub use logging::{default_log_level, init_from_config, init_logging, logging_status, LogSink};
pub use model::event::{Comment, DocumentValidationError, EventDocument};
pub use model::ids::{CommentId, EventId, ParticipantId, TermId};
pub use model::record::{Availability, AvailabilityRecord};
pub use model::view::EventView;
pub use repo::event_repo::{
    EventField, EventPatch, EventRepository, RepoError, RepoResult, SqliteEventRepository,
};
pub use service::error::{EngineError, EngineResult, ErrorKind, StorageFault};
pub use service::event_service::EventService;
pub use service::requests::{
    CommentUpdate, EventPut, EventUpdate, FixedChange, ParticipantUpdate, TermUpdate,
};

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
