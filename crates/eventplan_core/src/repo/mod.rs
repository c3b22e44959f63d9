//! Document store abstraction and persistence implementation.
//!
//! # Responsibility
//! - Define the store contract consumed by the event engine.
//! - Isolate SQLite and JSON encoding details from engine logic.
//!
//! # Invariants
//! - Store APIs return semantic outcomes (`None`, `NotFound`,
//!   `RevisionConflict`) in addition to transport errors.

pub mod event_repo;
