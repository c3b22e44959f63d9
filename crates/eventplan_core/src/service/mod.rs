//! Event aggregate engine.
//!
//! # Responsibility
//! - Turn typed requests into invariant-preserving partial writes.
//! - Keep transport layers decoupled from storage details.
//!
//! Operations are grouped by the collection they mutate; all of them hang
//! off the single `EventService` facade.

mod comment_ops;
pub mod error;
pub mod event_service;
mod participant_ops;
pub mod requests;
mod term_ops;
