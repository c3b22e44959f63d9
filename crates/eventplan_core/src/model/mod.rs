//! Domain model for scheduling events.
//!
//! # Responsibility
//! - Define the event aggregate and its four nested collections.
//! - Provide the caller-facing shaped projection.
//!
//! # Invariants
//! - Every nested collection allocates IDs monotonically and never reuses them.
//! - Allocation cursors never leave the core through `EventView`.

pub mod collection;
pub mod event;
pub mod ids;
pub mod record;
pub mod view;
