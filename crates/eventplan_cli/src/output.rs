//! Output formatting helpers.

use anyhow::Result;
use eventplan_core::EngineError;
use serde::Serialize;
use serde_json::json;

use crate::commands::Outcome;

pub fn print_outcome(outcome: &Outcome) -> Result<()> {
    match outcome {
        Outcome::Event(view) => print_json(view),
        Outcome::Deleted(id) => print_json(&json!({ "deleted": id })),
        Outcome::Pong => print_json(&json!({
            "ping": eventplan_core::ping(),
            "version": eventplan_core::core_version(),
        })),
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Engine failure anywhere in the error chain, if any.
pub fn engine_error(err: &anyhow::Error) -> Option<&EngineError> {
    err.chain().find_map(|cause| cause.downcast_ref::<EngineError>())
}

/// Prints the stable error payload: wire kind plus status code.
pub fn print_engine_error(err: &EngineError) -> Result<()> {
    print_json(&json!({
        "error": err.kind().as_str(),
        "status": err.status_code(),
    }))
}
