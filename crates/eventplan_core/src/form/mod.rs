//! Raw parameter validation.
//!
//! # Responsibility
//! - Turn a raw `key -> string` parameter map into a sanitized one.
//! - Convert sanitized maps into typed engine requests (`rules`).
//!
//! # Invariants
//! - Every parameter matches exactly one definition.
//! - Sanitizers run before validators; the output holds sanitized values.
//! - Engine operations never see unchecked caller input.

mod def;
pub mod rules;
pub mod validators;

pub use def::{FieldDef, KeyPattern, Occurrence};

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Raw caller parameters.
pub type Params = BTreeMap<String, String>;

/// Caller-input error raised before any engine operation runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    /// Parameter key matches no definition.
    UnknownParameter(String),
    /// Parameter key matches more than one definition.
    AmbiguousParameter(String),
    /// A definition matched the wrong number of parameters.
    Occurrence {
        key: String,
        expected: Occurrence,
        actual: usize,
    },
    /// A validator rejected the sanitized value.
    Invalid { key: String, rule: &'static str },
    /// The rule set itself is malformed.
    InvalidDefinition(String),
}

impl Display for FormError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownParameter(key) => write!(f, "unknown parameter `{key}`"),
            Self::AmbiguousParameter(key) => {
                write!(f, "parameter `{key}` matches several definitions")
            }
            Self::Occurrence {
                key,
                expected,
                actual,
            } => write!(
                f,
                "parameter `{key}` expected {expected}, got {actual}"
            ),
            Self::Invalid { key, rule } => write!(f, "parameter `{key}` failed `{rule}`"),
            Self::InvalidDefinition(message) => write!(f, "invalid form definition: {message}"),
        }
    }
}

impl Error for FormError {}

/// Checks `params` against `defs` and returns the sanitized map.
///
/// # Errors
/// - `UnknownParameter` / `AmbiguousParameter` for keys matching zero or
///   several definitions.
/// - `Invalid` when a validator rejects a sanitized value.
/// - `Occurrence` when a definition's match count is out of bounds.
pub fn check(params: &Params, defs: &[FieldDef]) -> Result<Params, FormError> {
    let mut counts = vec![0usize; defs.len()];
    let mut sanitized = Params::new();

    for (key, raw) in params {
        let mut matching = defs
            .iter()
            .enumerate()
            .filter(|(_, def)| def.key.matches(key));
        let (index, def) = match (matching.next(), matching.next()) {
            (None, _) => return Err(FormError::UnknownParameter(key.clone())),
            (Some(found), None) => found,
            (Some(_), Some(_)) => return Err(FormError::AmbiguousParameter(key.clone())),
        };
        counts[index] += 1;

        let value = match def.sanitizer {
            Some(sanitizer) => sanitizer(raw),
            None => raw.clone(),
        };
        if let Some(failed) = def
            .validators
            .iter()
            .find(|validator| !validator.accepts(&value))
        {
            return Err(FormError::Invalid {
                key: key.clone(),
                rule: failed.name(),
            });
        }
        sanitized.insert(key.clone(), value);
    }

    for (def, actual) in defs.iter().zip(counts) {
        if !def.occurrence.accepts(actual) {
            return Err(FormError::Occurrence {
                key: def.key.to_string(),
                expected: def.occurrence,
                actual,
            });
        }
    }

    Ok(sanitized)
}
