//! Parameter definitions: which keys are accepted, how often, and how each
//! value is sanitized and validated.

use super::validators::{Sanitizer, Validator};
use regex::Regex;
use std::fmt::{Display, Formatter};

/// How a definition selects parameter keys.
#[derive(Debug, Clone)]
pub enum KeyPattern {
    Exact(String),
    Regex(Regex),
}

impl KeyPattern {
    pub fn matches(&self, key: &str) -> bool {
        match self {
            Self::Exact(expected) => expected == key,
            Self::Regex(re) => re.is_match(key),
        }
    }
}

impl Display for KeyPattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact(key) => f.write_str(key),
            Self::Regex(re) => write!(f, "/{}/", re.as_str()),
        }
    }
}

/// How many parameters a definition must match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occurrence {
    /// Exactly once.
    Required,
    /// At most once.
    Optional,
    /// `n` or more times; meant for pattern keys.
    AtLeast(usize),
}

impl Occurrence {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Self::Required => count == 1,
            Self::Optional => count <= 1,
            Self::AtLeast(min) => count >= min,
        }
    }
}

impl Display for Occurrence {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Required => f.write_str("exactly once"),
            Self::Optional => f.write_str("at most once"),
            Self::AtLeast(min) => write!(f, "at least {min} times"),
        }
    }
}

/// One accepted parameter family.
pub struct FieldDef {
    pub(crate) key: KeyPattern,
    pub(crate) occurrence: Occurrence,
    pub(crate) sanitizer: Option<Sanitizer>,
    pub(crate) validators: Vec<Validator>,
}

impl FieldDef {
    /// Accepts exactly the key `key`.
    pub fn exact(key: impl Into<String>, occurrence: Occurrence) -> Self {
        Self::new(KeyPattern::Exact(key.into()), occurrence)
    }

    /// Accepts every key matching `pattern`.
    pub fn pattern(pattern: Regex, occurrence: Occurrence) -> Self {
        Self::new(KeyPattern::Regex(pattern), occurrence)
    }

    fn new(key: KeyPattern, occurrence: Occurrence) -> Self {
        Self {
            key,
            occurrence,
            sanitizer: None,
            validators: Vec::new(),
        }
    }

    /// Runs `sanitizer` on the value before any validator.
    pub fn sanitize(mut self, sanitizer: Sanitizer) -> Self {
        self.sanitizer = Some(sanitizer);
        self
    }

    /// Appends a validator; validators run in insertion order.
    pub fn validate(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn key(&self) -> &KeyPattern {
        &self.key
    }

    pub fn occurrence(&self) -> Occurrence {
        self.occurrence
    }
}
