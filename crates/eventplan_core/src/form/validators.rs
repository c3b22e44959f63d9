//! Value sanitizers and validators.
//!
//! Constructors taking bounds reject nonsensical definitions up front instead
//! of producing validators that can never pass.

use super::FormError;
use regex::Regex;
use std::fmt::{Debug, Formatter};

/// Value rewrite applied before validation.
pub type Sanitizer = fn(&str) -> String;

/// Trims surrounding whitespace.
pub fn strip(value: &str) -> String {
    value.trim().to_string()
}

/// Named predicate over a sanitized value.
pub struct Validator {
    name: &'static str,
    check: Box<dyn Fn(&str) -> bool + Send + Sync>,
}

impl Validator {
    pub fn new(name: &'static str, check: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        Self {
            name,
            check: Box::new(check),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn accepts(&self, value: &str) -> bool {
        (self.check)(value)
    }
}

impl Debug for Validator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator").field("name", &self.name).finish()
    }
}

/// Fails for empty or whitespace-only values.
pub fn not_whitespace() -> Validator {
    Validator::new("not_whitespace", |value| {
        value.chars().any(|ch| !ch.is_whitespace())
    })
}

/// Fails when the value contains `\r` or `\n`.
pub fn one_line() -> Validator {
    Validator::new("one_line", |value| !value.contains(['\r', '\n']))
}

/// Bounds the value length in characters, inclusive.
pub fn length(min: usize, max: usize) -> Result<Validator, FormError> {
    if min > max {
        return Err(FormError::InvalidDefinition(format!(
            "length bounds reversed: {min} > {max}"
        )));
    }
    Ok(Validator::new("length", move |value| {
        let count = value.chars().count();
        count >= min && count <= max
    }))
}

/// Accepts only the listed values.
pub fn one_of(values: &[&str]) -> Result<Validator, FormError> {
    if values.is_empty() {
        return Err(FormError::InvalidDefinition(
            "one_of requires at least one value".to_string(),
        ));
    }
    let allowed: Vec<String> = values.iter().map(|value| value.to_string()).collect();
    Ok(Validator::new("one_of", move |value| {
        allowed.iter().any(|candidate| candidate == value)
    }))
}

/// Accepts base-10 integers (optionally signed).
pub fn integer() -> Validator {
    Validator::new("integer", |value| value.parse::<i64>().is_ok())
}

/// Accepts integers in `[min, max]`.
pub fn range(min: i64, max: i64) -> Result<Validator, FormError> {
    if min > max {
        return Err(FormError::InvalidDefinition(format!(
            "range bounds reversed: {min} > {max}"
        )));
    }
    Ok(Validator::new("range", move |value| {
        value
            .parse::<i64>()
            .map(|number| number >= min && number <= max)
            .unwrap_or(false)
    }))
}

/// Accepts values fully matching `re`.
pub fn matches(name: &'static str, re: Regex) -> Validator {
    Validator::new(name, move |value| re.is_match(value))
}
