//! Per-operation parameter rules and typed request conversion.
//!
//! Names are stripped, non-blank, single-line and at most 255 characters.
//! Descriptions and comment bodies may span lines, up to 8192 characters.
//! Availability parameters are keyed by term ID (`"1" => "attendance"`).

use super::validators::{length, matches, not_whitespace, one_line, strip};
use super::{check, FieldDef, FormError, Occurrence, Params};
use crate::model::ids::TermId;
use crate::model::record::Availability;
use crate::service::requests::{
    CommentUpdate, EventPut, FixedChange, ParticipantUpdate, TermUpdate,
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

pub const NAME_MAX_CHARS: usize = 255;
pub const TEXT_MAX_CHARS: usize = 8192;
pub const AVAILABILITY_MAX_CHARS: usize = 64;

static TERM_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+$").expect("valid term key regex"));
static FIXED_VALUE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[1-9]\d*)?$").expect("valid fixed value regex"));

/// Sanitized `(title, description)` for event creation.
pub fn parse_event_create(params: &Params) -> Result<(String, String), FormError> {
    let checked = check(
        params,
        &[
            name_field("title", Occurrence::Required)?,
            text_field("description", Occurrence::Optional)?,
        ],
    )?;
    let title = required(&checked, "title")?;
    let description = checked.get("description").cloned().unwrap_or_default();
    Ok((title, description))
}

/// Combined event edit; `fixed=""` means unfix.
pub fn parse_event_put(params: &Params) -> Result<EventPut, FormError> {
    let checked = check(
        params,
        &[
            name_field("title", Occurrence::Optional)?,
            text_field("description", Occurrence::Optional)?,
            FieldDef::exact("fixed", Occurrence::Optional)
                .sanitize(strip)
                .validate(matches("term_id_or_empty", FIXED_VALUE_RE.clone())),
        ],
    )?;

    let fixed = match checked.get("fixed") {
        None => None,
        Some(value) if value.is_empty() => Some(FixedChange::Unfix),
        Some(value) => Some(FixedChange::FixTo(parse_term_id("fixed", value)?)),
    };

    Ok(EventPut {
        title: checked.get("title").cloned(),
        description: checked.get("description").cloned(),
        fixed,
    })
}

/// Term name for `add_term`.
pub fn parse_term_add(params: &Params) -> Result<String, FormError> {
    let checked = check(params, &[name_field("term", Occurrence::Required)?])?;
    required(&checked, "term")
}

pub fn parse_term_update(params: &Params) -> Result<TermUpdate, FormError> {
    let checked = check(params, &[name_field("term", Occurrence::Optional)?])?;
    Ok(TermUpdate {
        name: checked.get("term").cloned(),
    })
}

/// Participant name plus optional per-term availability.
pub fn parse_participant_add(
    params: &Params,
) -> Result<(String, BTreeMap<TermId, Availability>), FormError> {
    let checked = check(
        params,
        &[
            name_field("name", Occurrence::Required)?,
            availability_field()?,
        ],
    )?;
    let name = required(&checked, "name")?;
    Ok((name, availability_of(&checked)?))
}

pub fn parse_participant_update(params: &Params) -> Result<ParticipantUpdate, FormError> {
    let checked = check(
        params,
        &[
            name_field("name", Occurrence::Optional)?,
            availability_field()?,
        ],
    )?;
    Ok(ParticipantUpdate {
        name: checked.get("name").cloned(),
        availability: availability_of(&checked)?,
    })
}

/// Sanitized `(name, body)` for `add_comment`.
pub fn parse_comment_add(params: &Params) -> Result<(String, String), FormError> {
    let checked = check(
        params,
        &[
            name_field("name", Occurrence::Required)?,
            body_field(Occurrence::Required)?,
        ],
    )?;
    Ok((required(&checked, "name")?, required(&checked, "body")?))
}

pub fn parse_comment_update(params: &Params) -> Result<CommentUpdate, FormError> {
    let checked = check(
        params,
        &[
            name_field("name", Occurrence::Optional)?,
            body_field(Occurrence::Optional)?,
        ],
    )?;
    Ok(CommentUpdate {
        name: checked.get("name").cloned(),
        body: checked.get("body").cloned(),
    })
}

fn name_field(key: &str, occurrence: Occurrence) -> Result<FieldDef, FormError> {
    Ok(FieldDef::exact(key, occurrence)
        .sanitize(strip)
        .validate(not_whitespace())
        .validate(one_line())
        .validate(length(1, NAME_MAX_CHARS)?))
}

fn text_field(key: &str, occurrence: Occurrence) -> Result<FieldDef, FormError> {
    Ok(FieldDef::exact(key, occurrence)
        .sanitize(strip)
        .validate(length(0, TEXT_MAX_CHARS)?))
}

fn body_field(occurrence: Occurrence) -> Result<FieldDef, FormError> {
    Ok(FieldDef::exact("body", occurrence)
        .sanitize(strip)
        .validate(not_whitespace())
        .validate(length(1, TEXT_MAX_CHARS)?))
}

fn availability_field() -> Result<FieldDef, FormError> {
    Ok(FieldDef::pattern(TERM_KEY_RE.clone(), Occurrence::AtLeast(0))
        .sanitize(strip)
        .validate(not_whitespace())
        .validate(one_line())
        .validate(length(1, AVAILABILITY_MAX_CHARS)?))
}

fn availability_of(checked: &Params) -> Result<BTreeMap<TermId, Availability>, FormError> {
    checked
        .iter()
        .filter(|(key, _)| TERM_KEY_RE.is_match(key))
        .map(|(key, value)| {
            parse_term_id(key, key).map(|term| (term, Availability::new(value.clone())))
        })
        .collect()
}

fn parse_term_id(key: &str, value: &str) -> Result<TermId, FormError> {
    value
        .parse::<u64>()
        .map(TermId::new)
        .map_err(|_| FormError::Invalid {
            key: key.to_string(),
            rule: "term_id",
        })
}

fn required(checked: &Params, key: &str) -> Result<String, FormError> {
    checked.get(key).cloned().ok_or_else(|| FormError::Occurrence {
        key: key.to_string(),
        expected: Occurrence::Required,
        actual: 0,
    })
}
