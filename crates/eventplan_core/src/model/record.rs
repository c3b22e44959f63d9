//! Availability matrix between participants and terms.
//!
//! # Responsibility
//! - Hold one availability token per (participant, term) pair.
//! - Provide the cascade primitives used when terms or participants change.
//!
//! # Invariants
//! - A row exists for every current participant, even with zero terms.
//! - A cell exists iff its participant and its term are both current.

use super::ids::{ParticipantId, TermId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Default availability seeded for new matrix cells.
pub const ABSENCE: &str = "absence";
/// Conventional token for a participant who can attend.
pub const ATTENDANCE: &str = "attendance";

/// Caller-supplied availability token for one cell.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Availability(String);

impl Availability {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The system default token.
    pub fn absence() -> Self {
        Self(ABSENCE.to_string())
    }

    pub fn attendance() -> Self {
        Self(ATTENDANCE.to_string())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Default for Availability {
    fn default() -> Self {
        Self::absence()
    }
}

impl From<&str> for Availability {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Availability {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Display for Availability {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One participant's availability across terms.
pub type AvailabilityRow = BTreeMap<TermId, Availability>;

/// Sparse participant x term matrix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AvailabilityRecord(BTreeMap<ParticipantId, AvailabilityRow>);

impl AvailabilityRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `term` to every existing row with the default token.
    pub fn seed_term(&mut self, term: TermId) {
        for row in self.0.values_mut() {
            row.insert(term, Availability::absence());
        }
    }

    /// Drops the `term` column from every row.
    pub fn remove_term(&mut self, term: TermId) {
        for row in self.0.values_mut() {
            row.remove(&term);
        }
    }

    /// Inserts a full row for `participant`, replacing any previous one.
    ///
    /// Every term in `terms` gets a cell: the caller value from `supplied` when
    /// present, `absence` otherwise. Supplied values for other terms are dropped.
    pub fn insert_participant(
        &mut self,
        participant: ParticipantId,
        terms: impl IntoIterator<Item = TermId>,
        supplied: &BTreeMap<TermId, Availability>,
    ) {
        let row = terms
            .into_iter()
            .map(|term| {
                let value = supplied
                    .get(&term)
                    .cloned()
                    .unwrap_or_else(Availability::absence);
                (term, value)
            })
            .collect();
        self.0.insert(participant, row);
    }

    /// Drops the whole row of `participant`.
    pub fn remove_participant(&mut self, participant: ParticipantId) -> Option<AvailabilityRow> {
        self.0.remove(&participant)
    }

    /// Overwrites one cell. Returns `false` when the row does not exist.
    pub fn set_cell(
        &mut self,
        participant: ParticipantId,
        term: TermId,
        value: Availability,
    ) -> bool {
        match self.0.get_mut(&participant) {
            Some(row) => {
                row.insert(term, value);
                true
            }
            None => false,
        }
    }

    pub fn cell(&self, participant: ParticipantId, term: TermId) -> Option<&Availability> {
        self.0.get(&participant).and_then(|row| row.get(&term))
    }

    pub fn row(&self, participant: ParticipantId) -> Option<&AvailabilityRow> {
        self.0.get(&participant)
    }

    pub fn participants(&self) -> impl Iterator<Item = ParticipantId> + '_ {
        self.0.keys().copied()
    }

    pub fn rows(&self) -> &BTreeMap<ParticipantId, AvailabilityRow> {
        &self.0
    }

    pub fn into_rows(self) -> BTreeMap<ParticipantId, AvailabilityRow> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::{Availability, AvailabilityRecord};
    use crate::model::ids::{ParticipantId, TermId};
    use std::collections::BTreeMap;

    fn p(id: u64) -> ParticipantId {
        ParticipantId::new(id)
    }

    fn t(id: u64) -> TermId {
        TermId::new(id)
    }

    #[test]
    fn insert_participant_falls_back_to_absence_and_drops_unknown_terms() {
        let mut record = AvailabilityRecord::new();
        let mut supplied = BTreeMap::new();
        supplied.insert(t(1), Availability::attendance());
        supplied.insert(t(9), Availability::attendance());

        record.insert_participant(p(1), [t(1), t(2)], &supplied);

        assert_eq!(record.cell(p(1), t(1)), Some(&Availability::attendance()));
        assert_eq!(record.cell(p(1), t(2)), Some(&Availability::absence()));
        assert_eq!(record.cell(p(1), t(9)), None);
    }

    #[test]
    fn seed_and_remove_term_touch_every_row() {
        let mut record = AvailabilityRecord::new();
        record.insert_participant(p(1), [t(1)], &BTreeMap::new());
        record.insert_participant(p(2), [t(1)], &BTreeMap::new());

        record.seed_term(t(2));
        assert!(record.rows().values().all(|row| row.contains_key(&t(2))));

        record.remove_term(t(1));
        assert!(record.rows().values().all(|row| !row.contains_key(&t(1))));
        assert_eq!(record.row(p(1)).map(|row| row.len()), Some(1));
    }

    #[test]
    fn participant_without_terms_keeps_an_empty_row() {
        let mut record = AvailabilityRecord::new();
        record.insert_participant(p(3), [], &BTreeMap::new());
        assert_eq!(record.row(p(3)).map(|row| row.is_empty()), Some(true));
        assert!(!record.set_cell(p(4), t(1), Availability::absence()));
    }
}
