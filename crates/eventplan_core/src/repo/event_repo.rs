//! Event document store contract and SQLite implementation.
//!
//! # Responsibility
//! - Create, read, partially update, unset and delete event documents.
//! - Own the event ID sequence and the per-document revision stamp.
//!
//! # Invariants
//! - A partial write replaces exactly the sub-trees named in the patch, all
//!   inside one transaction, and bumps `revision` by one.
//! - A patch carrying `expected_revision` is rejected when the stored
//!   revision moved on; nothing is written in that case.
//! - The event ID sequence never goes backwards, so deleted IDs stay
//!   distinguishable from never-allocated ones.
//! - Read paths reject documents failing `EventDocument::validate()`.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::collection::Collection;
use crate::model::event::{Comment, DocumentValidationError, EventDocument};
use crate::model::ids::{CommentId, EventId, ParticipantId, TermId};
use crate::model::record::AvailabilityRecord;
use rusqlite::types::Value;
use rusqlite::{
    params, params_from_iter, Connection, OptionalExtension, Row, Transaction,
    TransactionBehavior,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

const EVENT_SELECT_SQL: &str = "SELECT
    id,
    title,
    description,
    fixed,
    terms,
    participants,
    record,
    comments,
    revision
FROM events";

const EVENT_SEQUENCE: &str = "events";

pub type RepoResult<T> = Result<T, RepoError>;

/// Store-level error for event persistence.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Persisted document breaks an aggregate invariant.
    Validation(DocumentValidationError),
    NotFound(EventId),
    /// Write carried a stale revision stamp.
    RevisionConflict {
        event_id: EventId,
        expected: u64,
        actual: u64,
    },
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "invalid event document: {err}"),
            Self::NotFound(id) => write!(f, "event not found: {id}"),
            Self::RevisionConflict {
                event_id,
                expected,
                actual,
            } => write!(
                f,
                "event {event_id} changed concurrently: expected revision {expected}, found {actual}"
            ),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "event repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted event data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<DocumentValidationError> for RepoError {
    fn from(value: DocumentValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Removable top-level document fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventField {
    Fixed,
}

impl EventField {
    fn column(self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
        }
    }
}

/// Partial write: every `Some` sub-tree replaces the stored one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPatch {
    /// Revision the caller based its diff on. `None` skips the check.
    pub expected_revision: Option<u64>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub fixed: Option<TermId>,
    pub terms: Option<Collection<TermId, String>>,
    pub participants: Option<Collection<ParticipantId, String>>,
    pub record: Option<AvailabilityRecord>,
    pub comments: Option<Collection<CommentId, Comment>>,
}

impl EventPatch {
    /// Empty patch guarded by `revision`.
    pub fn at_revision(revision: u64) -> Self {
        Self {
            expected_revision: Some(revision),
            ..Self::default()
        }
    }

    /// Whether the patch names no sub-tree at all.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.fixed.is_none()
            && self.terms.is_none()
            && self.participants.is_none()
            && self.record.is_none()
            && self.comments.is_none()
    }
}

/// Document store used by the event engine.
pub trait EventRepository {
    /// Allocates the next event ID and stores an empty, undecided event.
    fn create_event(&self, title: &str, description: &str) -> RepoResult<EventDocument>;
    /// Point read; `None` when no such event exists.
    fn read_event(&self, id: EventId) -> RepoResult<Option<EventDocument>>;
    /// Partial write; returns the full post-write document.
    fn set_event(&self, id: EventId, patch: &EventPatch) -> RepoResult<Option<EventDocument>>;
    /// Removes one optional top-level field; returns the post-write document.
    fn unset_event(&self, id: EventId, field: EventField) -> RepoResult<Option<EventDocument>>;
    /// Hard delete. The event ID is never handed out again.
    fn delete_event(&self, id: EventId) -> RepoResult<()>;
    /// Highest event ID ever allocated (`0` when none).
    fn last_event_id(&self) -> RepoResult<u64>;
}

/// SQLite-backed event document store.
pub struct SqliteEventRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEventRepository<'conn> {
    /// Creates a repository over a migrated connection.
    ///
    /// # Errors
    /// - `RepoError::UninitializedConnection` when migrations were not applied.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let actual_version = current_user_version(conn)?;
        let expected_version = latest_version();
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        Ok(Self { conn })
    }
}

impl EventRepository for SqliteEventRepository<'_> {
    fn create_event(&self, title: &str, description: &str) -> RepoResult<EventDocument> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "UPDATE counters SET seq = seq + 1 WHERE name = ?1;",
            [EVENT_SEQUENCE],
        )?;
        if changed == 0 {
            return Err(RepoError::InvalidData(
                "missing `events` row in counters".to_string(),
            ));
        }
        let seq: i64 = tx.query_row(
            "SELECT seq FROM counters WHERE name = ?1;",
            [EVENT_SEQUENCE],
            |row| row.get(0),
        )?;
        let id = EventId::new(to_u64(seq, "counters.seq")?);

        let empty = EventDocument::empty(id, title, description);
        tx.execute(
            "INSERT INTO events (
                id,
                title,
                description,
                fixed,
                terms,
                participants,
                record,
                comments,
                revision
            ) VALUES (?1, ?2, ?3, NULL, ?4, ?5, ?6, ?7, 0);",
            params![
                seq,
                empty.title.as_str(),
                empty.description.as_str(),
                to_json(&empty.terms, "terms")?,
                to_json(&empty.participants, "participants")?,
                to_json(&empty.record, "record")?,
                to_json(&empty.comments, "comments")?,
            ],
        )?;

        let created = load_event(&tx, id)?.ok_or(RepoError::NotFound(id))?;
        tx.commit()?;
        Ok(created)
    }

    fn read_event(&self, id: EventId) -> RepoResult<Option<EventDocument>> {
        load_event(self.conn, id)
    }

    fn set_event(&self, id: EventId, patch: &EventPatch) -> RepoResult<Option<EventDocument>> {
        let Some(sql_id) = event_row_id(id) else {
            return Ok(None);
        };
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        let actual: Option<i64> = tx
            .query_row(
                "SELECT revision FROM events WHERE id = ?1;",
                [sql_id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(actual) = actual else {
            return Ok(None);
        };
        let actual = to_u64(actual, "events.revision")?;

        if let Some(expected) = patch.expected_revision {
            if expected != actual {
                return Err(RepoError::RevisionConflict {
                    event_id: id,
                    expected,
                    actual,
                });
            }
        }

        let mut assignments: Vec<&'static str> = Vec::new();
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(title) = &patch.title {
            assignments.push("title = ?");
            bind_values.push(Value::Text(title.clone()));
        }
        if let Some(description) = &patch.description {
            assignments.push("description = ?");
            bind_values.push(Value::Text(description.clone()));
        }
        if let Some(fixed) = patch.fixed {
            assignments.push("fixed = ?");
            bind_values.push(Value::Integer(to_sql_id(fixed.get())?));
        }
        if let Some(terms) = &patch.terms {
            assignments.push("terms = ?");
            bind_values.push(Value::Text(to_json(terms, "terms")?));
        }
        if let Some(participants) = &patch.participants {
            assignments.push("participants = ?");
            bind_values.push(Value::Text(to_json(participants, "participants")?));
        }
        if let Some(record) = &patch.record {
            assignments.push("record = ?");
            bind_values.push(Value::Text(to_json(record, "record")?));
        }
        if let Some(comments) = &patch.comments {
            assignments.push("comments = ?");
            bind_values.push(Value::Text(to_json(comments, "comments")?));
        }

        assignments.push("revision = revision + 1");
        assignments.push("updated_at = (strftime('%s', 'now') * 1000)");
        bind_values.push(Value::Integer(sql_id));

        let sql = format!("UPDATE events SET {} WHERE id = ?;", assignments.join(", "));
        tx.execute(&sql, params_from_iter(bind_values))?;

        let updated = load_event(&tx, id)?;
        tx.commit()?;
        Ok(updated)
    }

    fn unset_event(&self, id: EventId, field: EventField) -> RepoResult<Option<EventDocument>> {
        let Some(sql_id) = event_row_id(id) else {
            return Ok(None);
        };
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let sql = format!(
            "UPDATE events
             SET {} = NULL,
                 revision = revision + 1,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            field.column()
        );
        let changed = tx.execute(&sql, [sql_id])?;
        if changed == 0 {
            return Ok(None);
        }

        let updated = load_event(&tx, id)?;
        tx.commit()?;
        Ok(updated)
    }

    fn delete_event(&self, id: EventId) -> RepoResult<()> {
        let Some(sql_id) = event_row_id(id) else {
            return Err(RepoError::NotFound(id));
        };
        let changed = self
            .conn
            .execute("DELETE FROM events WHERE id = ?1;", [sql_id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn last_event_id(&self) -> RepoResult<u64> {
        let seq: Option<i64> = self
            .conn
            .query_row(
                "SELECT seq FROM counters WHERE name = ?1;",
                [EVENT_SEQUENCE],
                |row| row.get(0),
            )
            .optional()?;
        to_u64(seq.unwrap_or(0), "counters.seq")
    }
}

fn load_event(conn: &Connection, id: EventId) -> RepoResult<Option<EventDocument>> {
    let Some(sql_id) = event_row_id(id) else {
        return Ok(None);
    };
    let mut stmt = conn.prepare(&format!("{EVENT_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([sql_id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_event_row(row)?));
    }
    Ok(None)
}

fn parse_event_row(row: &Row<'_>) -> RepoResult<EventDocument> {
    let id = EventId::new(to_u64(row.get("id")?, "events.id")?);
    let fixed = match row.get::<_, Option<i64>>("fixed")? {
        Some(value) => Some(TermId::new(to_u64(value, "events.fixed")?)),
        None => None,
    };

    let document = EventDocument {
        id,
        title: row.get("title")?,
        description: row.get("description")?,
        fixed,
        terms: from_json(&row.get::<_, String>("terms")?, "terms")?,
        participants: from_json(&row.get::<_, String>("participants")?, "participants")?,
        record: from_json(&row.get::<_, String>("record")?, "record")?,
        comments: from_json(&row.get::<_, String>("comments")?, "comments")?,
        revision: to_u64(row.get("revision")?, "events.revision")?,
    };
    document.validate()?;
    Ok(document)
}

fn to_json<T: Serialize>(value: &T, column: &str) -> RepoResult<String> {
    serde_json::to_string(value)
        .map_err(|err| RepoError::InvalidData(format!("cannot encode events.{column}: {err}")))
}

fn from_json<T: DeserializeOwned>(text: &str, column: &str) -> RepoResult<T> {
    serde_json::from_str(text)
        .map_err(|err| RepoError::InvalidData(format!("invalid json in events.{column}: {err}")))
}

/// Row key for an event; IDs past the sqlite integer range never name a row.
fn event_row_id(id: EventId) -> Option<i64> {
    i64::try_from(id.get()).ok()
}

fn to_sql_id(value: u64) -> RepoResult<i64> {
    i64::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("id `{value}` exceeds sqlite integer range")))
}

fn to_u64(value: i64, column: &str) -> RepoResult<u64> {
    u64::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("negative value `{value}` in {column}")))
}

#[cfg(test)]
mod tests {
    use super::{EventField, EventPatch, EventRepository, RepoError, SqliteEventRepository};
    use crate::db::open_db_in_memory;
    use crate::model::ids::EventId;
    use rusqlite::Connection;

    #[test]
    fn try_new_rejects_unmigrated_connection() {
        let conn = Connection::open_in_memory().unwrap();
        let err = SqliteEventRepository::try_new(&conn)
            .err()
            .expect("unmigrated connection must be rejected");
        assert!(matches!(
            err,
            RepoError::UninitializedConnection {
                actual_version: 0,
                ..
            }
        ));
    }

    #[test]
    fn empty_patch_still_bumps_revision() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteEventRepository::try_new(&conn).unwrap();
        let created = repo.create_event("t", "d").unwrap();

        let patch = EventPatch::at_revision(created.revision);
        assert!(patch.is_empty());
        let updated = repo.set_event(created.id, &patch).unwrap().unwrap();
        assert_eq!(updated.revision, created.revision + 1);
    }

    #[test]
    fn ids_past_sqlite_range_name_no_row() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteEventRepository::try_new(&conn).unwrap();
        let far = EventId::new(u64::MAX);

        assert!(repo.read_event(far).unwrap().is_none());
        assert!(repo.set_event(far, &EventPatch::default()).unwrap().is_none());
        assert!(repo.unset_event(far, EventField::Fixed).unwrap().is_none());
        assert!(matches!(
            repo.delete_event(far),
            Err(RepoError::NotFound(id)) if id == far
        ));
    }
}
