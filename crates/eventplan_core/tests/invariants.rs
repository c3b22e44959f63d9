use eventplan_core::db::open_db_in_memory;
use eventplan_core::{
    Availability, EngineError, ErrorKind, EventDocument, EventField, EventId, EventPatch,
    EventRepository, EventService, ParticipantId, ParticipantUpdate, RepoError, RepoResult,
    SqliteEventRepository, StorageFault, TermId,
};
use proptest::prelude::*;
use rusqlite::Connection;
use std::cell::Cell;
use std::collections::BTreeMap;

fn service(conn: &Connection) -> EventService<SqliteEventRepository<'_>> {
    EventService::new(SqliteEventRepository::try_new(conn).unwrap())
}

fn stored(engine: &EventService<SqliteEventRepository<'_>>, id: EventId) -> EventDocument {
    engine.repository().read_event(id).unwrap().unwrap()
}

/// One mutation of a random sequence; `pick` selects a target ID.
#[derive(Debug, Clone, Copy)]
enum Step {
    AddTerm,
    AddParticipant,
    DeleteTerm { pick: u64 },
    DeleteParticipant { pick: u64 },
    MarkAttendance,
}

fn step() -> impl Strategy<Value = Step> {
    (0..5u8, any::<u64>()).prop_map(|(kind, pick)| match kind {
        0 => Step::AddTerm,
        1 => Step::AddParticipant,
        2 => Step::DeleteTerm { pick },
        3 => Step::DeleteParticipant { pick },
        _ => Step::MarkAttendance,
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn ids_strictly_increase_and_matrix_stays_complete(
        steps in prop::collection::vec(step(), 1..200)
    ) {
        let conn = open_db_in_memory().unwrap();
        let engine = service(&conn);
        let id = engine.create("title", "").unwrap().id;
        let mut last_term = 0;
        let mut last_participant = 0;

        for (round, step) in steps.into_iter().enumerate() {
            let doc = stored(&engine, id);
            match step {
                Step::AddTerm => {
                    let view = engine.add_term(id, format!("term-{round}")).unwrap();
                    let newest = view.terms.keys().next_back().unwrap().get();
                    prop_assert!(newest > last_term);
                    last_term = newest;
                }
                Step::AddParticipant => {
                    let view = engine
                        .add_participant(id, format!("person-{round}"), &BTreeMap::new())
                        .unwrap();
                    let newest = view.participants.keys().next_back().unwrap().get();
                    prop_assert!(newest > last_participant);
                    last_participant = newest;
                }
                Step::DeleteTerm { pick } if doc.terms.counter() > 0 => {
                    let target = TermId::new(pick % doc.terms.counter() + 1);
                    engine.delete_term(id, target).unwrap();
                }
                Step::DeleteParticipant { pick } if doc.participants.counter() > 0 => {
                    let target = ParticipantId::new(pick % doc.participants.counter() + 1);
                    engine.delete_participant(id, target).unwrap();
                }
                _ => {
                    if let Some(participant) = doc.participants.ids().next() {
                        let update = ParticipantUpdate::default()
                            .with_availability(TermId::new(last_term), Availability::attendance());
                        engine.update_participant(id, participant, &update).unwrap();
                    }
                }
            }

            let after = stored(&engine, id);
            prop_assert!(after.validate().is_ok());
            prop_assert_eq!(after.terms.counter(), last_term);
            prop_assert_eq!(after.participants.counter(), last_participant);
            prop_assert_eq!(after.record.rows().len(), after.participants.len());
        }
    }
}

#[test]
fn shaped_output_carries_no_cursor() {
    let conn = open_db_in_memory().unwrap();
    let engine = service(&conn);
    let id = engine.create("title", "").unwrap().id;
    engine.add_term(id, "mon").unwrap();
    engine.add_participant(id, "alice", &BTreeMap::new()).unwrap();
    let view = engine.add_comment(id, "alice", "hi").unwrap();

    let json = serde_json::to_value(&view).unwrap();
    for key in ["terms", "participants", "comments"] {
        assert!(json[key].get("counter").is_none(), "{key} leaks its cursor");
    }
    assert!(json.get("revision").is_none());
    assert_eq!(json["record"]["1"]["1"], "absence");
}

#[test]
fn rejected_operations_write_nothing() {
    let conn = open_db_in_memory().unwrap();
    let engine = service(&conn);
    let id = engine.create("title", "").unwrap().id;
    engine.add_term(id, "mon").unwrap();
    let before = stored(&engine, id);

    assert!(engine.add_term(id, "mon").is_err());
    assert!(engine.delete_term(id, TermId::new(4)).is_err());
    assert!(engine.fix(id, TermId::new(4)).is_err());
    assert_eq!(stored(&engine, id), before);
}

#[test]
fn idempotent_deletes_do_not_bump_revision() {
    let conn = open_db_in_memory().unwrap();
    let engine = service(&conn);
    let id = engine.create("title", "").unwrap().id;
    engine.add_term(id, "mon").unwrap();
    engine.delete_term(id, TermId::new(1)).unwrap();
    let revision = stored(&engine, id).revision;

    engine.delete_term(id, TermId::new(1)).unwrap();
    assert_eq!(stored(&engine, id).revision, revision);
}

/// Store that lets another writer slip in between the engine's read and
/// its write.
struct RacingRepository<'conn> {
    inner: SqliteEventRepository<'conn>,
    raced: Cell<bool>,
}

impl EventRepository for RacingRepository<'_> {
    fn create_event(&self, title: &str, description: &str) -> RepoResult<EventDocument> {
        self.inner.create_event(title, description)
    }

    fn read_event(&self, id: EventId) -> RepoResult<Option<EventDocument>> {
        self.inner.read_event(id)
    }

    fn set_event(&self, id: EventId, patch: &EventPatch) -> RepoResult<Option<EventDocument>> {
        if !self.raced.replace(true) {
            let rival = EventPatch {
                title: Some("rival".to_string()),
                ..EventPatch::default()
            };
            self.inner.set_event(id, &rival)?;
        }
        self.inner.set_event(id, patch)
    }

    fn unset_event(&self, id: EventId, field: EventField) -> RepoResult<Option<EventDocument>> {
        self.inner.unset_event(id, field)
    }

    fn delete_event(&self, id: EventId) -> RepoResult<()> {
        self.inner.delete_event(id)
    }

    fn last_event_id(&self) -> RepoResult<u64> {
        self.inner.last_event_id()
    }
}

#[test]
fn concurrent_write_surfaces_as_storage_error() {
    let conn = open_db_in_memory().unwrap();
    let engine = EventService::new(RacingRepository {
        inner: SqliteEventRepository::try_new(&conn).unwrap(),
        raced: Cell::new(false),
    });
    let id = engine.create("title", "").unwrap().id;

    let err = engine.add_term(id, "mon").unwrap_err();
    assert!(matches!(
        err,
        EngineError::Storage(StorageFault::Repo(RepoError::RevisionConflict { .. }))
    ));
    assert_eq!(err.kind(), ErrorKind::ServerSide);
    assert_eq!(err.status_code(), 500);

    let view = engine.get(id).unwrap();
    assert_eq!(view.title, "rival");
    assert!(view.terms.is_empty());

    let retried = engine.add_term(id, "mon").unwrap();
    assert_eq!(retried.terms.len(), 1);
}

/// Store whose writes report success but return no document.
struct VanishingRepository<'conn> {
    inner: SqliteEventRepository<'conn>,
}

impl EventRepository for VanishingRepository<'_> {
    fn create_event(&self, title: &str, description: &str) -> RepoResult<EventDocument> {
        self.inner.create_event(title, description)
    }

    fn read_event(&self, id: EventId) -> RepoResult<Option<EventDocument>> {
        self.inner.read_event(id)
    }

    fn set_event(&self, id: EventId, patch: &EventPatch) -> RepoResult<Option<EventDocument>> {
        self.inner.set_event(id, patch)?;
        Ok(None)
    }

    fn unset_event(&self, id: EventId, field: EventField) -> RepoResult<Option<EventDocument>> {
        self.inner.unset_event(id, field)
    }

    fn delete_event(&self, id: EventId) -> RepoResult<()> {
        self.inner.delete_event(id)
    }

    fn last_event_id(&self) -> RepoResult<u64> {
        self.inner.last_event_id()
    }
}

#[test]
fn missing_document_after_write_is_a_storage_error() {
    let conn = open_db_in_memory().unwrap();
    let engine = EventService::new(VanishingRepository {
        inner: SqliteEventRepository::try_new(&conn).unwrap(),
    });
    let id = engine.create("title", "").unwrap().id;

    let err = engine.add_comment(id, "alice", "hi").unwrap_err();
    assert!(matches!(
        err,
        EngineError::Storage(StorageFault::MissingAfterWrite(event)) if event == id
    ));
    assert_eq!(err.status_code(), 500);
}
