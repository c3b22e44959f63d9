use eventplan_core::db::open_db_in_memory;
use eventplan_core::{
    EngineError, ErrorKind, EventId, EventPut, EventService, EventUpdate, FixedChange,
    SqliteEventRepository, TermId,
};
use rusqlite::Connection;

fn service(conn: &Connection) -> EventService<SqliteEventRepository<'_>> {
    EventService::new(SqliteEventRepository::try_new(conn).unwrap())
}

#[test]
fn create_returns_empty_shaped_event() {
    let conn = open_db_in_memory().unwrap();
    let engine = service(&conn);

    let view = engine.create("team dinner", "somewhere nice").unwrap();
    assert_eq!(view.id, EventId::new(1));
    assert_eq!(view.title, "team dinner");
    assert_eq!(view.description, "somewhere nice");
    assert_eq!(view.fixed, None);
    assert!(view.terms.is_empty());
    assert!(view.participants.is_empty());
    assert!(view.record.is_empty());
    assert!(view.comments.is_empty());

    assert_eq!(engine.get(view.id).unwrap(), view);
}

#[test]
fn update_edits_only_supplied_fields() {
    let conn = open_db_in_memory().unwrap();
    let engine = service(&conn);
    let id = engine.create("title", "desc").unwrap().id;

    let view = engine
        .update(
            id,
            &EventUpdate {
                title: None,
                description: Some("new desc".to_string()),
            },
        )
        .unwrap();
    assert_eq!(view.title, "title");
    assert_eq!(view.description, "new desc");
}

#[test]
fn fix_locks_content_and_unfix_releases_it() {
    let conn = open_db_in_memory().unwrap();
    let engine = service(&conn);
    let id = engine.create("title", "").unwrap().id;
    engine.add_term(id, "monday").unwrap();

    let fixed = engine.fix(id, TermId::new(1)).unwrap();
    assert_eq!(fixed.fixed, Some(TermId::new(1)));

    let err = engine
        .update(
            id,
            &EventUpdate {
                title: Some("other".to_string()),
                description: None,
            },
        )
        .unwrap_err();
    assert!(matches!(err, EngineError::FixedEvent(event) if event == id));
    assert_eq!(err.status_code(), 409);

    let refix = engine.fix(id, TermId::new(1)).unwrap_err();
    assert_eq!(refix.kind(), ErrorKind::FixedEvent);

    let unfixed = engine.unfix(id).unwrap();
    assert_eq!(unfixed.fixed, None);
    let renamed = engine
        .update(
            id,
            &EventUpdate {
                title: Some("other".to_string()),
                description: None,
            },
        )
        .unwrap();
    assert_eq!(renamed.title, "other");
}

#[test]
fn empty_update_on_fixed_event_is_a_no_op() {
    let conn = open_db_in_memory().unwrap();
    let engine = service(&conn);
    let id = engine.create("title", "").unwrap().id;
    engine.add_term(id, "monday").unwrap();
    let fixed = engine.fix(id, TermId::new(1)).unwrap();

    let view = engine.update(id, &EventUpdate::default()).unwrap();
    assert_eq!(view, fixed);
}

#[test]
fn fix_requires_current_term() {
    let conn = open_db_in_memory().unwrap();
    let engine = service(&conn);
    let id = engine.create("title", "").unwrap().id;
    engine.add_term(id, "monday").unwrap();
    engine.delete_term(id, TermId::new(1)).unwrap();

    let deleted = engine.fix(id, TermId::new(1)).unwrap_err();
    assert!(matches!(
        deleted,
        EngineError::TermNotFound {
            previously_allocated: true,
            ..
        }
    ));
    assert_eq!(deleted.status_code(), 410);

    let never = engine.fix(id, TermId::new(7)).unwrap_err();
    assert_eq!(never.kind(), ErrorKind::TermNotFound);
    assert_eq!(never.status_code(), 404);
}

#[test]
fn unfix_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let engine = service(&conn);
    let id = engine.create("title", "").unwrap().id;

    let first = engine.unfix(id).unwrap();
    let second = engine.unfix(id).unwrap();
    assert_eq!(first.fixed, None);
    assert_eq!(first, second);
}

#[test]
fn put_dispatches_on_fixed_presence() {
    let conn = open_db_in_memory().unwrap();
    let engine = service(&conn);
    let id = engine.create("title", "").unwrap().id;
    engine.add_term(id, "monday").unwrap();

    let fixed = engine
        .put(
            id,
            &EventPut {
                fixed: Some(FixedChange::FixTo(TermId::new(1))),
                ..EventPut::default()
            },
        )
        .unwrap();
    assert_eq!(fixed.fixed, Some(TermId::new(1)));

    let unfixed = engine
        .put(
            id,
            &EventPut {
                fixed: Some(FixedChange::Unfix),
                ..EventPut::default()
            },
        )
        .unwrap();
    assert_eq!(unfixed.fixed, None);

    let edited = engine
        .put(
            id,
            &EventPut::from(EventUpdate {
                title: Some("renamed".to_string()),
                description: None,
            }),
        )
        .unwrap();
    assert_eq!(edited.title, "renamed");
}

#[test]
fn put_rejects_decision_mixed_with_content() {
    let conn = open_db_in_memory().unwrap();
    let engine = service(&conn);
    let id = engine.create("title", "").unwrap().id;
    engine.add_term(id, "monday").unwrap();

    let err = engine
        .put(
            id,
            &EventPut {
                title: Some("renamed".to_string()),
                description: None,
                fixed: Some(FixedChange::FixTo(TermId::new(1))),
            },
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    assert_eq!(err.status_code(), 400);

    let view = engine.get(id).unwrap();
    assert_eq!(view.title, "title");
    assert_eq!(view.fixed, None);
}

#[test]
fn missing_events_report_404_or_410() {
    let conn = open_db_in_memory().unwrap();
    let engine = service(&conn);
    let id = engine.create("title", "").unwrap().id;

    engine.delete(id).unwrap();

    let gone = engine.get(id).unwrap_err();
    assert!(matches!(
        gone,
        EngineError::EventNotFound { deleted: true, .. }
    ));
    assert_eq!(gone.status_code(), 410);

    let never = engine.get(EventId::new(99)).unwrap_err();
    assert_eq!(never.kind(), ErrorKind::NotFound);
    assert_eq!(never.status_code(), 404);

    let again = engine.delete(id).unwrap_err();
    assert_eq!(again.status_code(), 410);
    assert_eq!(engine.unfix(id).unwrap_err().status_code(), 410);
    assert_eq!(engine.add_term(id, "monday").unwrap_err().status_code(), 410);
}

#[test]
fn ids_past_storage_range_are_plain_not_found() {
    let conn = open_db_in_memory().unwrap();
    let engine = service(&conn);
    engine.create("title", "").unwrap();

    for id in [EventId::new(u64::MAX), EventId::new(1 << 63)] {
        let err = engine.get(id).unwrap_err();
        assert!(matches!(
            err,
            EngineError::EventNotFound { deleted: false, .. }
        ));
        assert_eq!(err.status_code(), 404);

        let err = engine.add_comment(id, "alice", "hi").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.status_code(), 404);

        assert_eq!(engine.unfix(id).unwrap_err().status_code(), 404);
        assert_eq!(engine.delete(id).unwrap_err().kind(), ErrorKind::NotFound);
    }
}
