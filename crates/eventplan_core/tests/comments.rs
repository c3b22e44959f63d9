use eventplan_core::db::open_db_in_memory;
use eventplan_core::{
    Comment, CommentId, CommentUpdate, EngineError, ErrorKind, EventService,
    SqliteEventRepository, TermId,
};
use rusqlite::Connection;

fn service(conn: &Connection) -> EventService<SqliteEventRepository<'_>> {
    EventService::new(SqliteEventRepository::try_new(conn).unwrap())
}

#[test]
fn comments_get_sequential_ids() {
    let conn = open_db_in_memory().unwrap();
    let engine = service(&conn);
    let id = engine.create("title", "").unwrap().id;

    engine.add_comment(id, "alice", "first").unwrap();
    let view = engine.add_comment(id, "bob", "second\nline").unwrap();

    assert_eq!(view.comments[&CommentId::new(1)], Comment::new("alice", "first"));
    assert_eq!(
        view.comments[&CommentId::new(2)],
        Comment::new("bob", "second\nline")
    );
}

#[test]
fn update_comment_applies_supplied_fields() {
    let conn = open_db_in_memory().unwrap();
    let engine = service(&conn);
    let id = engine.create("title", "").unwrap().id;
    engine.add_comment(id, "alice", "first").unwrap();

    let view = engine
        .update_comment(
            id,
            CommentId::new(1),
            &CommentUpdate {
                name: None,
                body: Some("edited".to_string()),
            },
        )
        .unwrap();
    assert_eq!(view.comments[&CommentId::new(1)], Comment::new("alice", "edited"));

    let unchanged = engine
        .update_comment(id, CommentId::new(9), &CommentUpdate::default())
        .unwrap();
    assert_eq!(unchanged, view);
}

#[test]
fn update_comment_reports_missing_ids() {
    let conn = open_db_in_memory().unwrap();
    let engine = service(&conn);
    let id = engine.create("title", "").unwrap().id;
    engine.add_comment(id, "alice", "first").unwrap();
    engine.delete_comment(id, CommentId::new(1)).unwrap();

    let edit = CommentUpdate {
        name: Some("bob".to_string()),
        body: None,
    };
    let deleted = engine
        .update_comment(id, CommentId::new(1), &edit)
        .unwrap_err();
    assert_eq!(deleted.kind(), ErrorKind::CommentNotFound);
    assert_eq!(deleted.status_code(), 410);

    let never = engine
        .update_comment(id, CommentId::new(2), &edit)
        .unwrap_err();
    assert_eq!(never.status_code(), 404);
}

#[test]
fn delete_comment_range_and_idempotence() {
    let conn = open_db_in_memory().unwrap();
    let engine = service(&conn);
    let id = engine.create("title", "").unwrap().id;
    engine.add_comment(id, "alice", "first").unwrap();
    engine.add_comment(id, "bob", "second").unwrap();

    let first = engine.delete_comment(id, CommentId::new(1)).unwrap();
    let second = engine.delete_comment(id, CommentId::new(1)).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.comments.len(), 1);

    let beyond = engine.delete_comment(id, CommentId::new(3)).unwrap_err();
    assert!(matches!(
        beyond,
        EngineError::CommentNotFound {
            previously_allocated: false,
            ..
        }
    ));
}

#[test]
fn comments_stay_editable_while_fixed() {
    let conn = open_db_in_memory().unwrap();
    let engine = service(&conn);
    let id = engine.create("title", "").unwrap().id;
    engine.add_term(id, "mon").unwrap();
    engine.add_comment(id, "alice", "before").unwrap();
    engine.fix(id, TermId::new(1)).unwrap();

    engine.add_comment(id, "bob", "after").unwrap();
    engine
        .update_comment(
            id,
            CommentId::new(1),
            &CommentUpdate {
                name: None,
                body: Some("edited".to_string()),
            },
        )
        .unwrap();
    let view = engine.delete_comment(id, CommentId::new(2)).unwrap();

    assert_eq!(view.fixed, Some(TermId::new(1)));
    assert_eq!(view.comments.len(), 1);
    assert_eq!(view.comments[&CommentId::new(1)].body, "edited");
}
