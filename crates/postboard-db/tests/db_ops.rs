//! Integration tests for the data-access operations, run against an
//! in-memory database.

use std::sync::Arc;
use std::thread;

use postboard_db::{Database, DbError};
use postboard_types::api::CreateEventRequest;
use postboard_types::models::{AttendIntent, ReactionMap};

fn db() -> Database {
    Database::open_in_memory().unwrap()
}

fn seed_user(db: &Database, email: &str, name: &str) -> i64 {
    db.create_user(email, "argon2-hash", name, Some("CSE111"), Some("Fall 2026"))
        .unwrap()
        .id
}

fn seed_board(db: &Database, user_id: i64) -> i64 {
    db.create_board("general", Some("general discussion"), user_id)
        .unwrap()
        .id
}

fn count(db: &Database, sql: &str) -> i64 {
    db.with_conn(|conn| Ok(conn.query_row(sql, [], |row| row.get(0))?))
        .unwrap()
}

#[test]
fn duplicate_email_is_a_conflict_and_inserts_nothing() {
    let db = db();
    seed_user(&db, "ana@example.edu", "ana");

    let err = db
        .create_user("ana@example.edu", "other-hash", "impostor", None, None)
        .unwrap_err();
    assert!(matches!(err, DbError::Conflict(_)));
    assert_eq!(count(&db, "SELECT COUNT(*) FROM users"), 1);
}

#[test]
fn created_post_appears_exactly_once_with_increasing_timestamps() {
    let db = db();
    let user = seed_user(&db, "ana@example.edu", "ana");
    let board = seed_board(&db, user);

    let first = db.create_post(board, user, "first", "post").unwrap();
    let second = db.create_post(board, user, "second", "post").unwrap();
    assert!(second.created_at > first.created_at);

    let posts = db.board_posts(board).unwrap();
    assert_eq!(posts.len(), 2);
    // newest first
    assert_eq!(posts[0].id, second.id);
    assert_eq!(posts[1].id, first.id);
    assert_eq!(posts.iter().filter(|p| p.id == second.id).count(), 1);
    assert_eq!(posts[0].author, "ana");
}

#[test]
fn create_post_on_missing_board_is_not_found() {
    let db = db();
    let user = seed_user(&db, "ana@example.edu", "ana");

    let err = db.create_post(999, user, "hello", "post").unwrap_err();
    assert!(matches!(err, DbError::NotFound));
    // nothing was half-written
    assert_eq!(count(&db, "SELECT COUNT(*) FROM posts"), 0);
    assert_eq!(count(&db, "SELECT COUNT(*) FROM board_posts"), 0);
}

#[test]
fn toggling_a_reaction_twice_restores_the_original_state() {
    let db = db();
    let user = seed_user(&db, "ana@example.edu", "ana");
    let board = seed_board(&db, user);
    let post = db.create_post(board, user, "hello", "post").unwrap();

    let after_first = db.toggle_reaction(post.id, "like", user).unwrap();
    assert!(after_first.contains("like", user));

    let after_second = db.toggle_reaction(post.id, "like", user).unwrap();
    assert_eq!(after_second, ReactionMap::default());

    let posts = db.board_posts(board).unwrap();
    assert_eq!(posts[0].reactions, ReactionMap::default());
}

#[test]
fn unknown_reaction_kind_starts_a_new_set() {
    let db = db();
    let user = seed_user(&db, "ana@example.edu", "ana");
    let board = seed_board(&db, user);
    let post = db.create_post(board, user, "hello", "post").unwrap();

    let reactions = db.toggle_reaction(post.id, "fire", user).unwrap();
    assert!(reactions.contains("fire", user));
}

#[test]
fn toggling_a_reaction_on_a_missing_post_is_not_found() {
    let db = db();
    let user = seed_user(&db, "ana@example.edu", "ana");

    let err = db.toggle_reaction(404, "like", user).unwrap_err();
    assert!(matches!(err, DbError::NotFound));
}

#[test]
fn malformed_reactions_column_degrades_to_the_default_structure() {
    let db = db();
    let user = seed_user(&db, "ana@example.edu", "ana");
    let board = seed_board(&db, user);
    let post = db.create_post(board, user, "hello", "post").unwrap();

    db.with_conn(|conn| {
        conn.execute(
            "UPDATE posts SET reactions = 'definitely not json' WHERE id = ?1",
            [post.id],
        )?;
        Ok(())
    })
    .unwrap();

    let posts = db.board_posts(board).unwrap();
    assert_eq!(posts[0].reactions, ReactionMap::default());
}

#[test]
fn concurrent_toggles_by_different_users_both_land() {
    let db = Arc::new(db());
    let alice = seed_user(&db, "alice@example.edu", "alice");
    let bob = seed_user(&db, "bob@example.edu", "bob");
    let board = seed_board(&db, alice);
    let post = db.create_post(board, alice, "race me", "post").unwrap();

    let handles: Vec<_> = [alice, bob]
        .into_iter()
        .map(|user| {
            let db = Arc::clone(&db);
            thread::spawn(move || db.toggle_reaction(post.id, "like", user).unwrap())
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let posts = db.board_posts(board).unwrap();
    assert!(posts[0].reactions.contains("like", alice));
    assert!(posts[0].reactions.contains("like", bob));
}

#[test]
fn deleting_a_post_removes_it_everywhere() {
    let db = db();
    let user = seed_user(&db, "ana@example.edu", "ana");
    let board = seed_board(&db, user);
    let post = db.create_post(board, user, "doomed", "post").unwrap();
    db.add_comment(post.id, user, "nice post").unwrap();

    db.delete_post(post.id).unwrap();

    assert!(db.board_posts(board).unwrap().is_empty());
    assert_eq!(count(&db, "SELECT COUNT(*) FROM board_posts"), 0);
    assert_eq!(count(&db, "SELECT COUNT(*) FROM post_comments"), 0);
    assert_eq!(count(&db, "SELECT COUNT(*) FROM comments"), 0);

    let err = db.delete_post(post.id).unwrap_err();
    assert!(matches!(err, DbError::NotFound));
}

#[test]
fn comments_attach_in_chronological_order() {
    let db = db();
    let user = seed_user(&db, "ana@example.edu", "ana");
    let board = seed_board(&db, user);
    let post = db.create_post(board, user, "hello", "post").unwrap();

    let first = db.add_comment(post.id, user, "first!").unwrap();
    let second = db.add_comment(post.id, user, "second").unwrap();

    let posts = db.board_posts(board).unwrap();
    let comments = &posts[0].comments;
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0].id, first.id);
    assert_eq!(comments[1].id, second.id);
    assert_eq!(comments[0].author, "ana");
}

#[test]
fn deleting_a_comment_detaches_it_from_its_post() {
    let db = db();
    let user = seed_user(&db, "ana@example.edu", "ana");
    let board = seed_board(&db, user);
    let post = db.create_post(board, user, "hello", "post").unwrap();

    let doomed = db.add_comment(post.id, user, "delete me").unwrap();
    let kept = db.add_comment(post.id, user, "keep me").unwrap();

    db.delete_comment(doomed.id).unwrap();

    let posts = db.board_posts(board).unwrap();
    assert_eq!(posts[0].comments.len(), 1);
    assert_eq!(posts[0].comments[0].id, kept.id);
    assert_eq!(count(&db, "SELECT COUNT(*) FROM comments"), 1);
    assert_eq!(count(&db, "SELECT COUNT(*) FROM post_comments"), 1);

    let err = db.delete_comment(doomed.id).unwrap_err();
    assert!(matches!(err, DbError::NotFound));
}

#[test]
fn missing_or_empty_display_names_render_as_anonymous() {
    let db = db();
    let user = seed_user(&db, "ana@example.edu", "ana");
    let board = seed_board(&db, user);
    db.create_post(board, user, "who am i", "post").unwrap();

    db.with_conn(|conn| {
        conn.execute("UPDATE users SET display_name = '' WHERE id = ?1", [user])?;
        Ok(())
    })
    .unwrap();

    let posts = db.board_posts(board).unwrap();
    assert_eq!(posts[0].author, "Anonymous");
}

#[test]
fn events_are_excluded_from_the_posts_listing() {
    let db = db();
    let user = seed_user(&db, "ana@example.edu", "ana");
    let board = seed_board(&db, user);

    let input = CreateEventRequest {
        title: "study session".into(),
        description: Some("midterm prep".into()),
        event_type: Some("study".into()),
        starts_at: Some("2026-09-10T18:00:00Z".into()),
        location: Some("library".into()),
    };
    let event = db.create_event(board, user, &input).unwrap();

    assert!(db.board_posts(board).unwrap().is_empty());

    let events = db.board_events(board).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].id, event.id);
    assert_eq!(events[0].title, "study session");
    assert_eq!(events[0].description, "midterm prep");
}

#[test]
fn attendance_lists_stay_mutually_exclusive() {
    let db = db();
    let user = seed_user(&db, "ana@example.edu", "ana");
    let board = seed_board(&db, user);
    let input = CreateEventRequest {
        title: "game night".into(),
        description: None,
        event_type: None,
        starts_at: None,
        location: None,
    };
    let event = db.create_event(board, user, &input).unwrap();

    let after_going = db
        .toggle_attendance(event.id, AttendIntent::Going, user)
        .unwrap();
    assert_eq!(after_going.going, vec![user]);
    assert!(after_going.interested.is_empty());

    let after_interested = db
        .toggle_attendance(event.id, AttendIntent::Interested, user)
        .unwrap();
    assert!(after_interested.going.is_empty());
    assert_eq!(after_interested.interested, vec![user]);

    // double toggle clears membership entirely
    let cleared = db
        .toggle_attendance(event.id, AttendIntent::Interested, user)
        .unwrap();
    assert!(cleared.going.is_empty());
    assert!(cleared.interested.is_empty());

    let events = db.board_events(board).unwrap();
    assert!(events[0].going.is_empty());
    assert!(events[0].interested.is_empty());
}

#[test]
fn hidden_boards_drop_out_of_the_listing() {
    let db = db();
    let user = seed_user(&db, "ana@example.edu", "ana");
    let board = seed_board(&db, user);

    assert_eq!(db.list_boards().unwrap().len(), 1);
    db.set_board_hidden(board, true).unwrap();
    assert!(db.list_boards().unwrap().is_empty());
    // still reachable directly
    assert!(db.board_by_id(board).unwrap().is_some());
}

#[test]
fn profile_updates_show_up_on_later_posts() {
    let db = db();
    let user = seed_user(&db, "ana@example.edu", "ana");
    let board = seed_board(&db, user);
    db.create_post(board, user, "hi", "post").unwrap();

    db.update_profile(user, "ana banana", Some("CSE120"), Some("Spring 2027"))
        .unwrap();

    let posts = db.board_posts(board).unwrap();
    assert_eq!(posts[0].author, "ana banana");

    let err = db.update_profile(9999, "ghost", None, None).unwrap_err();
    assert!(matches!(err, DbError::NotFound));
}
