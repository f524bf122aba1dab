//! Data-access operations. Multi-statement writes run inside a single
//! immediate transaction so no partial state is ever observable, and the
//! read-modify-write toggles cannot lose updates.

use chrono::{SecondsFormat, Utc};
use postboard_types::api::{CommentResponse, CreateEventRequest, EventResponse, PostResponse};
use postboard_types::models::{AttendIntent, Attendance, ReactionMap};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};

use crate::models::{BoardRow, CommentRow, EventRow, PostRow, UserRow};
use crate::{Database, DbError, Result, mapper};

/// Server-assigned timestamps. RFC 3339 UTC with nanosecond precision, so
/// lexicographic order equals chronological order.
fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true)
}

impl Database {
    // -- Users --

    pub fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        display_name: &str,
        course: Option<&str>,
        term: Option<&str>,
    ) -> Result<UserRow> {
        self.with_conn(|conn| {
            let created_at = now_rfc3339();
            conn.execute(
                "INSERT INTO users (email, password_hash, display_name, course, term, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![email, password_hash, display_name, course, term, created_at],
            )
            .map_err(|e| conflict_on_unique(e, "email already registered"))?;

            Ok(UserRow {
                id: conn.last_insert_rowid(),
                email: email.to_string(),
                password_hash: password_hash.to_string(),
                display_name: Some(display_name.to_string()),
                course: course.map(ToString::to_string),
                term: term.map(ToString::to_string),
                created_at,
            })
        })
    }

    pub fn user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_email(conn, email))
    }

    pub fn user_by_id(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_id(conn, id))
    }

    pub fn update_profile(
        &self,
        user_id: i64,
        display_name: &str,
        course: Option<&str>,
        term: Option<&str>,
    ) -> Result<()> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE users SET display_name = ?1, course = ?2, term = ?3 WHERE id = ?4",
                params![display_name, course, term, user_id],
            )?;
            if changed == 0 {
                return Err(DbError::NotFound);
            }
            Ok(())
        })
    }

    // -- Boards --

    pub fn create_board(
        &self,
        name: &str,
        description: Option<&str>,
        user_id: i64,
    ) -> Result<BoardRow> {
        self.with_conn(|conn| {
            let created_at = now_rfc3339();
            conn.execute(
                "INSERT INTO boards (name, description, created_at, user_id) VALUES (?1, ?2, ?3, ?4)",
                params![name, description, created_at, user_id],
            )?;

            Ok(BoardRow {
                id: conn.last_insert_rowid(),
                name: name.to_string(),
                description: description.map(ToString::to_string),
                created_at,
                user_id: Some(user_id),
                hidden: false,
                post_count: 0,
            })
        })
    }

    /// Visible boards, newest first, each with its post count.
    pub fn list_boards(&self) -> Result<Vec<BoardRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT b.id, b.name, b.description, b.created_at, b.user_id, b.hidden,
                        (SELECT COUNT(*) FROM board_posts bp WHERE bp.board_id = b.id)
                 FROM boards b
                 WHERE b.hidden = 0
                 ORDER BY b.created_at DESC",
            )?;

            let rows = stmt
                .query_map([], board_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn board_by_id(&self, board_id: i64) -> Result<Option<BoardRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT b.id, b.name, b.description, b.created_at, b.user_id, b.hidden,
                            (SELECT COUNT(*) FROM board_posts bp WHERE bp.board_id = b.id)
                     FROM boards b
                     WHERE b.id = ?1",
                    [board_id],
                    board_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn set_board_hidden(&self, board_id: i64, hidden: bool) -> Result<()> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE boards SET hidden = ?1 WHERE id = ?2",
                params![hidden, board_id],
            )?;
            if changed == 0 {
                return Err(DbError::NotFound);
            }
            Ok(())
        })
    }

    // -- Posts --

    /// Ordinary posts on a board, newest first, with author name, parsed
    /// reactions and comments attached. Comments are fetched per post; the
    /// N+1 pattern is fine at this scale.
    pub fn board_posts(&self, board_id: i64) -> Result<Vec<PostResponse>> {
        self.with_conn(|conn| {
            board_exists(conn, board_id)?;

            let mut stmt = conn.prepare(
                "SELECT p.id, p.created_at, p.post_type, p.content, p.user_id, p.reactions,
                        u.display_name
                 FROM posts p
                 JOIN board_posts bp ON bp.post_id = p.id
                 LEFT JOIN users u ON u.id = p.user_id
                 WHERE bp.board_id = ?1 AND p.post_type != 'event'
                 ORDER BY p.created_at DESC",
            )?;

            let rows = stmt
                .query_map([board_id], post_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            let mut posts = Vec::with_capacity(rows.len());
            for row in rows {
                let comments = comments_for_post(conn, row.id)?;
                posts.push(mapper::post_response(row, comments));
            }
            Ok(posts)
        })
    }

    /// Insert the post, its board link and the author lookup as one
    /// transaction: either the post is fully published or nothing is.
    pub fn create_post(
        &self,
        board_id: i64,
        user_id: i64,
        content: &str,
        post_type: &str,
    ) -> Result<PostResponse> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            board_exists(&tx, board_id)?;

            let created_at = now_rfc3339();
            tx.execute(
                "INSERT INTO posts (created_at, post_type, content, user_id, reactions)
                 VALUES (?1, ?2, ?3, ?4, '{}')",
                params![created_at, post_type, content, user_id],
            )?;
            let post_id = tx.last_insert_rowid();

            tx.execute(
                "INSERT INTO board_posts (board_id, post_id) VALUES (?1, ?2)",
                params![board_id, post_id],
            )?;

            let author = author_name(&tx, user_id)?;
            tx.commit()?;

            Ok(PostResponse {
                id: post_id,
                created_at,
                post_type: post_type.to_string(),
                content: content.to_string(),
                user_id: Some(user_id),
                author: mapper::author_or_anonymous(author),
                reactions: ReactionMap::default(),
                comments: Vec::new(),
            })
        })
    }

    pub fn update_post(&self, post_id: i64, content: &str) -> Result<()> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE posts SET content = ?1 WHERE id = ?2",
                params![content, post_id],
            )?;
            if changed == 0 {
                return Err(DbError::NotFound);
            }
            Ok(())
        })
    }

    /// A single DELETE; the schema cascades clean the board and comment
    /// links, and the GC trigger removes the comment rows themselves.
    pub fn delete_post(&self, post_id: i64) -> Result<()> {
        self.with_conn(|conn| {
            let changed = conn.execute("DELETE FROM posts WHERE id = ?1", [post_id])?;
            if changed == 0 {
                return Err(DbError::NotFound);
            }
            Ok(())
        })
    }

    /// Flip `user_id`'s membership in the reaction set for `kind` and return
    /// the full mapping. Read, modify and write happen in one immediate
    /// transaction so concurrent toggles cannot lose updates. An unknown
    /// kind starts a new empty set; a malformed stored column degrades to
    /// the default mapping rather than failing.
    pub fn toggle_reaction(&self, post_id: i64, kind: &str, user_id: i64) -> Result<ReactionMap> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let raw = tx
                .query_row(
                    "SELECT reactions FROM posts WHERE id = ?1",
                    [post_id],
                    |row| row.get::<_, Option<String>>(0),
                )
                .optional()?
                .ok_or(DbError::NotFound)?;

            let mut reactions = mapper::reactions_from_column(raw.as_deref());
            reactions.toggle(kind, user_id);

            tx.execute(
                "UPDATE posts SET reactions = ?1 WHERE id = ?2",
                params![mapper::reactions_to_column(&reactions), post_id],
            )?;
            tx.commit()?;

            Ok(reactions)
        })
    }

    // -- Comments --

    pub fn add_comment(&self, post_id: i64, user_id: i64, text: &str) -> Result<CommentResponse> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            post_exists(&tx, post_id)?;

            let created_at = now_rfc3339();
            tx.execute(
                "INSERT INTO comments (created_at, content, user_id) VALUES (?1, ?2, ?3)",
                params![created_at, text, user_id],
            )?;
            let comment_id = tx.last_insert_rowid();

            tx.execute(
                "INSERT INTO post_comments (post_id, comment_id) VALUES (?1, ?2)",
                params![post_id, comment_id],
            )?;

            let author = author_name(&tx, user_id)?;
            tx.commit()?;

            Ok(CommentResponse {
                id: comment_id,
                created_at,
                text: text.to_string(),
                user_id: Some(user_id),
                author: mapper::author_or_anonymous(author),
            })
        })
    }

    /// A single DELETE; the comment_id cascade cleans the junction row.
    pub fn delete_comment(&self, comment_id: i64) -> Result<()> {
        self.with_conn(|conn| {
            let changed = conn.execute("DELETE FROM comments WHERE id = ?1", [comment_id])?;
            if changed == 0 {
                return Err(DbError::NotFound);
            }
            Ok(())
        })
    }

    // -- Events --

    /// Events published to a board, soonest-created first, with their
    /// going/interested sets parsed and comments attached.
    pub fn board_events(&self, board_id: i64) -> Result<Vec<EventResponse>> {
        self.with_conn(|conn| {
            board_exists(conn, board_id)?;

            let mut stmt = conn.prepare(
                "SELECT e.post_id, e.name, e.location, e.starts_at, e.event_type, e.attendance,
                        e.going, e.interested, e.description
                 FROM events e
                 JOIN board_posts bp ON bp.post_id = e.post_id
                 WHERE bp.board_id = ?1
                 ORDER BY e.starts_at DESC",
            )?;

            let rows = stmt
                .query_map([board_id], event_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            let mut events = Vec::with_capacity(rows.len());
            for row in rows {
                let comments = comments_for_post(conn, row.post_id)?;
                events.push(mapper::event_response(row, comments));
            }
            Ok(events)
        })
    }

    /// Create the backing post (type `event`, content doubling as the
    /// description), the board link and the event row atomically. The event
    /// is exposed under the backing post's id.
    pub fn create_event(
        &self,
        board_id: i64,
        user_id: i64,
        input: &CreateEventRequest,
    ) -> Result<EventResponse> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            board_exists(&tx, board_id)?;

            let created_at = now_rfc3339();
            let description = input.description.as_deref().unwrap_or_default();
            tx.execute(
                "INSERT INTO posts (created_at, post_type, content, user_id, reactions)
                 VALUES (?1, 'event', ?2, ?3, '{}')",
                params![created_at, description, user_id],
            )?;
            let post_id = tx.last_insert_rowid();

            tx.execute(
                "INSERT INTO board_posts (board_id, post_id) VALUES (?1, ?2)",
                params![board_id, post_id],
            )?;

            tx.execute(
                "INSERT INTO events (name, location, starts_at, event_type, attendance, post_id,
                                     going, interested, description)
                 VALUES (?1, ?2, ?3, ?4, 0, ?5, '[]', '[]', ?6)",
                params![
                    input.title,
                    input.location,
                    input.starts_at,
                    input.event_type,
                    post_id,
                    description,
                ],
            )?;
            tx.commit()?;

            Ok(EventResponse {
                id: post_id,
                title: input.title.clone(),
                location: input.location.clone().unwrap_or_default(),
                starts_at: input.starts_at.clone().unwrap_or_default(),
                event_type: input.event_type.clone().unwrap_or_default(),
                attendance: 0,
                going: Vec::new(),
                interested: Vec::new(),
                description: description.to_string(),
                comments: Vec::new(),
            })
        })
    }

    /// Toggle `user_id` on the going or interested list of the event backed
    /// by post `event_id`. The two lists stay mutually exclusive, and the
    /// read-modify-write runs as one immediate transaction.
    pub fn toggle_attendance(
        &self,
        event_id: i64,
        intent: AttendIntent,
        user_id: i64,
    ) -> Result<Attendance> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let (going, interested) = tx
                .query_row(
                    "SELECT going, interested FROM events WHERE post_id = ?1",
                    [event_id],
                    |row| {
                        Ok((
                            row.get::<_, Option<String>>(0)?,
                            row.get::<_, Option<String>>(1)?,
                        ))
                    },
                )
                .optional()?
                .ok_or(DbError::NotFound)?;

            let mut attendance = Attendance {
                going: mapper::user_list_from_column(going.as_deref()),
                interested: mapper::user_list_from_column(interested.as_deref()),
            };
            attendance.toggle(intent, user_id);

            tx.execute(
                "UPDATE events SET going = ?1, interested = ?2 WHERE post_id = ?3",
                params![
                    mapper::user_list_to_column(&attendance.going),
                    mapper::user_list_to_column(&attendance.interested),
                    event_id,
                ],
            )?;
            tx.commit()?;

            Ok(attendance)
        })
    }
}

// -- Row extractors --

fn board_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<BoardRow> {
    Ok(BoardRow {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        created_at: row.get(3)?,
        user_id: row.get(4)?,
        hidden: row.get(5)?,
        post_count: row.get(6)?,
    })
}

fn post_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PostRow> {
    Ok(PostRow {
        id: row.get(0)?,
        created_at: row.get(1)?,
        post_type: row.get(2)?,
        content: row.get(3)?,
        user_id: row.get(4)?,
        reactions: row.get(5)?,
        author: row.get(6)?,
    })
}

fn event_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<EventRow> {
    Ok(EventRow {
        post_id: row.get(0)?,
        name: row.get(1)?,
        location: row.get(2)?,
        starts_at: row.get(3)?,
        event_type: row.get(4)?,
        attendance: row.get(5)?,
        going: row.get(6)?,
        interested: row.get(7)?,
        description: row.get(8)?,
    })
}

// -- Helpers --

fn query_user_by_email(conn: &Connection, email: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, email, password_hash, display_name, course, term, created_at
         FROM users WHERE email = ?1",
    )?;

    let row = stmt.query_row([email], user_row).optional()?;
    Ok(row)
}

fn query_user_by_id(conn: &Connection, id: i64) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, email, password_hash, display_name, course, term, created_at
         FROM users WHERE id = ?1",
    )?;

    let row = stmt.query_row([id], user_row).optional()?;
    Ok(row)
}

fn user_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        display_name: row.get(3)?,
        course: row.get(4)?,
        term: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn comments_for_post(conn: &Connection, post_id: i64) -> Result<Vec<CommentResponse>> {
    let mut stmt = conn.prepare(
        "SELECT c.id, c.created_at, c.content, c.user_id, u.display_name
         FROM comments c
         JOIN post_comments pc ON pc.comment_id = c.id
         LEFT JOIN users u ON u.id = c.user_id
         WHERE pc.post_id = ?1
         ORDER BY c.created_at ASC",
    )?;

    let rows = stmt
        .query_map([post_id], |row| {
            Ok(CommentRow {
                id: row.get(0)?,
                created_at: row.get(1)?,
                content: row.get(2)?,
                user_id: row.get(3)?,
                author: row.get(4)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows.into_iter().map(mapper::comment_response).collect())
}

fn board_exists(conn: &Connection, board_id: i64) -> Result<()> {
    conn.query_row("SELECT 1 FROM boards WHERE id = ?1", [board_id], |_| Ok(()))
        .optional()?
        .ok_or(DbError::NotFound)
}

fn post_exists(conn: &Connection, post_id: i64) -> Result<()> {
    conn.query_row("SELECT 1 FROM posts WHERE id = ?1", [post_id], |_| Ok(()))
        .optional()?
        .ok_or(DbError::NotFound)
}

fn author_name(conn: &Connection, user_id: i64) -> Result<Option<String>> {
    let name = conn
        .query_row(
            "SELECT display_name FROM users WHERE id = ?1",
            [user_id],
            |row| row.get::<_, Option<String>>(0),
        )
        .optional()?;
    Ok(name.flatten())
}

/// UNIQUE violations become a conflict the API can report distinctly.
fn conflict_on_unique(err: rusqlite::Error, message: &str) -> DbError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation => {
            DbError::Conflict(message.to_string())
        }
        _ => DbError::Sqlite(err),
    }
}
