//! Schema setup. Idempotent and additive-only: the base DDL uses
//! `CREATE ... IF NOT EXISTS`, and columns added after the initial schema
//! go through [`add_column`], which checks `PRAGMA table_info` first so
//! re-running never touches existing rows.

use rusqlite::Connection;
use tracing::info;

use crate::Result;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            email         TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            display_name  TEXT,
            created_at    TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS boards (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL,
            description TEXT,
            created_at  TEXT NOT NULL,
            user_id     INTEGER REFERENCES users(id)
        );

        CREATE TABLE IF NOT EXISTS posts (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            created_at  TEXT NOT NULL,
            post_type   TEXT NOT NULL DEFAULT 'post',
            content     TEXT,
            user_id     INTEGER REFERENCES users(id)
        );

        CREATE INDEX IF NOT EXISTS idx_posts_created
            ON posts(created_at);

        CREATE TABLE IF NOT EXISTS board_posts (
            board_id  INTEGER NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
            post_id   INTEGER NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
            PRIMARY KEY (board_id, post_id)
        );

        CREATE INDEX IF NOT EXISTS idx_board_posts_post
            ON board_posts(post_id);

        CREATE TABLE IF NOT EXISTS events (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL,
            location    TEXT,
            starts_at   TEXT,
            event_type  TEXT,
            attendance  INTEGER NOT NULL DEFAULT 0,
            post_id     INTEGER NOT NULL UNIQUE REFERENCES posts(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS comments (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            created_at  TEXT NOT NULL,
            content     TEXT,
            user_id     INTEGER REFERENCES users(id)
        );

        CREATE TABLE IF NOT EXISTS post_comments (
            post_id     INTEGER NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
            comment_id  INTEGER NOT NULL REFERENCES comments(id) ON DELETE CASCADE,
            PRIMARY KEY (post_id, comment_id)
        );

        CREATE INDEX IF NOT EXISTS idx_post_comments_comment
            ON post_comments(comment_id);

        -- Comment rows are only reachable through post_comments, so when a
        -- post cascade removes the link the comment itself goes too.
        CREATE TRIGGER IF NOT EXISTS post_comments_gc
        AFTER DELETE ON post_comments
        BEGIN
            DELETE FROM comments WHERE id = OLD.comment_id;
        END;
        ",
    )?;

    // Columns added after the initial release.
    add_column(conn, "users", "course", "TEXT")?;
    add_column(conn, "users", "term", "TEXT")?;
    add_column(conn, "boards", "hidden", "INTEGER NOT NULL DEFAULT 0")?;
    add_column(conn, "posts", "reactions", "TEXT NOT NULL DEFAULT '{}'")?;
    add_column(conn, "events", "going", "TEXT NOT NULL DEFAULT '[]'")?;
    add_column(conn, "events", "interested", "TEXT NOT NULL DEFAULT '[]'")?;
    add_column(conn, "events", "description", "TEXT")?;

    info!("Database migrations complete");
    Ok(())
}

fn add_column(conn: &Connection, table: &str, column: &str, decl: &str) -> Result<()> {
    if !column_exists(conn, table, column)? {
        conn.execute_batch(&format!("ALTER TABLE {table} ADD COLUMN {column} {decl}"))?;
    }
    Ok(())
}

fn column_exists(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        super::run(&conn).unwrap();
        super::run(&conn).unwrap();
    }

    #[test]
    fn migrations_preserve_existing_rows() {
        let conn = Connection::open_in_memory().unwrap();
        super::run(&conn).unwrap();
        conn.execute(
            "INSERT INTO users (email, password_hash, created_at) VALUES ('a@b.c', 'x', '2026-01-01T00:00:00Z')",
            [],
        )
        .unwrap();

        super::run(&conn).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }
}
