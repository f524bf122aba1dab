/// Database row types — these map directly to SQLite rows.
/// Distinct from the postboard-types API models to keep the DB layer
/// independent; the mapper module converts between the two.

#[derive(Debug)]
pub struct UserRow {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub display_name: Option<String>,
    pub course: Option<String>,
    pub term: Option<String>,
    pub created_at: String,
}

#[derive(Debug)]
pub struct BoardRow {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: String,
    pub user_id: Option<i64>,
    pub hidden: bool,
    pub post_count: i64,
}

#[derive(Debug)]
pub struct PostRow {
    pub id: i64,
    pub created_at: String,
    pub post_type: String,
    pub content: Option<String>,
    pub user_id: Option<i64>,
    pub author: Option<String>,
    pub reactions: Option<String>,
}

#[derive(Debug)]
pub struct CommentRow {
    pub id: i64,
    pub created_at: String,
    pub content: Option<String>,
    pub user_id: Option<i64>,
    pub author: Option<String>,
}

#[derive(Debug)]
pub struct EventRow {
    pub post_id: i64,
    pub name: String,
    pub location: Option<String>,
    pub starts_at: Option<String>,
    pub event_type: Option<String>,
    pub attendance: i64,
    pub going: Option<String>,
    pub interested: Option<String>,
    pub description: Option<String>,
}
