//! Row mapping: raw SQLite rows in, response-shaped records out.
//!
//! Nullable text columns default to empty strings; JSON-encoded collection
//! columns parse into structured values and silently degrade to their
//! documented default when null or malformed. Write paths serialize back
//! through the same types, so the stored text representation is stable.

use std::collections::BTreeMap;

use postboard_types::api::{BoardResponse, CommentResponse, EventResponse, PostResponse};
use postboard_types::models::{Attendance, ReactionMap};

use crate::models::{BoardRow, CommentRow, EventRow, PostRow};

/// Parse the `reactions` column. Malformed or missing JSON degrades to the
/// default empty sets; parsed kinds overlay the defaults so the standard
/// kinds are always present.
pub fn reactions_from_column(raw: Option<&str>) -> ReactionMap {
    let mut map = ReactionMap::default();
    if let Some(text) = raw {
        if let Ok(parsed) = serde_json::from_str::<BTreeMap<String, Vec<i64>>>(text) {
            for (kind, users) in parsed {
                map.0.insert(kind, users);
            }
        }
    }
    map
}

pub fn reactions_to_column(reactions: &ReactionMap) -> String {
    serde_json::to_string(reactions).unwrap_or_else(|_| String::from("{}"))
}

/// Parse a `going`/`interested` column. Defaults to an empty list.
pub fn user_list_from_column(raw: Option<&str>) -> Vec<i64> {
    raw.and_then(|text| serde_json::from_str(text).ok())
        .unwrap_or_default()
}

pub fn user_list_to_column(users: &[i64]) -> String {
    serde_json::to_string(users).unwrap_or_else(|_| String::from("[]"))
}

pub fn text_or_empty(value: Option<String>) -> String {
    value.unwrap_or_default()
}

/// Author display name for a response; absent or empty names render as
/// "Anonymous".
pub fn author_or_anonymous(value: Option<String>) -> String {
    value
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| String::from("Anonymous"))
}

pub fn board_response(row: BoardRow) -> BoardResponse {
    BoardResponse {
        id: row.id,
        name: row.name,
        description: text_or_empty(row.description),
        created_at: row.created_at,
        post_count: row.post_count,
    }
}

pub fn post_response(row: PostRow, comments: Vec<CommentResponse>) -> PostResponse {
    PostResponse {
        id: row.id,
        created_at: row.created_at,
        post_type: row.post_type,
        content: text_or_empty(row.content),
        user_id: row.user_id,
        author: author_or_anonymous(row.author),
        reactions: reactions_from_column(row.reactions.as_deref()),
        comments,
    }
}

pub fn comment_response(row: CommentRow) -> CommentResponse {
    CommentResponse {
        id: row.id,
        created_at: row.created_at,
        text: text_or_empty(row.content),
        user_id: row.user_id,
        author: author_or_anonymous(row.author),
    }
}

pub fn event_response(row: EventRow, comments: Vec<CommentResponse>) -> EventResponse {
    let attendance = Attendance {
        going: user_list_from_column(row.going.as_deref()),
        interested: user_list_from_column(row.interested.as_deref()),
    };
    EventResponse {
        id: row.post_id,
        title: row.name,
        location: text_or_empty(row.location),
        starts_at: text_or_empty(row.starts_at),
        event_type: text_or_empty(row.event_type),
        attendance: row.attendance,
        going: attendance.going,
        interested: attendance.interested,
        description: text_or_empty(row.description),
        comments,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_reactions_degrade_to_default() {
        let parsed = reactions_from_column(Some("not valid json"));
        assert_eq!(parsed, ReactionMap::default());
    }

    #[test]
    fn missing_reactions_degrade_to_default() {
        assert_eq!(reactions_from_column(None), ReactionMap::default());
    }

    #[test]
    fn parsed_kinds_overlay_the_defaults() {
        let parsed = reactions_from_column(Some(r#"{"like":[4,9],"fire":[2]}"#));
        assert!(parsed.contains("like", 4));
        assert!(parsed.contains("fire", 2));
        // standard kinds remain present even when absent from the column
        assert!(parsed.0.contains_key("heart"));
        assert!(parsed.0.contains_key("smile"));
    }

    #[test]
    fn reactions_round_trip_is_stable() {
        let mut reactions = ReactionMap::default();
        reactions.toggle("like", 1);
        reactions.toggle("fire", 2);

        let text = reactions_to_column(&reactions);
        let reparsed = reactions_from_column(Some(&text));
        assert_eq!(reparsed, reactions);
        assert_eq!(reactions_to_column(&reparsed), text);
    }

    #[test]
    fn malformed_user_list_degrades_to_empty() {
        assert!(user_list_from_column(Some("{broken")).is_empty());
        assert!(user_list_from_column(None).is_empty());
        assert_eq!(user_list_from_column(Some("[3,1]")), vec![3, 1]);
    }

    #[test]
    fn absent_and_empty_authors_render_as_anonymous() {
        assert_eq!(author_or_anonymous(None), "Anonymous");
        assert_eq!(author_or_anonymous(Some(String::new())), "Anonymous");
        assert_eq!(author_or_anonymous(Some("ana".into())), "ana");
    }
}
