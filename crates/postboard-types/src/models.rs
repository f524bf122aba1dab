//! Domain value types shared by the DB layer and the API layer.
//!
//! The toggle logic on these types is the only real business logic in the
//! system; the DB layer persists the result inside a single transaction.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Reaction kinds every post starts with. Unknown kinds are allowed and
/// simply create a new entry when first toggled.
pub const DEFAULT_REACTION_KINDS: [&str; 3] = ["like", "heart", "smile"];

/// Mapping from reaction kind to the ids of users who reacted.
///
/// Stored as a JSON text column; `BTreeMap` keeps the serialized form
/// stable so the write path re-produces the same text it read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReactionMap(pub BTreeMap<String, Vec<i64>>);

impl Default for ReactionMap {
    fn default() -> Self {
        Self(
            DEFAULT_REACTION_KINDS
                .iter()
                .map(|kind| ((*kind).to_string(), Vec::new()))
                .collect(),
        )
    }
}

impl ReactionMap {
    /// Flip `user_id`'s membership in the set for `kind`.
    /// Returns true when the user was added, false when removed.
    pub fn toggle(&mut self, kind: &str, user_id: i64) -> bool {
        let users = self.0.entry(kind.to_string()).or_default();
        if let Some(pos) = users.iter().position(|&id| id == user_id) {
            users.remove(pos);
            false
        } else {
            users.push(user_id);
            true
        }
    }

    pub fn contains(&self, kind: &str, user_id: i64) -> bool {
        self.0
            .get(kind)
            .is_some_and(|users| users.contains(&user_id))
    }
}

/// Which attendance list a toggle targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendIntent {
    Going,
    Interested,
}

/// Going/interested membership for one event.
///
/// Invariant: a user is in at most one of the two lists at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendance {
    pub going: Vec<i64>,
    pub interested: Vec<i64>,
}

impl Attendance {
    /// Toggle `user_id` on the list named by `intent`, first removing the
    /// user from the other list so the two stay mutually exclusive.
    /// Returns true when the user ends up on the target list.
    pub fn toggle(&mut self, intent: AttendIntent, user_id: i64) -> bool {
        let (target, other) = match intent {
            AttendIntent::Going => (&mut self.going, &mut self.interested),
            AttendIntent::Interested => (&mut self.interested, &mut self.going),
        };

        if let Some(pos) = other.iter().position(|&id| id == user_id) {
            other.remove(pos);
        }

        if let Some(pos) = target.iter().position(|&id| id == user_id) {
            target.remove(pos);
            false
        } else {
            target.push(user_id);
            true
        }
    }
}
