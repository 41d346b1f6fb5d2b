//! Assembly of the dynamic list and update statements.
//!
//! Filters and assignments are collected as structured clauses, each owning
//! one numbered `?N` placeholder, so the statement text and its parameters
//! can never drift apart.

use super::schema::SONGS_TABLE;
use crate::song::{SongFilter, SongForUpdate};
use rusqlite::types::Value;

pub const SONG_COLUMNS: &str = "song_id, song_name, group_name, release_date, text_of_song, link";

/// A statement together with its positional parameters.
#[derive(Debug, PartialEq)]
pub struct SqlStatement {
    pub sql: String,
    pub params: Vec<Value>,
}

#[derive(Default)]
struct ClauseList {
    clauses: Vec<String>,
    params: Vec<Value>,
}

impl ClauseList {
    fn next_placeholder(&self) -> String {
        format!("?{}", self.params.len() + 1)
    }

    /// Adds a clause; `template` receives the placeholder for `value`.
    fn push(&mut self, template: impl FnOnce(&str) -> String, value: Value) {
        let placeholder = self.next_placeholder();
        self.clauses.push(template(&placeholder));
        self.params.push(value);
    }

    fn push_substring(&mut self, column: &str, needle: &str) {
        if needle.is_empty() {
            return;
        }
        self.push(
            |p| format!("instr(casefold({}), casefold({})) > 0", column, p),
            Value::Text(needle.to_string()),
        );
    }

    fn push_assignment(&mut self, column: &str, value: &Option<String>) {
        if let Some(value) = value {
            self.push(
                |p| format!("{} = {}", column, p),
                Value::Text(value.clone()),
            );
        }
    }
}

/// Builds the filtered, ordered and paginated listing query.
///
/// Every non-empty filter is a case-insensitive substring match, AND-combined.
pub fn build_list_query(filter: &SongFilter, limit: usize, offset: usize) -> SqlStatement {
    let mut predicates = ClauseList::default();
    predicates.push_substring("song_name", &filter.name);
    predicates.push_substring("group_name", &filter.group);
    predicates.push_substring("text_of_song", &filter.text);
    predicates.push_substring("release_date", &filter.date);
    predicates.push_substring("link", &filter.link);

    let mut sql = format!("SELECT {} FROM {}", SONG_COLUMNS, SONGS_TABLE.name);
    if !predicates.clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&predicates.clauses.join(" AND "));
    }

    let limit_placeholder = predicates.params.len() + 1;
    sql.push_str(&format!(
        " ORDER BY song_id LIMIT ?{} OFFSET ?{}",
        limit_placeholder,
        limit_placeholder + 1
    ));

    let mut params = predicates.params;
    params.push(Value::Integer(clamp_to_i64(limit)));
    params.push(Value::Integer(clamp_to_i64(offset)));

    SqlStatement { sql, params }
}

/// Builds the partial update statement, or `None` when no field is set.
pub fn build_update_query(id: i64, update: &SongForUpdate) -> Option<SqlStatement> {
    let mut assignments = ClauseList::default();
    assignments.push_assignment("song_name", &update.song);
    assignments.push_assignment("group_name", &update.group);
    assignments.push_assignment("text_of_song", &update.text);
    assignments.push_assignment("release_date", &update.release_date);
    assignments.push_assignment("link", &update.link);

    if assignments.clauses.is_empty() {
        return None;
    }

    let sql = format!(
        "UPDATE {} SET {} WHERE song_id = {}",
        SONGS_TABLE.name,
        assignments.clauses.join(", "),
        assignments.next_placeholder()
    );
    let mut params = assignments.params;
    params.push(Value::Integer(id));

    Some(SqlStatement { sql, params })
}

fn clamp_to_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
