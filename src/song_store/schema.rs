//! Schema definition for the songs database.

use crate::sqlite_column;
use crate::sqlite_persistence::{SqlType, Table, VersionedSchema};

pub const SONGS_TABLE: Table = Table {
    name: "songs",
    columns: &[
        sqlite_column!("song_id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("song_name", &SqlType::Text, non_null = true),
        sqlite_column!("group_name", &SqlType::Text, non_null = true),
        sqlite_column!("release_date", &SqlType::Text, non_null = true),
        sqlite_column!("text_of_song", &SqlType::Text, non_null = true),
        sqlite_column!("link", &SqlType::Text, non_null = true),
    ],
    indices: &[("idx_songs_name_group", "song_name, group_name")],
};

pub const SONG_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[SONGS_TABLE],
}];
