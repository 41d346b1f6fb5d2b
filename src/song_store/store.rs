//! SQLite-backed song store implementation.

use super::query::{build_list_query, build_update_query};
use super::schema::{SONGS_TABLE, SONG_VERSIONED_SCHEMAS};
use super::trait_def::SongStore;
use super::SongStoreError;
use crate::song::{NewSong, Song, SongFilter, SongForUpdate};
use crate::sqlite_persistence::BASE_DB_VERSION;
use anyhow::{bail, Context, Result};
use rusqlite::functions::FunctionFlags;
use rusqlite::{params, params_from_iter, Connection, OpenFlags, OptionalExtension, Row};
use rusqlite::{Transaction, TransactionBehavior};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Number of virtual machine instructions between deadline checks.
const PROGRESS_CHECK_INTERVAL: i32 = 1000;

/// SQLite-backed song store.
///
/// Writes go through a single connection, reads are spread round-robin over
/// a pool of read-only connections.
#[derive(Clone)]
pub struct SqliteSongStore {
    write_conn: Arc<Mutex<Connection>>,
    read_pool: Vec<Arc<Mutex<Connection>>>,
    read_index: Arc<AtomicUsize>,
}

fn create_or_validate_schema(conn: &Connection) -> Result<()> {
    let latest_version = SONG_VERSIONED_SCHEMAS.len() - 1;
    let latest_schema = &SONG_VERSIONED_SCHEMAS[latest_version];

    let table_count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |r| r.get(0),
    )?;

    if table_count == 0 {
        info!("Creating songs db schema at version {}", latest_version);
        latest_schema.create(conn)?;
        return Ok(());
    }

    let db_version: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    let expected_version = (BASE_DB_VERSION + latest_version) as i64;
    if db_version != expected_version {
        bail!(
            "Unsupported songs db version {} (expected {})",
            db_version,
            expected_version
        );
    }
    latest_schema
        .validate(conn)
        .context("Songs database schema does not match")
}

/// Case-insensitive matching for non-ASCII text, which the built-in `lower()`
/// and `LIKE` do not handle.
fn register_functions(conn: &Connection) -> Result<()> {
    conn.create_scalar_function(
        "casefold",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let value: String = ctx.get(0)?;
            Ok(value.to_lowercase())
        },
    )?;
    Ok(())
}

fn configure_connection(conn: &Connection, op_timeout: Duration) -> Result<()> {
    conn.busy_timeout(op_timeout)?;
    register_functions(conn)
}

fn lock(conn: &Mutex<Connection>) -> MutexGuard<'_, Connection> {
    conn.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Runs `op` with statements on `conn` aborted once `deadline` has passed.
///
/// Fails without touching the connection if the deadline already expired,
/// typically while the caller was waiting for the connection lock.
fn with_deadline<T>(
    conn: &mut Connection,
    deadline: Instant,
    op: impl FnOnce(&mut Connection) -> Result<T, SongStoreError>,
) -> Result<T, SongStoreError> {
    if Instant::now() >= deadline {
        return Err(SongStoreError::Timeout);
    }
    conn.progress_handler(
        PROGRESS_CHECK_INTERVAL,
        Some(move || Instant::now() >= deadline),
    );
    let result = op(conn);
    conn.progress_handler(0, None::<fn() -> bool>);
    result
}

/// Commits `tx` unless `deadline` has passed, in which case it rolls back.
fn commit_before(tx: Transaction, deadline: Instant) -> Result<(), SongStoreError> {
    if Instant::now() >= deadline {
        tx.rollback()?;
        return Err(SongStoreError::Timeout);
    }
    tx.commit()?;
    Ok(())
}

fn song_from_row(row: &Row) -> rusqlite::Result<Song> {
    Ok(Song {
        song_id: row.get(0)?,
        song: row.get(1)?,
        group: row.get(2)?,
        release_date: row.get(3)?,
        text: row.get(4)?,
        link: row.get(5)?,
    })
}

fn song_exists(tx: &Transaction, id: i64) -> Result<bool, SongStoreError> {
    let found = tx
        .query_row(
            &format!("SELECT song_id FROM {} WHERE song_id = ?1", SONGS_TABLE.name),
            params![id],
            |row| row.get::<_, i64>(0),
        )
        .optional()?;
    Ok(found.is_some())
}

impl SqliteSongStore {
    /// Open (or create) the songs database.
    ///
    /// # Arguments
    /// * `db_path` - Path to the SQLite database file
    /// * `read_pool_size` - Number of connections for concurrent reads
    /// * `op_timeout` - How long a statement waits on a locked database file
    pub fn new<P: AsRef<Path>>(
        db_path: P,
        read_pool_size: usize,
        op_timeout: Duration,
    ) -> Result<Self> {
        let db_path = db_path.as_ref();
        if read_pool_size == 0 {
            bail!("read_pool_size must be greater than zero");
        }

        let write_conn = Connection::open_with_flags(
            db_path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("Failed to open songs database at {:?}", db_path))?;

        write_conn.pragma_update(None, "journal_mode", "WAL")?;
        create_or_validate_schema(&write_conn)?;
        configure_connection(&write_conn, op_timeout)?;

        let song_count: i64 = write_conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", SONGS_TABLE.name),
            [],
            |r| r.get(0),
        )?;
        info!("Opened songs database with {} songs", song_count);

        let mut read_pool = Vec::with_capacity(read_pool_size);
        for _ in 0..read_pool_size {
            let read_conn = Connection::open_with_flags(
                db_path,
                OpenFlags::SQLITE_OPEN_READ_ONLY
                    | OpenFlags::SQLITE_OPEN_URI
                    | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )
            .context("Failed to open read connection")?;
            configure_connection(&read_conn, op_timeout)?;
            read_pool.push(Arc::new(Mutex::new(read_conn)));
        }

        Ok(SqliteSongStore {
            write_conn: Arc::new(Mutex::new(write_conn)),
            read_pool,
            read_index: Arc::new(AtomicUsize::new(0)),
        })
    }

    fn get_read_conn(&self) -> Arc<Mutex<Connection>> {
        let index = self.read_index.fetch_add(1, Ordering::SeqCst) % self.read_pool.len();
        self.read_pool[index].clone()
    }

    /// Flush the write-ahead log into the main database file.
    ///
    /// Called once on shutdown, before the connections are dropped.
    pub fn checkpoint(&self) -> Result<()> {
        let conn = lock(&self.write_conn);
        conn.query_row("PRAGMA wal_checkpoint(TRUNCATE)", [], |_| Ok(()))?;
        Ok(())
    }
}

impl SongStore for SqliteSongStore {
    fn add_song(&self, song: &NewSong, deadline: Instant) -> Result<Song, SongStoreError> {
        let mut conn = lock(&self.write_conn);
        let song_id = with_deadline(&mut conn, deadline, |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let existing = tx
                .query_row(
                    &format!(
                        "SELECT song_id FROM {} WHERE song_name = ?1 AND group_name = ?2",
                        SONGS_TABLE.name
                    ),
                    params![song.song, song.group],
                    |row| row.get::<_, i64>(0),
                )
                .optional()?;
            if let Some(existing_id) = existing {
                debug!("Song already stored with id {}", existing_id);
                return Err(SongStoreError::AlreadyExists);
            }

            tx.execute(
                &format!(
                    "INSERT INTO {} (song_name, group_name, release_date, text_of_song, link) \
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    SONGS_TABLE.name
                ),
                params![song.song, song.group, song.release_date, song.text, song.link],
            )?;
            let song_id = tx.last_insert_rowid();
            commit_before(tx, deadline)?;
            Ok(song_id)
        })?;

        info!("Added song {} with id {}", song.song, song_id);
        Ok(song.clone().into_song(song_id))
    }

    fn get_songs(
        &self,
        filter: &SongFilter,
        limit: usize,
        offset: usize,
        deadline: Instant,
    ) -> Result<Vec<Song>, SongStoreError> {
        let statement = build_list_query(filter, limit, offset);
        debug!("List query: {}", statement.sql);

        let conn = self.get_read_conn();
        let mut conn = lock(&conn);
        let songs = with_deadline(&mut conn, deadline, |conn| {
            let mut stmt = conn.prepare(&statement.sql)?;
            let songs = stmt
                .query_map(params_from_iter(statement.params.iter()), song_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(songs)
        })?;

        if songs.is_empty() {
            return Err(SongStoreError::ListEmpty);
        }
        Ok(songs)
    }

    fn delete_song(&self, id: i64, deadline: Instant) -> Result<i64, SongStoreError> {
        let mut conn = lock(&self.write_conn);
        with_deadline(&mut conn, deadline, |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            if !song_exists(&tx, id)? {
                return Err(SongStoreError::NotFound(id));
            }
            tx.execute(
                &format!("DELETE FROM {} WHERE song_id = ?1", SONGS_TABLE.name),
                params![id],
            )?;
            commit_before(tx, deadline)?;
            Ok(())
        })?;

        info!("Deleted song {}", id);
        Ok(id)
    }

    fn get_song_text(&self, id: i64, deadline: Instant) -> Result<String, SongStoreError> {
        let conn = self.get_read_conn();
        let mut conn = lock(&conn);
        with_deadline(&mut conn, deadline, |conn| {
            conn.query_row(
                &format!(
                    "SELECT text_of_song FROM {} WHERE song_id = ?1",
                    SONGS_TABLE.name
                ),
                params![id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or(SongStoreError::NotFound(id))
        })
    }

    fn update_song(
        &self,
        id: i64,
        update: &SongForUpdate,
        deadline: Instant,
    ) -> Result<i64, SongStoreError> {
        let statement = build_update_query(id, update).ok_or(SongStoreError::NothingToUpdate)?;
        debug!("Update query: {}", statement.sql);

        let mut conn = lock(&self.write_conn);
        with_deadline(&mut conn, deadline, |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            if !song_exists(&tx, id)? {
                return Err(SongStoreError::NotFound(id));
            }
            tx.execute(&statement.sql, params_from_iter(statement.params.iter()))?;
            commit_before(tx, deadline)?;
            Ok(())
        })?;

        info!("Updated song {}", id);
        Ok(id)
    }
}
