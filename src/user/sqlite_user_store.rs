use super::user_models::{Note, Rating, TargetColumns};
use super::user_store::{AnnotationStore, UserStore};
use crate::catalog_store::ContentRef;
use crate::sqlite_column;
use crate::sqlite_persistence::{
    open_versioned, Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema,
    DEFAULT_TIMESTAMP,
};
use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Params, Row};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info};

pub const USER_TABLE_NAME: &str = "user";
pub const RATING_TABLE_NAME: &str = "rating";
pub const NOTE_TABLE_NAME: &str = "note";

const USER_FOREIGN_KEY: ForeignKey = ForeignKey {
    foreign_table: USER_TABLE_NAME,
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::Cascade,
};

/// V 0
const USER_TABLE_V_0: Table = Table {
    name: USER_TABLE_NAME,
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("handle", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[("idx_user_handle", "handle")],
    unique_constraints: &[],
};

const RATING_TABLE_V_0: Table = Table {
    name: RATING_TABLE_NAME,
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&USER_FOREIGN_KEY)
        ),
        sqlite_column!("value", &SqlType::Real, non_null = true),
        sqlite_column!(
            "timestamp",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
        // exactly one of the following is set
        sqlite_column!("episode_id", &SqlType::Integer),
        sqlite_column!("movie_id", &SqlType::Integer),
        sqlite_column!("season_id", &SqlType::Integer),
        sqlite_column!("show_id", &SqlType::Integer),
    ],
    indices: &[("idx_rating_user_id", "user_id")],
    unique_constraints: &[
        &["user_id", "episode_id"],
        &["user_id", "movie_id"],
        &["user_id", "season_id"],
        &["user_id", "show_id"],
    ],
};

const NOTE_TABLE_V_0: Table = Table {
    name: NOTE_TABLE_NAME,
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&USER_FOREIGN_KEY)
        ),
        sqlite_column!("content", &SqlType::Text, non_null = true),
        sqlite_column!(
            "timestamp",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
        sqlite_column!("episode_id", &SqlType::Integer),
        sqlite_column!("movie_id", &SqlType::Integer),
        sqlite_column!("season_id", &SqlType::Integer),
        sqlite_column!("show_id", &SqlType::Integer),
    ],
    indices: &[("idx_note_user_id", "user_id")],
    unique_constraints: &[
        &["user_id", "episode_id"],
        &["user_id", "movie_id"],
        &["user_id", "season_id"],
        &["user_id", "show_id"],
    ],
};

pub const VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[USER_TABLE_V_0, RATING_TABLE_V_0, NOTE_TABLE_V_0],
    migration: None,
}];

const RATING_COLUMNS: &str =
    "id, user_id, value, timestamp, episode_id, movie_id, season_id, show_id";
const NOTE_COLUMNS: &str =
    "id, user_id, content, timestamp, episode_id, movie_id, season_id, show_id";

type RawRow<V> = (i64, i64, V, i64, TargetColumns);

#[derive(Clone)]
pub struct SqliteUserStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteUserStore {
    pub fn new<T: AsRef<Path>>(db_path: T) -> Result<Self> {
        let db_path = db_path.as_ref();
        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open user db at {:?}", db_path))?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(mut conn: Connection) -> Result<Self> {
        open_versioned(&mut conn, VERSIONED_SCHEMAS, "user")?;
        conn.execute("PRAGMA foreign_keys = ON;", [])?;
        Ok(SqliteUserStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Writes a consistent copy of the database to `dest`.
    pub fn backup_to<P: AsRef<Path>>(&self, dest: P) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let dest = dest.as_ref().to_string_lossy().to_string();
        conn.execute("VACUUM INTO ?1", params![dest])?;
        info!("User db backed up to {}", dest);
        Ok(())
    }

    fn read_raw_row<V: rusqlite::types::FromSql>(row: &Row) -> rusqlite::Result<RawRow<V>> {
        Ok((
            row.get(0)?,
            row.get(1)?,
            row.get(2)?,
            row.get::<_, Option<i64>>(3)?.unwrap_or_default(),
            TargetColumns {
                episode_id: row.get(4)?,
                movie_id: row.get(5)?,
                season_id: row.get(6)?,
                show_id: row.get(7)?,
            },
        ))
    }

    fn resolve_target(table: &'static str, row_id: i64, columns: TargetColumns) -> Result<ContentRef> {
        columns.into_target(table, row_id).map_err(|e| {
            error!("Inconsistent annotation row: {}", e);
            e.into()
        })
    }

    fn query_ratings<P: Params>(conn: &Connection, filter: &str, params: P) -> Result<Vec<Rating>> {
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {} FROM {} {} ORDER BY id",
            RATING_COLUMNS, RATING_TABLE_NAME, filter
        ))?;
        let rows = stmt
            .query_map(params, Self::read_raw_row::<f64>)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter()
            .map(|(id, user_id, value, timestamp, columns)| {
                Ok(Rating {
                    id,
                    user_id,
                    target: Self::resolve_target(RATING_TABLE_NAME, id, columns)?,
                    value,
                    timestamp,
                })
            })
            .collect()
    }

    fn query_notes<P: Params>(conn: &Connection, filter: &str, params: P) -> Result<Vec<Note>> {
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {} FROM {} {} ORDER BY id",
            NOTE_COLUMNS, NOTE_TABLE_NAME, filter
        ))?;
        let rows = stmt
            .query_map(params, Self::read_raw_row::<String>)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter()
            .map(|(id, user_id, content, timestamp, columns)| {
                Ok(Note {
                    id,
                    user_id,
                    target: Self::resolve_target(NOTE_TABLE_NAME, id, columns)?,
                    content,
                    timestamp,
                })
            })
            .collect()
    }

    fn upsert_sql(table: &str, value_column: &str, target: &ContentRef) -> String {
        let target_column = TargetColumns::column_for(target);
        format!(
            "INSERT INTO {table} (user_id, {target_column}, {value_column}) VALUES (?1, ?2, ?3)
             ON CONFLICT(user_id, {target_column}) DO UPDATE
             SET {value_column} = excluded.{value_column}, timestamp = {DEFAULT_TIMESTAMP}"
        )
    }
}

impl UserStore for SqliteUserStore {
    fn create_user(&self, user_handle: &str) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!("INSERT INTO {} (handle) VALUES (?1)", USER_TABLE_NAME),
            params![user_handle],
        )
        .with_context(|| format!("Failed to create user {}", user_handle))?;
        let user_id = conn.last_insert_rowid();
        info!("Created user {} with id {}", user_handle, user_id);
        Ok(user_id)
    }

    fn get_user_id(&self, user_handle: &str) -> Result<Option<i64>> {
        let conn = self.conn.lock().unwrap();
        Ok(conn
            .query_row(
                &format!("SELECT id FROM {} WHERE handle = ?1", USER_TABLE_NAME),
                params![user_handle],
                |row| row.get(0),
            )
            .optional()?)
    }

    fn get_user_handle(&self, user_id: i64) -> Result<Option<String>> {
        let conn = self.conn.lock().unwrap();
        Ok(conn
            .query_row(
                &format!("SELECT handle FROM {} WHERE id = ?1", USER_TABLE_NAME),
                params![user_id],
                |row| row.get(0),
            )
            .optional()?)
    }

    fn get_all_user_handles(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare_cached(&format!("SELECT handle FROM {} ORDER BY id", USER_TABLE_NAME))?;
        let handles = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(handles)
    }
}

impl AnnotationStore for SqliteUserStore {
    fn get_rating(&self, user_id: i64, target: ContentRef) -> Result<Option<Rating>> {
        let conn = self.conn.lock().unwrap();
        let filter = format!(
            "WHERE user_id = ?1 AND {} = ?2",
            TargetColumns::column_for(&target)
        );
        Ok(Self::query_ratings(&conn, &filter, params![user_id, target.id()])?
            .into_iter()
            .next())
    }

    fn get_note(&self, user_id: i64, target: ContentRef) -> Result<Option<Note>> {
        let conn = self.conn.lock().unwrap();
        let filter = format!(
            "WHERE user_id = ?1 AND {} = ?2",
            TargetColumns::column_for(&target)
        );
        Ok(Self::query_notes(&conn, &filter, params![user_id, target.id()])?
            .into_iter()
            .next())
    }

    fn get_ratings_for(&self, target: ContentRef) -> Result<Vec<Rating>> {
        let conn = self.conn.lock().unwrap();
        let filter = format!("WHERE {} = ?1", TargetColumns::column_for(&target));
        Self::query_ratings(&conn, &filter, params![target.id()])
    }

    fn get_notes_for(&self, target: ContentRef) -> Result<Vec<Note>> {
        let conn = self.conn.lock().unwrap();
        let filter = format!("WHERE {} = ?1", TargetColumns::column_for(&target));
        Self::query_notes(&conn, &filter, params![target.id()])
    }

    fn get_user_notes(&self, user_id: i64) -> Result<Vec<Note>> {
        let conn = self.conn.lock().unwrap();
        Self::query_notes(&conn, "WHERE user_id = ?1", params![user_id])
    }

    fn get_all_notes(&self, user_id: Option<i64>) -> Result<Vec<Note>> {
        let conn = self.conn.lock().unwrap();
        match user_id {
            Some(user_id) => Self::query_notes(&conn, "WHERE user_id = ?1", params![user_id]),
            None => Self::query_notes(&conn, "", []),
        }
    }

    fn get_all_ratings(&self, user_id: Option<i64>) -> Result<Vec<Rating>> {
        let conn = self.conn.lock().unwrap();
        match user_id {
            Some(user_id) => Self::query_ratings(&conn, "WHERE user_id = ?1", params![user_id]),
            None => Self::query_ratings(&conn, "", []),
        }
    }

    fn upsert_annotations(
        &self,
        user_id: i64,
        target: ContentRef,
        note: Option<&str>,
        rating: Option<f64>,
    ) -> Result<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        if let Some(content) = note {
            tx.execute(
                &Self::upsert_sql(NOTE_TABLE_NAME, "content", &target),
                params![user_id, target.id(), content],
            )
            .with_context(|| format!("Failed to store note on {}", target))?;
        }
        if let Some(value) = rating {
            tx.execute(
                &Self::upsert_sql(RATING_TABLE_NAME, "value", &target),
                params![user_id, target.id(), value],
            )
            .with_context(|| format!("Failed to store rating on {}", target))?;
        }
        tx.commit()?;
        debug!(
            "Stored annotations of user {} on {} (note: {}, rating: {:?})",
            user_id,
            target,
            note.is_some(),
            rating
        );
        Ok(())
    }
}
