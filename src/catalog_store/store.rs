//! SQLite-backed content hierarchy store.

use super::models::*;
use super::schema::*;
use super::trait_def::{CatalogStore, WritableCatalogStore};
use crate::sqlite_persistence::open_versioned;
use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

const SHOW_COLUMNS: &str = "id, title, description, display_order, artwork_url, imdb_rating";
const SEASON_COLUMNS: &str = "id, show_id, number, artwork_url, imdb_rating";
const EPISODE_COLUMNS: &str =
    "id, season_id, title, episode_number, air_date, artwork_url, imdb_rating, watched";
const MOVIE_COLUMNS: &str =
    "id, title, release_date, description, display_order, artwork_url, imdb_rating, watched";

#[derive(Clone)]
pub struct SqliteCatalogStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCatalogStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref();
        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open catalog db at {:?}", db_path))?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(mut conn: Connection) -> Result<Self> {
        open_versioned(&mut conn, CATALOG_VERSIONED_SCHEMAS, "catalog")?;
        conn.execute("PRAGMA foreign_keys = ON;", [])?;
        Ok(SqliteCatalogStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Writes a consistent copy of the database to `dest`.
    pub fn backup_to<P: AsRef<Path>>(&self, dest: P) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let dest = dest.as_ref().to_string_lossy().to_string();
        conn.execute("VACUUM INTO ?1", params![dest])?;
        info!("Catalog db backed up to {}", dest);
        Ok(())
    }

    fn parse_show_row(row: &Row) -> rusqlite::Result<Show> {
        Ok(Show {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            order: row.get(3)?,
            artwork_url: row.get(4)?,
            imdb_rating: row.get(5)?,
        })
    }

    fn parse_season_row(row: &Row) -> rusqlite::Result<Season> {
        Ok(Season {
            id: row.get(0)?,
            show_id: row.get(1)?,
            number: row.get(2)?,
            artwork_url: row.get(3)?,
            imdb_rating: row.get(4)?,
        })
    }

    fn parse_episode_row(row: &Row) -> rusqlite::Result<Episode> {
        Ok(Episode {
            id: row.get(0)?,
            season_id: row.get(1)?,
            title: row.get(2)?,
            episode_number: row.get(3)?,
            air_date: row.get(4)?,
            artwork_url: row.get(5)?,
            imdb_rating: row.get(6)?,
            watched: row.get::<_, i32>(7)? != 0,
        })
    }

    fn parse_movie_row(row: &Row) -> rusqlite::Result<Movie> {
        Ok(Movie {
            id: row.get(0)?,
            title: row.get(1)?,
            release_date: row.get(2)?,
            description: row.get(3)?,
            order: row.get(4)?,
            artwork_url: row.get(5)?,
            imdb_rating: row.get(6)?,
            watched: row.get::<_, i32>(7)? != 0,
        })
    }

    fn count(&self, table: &str) -> usize {
        let conn = self.conn.lock().unwrap();
        conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| {
            r.get::<_, i64>(0)
        })
        .unwrap_or(0) as usize
    }
}

impl CatalogStore for SqliteCatalogStore {
    fn get_show(&self, id: i64) -> Result<Option<Show>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {} FROM {} WHERE id = ?1",
            SHOW_COLUMNS, SHOW_TABLE_NAME
        ))?;
        Ok(stmt.query_row(params![id], Self::parse_show_row).optional()?)
    }

    fn get_season(&self, id: i64) -> Result<Option<Season>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {} FROM {} WHERE id = ?1",
            SEASON_COLUMNS, SEASON_TABLE_NAME
        ))?;
        Ok(stmt
            .query_row(params![id], Self::parse_season_row)
            .optional()?)
    }

    fn get_episode(&self, id: i64) -> Result<Option<Episode>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {} FROM {} WHERE id = ?1",
            EPISODE_COLUMNS, EPISODE_TABLE_NAME
        ))?;
        Ok(stmt
            .query_row(params![id], Self::parse_episode_row)
            .optional()?)
    }

    fn get_movie(&self, id: i64) -> Result<Option<Movie>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {} FROM {} WHERE id = ?1",
            MOVIE_COLUMNS, MOVIE_TABLE_NAME
        ))?;
        Ok(stmt.query_row(params![id], Self::parse_movie_row).optional()?)
    }

    fn list_shows(&self) -> Result<Vec<Show>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {} FROM {} ORDER BY id",
            SHOW_COLUMNS, SHOW_TABLE_NAME
        ))?;
        let shows = stmt
            .query_map([], Self::parse_show_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(shows)
    }

    fn list_movies(&self) -> Result<Vec<Movie>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {} FROM {} ORDER BY id",
            MOVIE_COLUMNS, MOVIE_TABLE_NAME
        ))?;
        let movies = stmt
            .query_map([], Self::parse_movie_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(movies)
    }

    fn get_show_seasons(&self, show_id: i64) -> Result<Vec<Season>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {} FROM {} WHERE show_id = ?1 ORDER BY number, id",
            SEASON_COLUMNS, SEASON_TABLE_NAME
        ))?;
        let seasons = stmt
            .query_map(params![show_id], Self::parse_season_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(seasons)
    }

    fn get_season_episodes(&self, season_id: i64) -> Result<Vec<Episode>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {} FROM {} WHERE season_id = ?1
             ORDER BY episode_number IS NULL, episode_number, id",
            EPISODE_COLUMNS, EPISODE_TABLE_NAME
        ))?;
        let episodes = stmt
            .query_map(params![season_id], Self::parse_episode_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(episodes)
    }

    fn set_episode_watched(&self, id: i64, watched: bool) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute(
            &format!("UPDATE {} SET watched = ?1 WHERE id = ?2", EPISODE_TABLE_NAME),
            params![watched as i32, id],
        )?;
        Ok(changed > 0)
    }

    fn set_movie_watched(&self, id: i64, watched: bool) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute(
            &format!("UPDATE {} SET watched = ?1 WHERE id = ?2", MOVIE_TABLE_NAME),
            params![watched as i32, id],
        )?;
        Ok(changed > 0)
    }

    fn set_season_episodes_watched(&self, season_id: i64, watched: bool) -> Result<usize> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        let changed = tx.execute(
            &format!(
                "UPDATE {} SET watched = ?1 WHERE season_id = ?2",
                EPISODE_TABLE_NAME
            ),
            params![watched as i32, season_id],
        )?;
        tx.commit()?;
        debug!(
            "Set watched={} on {} episodes of season {}",
            watched, changed, season_id
        );
        Ok(changed)
    }

    fn set_show_episodes_watched(&self, show_id: i64, watched: bool) -> Result<usize> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        let season_ids = {
            let mut stmt = tx.prepare(&format!(
                "SELECT id FROM {} WHERE show_id = ?1 ORDER BY number",
                SEASON_TABLE_NAME
            ))?;
            let ids = stmt
                .query_map(params![show_id], |r| r.get::<_, i64>(0))?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            ids
        };
        let mut changed = 0;
        for season_id in season_ids {
            changed += tx.execute(
                &format!(
                    "UPDATE {} SET watched = ?1 WHERE season_id = ?2",
                    EPISODE_TABLE_NAME
                ),
                params![watched as i32, season_id],
            )?;
        }
        tx.commit()?;
        debug!(
            "Set watched={} on {} episodes of show {}",
            watched, changed, show_id
        );
        Ok(changed)
    }

    fn get_shows_count(&self) -> usize {
        self.count(SHOW_TABLE_NAME)
    }

    fn get_seasons_count(&self) -> usize {
        self.count(SEASON_TABLE_NAME)
    }

    fn get_episodes_count(&self) -> usize {
        self.count(EPISODE_TABLE_NAME)
    }

    fn get_movies_count(&self) -> usize {
        self.count(MOVIE_TABLE_NAME)
    }
}

impl WritableCatalogStore for SqliteCatalogStore {
    fn insert_show(&self, show: &NewShow) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!(
                "INSERT INTO {} (title, description, display_order, artwork_url, imdb_rating)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                SHOW_TABLE_NAME
            ),
            params![
                show.title,
                show.description,
                show.order,
                show.artwork_url,
                show.imdb_rating
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn insert_season(&self, season: &NewSeason) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!(
                "INSERT INTO {} (show_id, number, artwork_url, imdb_rating)
                 VALUES (?1, ?2, ?3, ?4)",
                SEASON_TABLE_NAME
            ),
            params![
                season.show_id,
                season.number,
                season.artwork_url,
                season.imdb_rating
            ],
        )
        .with_context(|| {
            format!(
                "Failed to insert season {} of show {}",
                season.number, season.show_id
            )
        })?;
        Ok(conn.last_insert_rowid())
    }

    fn insert_episode(&self, episode: &NewEpisode) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!(
                "INSERT INTO {} (season_id, title, episode_number, air_date, artwork_url, imdb_rating)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                EPISODE_TABLE_NAME
            ),
            params![
                episode.season_id,
                episode.title,
                episode.episode_number,
                episode.air_date,
                episode.artwork_url,
                episode.imdb_rating
            ],
        )
        .with_context(|| format!("Failed to insert episode into season {}", episode.season_id))?;
        Ok(conn.last_insert_rowid())
    }

    fn insert_movie(&self, movie: &NewMovie) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!(
                "INSERT INTO {} (title, release_date, description, display_order, artwork_url, imdb_rating)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                MOVIE_TABLE_NAME
            ),
            params![
                movie.title,
                movie.release_date,
                movie.description,
                movie.order,
                movie.artwork_url,
                movie.imdb_rating
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }
}
