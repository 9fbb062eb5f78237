//! SQLite schema for the content hierarchy database.

use crate::sqlite_column;
use crate::sqlite_persistence::{
    Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema,
};

pub const SHOW_TABLE_NAME: &str = "show";
pub const SEASON_TABLE_NAME: &str = "season";
pub const EPISODE_TABLE_NAME: &str = "episode";
pub const MOVIE_TABLE_NAME: &str = "movie";

const SHOW_FOREIGN_KEY: ForeignKey = ForeignKey {
    foreign_table: SHOW_TABLE_NAME,
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::Cascade,
};

const SEASON_FOREIGN_KEY: ForeignKey = ForeignKey {
    foreign_table: SEASON_TABLE_NAME,
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::Cascade,
};

const SHOW_TABLE_V_0: Table = Table {
    name: SHOW_TABLE_NAME,
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("description", &SqlType::Text),
        sqlite_column!("display_order", &SqlType::Integer), // null sorts last
        sqlite_column!("artwork_url", &SqlType::Text),
        sqlite_column!("imdb_rating", &SqlType::Real),
    ],
    indices: &[],
    unique_constraints: &[],
};

const SEASON_TABLE_V_0: Table = Table {
    name: SEASON_TABLE_NAME,
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "show_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&SHOW_FOREIGN_KEY)
        ),
        sqlite_column!("number", &SqlType::Integer, non_null = true),
        sqlite_column!("artwork_url", &SqlType::Text),
        sqlite_column!("imdb_rating", &SqlType::Real),
    ],
    indices: &[("idx_season_show_id", "show_id")],
    unique_constraints: &[&["show_id", "number"]],
};

const EPISODE_TABLE_V_0: Table = Table {
    name: EPISODE_TABLE_NAME,
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "season_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&SEASON_FOREIGN_KEY)
        ),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("episode_number", &SqlType::Integer),
        sqlite_column!("air_date", &SqlType::Text), // 'YYYY-MM-DD'
        sqlite_column!("artwork_url", &SqlType::Text),
        sqlite_column!("imdb_rating", &SqlType::Real),
        sqlite_column!(
            "watched",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
    ],
    indices: &[("idx_episode_season_id", "season_id")],
    unique_constraints: &[],
};

const MOVIE_TABLE_V_0: Table = Table {
    name: MOVIE_TABLE_NAME,
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("release_date", &SqlType::Text), // 'YYYY-MM-DD'
        sqlite_column!("description", &SqlType::Text),
        sqlite_column!("display_order", &SqlType::Integer),
        sqlite_column!("artwork_url", &SqlType::Text),
        sqlite_column!("imdb_rating", &SqlType::Real),
        sqlite_column!(
            "watched",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
    ],
    indices: &[],
    unique_constraints: &[],
};

pub const CATALOG_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[
        SHOW_TABLE_V_0,
        SEASON_TABLE_V_0,
        EPISODE_TABLE_V_0,
        MOVIE_TABLE_V_0,
    ],
    migration: None,
}];
