mod versioned_schema;

pub use versioned_schema::{
    Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema, BASE_DB_VERSION,
    DEFAULT_TIMESTAMP,
};

use anyhow::{bail, Context, Result};
use rusqlite::Connection;
use tracing::info;

/// Brings `conn` to the latest schema in `schemas`.
///
/// Empty databases get the latest schema created directly. Databases that
/// already carry a `user_version` are validated against the schema they claim
/// to be at and then migrated forward inside a single transaction.
pub fn open_versioned(conn: &mut Connection, schemas: &[VersionedSchema], db_name: &str) -> Result<()> {
    let latest = schemas
        .last()
        .context("At least one versioned schema is required")?;

    let table_count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |r| r.get(0),
    )?;
    if table_count == 0 {
        info!("Creating {} db schema at version {}", db_name, latest.version);
        latest.create(conn)?;
        return Ok(());
    }

    let db_version = conn
        .query_row("PRAGMA user_version;", [], |row| row.get::<usize, i64>(0))
        .with_context(|| format!("Failed to read {} database version", db_name))?
        - BASE_DB_VERSION as i64;
    if db_version < 0 {
        bail!(
            "{} database version {} is too old, does not contain base db version {}",
            db_name,
            db_version,
            BASE_DB_VERSION
        );
    }
    let version = db_version as usize;
    let current = schemas
        .get(version)
        .with_context(|| format!("{} database version {} is too new", db_name, version))?;
    current.validate(conn)?;

    if version == latest.version {
        return Ok(());
    }

    conn.execute("PRAGMA foreign_keys = ON;", [])?;
    let tx = conn.transaction()?;
    let mut migrated_to = version;
    for schema in schemas.iter().skip(version + 1) {
        if let Some(migration_fn) = schema.migration {
            info!(
                "Migrating {} db from version {} to {}",
                db_name, migrated_to, schema.version
            );
            migration_fn(&tx)?;
        }
        migrated_to = schema.version;
    }
    tx.pragma_update(None, "user_version", BASE_DB_VERSION + migrated_to)?;
    tx.commit()?;
    Ok(())
}
