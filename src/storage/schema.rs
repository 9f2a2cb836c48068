//! Consumption store schema and migrations.
//!
//! Defines the `SQLite` schema for canonical consumption records and their
//! derived rollups. Migrations are embedded SQL files applied in order,
//! each inside its own transaction, with applied versions recorded in a
//! `schema_migrations` table.

use rusqlite::Connection;

use crate::error::Result;

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        sql: include_str!("../../migrations/001_hourly_consumption.sql"),
    },
    Migration {
        version: 2,
        sql: include_str!("../../migrations/002_daily_aggregates.sql"),
    },
    Migration {
        version: 3,
        sql: include_str!("../../migrations/003_monthly_aggregates.sql"),
    },
];

/// Run schema migrations for the consumption database.
///
/// Returns the latest schema version applied.
///
/// # Errors
/// Returns an error if creating the migrations table, reading the schema
/// version, or applying any migration fails.
pub fn run_migrations(conn: &mut Connection) -> Result<i32> {
    ensure_schema_migrations_table(conn)?;

    let mut current_version = get_schema_version(conn)?;

    for migration in MIGRATIONS {
        if migration.version > current_version {
            apply_migration(conn, migration)?;
            current_version = migration.version;
        }
    }

    Ok(current_version)
}

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: i32,
    sql: &'static str,
}

fn ensure_schema_migrations_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (\
            version INTEGER PRIMARY KEY,\
            applied_at TEXT DEFAULT (datetime('now'))\
        );",
    )?;

    Ok(())
}

fn get_schema_version(conn: &Connection) -> Result<i32> {
    let version: Option<i32> =
        conn.query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
            row.get(0)
        })?;

    Ok(version.unwrap_or(0))
}

fn apply_migration(conn: &mut Connection, migration: &Migration) -> Result<()> {
    let tx = conn.transaction()?;

    tx.execute_batch(migration.sql)?;

    tx.execute(
        "INSERT INTO schema_migrations (version) VALUES (?1)",
        [migration.version],
    )?;

    tx.commit()?;

    Ok(())
}
