pub mod migrations;
pub mod queries;

use anyhow::Context;
use rusqlite::Connection;

/// Open (or create) the database at `path` and bring its schema up to date.
/// `":memory:"` gives a throwaway database for tests.
pub fn init_db(path: &str) -> anyhow::Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("failed to open database at {path}"))?;

    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
        .context("failed to set database pragmas")?;

    let applied = migrations::run_migrations(&conn)?;
    tracing::debug!(path, applied, "database ready");

    Ok(conn)
}
