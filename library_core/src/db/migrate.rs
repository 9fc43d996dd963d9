//! Embedded schema migrations.

use anyhow::anyhow;
use diesel::SqliteConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

use super::connection::connect_sqlite;

/// Embedded Diesel migrations bundled with this crate.
///
/// These create the `books`, `members`, and `transactions` tables.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Applies every pending migration on an open connection.
///
/// Returns how many migrations ran (0 when the schema is current).
pub fn run_pending(conn: &mut SqliteConnection) -> anyhow::Result<usize> {
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow!(e))?;
    for version in &applied {
        info!(%version, "applied migration");
    }
    Ok(applied.len())
}

/// Runs pending Diesel migrations on a SQLite database at the given URL.
///
/// The connection is opened with [`connect_sqlite`], so the file ends up in WAL mode.
pub fn run_sqlite(url: &str) -> anyhow::Result<()> {
    let mut conn = connect_sqlite(url)?;
    run_pending(&mut conn)?;
    Ok(())
}

/// Runs pending migrations for the given database URL.
///
/// Accepts bare paths and `sqlite:` URLs; server databases are rejected since
/// the schema relies on SQLite semantics (`AUTOINCREMENT`, `date('now')`).
pub fn run_all(database_url: &str) -> anyhow::Result<()> {
    if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        anyhow::bail!("Unsupported DATABASE_URL: {database_url}");
    }
    run_sqlite(database_url)
}
