//! SQLite connection helpers.
//!
//! Provides [`connect_sqlite`] that opens a connection and applies the PRAGMAs
//! the library relies on: WAL journaling, foreign_keys=ON (needed for the
//! `ON DELETE SET NULL` loan references), and a 5000ms busy_timeout.
//!
//! Example:
//! ```no_run
//! use library_core::db::connection::connect_sqlite;
//!
//! let path = std::env::temp_dir().join("library_example.db");
//! let _conn = connect_sqlite(path.to_str().unwrap()).expect("open sqlite");
//! ```

use anyhow::Context;
use diesel::connection::SimpleConnection;
use diesel::{Connection, SqliteConnection};

use super::sqlite_path;

/// Open a SQLite connection and apply connection-wide PRAGMAs.
///
/// Accepts a bare file path, a `sqlite:`/`sqlite://` URL, or `:memory:`.
pub fn connect_sqlite(database_url: &str) -> anyhow::Result<SqliteConnection> {
    let path = sqlite_path(database_url)?;
    let mut conn = SqliteConnection::establish(path)
        .with_context(|| format!("cannot open sqlite database at {path}"))?;

    conn.batch_execute(
        "PRAGMA journal_mode=WAL;
         PRAGMA foreign_keys=ON;
         PRAGMA busy_timeout=5000;",
    )?;
    Ok(conn)
}
