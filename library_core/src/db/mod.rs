//! Database utilities for connections and schema migrations.
//!
//! This module provides:
//! - SQLite connection helpers: [`connection::connect_sqlite`] applies WAL, foreign_keys=ON, and a 5000ms busy_timeout.
//! - Embedded Diesel migrations and runners: [`migrate::run_sqlite`], [`migrate::run_pending`], and [`migrate::run_all`].
//! - [`open`]: connect + migrate on the same connection, which also works for `:memory:`.
//!
//! Example:
//! ```no_run
//! use library_core::db;
//!
//! let db_path = std::env::temp_dir().join("library_example.db");
//! let _conn = db::open(db_path.to_str().unwrap()).expect("open + migrate");
//! ```

use diesel::SqliteConnection;

pub mod connection;
pub mod migrate;

/// Opens `database_url` and brings its schema up to date.
pub fn open(database_url: &str) -> anyhow::Result<SqliteConnection> {
    let mut conn = connection::connect_sqlite(database_url)?;
    migrate::run_pending(&mut conn)?;
    Ok(conn)
}

/// Strips an optional `sqlite://` / `sqlite:` scheme, leaving what diesel's
/// `establish` expects.
pub(crate) fn sqlite_path(database_url: &str) -> anyhow::Result<&str> {
    let path = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))
        .unwrap_or(database_url)
        .trim();
    if path.is_empty() {
        anyhow::bail!("empty database url");
    }
    Ok(path)
}
