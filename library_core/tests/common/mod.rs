#![allow(dead_code)]

use chrono::NaiveDate;
use diesel::QueryableByName;
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{BigInt, Integer, Text};
use library_core::catalog::CatalogRepo;
use library_core::clock::FixedClock;
use library_core::db::{connection, migrate};
use library_core::forms::{BookDraft, MemberDraft};
use library_core::membership::MembershipRepo;
use library_core::models::{Book, Member};
use library_core::repo::SqliteRepo;
use std::path::PathBuf;
use tempfile::TempDir;

#[derive(QueryableByName)]
struct JournalMode {
    #[diesel(sql_type = Text)]
    journal_mode: String,
}
#[derive(QueryableByName)]
struct ForeignKeys {
    #[diesel(sql_type = Integer)]
    foreign_keys: i32,
}
#[derive(QueryableByName)]
struct BusyTimeout {
    #[diesel(sql_type = Integer, column_name = "timeout")]
    busy_timeout: i32,
}
#[derive(QueryableByName)]
struct Cnt {
    #[diesel(sql_type = BigInt)]
    cnt: i64,
}
#[derive(QueryableByName, Debug)]
struct FkViolation {
    #[diesel(sql_type = Text)]
    table: String,
    #[diesel(sql_type = Text)]
    parent: String,
}

pub struct TestDb {
    _dir: TempDir,    // keep alive for the life of the test
    pub path: String, // <tmpdir>/test.db
}

pub fn setup_db() -> (TestDb, SqliteConnection) {
    let dir = TempDir::new().expect("tempdir");
    let mut p = PathBuf::from(dir.path());
    p.push("test.db");
    let path = p.to_string_lossy().to_string();

    migrate::run_all(&path).expect("migrations");

    // open a connection with PRAGMAs applied
    let conn = connection::connect_sqlite(&path).expect("connect");
    (TestDb { _dir: dir, path }, conn)
}

pub fn assert_sqlite_pragmas(conn: &mut SqliteConnection) {
    let jm: JournalMode = sql_query("PRAGMA journal_mode;").get_result(conn).unwrap();
    assert_eq!(jm.journal_mode.to_lowercase(), "wal"); // WAL is persistent per DB file

    let fk: ForeignKeys = sql_query("PRAGMA foreign_keys;").get_result(conn).unwrap();
    assert_eq!(fk.foreign_keys, 1);

    let bt: BusyTimeout = sql_query("PRAGMA busy_timeout;").get_result(conn).unwrap();
    assert_eq!(bt.busy_timeout, 5000);
}

pub fn count(conn: &mut SqliteConnection, table: &str) -> i64 {
    let c: Cnt = sql_query(format!("SELECT COUNT(*) AS cnt FROM {table};"))
        .get_result(conn)
        .unwrap();
    c.cnt
}

pub fn fk_check_empty(conn: &mut SqliteConnection) {
    let rows: Vec<FkViolation> = sql_query("PRAGMA foreign_key_check;").load(conn).unwrap();
    assert!(rows.is_empty(), "foreign key violations: {rows:?}");
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Repository pinned to 2024-05-01.
pub fn repo() -> SqliteRepo<FixedClock> {
    repo_on(day(2024, 5, 1))
}

pub fn repo_on(today: NaiveDate) -> SqliteRepo<FixedClock> {
    SqliteRepo::with_clock(FixedClock(today))
}

pub fn seed_book(
    conn: &mut SqliteConnection,
    repo: &SqliteRepo<FixedClock>,
    title: &str,
    quantity: i32,
) -> Book {
    repo.add_book(conn, &BookDraft::new(title, "Anon").quantity(quantity))
        .expect("seed book")
}

pub fn seed_member(
    conn: &mut SqliteConnection,
    repo: &SqliteRepo<FixedClock>,
    name: &str,
) -> Member {
    repo.add_member(conn, &MemberDraft::new(name)).expect("seed member")
}

pub fn available(conn: &mut SqliteConnection, repo: &SqliteRepo<FixedClock>, book_id: i32) -> i32 {
    repo.get_book(conn, book_id).expect("book").available
}
