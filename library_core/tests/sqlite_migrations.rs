mod common;
use common::{assert_sqlite_pragmas, count, fk_check_empty, setup_db};

use diesel::QueryableByName;
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{Integer, Text};
use library_core::db::{self, connection::connect_sqlite, migrate};

#[derive(QueryableByName)]
struct TblCnt {
    #[diesel(sql_type = Integer)]
    cnt: i32,
}
#[derive(QueryableByName)]
struct Status {
    #[diesel(sql_type = Text)]
    status: String,
}

#[test]
fn migrations_apply_and_pragmas_are_set() {
    let (db, mut conn) = setup_db();

    // WAL is a persistent property of the .db file; FKs/timeout are per-connection
    assert_sqlite_pragmas(&mut conn);
    let mut second = connect_sqlite(&db.path).expect("connect second");
    assert_sqlite_pragmas(&mut second);

    let tbls: TblCnt = sql_query(
        "SELECT COUNT(*) AS cnt
            FROM sqlite_master
            WHERE type='table'
            AND name IN ('books','members','transactions');",
    )
    .get_result(&mut conn)
    .unwrap();
    assert_eq!(tbls.cnt, 3, "expected three tables to be present");

    // re-running is harmless
    migrate::run_all(&db.path).expect("second migration run");
    fk_check_empty(&mut conn);
}

#[test]
fn defaults_fill_status_and_quantity() {
    let (_db, mut conn) = setup_db();

    sql_query("INSERT INTO books (title, author) VALUES ('Dune', 'Herbert');")
        .execute(&mut conn)
        .unwrap();
    sql_query("INSERT INTO members (name, join_date) VALUES ('Ada', '2024-05-01');")
        .execute(&mut conn)
        .unwrap();
    sql_query(
        "INSERT INTO transactions (book_id, member_id, issue_date, due_date)
         VALUES (1, 1, '2024-05-01', '2024-05-15');",
    )
    .execute(&mut conn)
    .unwrap();

    let s: Status = sql_query("SELECT status FROM transactions WHERE id = 1;")
        .get_result(&mut conn)
        .unwrap();
    assert_eq!(s.status, "Issued");
    assert_eq!(count(&mut conn, "books"), 1);
}

#[test]
fn check_constraints_reject_inconsistent_rows() {
    let (_db, mut conn) = setup_db();

    let bad = [
        // available above quantity
        "INSERT INTO books (title, author, quantity, available) VALUES ('A', 'B', 1, 2);",
        // negative stock
        "INSERT INTO books (title, author, quantity, available) VALUES ('A', 'B', -1, 0);",
        // blank title
        "INSERT INTO books (title, author) VALUES ('  ', 'B');",
        // unknown status
        "INSERT INTO transactions (issue_date, due_date, status) VALUES ('2024-01-01', '2024-01-02', 'Lost');",
        // returned without a return date
        "INSERT INTO transactions (issue_date, due_date, status) VALUES ('2024-01-01', '2024-01-02', 'Returned');",
        // due before issue
        "INSERT INTO transactions (issue_date, due_date) VALUES ('2024-01-05', '2024-01-02');",
        // member without a join date
        "INSERT INTO members (name) VALUES ('Ada');",
        // dangling reference
        "INSERT INTO transactions (book_id, issue_date, due_date) VALUES (99, '2024-01-01', '2024-01-02');",
    ];
    for stmt in bad {
        assert!(sql_query(stmt).execute(&mut conn).is_err(), "accepted: {stmt}");
    }
    assert_eq!(count(&mut conn, "books"), 0);
    assert_eq!(count(&mut conn, "members"), 0);
    assert_eq!(count(&mut conn, "transactions"), 0);
}

#[test]
fn open_works_in_memory() {
    let mut conn = db::open(":memory:").expect("open");
    sql_query(
        "INSERT INTO members (name, email, join_date) VALUES ('Ada', 'ada@example.com', '2024-05-01');",
    )
        .execute(&mut conn)
        .unwrap();
    assert!(
        sql_query(
            "INSERT INTO members (name, email, join_date) VALUES ('Bob', 'ada@example.com', '2024-05-01');",
        )
            .execute(&mut conn)
            .is_err()
    );
    assert_eq!(count(&mut conn, "members"), 1);
}
