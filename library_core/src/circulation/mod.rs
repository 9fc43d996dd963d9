//! Circulation service: issuing and returning copies.
//!
//! A loan is one row in `transactions` with a two-state lifecycle:
//!
//! ```text
//! Issued --return--> Returned
//! ```
//!
//! There is no way back to `Issued`; lending the same copy again creates a
//! new row. Issue and return each change two tables (the loan row and the
//! book's `available` count) and run inside one `BEGIN IMMEDIATE` store
//! transaction, so a failure in either half leaves both untouched.

use std::{fmt, num::NonZeroU32, str::FromStr};

use anyhow::bail;
use diesel::SqliteConnection;
use diesel::prelude::*;

use crate::error::LibraryResult;
use crate::forms::IssueRequest;
use crate::models::LoanTransaction;
use crate::schema::transactions::dsl as t;

pub mod repo;

/// Loan period used when the issue form leaves it blank.
pub const DEFAULT_DUE_DAYS: NonZeroU32 = NonZeroU32::new(14).unwrap();

/// Lifecycle state of a loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoanStatus {
    /// The copy is out.
    Issued,
    /// The copy came back (terminal).
    Returned,
}

impl LoanStatus {
    /// Value stored in `transactions.status`.
    pub const fn as_db_str(self) -> &'static str {
        match self {
            LoanStatus::Issued => "Issued",
            LoanStatus::Returned => "Returned",
        }
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_db_str())
    }
}

impl FromStr for LoanStatus {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Issued" => Ok(LoanStatus::Issued),
            "Returned" => Ok(LoanStatus::Returned),
            _ => bail!("unknown loan status: {s}"),
        }
    }
}

/// Lending desk operations.
pub trait CirculationRepo {
    /// Lends one copy of `req.book_id` to `req.member_id`, due
    /// `req.due_days` after today.
    ///
    /// Checks run in order: book exists (`NotFound`), a copy is free
    /// (`Unavailable`), member exists (`NotFound`). On success the loan row is
    /// written and `available` drops by one, atomically.
    fn issue_book(
        &self,
        conn: &mut SqliteConnection,
        req: &IssueRequest,
    ) -> LibraryResult<LoanTransaction>;

    /// Closes loan `transaction_id` with today's date and puts the copy back.
    ///
    /// `AlreadyReturned` if the loan is closed. The availability increment is
    /// capped at the book's quantity.
    fn return_book(
        &self,
        conn: &mut SqliteConnection,
        transaction_id: i32,
    ) -> LibraryResult<LoanTransaction>;

    /// Fetches one loan.
    fn get_transaction(
        &self,
        conn: &mut SqliteConnection,
        transaction_id: i32,
    ) -> LibraryResult<LoanTransaction>;

    /// All loans, most recent first.
    fn list_transactions(&self, conn: &mut SqliteConnection)
    -> LibraryResult<Vec<LoanTransaction>>;
}

/// Number of `Issued` loans on a book.
pub(crate) fn open_loans_for_book(conn: &mut SqliteConnection, book_id: i32) -> QueryResult<i64> {
    t::transactions
        .filter(t::book_id.eq(book_id))
        .filter(t::status.eq(LoanStatus::Issued.as_db_str()))
        .count()
        .get_result(conn)
}

/// Number of `Issued` loans held by a member.
pub(crate) fn open_loans_for_member(
    conn: &mut SqliteConnection,
    member_id: i32,
) -> QueryResult<i64> {
    t::transactions
        .filter(t::member_id.eq(member_id))
        .filter(t::status.eq(LoanStatus::Issued.as_db_str()))
        .count()
        .get_result(conn)
}
