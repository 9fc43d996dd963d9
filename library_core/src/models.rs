//! Diesel models mapping to the database schema.
//!
//! These types mirror the tables defined in the embedded migrations and in
//! [`crate::schema`] for use with Diesel's Queryable/Insertable APIs:
//! - [`crate::schema::books`]: catalog entries and their copy counts
//! - [`crate::schema::members`]: registered borrowers
//! - [`crate::schema::transactions`]: one row per loan, issued through returned
//!
//! Dates are stored as ISO `YYYY-MM-DD` text; see [`crate::clock`] for the
//! conversion helpers. See migrations for the CHECK constraints
//! (`0 <= available <= quantity`, status/return_date agreement) and the
//! `ON DELETE SET NULL` references from `transactions`.

use chrono::NaiveDate;
use diesel::prelude::*;
use serde::Serialize;

use crate::circulation::LoanStatus;
use crate::clock;
use crate::schema::*;

/// A row in [`crate::schema::books`]: one title and how many copies are on the shelf.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Identifiable, Selectable, Serialize)]
#[diesel(table_name = books, check_for_backend(diesel::sqlite::Sqlite))]
pub struct Book {
    /// Database primary key, assigned on insert.
    pub id: i32,
    /// Title, never blank.
    pub title: String,
    /// Author, never blank.
    pub author: String,
    /// Optional ISBN; unique across books when present.
    pub isbn: Option<String>,
    /// Optional free-form category (e.g., "Scifi").
    pub category: Option<String>,
    /// Total copies owned.
    pub quantity: i32,
    /// Copies not currently on loan.
    pub available: i32,
}

/// Insertable form of [`Book`].
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = books)]
pub struct NewBook<'a> {
    /// Title.
    pub title: &'a str,
    /// Author.
    pub author: &'a str,
    /// Optional ISBN.
    pub isbn: Option<&'a str>,
    /// Optional category.
    pub category: Option<&'a str>,
    /// Total copies owned.
    pub quantity: i32,
    /// Initial loanable copies; equal to `quantity` for a new book.
    pub available: i32,
}

/// Full overwrite of the mutable [`Book`] columns.
///
/// `None` clears the column (`treat_none_as_null`), matching a blank form field.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = books, treat_none_as_null = true)]
pub struct BookChanges<'a> {
    /// Replacement title.
    pub title: &'a str,
    /// Replacement author.
    pub author: &'a str,
    /// Replacement ISBN (or NULL).
    pub isbn: Option<&'a str>,
    /// Replacement category (or NULL).
    pub category: Option<&'a str>,
    /// Replacement copy count.
    pub quantity: i32,
    /// Reconciled loanable count.
    pub available: i32,
}

/// A row in [`crate::schema::members`].
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Identifiable, Selectable, Serialize)]
#[diesel(table_name = members, check_for_backend(diesel::sqlite::Sqlite))]
pub struct Member {
    /// Database primary key, assigned on insert.
    pub id: i32,
    /// Display name, never blank.
    pub name: String,
    /// Optional email; unique across members when present.
    pub email: Option<String>,
    /// Optional phone number.
    pub phone: Option<String>,
    /// Registration date (`YYYY-MM-DD`); never changes after insert.
    pub join_date: String,
}

/// Insertable form of [`Member`].
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = members)]
pub struct NewMember<'a> {
    /// Display name.
    pub name: &'a str,
    /// Optional email.
    pub email: Option<&'a str>,
    /// Optional phone number.
    pub phone: Option<&'a str>,
    /// Registration date (`YYYY-MM-DD`).
    pub join_date: &'a str,
}

/// Overwrite of the mutable [`Member`] columns; `join_date` never changes.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = members, treat_none_as_null = true)]
pub struct MemberChanges<'a> {
    /// Replacement name.
    pub name: &'a str,
    /// Replacement email (or NULL).
    pub email: Option<&'a str>,
    /// Replacement phone (or NULL).
    pub phone: Option<&'a str>,
}

/// A row in [`crate::schema::transactions`]: the lifecycle of one loan.
///
/// `book_id`/`member_id` become `None` once the referenced row is deleted;
/// only returned loans can end up in that state.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Identifiable, Selectable, Serialize)]
#[diesel(table_name = transactions, check_for_backend(diesel::sqlite::Sqlite))]
pub struct LoanTransaction {
    /// Database primary key, assigned on insert.
    pub id: i32,
    /// Loaned book.
    pub book_id: Option<i32>,
    /// Borrowing member.
    pub member_id: Option<i32>,
    /// Date the book left the desk (`YYYY-MM-DD`).
    pub issue_date: String,
    /// Date the book is due back (`YYYY-MM-DD`).
    pub due_date: String,
    /// Date the book came back, if it has.
    pub return_date: Option<String>,
    /// "Issued" | "Returned".
    pub status: String,
}

impl LoanTransaction {
    /// Parsed [`LoanStatus`] of this row.
    pub fn loan_status(&self) -> anyhow::Result<LoanStatus> {
        self.status.parse()
    }

    /// `true` while the loan is still out.
    pub fn is_open(&self) -> bool {
        self.status == LoanStatus::Issued.as_db_str()
    }

    /// `true` for an open loan whose due date lies before `today`.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.is_open()
            && clock::parse_iso_date(&self.due_date)
                .map(|due| due < today)
                .unwrap_or(false)
    }
}

/// Insertable form of [`LoanTransaction`]; always starts out as "Issued".
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = transactions)]
pub struct NewLoanTransaction<'a> {
    /// Loaned book.
    pub book_id: Option<i32>,
    /// Borrowing member.
    pub member_id: Option<i32>,
    /// Issue date (`YYYY-MM-DD`).
    pub issue_date: &'a str,
    /// Due date (`YYYY-MM-DD`).
    pub due_date: &'a str,
    /// Initial status.
    pub status: &'a str,
}
