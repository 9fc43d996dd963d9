//! Catalog service: the book table and its copy counts.
//!
//! Portable surface; the SQLite implementation lives in [`repo`].
//!
//! `available` is owned by circulation. Catalog writes only touch it on
//! insert (`available = quantity`) and on update, where it is recomputed as
//! `quantity - open loans` so the two counts never drift apart.

use std::{fmt, str::FromStr};

use anyhow::bail;
use diesel::SqliteConnection;

use crate::error::LibraryResult;
use crate::forms::BookDraft;
use crate::models::Book;

pub mod repo;

/// Column a catalog search runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    /// `books.title`
    Title,
    /// `books.author`
    Author,
    /// `books.isbn`
    Isbn,
    /// `books.category`
    Category,
}

impl SearchField {
    /// Every searchable column, in display order.
    pub const ALL: [SearchField; 4] = [
        SearchField::Title,
        SearchField::Author,
        SearchField::Isbn,
        SearchField::Category,
    ];
}

impl fmt::Display for SearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SearchField::Title => "title",
            SearchField::Author => "author",
            SearchField::Isbn => "isbn",
            SearchField::Category => "category",
        })
    }
}

impl FromStr for SearchField {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "title" => Ok(SearchField::Title),
            "author" => Ok(SearchField::Author),
            "isbn" => Ok(SearchField::Isbn),
            "category" => Ok(SearchField::Category),
            other => bail!("unknown search field: {other}"),
        }
    }
}

/// Book inventory operations.
pub trait CatalogRepo {
    /// Inserts a book with `available = quantity` and returns the stored row.
    ///
    /// Errors: `Validation` for a blank title/author, `DuplicateIsbn` when the
    /// ISBN is taken.
    fn add_book(&self, conn: &mut SqliteConnection, draft: &BookDraft) -> LibraryResult<Book>;

    /// Overwrites title, author, ISBN, category, and quantity of book `id`.
    ///
    /// `available` becomes `quantity - open loans`; a quantity below the
    /// number of copies on loan is a `Validation` error.
    fn update_book(
        &self,
        conn: &mut SqliteConnection,
        id: i32,
        draft: &BookDraft,
    ) -> LibraryResult<Book>;

    /// Deletes book `id`. Refused with `OpenLoans` while copies are out;
    /// returned loans keep their history with a NULL `book_id`.
    fn delete_book(&self, conn: &mut SqliteConnection, id: i32) -> LibraryResult<()>;

    /// Fetches one book.
    fn get_book(&self, conn: &mut SqliteConnection, id: i32) -> LibraryResult<Book>;

    /// All books in insertion order.
    fn list_books(&self, conn: &mut SqliteConnection) -> LibraryResult<Vec<Book>>;

    /// Books whose `field` contains `term`, ignoring ASCII case.
    ///
    /// `term` is matched literally (LIKE wildcards are escaped). No match is
    /// an empty vector; a blank term is a `Validation` error.
    fn search_books(
        &self,
        conn: &mut SqliteConnection,
        field: SearchField,
        term: &str,
    ) -> LibraryResult<Vec<Book>>;
}
