//! Errors surfaced by the catalog, membership, and circulation services.
//!
//! Every service call returns [`LibraryResult`]. Callers that need a
//! structured value (kind + message) instead of an error chain use
//! [`LibraryError::report`].

use std::fmt;

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use serde::Serialize;

/// Which table an id was looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Entity {
    /// A row in `books`.
    Book,
    /// A row in `members`.
    Member,
    /// A row in `transactions`.
    Transaction,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Entity::Book => "book",
            Entity::Member => "member",
            Entity::Transaction => "transaction",
        })
    }
}

/// Errors that can occur while operating on the library.
#[derive(thiserror::Error, Debug)]
pub enum LibraryError {
    /// Missing or malformed input.
    #[error("invalid input: {0}")]
    Validation(String),

    /// Another book already carries this ISBN.
    #[error("ISBN {0} already exists")]
    DuplicateIsbn(String),

    /// Another member already uses this email.
    #[error("email {0} already exists")]
    DuplicateEmail(String),

    /// No row with this id.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Table the lookup ran against.
        entity: Entity,
        /// Requested id.
        id: i32,
    },

    /// Every copy of the book is out.
    #[error("book {book_id} is not available")]
    Unavailable {
        /// Requested book.
        book_id: i32,
    },

    /// The loan was closed earlier.
    #[error("transaction {0} was already returned")]
    AlreadyReturned(i32),

    /// A delete was refused because loans on the row are still open.
    #[error("{entity} {id} has {open} open loan(s)")]
    OpenLoans {
        /// Table of the row being deleted.
        entity: Entity,
        /// Row id.
        id: i32,
        /// Number of Issued transactions referencing it.
        open: i64,
    },

    /// Anything the store reported that is not classified above.
    #[error("storage error: {0}")]
    Storage(#[from] DieselError),
}

/// Result type used by every service operation.
pub type LibraryResult<T> = Result<T, LibraryError>;

/// Flat classification of [`LibraryError`] for callers that only branch on the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// See [`LibraryError::Validation`].
    Validation,
    /// See [`LibraryError::DuplicateIsbn`].
    DuplicateIsbn,
    /// See [`LibraryError::DuplicateEmail`].
    DuplicateEmail,
    /// See [`LibraryError::NotFound`].
    NotFound,
    /// See [`LibraryError::Unavailable`].
    Unavailable,
    /// See [`LibraryError::AlreadyReturned`].
    AlreadyReturned,
    /// See [`LibraryError::OpenLoans`].
    OpenLoans,
    /// See [`LibraryError::Storage`].
    Storage,
}

/// Serializable error result handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    /// Error classification.
    pub kind: ErrorKind,
    /// Human-readable message.
    pub message: String,
}

impl LibraryError {
    /// Shorthand for [`LibraryError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Shorthand for [`LibraryError::NotFound`].
    pub fn not_found(entity: Entity, id: i32) -> Self {
        Self::NotFound { entity, id }
    }

    /// Classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::DuplicateIsbn(_) => ErrorKind::DuplicateIsbn,
            Self::DuplicateEmail(_) => ErrorKind::DuplicateEmail,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Unavailable { .. } => ErrorKind::Unavailable,
            Self::AlreadyReturned(_) => ErrorKind::AlreadyReturned,
            Self::OpenLoans { .. } => ErrorKind::OpenLoans,
            Self::Storage(_) => ErrorKind::Storage,
        }
    }

    /// Kind + rendered message.
    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}

/// `true` when diesel reports a UNIQUE constraint failure.
pub(crate) fn is_unique_violation(err: &DieselError) -> bool {
    matches!(
        err,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
    )
}
