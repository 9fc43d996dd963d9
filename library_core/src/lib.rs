//! Book inventory, membership, and loan bookkeeping on an embedded SQLite store.
//!
//! The three services are traits ([`catalog::CatalogRepo`],
//! [`membership::MembershipRepo`], [`circulation::CirculationRepo`]) implemented
//! by [`repo::SqliteRepo`]. Each call receives the connection it runs on:
//!
//! ```no_run
//! use library_core::catalog::CatalogRepo;
//! use library_core::circulation::CirculationRepo;
//! use library_core::forms::{BookDraft, IssueRequest, MemberDraft};
//! use library_core::membership::MembershipRepo;
//! use library_core::{db, repo::SqliteRepo};
//!
//! let mut conn = db::open("library.db").expect("open");
//! let repo = SqliteRepo::new();
//!
//! let book = repo.add_book(&mut conn, &BookDraft::new("Dune", "Herbert").quantity(3)).unwrap();
//! let member = repo.add_member(&mut conn, &MemberDraft::new("Ada")).unwrap();
//! let loan = repo.issue_book(&mut conn, &IssueRequest::new(book.id, member.id)).unwrap();
//! repo.return_book(&mut conn, loan.id).unwrap();
//! ```

#![deny(missing_docs)]

pub mod catalog;
pub mod circulation;
pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod forms;
pub mod logging;
pub mod membership;
pub mod models;
pub mod repo;
/// Diesel table definitions matching the embedded migrations.
#[allow(missing_docs)]
pub mod schema;

pub use error::{ErrorKind, ErrorReport, LibraryError, LibraryResult};
