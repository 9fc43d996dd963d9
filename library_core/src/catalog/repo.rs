//! Catalog statements for SQLite.
use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::{debug, info};

use crate::catalog::{CatalogRepo, SearchField};
use crate::circulation::open_loans_for_book;
use crate::error::{Entity, LibraryError, LibraryResult, is_unique_violation};
use crate::forms::{BookDraft, non_blank};
use crate::models::{Book, BookChanges, NewBook};
use crate::repo::SqliteRepo;
use crate::schema::books::dsl as b;

fn isbn_conflict(err: diesel::result::Error, isbn: Option<&str>) -> LibraryError {
    if is_unique_violation(&err) {
        LibraryError::DuplicateIsbn(isbn.unwrap_or_default().to_string())
    } else {
        err.into()
    }
}

/// `%term%` with LIKE metacharacters escaped by `\`.
fn like_pattern(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 2);
    out.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('%');
    out
}

pub(crate) fn find_book(conn: &mut SqliteConnection, id: i32) -> LibraryResult<Book> {
    b::books
        .find(id)
        .select(Book::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| LibraryError::not_found(Entity::Book, id))
}

impl<C> CatalogRepo for SqliteRepo<C> {
    fn add_book(&self, conn: &mut SqliteConnection, draft: &BookDraft) -> LibraryResult<Book> {
        draft.validate()?;

        let row = NewBook {
            title: draft.title.trim(),
            author: draft.author.trim(),
            isbn: non_blank(draft.isbn.as_ref()),
            category: non_blank(draft.category.as_ref()),
            quantity: draft.quantity,
            available: draft.quantity,
        };

        let book = diesel::insert_into(b::books)
            .values(&row)
            .returning(Book::as_returning())
            .get_result(conn)
            .map_err(|e| isbn_conflict(e, row.isbn))?;

        info!(book_id = book.id, title = %book.title, quantity = book.quantity, "book added");
        Ok(book)
    }

    fn update_book(
        &self,
        conn: &mut SqliteConnection,
        id: i32,
        draft: &BookDraft,
    ) -> LibraryResult<Book> {
        draft.validate()?;

        conn.immediate_transaction::<_, LibraryError, _>(|conn| {
            let current = find_book(conn, id)?;
            let open = open_loans_for_book(conn, id)?;
            if i64::from(draft.quantity) < open {
                return Err(LibraryError::validation(format!(
                    "quantity {} is below the {open} copies of book {id} currently on loan",
                    draft.quantity
                )));
            }

            let changes = BookChanges {
                title: draft.title.trim(),
                author: draft.author.trim(),
                isbn: non_blank(draft.isbn.as_ref()),
                category: non_blank(draft.category.as_ref()),
                quantity: draft.quantity,
                // open <= quantity, so this stays within [0, quantity]
                available: draft.quantity - open as i32,
            };

            let book = diesel::update(b::books.find(id))
                .set(&changes)
                .returning(Book::as_returning())
                .get_result(conn)
                .map_err(|e| isbn_conflict(e, changes.isbn))?;

            if book.available != current.available {
                info!(
                    book_id = id,
                    from = current.available,
                    to = book.available,
                    "availability reconciled with new quantity"
                );
            }
            info!(book_id = id, "book updated");
            Ok(book)
        })
    }

    fn delete_book(&self, conn: &mut SqliteConnection, id: i32) -> LibraryResult<()> {
        conn.immediate_transaction::<_, LibraryError, _>(|conn| {
            let open = open_loans_for_book(conn, id)?;
            if open > 0 {
                return Err(LibraryError::OpenLoans {
                    entity: Entity::Book,
                    id,
                    open,
                });
            }

            let n = diesel::delete(b::books.find(id)).execute(conn)?;
            if n == 0 {
                return Err(LibraryError::not_found(Entity::Book, id));
            }
            info!(book_id = id, "book deleted");
            Ok(())
        })
    }

    fn get_book(&self, conn: &mut SqliteConnection, id: i32) -> LibraryResult<Book> {
        find_book(conn, id)
    }

    fn list_books(&self, conn: &mut SqliteConnection) -> LibraryResult<Vec<Book>> {
        let rows = b::books
            .select(Book::as_select())
            .order(b::id.asc())
            .load(conn)?;
        debug!(count = rows.len(), "listed books");
        Ok(rows)
    }

    fn search_books(
        &self,
        conn: &mut SqliteConnection,
        field: SearchField,
        term: &str,
    ) -> LibraryResult<Vec<Book>> {
        let term = term.trim();
        if term.is_empty() {
            return Err(LibraryError::validation("search term is required"));
        }
        let pattern = like_pattern(term);

        let query = b::books
            .select(Book::as_select())
            .order(b::id.asc())
            .into_boxed();
        let query = match field {
            SearchField::Title => query.filter(b::title.like(pattern.as_str()).escape('\\')),
            SearchField::Author => query.filter(b::author.like(pattern.as_str()).escape('\\')),
            SearchField::Isbn => query.filter(b::isbn.like(pattern.as_str()).escape('\\')),
            SearchField::Category => {
                query.filter(b::category.like(pattern.as_str()).escape('\\'))
            }
        };

        let rows = query.load(conn)?;
        debug!(%field, term, hits = rows.len(), "searched books");
        Ok(rows)
    }
}
