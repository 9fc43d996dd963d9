//! Circulation statements for SQLite.
use chrono::{Datelike, Days};
use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::{debug, info, warn};

use crate::catalog::repo::find_book;
use crate::circulation::{CirculationRepo, LoanStatus};
use crate::clock::{Clock, to_iso_date};
use crate::error::{Entity, LibraryError, LibraryResult};
use crate::forms::IssueRequest;
use crate::membership::repo::find_member;
use crate::models::{LoanTransaction, NewLoanTransaction};
use crate::repo::SqliteRepo;
use crate::schema::books::dsl as b;
use crate::schema::transactions::dsl as t;

fn find_transaction(conn: &mut SqliteConnection, id: i32) -> LibraryResult<LoanTransaction> {
    t::transactions
        .find(id)
        .select(LoanTransaction::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| LibraryError::not_found(Entity::Transaction, id))
}

impl<C: Clock> CirculationRepo for SqliteRepo<C> {
    fn issue_book(
        &self,
        conn: &mut SqliteConnection,
        req: &IssueRequest,
    ) -> LibraryResult<LoanTransaction> {
        let today = self.today();
        let due = today
            .checked_add_days(Days::new(u64::from(req.due_days.get())))
            // four-digit years only, so ISO strings keep sorting as dates
            .filter(|d| d.year() <= 9999)
            .ok_or_else(|| {
                LibraryError::validation(format!("{} due days is out of range", req.due_days))
            })?;
        let issue_date = to_iso_date(today);
        let due_date = to_iso_date(due);

        conn.immediate_transaction::<_, LibraryError, _>(|conn| {
            let book = find_book(conn, req.book_id)?;
            if book.available <= 0 {
                return Err(LibraryError::Unavailable { book_id: book.id });
            }
            find_member(conn, req.member_id)?;

            let loan = diesel::insert_into(t::transactions)
                .values(&NewLoanTransaction {
                    book_id: Some(book.id),
                    member_id: Some(req.member_id),
                    issue_date: &issue_date,
                    due_date: &due_date,
                    status: LoanStatus::Issued.as_db_str(),
                })
                .returning(LoanTransaction::as_returning())
                .get_result(conn)?;

            let n = diesel::update(b::books.find(book.id).filter(b::available.gt(0)))
                .set(b::available.eq(b::available - 1))
                .execute(conn)?;
            if n != 1 {
                return Err(LibraryError::Unavailable { book_id: book.id });
            }

            info!(
                transaction_id = loan.id,
                book_id = book.id,
                member_id = req.member_id,
                due_date = %loan.due_date,
                "book issued"
            );
            Ok(loan)
        })
    }

    fn return_book(
        &self,
        conn: &mut SqliteConnection,
        transaction_id: i32,
    ) -> LibraryResult<LoanTransaction> {
        let return_date = to_iso_date(self.today());

        conn.immediate_transaction::<_, LibraryError, _>(|conn| {
            let loan = find_transaction(conn, transaction_id)?;
            if !loan.is_open() {
                return Err(LibraryError::AlreadyReturned(transaction_id));
            }

            let loan = diesel::update(
                t::transactions
                    .find(transaction_id)
                    .filter(t::status.eq(LoanStatus::Issued.as_db_str())),
            )
            .set((
                t::return_date.eq(return_date.as_str()),
                t::status.eq(LoanStatus::Returned.as_db_str()),
            ))
            .returning(LoanTransaction::as_returning())
            .get_result(conn)?;

            match loan.book_id {
                Some(book_id) => {
                    let book = find_book(conn, book_id)?;
                    let next = (book.available + 1).min(book.quantity);
                    if next == book.available {
                        warn!(
                            book_id,
                            quantity = book.quantity,
                            "return would exceed quantity; availability capped"
                        );
                    } else {
                        diesel::update(b::books.find(book_id))
                            .set(b::available.eq(next))
                            .execute(conn)?;
                    }
                }
                None => warn!(transaction_id, "returned loan no longer references a book"),
            }

            info!(transaction_id, book_id = ?loan.book_id, "book returned");
            Ok(loan)
        })
    }

    fn get_transaction(
        &self,
        conn: &mut SqliteConnection,
        transaction_id: i32,
    ) -> LibraryResult<LoanTransaction> {
        find_transaction(conn, transaction_id)
    }

    fn list_transactions(
        &self,
        conn: &mut SqliteConnection,
    ) -> LibraryResult<Vec<LoanTransaction>> {
        let rows = t::transactions
            .select(LoanTransaction::as_select())
            .order(t::id.desc())
            .load(conn)?;
        debug!(count = rows.len(), "listed transactions");
        Ok(rows)
    }
}
