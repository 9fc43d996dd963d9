mod common;
use common::{available, count, fk_check_empty, repo, seed_book, seed_member, setup_db};

use library_core::ErrorKind;
use library_core::catalog::{CatalogRepo, SearchField};
use library_core::circulation::CirculationRepo;
use library_core::forms::{BookDraft, BookForm, IssueRequest};
use library_core::schema::transactions::dsl as t;

use diesel::prelude::*;

#[test]
fn added_book_starts_fully_available() {
    let (_db, mut conn) = setup_db();
    let repo = repo();

    let draft = BookForm {
        title: " Dune ".into(),
        author: "Herbert".into(),
        isbn: "111".into(),
        category: "Scifi".into(),
        quantity: "3".into(),
    }
    .parse()
    .unwrap();
    let book = repo.add_book(&mut conn, &draft).expect("add");
    assert_eq!(book.title, "Dune");
    assert_eq!(book.quantity, 3);
    assert_eq!(book.available, 3);

    let listed = repo.list_books(&mut conn).unwrap();
    assert_eq!(listed, vec![book]);
}

#[test]
fn default_quantity_is_one() {
    let (_db, mut conn) = setup_db();
    let repo = repo();

    let draft = BookForm {
        title: "Emma".into(),
        author: "Austen".into(),
        ..Default::default()
    }
    .parse()
    .unwrap();
    let book = repo.add_book(&mut conn, &draft).unwrap();
    assert_eq!((book.quantity, book.available), (1, 1));
    assert_eq!(book.isbn, None);
    assert_eq!(book.category, None);
}

#[test]
fn duplicate_isbn_is_rejected_and_keeps_one_row() {
    let (_db, mut conn) = setup_db();
    let repo = repo();

    repo.add_book(&mut conn, &BookDraft::new("Dune", "Herbert").isbn("111"))
        .unwrap();
    let err = repo
        .add_book(&mut conn, &BookDraft::new("Dune II", "Herbert").isbn("111"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateIsbn);

    let hits = repo
        .search_books(&mut conn, SearchField::Isbn, "111")
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "Dune");
}

#[test]
fn blank_isbns_never_collide() {
    let (_db, mut conn) = setup_db();
    let repo = repo();

    repo.add_book(&mut conn, &BookDraft::new("A", "X")).unwrap();
    repo.add_book(&mut conn, &BookDraft::new("B", "X").isbn("  "))
        .unwrap();
    assert_eq!(count(&mut conn, "books"), 2);
}

#[test]
fn blank_title_or_author_is_a_validation_error() {
    let (_db, mut conn) = setup_db();
    let repo = repo();

    for draft in [BookDraft::new("", "X"), BookDraft::new("T", "  ")] {
        let err = repo.add_book(&mut conn, &draft).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
    assert_eq!(count(&mut conn, "books"), 0);
}

#[test]
fn update_overwrites_fields_and_clears_blanks() {
    let (_db, mut conn) = setup_db();
    let repo = repo();

    let book = repo
        .add_book(
            &mut conn,
            &BookDraft::new("Dune", "Herbert").isbn("111").category("Scifi"),
        )
        .unwrap();

    let updated = repo
        .update_book(
            &mut conn,
            book.id,
            &BookDraft::new("Dune Messiah", "F. Herbert").quantity(4),
        )
        .unwrap();
    assert_eq!(updated.id, book.id);
    assert_eq!(updated.title, "Dune Messiah");
    assert_eq!(updated.isbn, None);
    assert_eq!(updated.category, None);
    assert_eq!((updated.quantity, updated.available), (4, 4));
}

#[test]
fn update_reconciles_available_with_open_loans() {
    let (_db, mut conn) = setup_db();
    let repo = repo();
    let book = seed_book(&mut conn, &repo, "Dune", 3);
    let member = seed_member(&mut conn, &repo, "Ada");

    repo.issue_book(&mut conn, &IssueRequest::new(book.id, member.id))
        .unwrap();
    repo.issue_book(&mut conn, &IssueRequest::new(book.id, member.id))
        .unwrap();
    assert_eq!(available(&mut conn, &repo, book.id), 1);

    // shrink to exactly the copies on loan
    let b = repo
        .update_book(&mut conn, book.id, &BookDraft::new("Dune", "Anon").quantity(2))
        .unwrap();
    assert_eq!((b.quantity, b.available), (2, 0));

    // grow again
    let b = repo
        .update_book(&mut conn, book.id, &BookDraft::new("Dune", "Anon").quantity(5))
        .unwrap();
    assert_eq!((b.quantity, b.available), (5, 3));

    // below the copies on loan is refused and nothing changes
    let err = repo
        .update_book(&mut conn, book.id, &BookDraft::new("Dune", "Anon").quantity(1))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    let b = repo.get_book(&mut conn, book.id).unwrap();
    assert_eq!((b.quantity, b.available), (5, 3));
}

#[test]
fn update_to_taken_isbn_is_duplicate() {
    let (_db, mut conn) = setup_db();
    let repo = repo();
    repo.add_book(&mut conn, &BookDraft::new("A", "X").isbn("1"))
        .unwrap();
    let b = repo
        .add_book(&mut conn, &BookDraft::new("B", "X").isbn("2"))
        .unwrap();

    let err = repo
        .update_book(&mut conn, b.id, &BookDraft::new("B", "X").isbn("1"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateIsbn);
    assert_eq!(
        repo.get_book(&mut conn, b.id).unwrap().isbn.as_deref(),
        Some("2")
    );
}

#[test]
fn unknown_ids_are_not_found() {
    let (_db, mut conn) = setup_db();
    let repo = repo();

    let draft = BookDraft::new("A", "X");
    assert_eq!(
        repo.update_book(&mut conn, 42, &draft).unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert_eq!(
        repo.delete_book(&mut conn, 42).unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert_eq!(
        repo.get_book(&mut conn, 42).unwrap_err().kind(),
        ErrorKind::NotFound
    );
}

#[test]
fn delete_is_refused_while_copies_are_out() {
    let (_db, mut conn) = setup_db();
    let repo = repo();
    let book = seed_book(&mut conn, &repo, "Dune", 1);
    let member = seed_member(&mut conn, &repo, "Ada");
    let loan = repo
        .issue_book(&mut conn, &IssueRequest::new(book.id, member.id))
        .unwrap();

    let err = repo.delete_book(&mut conn, book.id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OpenLoans);
    assert_eq!(count(&mut conn, "books"), 1);

    // after the return the book can go; the loan stays as history
    repo.return_book(&mut conn, loan.id).unwrap();
    repo.delete_book(&mut conn, book.id).unwrap();
    assert_eq!(count(&mut conn, "books"), 0);

    let book_ref: Option<i32> = t::transactions
        .find(loan.id)
        .select(t::book_id)
        .first(&mut conn)
        .unwrap();
    assert_eq!(book_ref, None);
    fk_check_empty(&mut conn);
}

#[test]
fn list_is_in_insertion_order() {
    let (_db, mut conn) = setup_db();
    let repo = repo();
    for title in ["C", "A", "B"] {
        seed_book(&mut conn, &repo, title, 1);
    }
    let titles: Vec<String> = repo
        .list_books(&mut conn)
        .unwrap()
        .into_iter()
        .map(|b| b.title)
        .collect();
    assert_eq!(titles, ["C", "A", "B"]);
}

#[test]
fn search_is_case_insensitive_substring() {
    let (_db, mut conn) = setup_db();
    let repo = repo();
    for title in ["The Hobbit", "Anthem", "Dune", "Brave New World", "OTHELLO"] {
        seed_book(&mut conn, &repo, title, 1);
    }

    let mut hits: Vec<String> = repo
        .search_books(&mut conn, SearchField::Title, "the")
        .unwrap()
        .into_iter()
        .map(|b| b.title)
        .collect();
    hits.sort();
    assert_eq!(hits, ["Anthem", "OTHELLO", "The Hobbit"]);

    let none = repo
        .search_books(&mut conn, SearchField::Title, "zzz")
        .unwrap();
    assert!(none.is_empty());
}

#[test]
fn search_by_other_fields() {
    let (_db, mut conn) = setup_db();
    let repo = repo();
    repo.add_book(
        &mut conn,
        &BookDraft::new("Dune", "Frank Herbert").category("Scifi"),
    )
    .unwrap();
    repo.add_book(&mut conn, &BookDraft::new("Emma", "Jane Austen").isbn("978-0"))
        .unwrap();

    let by_author = repo
        .search_books(&mut conn, SearchField::Author, "AUSTEN")
        .unwrap();
    assert_eq!(by_author.len(), 1);
    assert_eq!(by_author[0].title, "Emma");

    let by_category = repo
        .search_books(&mut conn, SearchField::Category, "sci")
        .unwrap();
    assert_eq!(by_category.len(), 1);
    assert_eq!(by_category[0].title, "Dune");

    // NULL isbn never matches
    let by_isbn = repo
        .search_books(&mut conn, SearchField::Isbn, "978")
        .unwrap();
    assert_eq!(by_isbn.len(), 1);
}

#[test]
fn search_treats_wildcards_literally() {
    let (_db, mut conn) = setup_db();
    let repo = repo();
    seed_book(&mut conn, &repo, "100% Rust", 1);
    seed_book(&mut conn, &repo, "1000 Rust Tips", 1);
    seed_book(&mut conn, &repo, "snake_case", 1);
    seed_book(&mut conn, &repo, "snakeXcase", 1);

    let pct = repo
        .search_books(&mut conn, SearchField::Title, "0%")
        .unwrap();
    assert_eq!(pct.len(), 1);
    assert_eq!(pct[0].title, "100% Rust");

    let underscore = repo
        .search_books(&mut conn, SearchField::Title, "e_c")
        .unwrap();
    assert_eq!(underscore.len(), 1);
    assert_eq!(underscore[0].title, "snake_case");
}

#[test]
fn blank_search_term_is_a_validation_error() {
    let (_db, mut conn) = setup_db();
    let repo = repo();
    let err = repo
        .search_books(&mut conn, SearchField::Title, "  ")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}
