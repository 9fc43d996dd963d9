//! Raw form input and the validated drafts the services accept.
//!
//! A form holds exactly what a user typed: untrimmed strings, possibly blank.
//! `parse()` turns it into a draft or a [`LibraryError::Validation`]:
//! - text is trimmed; required fields must be non-empty afterwards
//! - blank optional fields become `None` (stored as NULL, so they never
//!   collide with the UNIQUE constraints on `isbn`/`email`)
//! - integers are parsed strictly (`quantity >= 0`, ids `> 0`, due days `> 0`)
//!
//! Drafts have public fields so they can also be built directly; services
//! call `validate()` on them again before writing.

use std::num::NonZeroU32;

use crate::circulation::DEFAULT_DUE_DAYS;
use crate::error::{LibraryError, LibraryResult};

/// Parse an entity id typed into a form field.
pub fn parse_id(field: &str, raw: &str) -> LibraryResult<i32> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(LibraryError::validation(format!("{field} is required")));
    }
    match raw.parse::<i32>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(LibraryError::validation(format!(
            "{field} must be a positive integer, got {raw:?}"
        ))),
    }
}

fn required_text(field: &str, raw: &str) -> LibraryResult<String> {
    let v = raw.trim();
    if v.is_empty() {
        return Err(LibraryError::validation(format!("{field} is required")));
    }
    Ok(v.to_string())
}

fn optional_text(raw: &str) -> Option<String> {
    let v = raw.trim();
    (!v.is_empty()).then(|| v.to_string())
}

fn require_present(field: &str, value: &str) -> LibraryResult<()> {
    if value.trim().is_empty() {
        return Err(LibraryError::validation(format!("{field} is required")));
    }
    Ok(())
}

/// Trimmed view of an optional field, with blank treated as absent.
pub(crate) fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

// ----------------------- books -----------------------

/// Book details as typed into the form.
#[derive(Debug, Clone, Default)]
pub struct BookForm {
    /// Title (required).
    pub title: String,
    /// Author (required).
    pub author: String,
    /// ISBN (optional).
    pub isbn: String,
    /// Category (optional).
    pub category: String,
    /// Copy count; blank means 1.
    pub quantity: String,
}

/// Validated book fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookDraft {
    /// Trimmed, non-empty title.
    pub title: String,
    /// Trimmed, non-empty author.
    pub author: String,
    /// ISBN, `None` when blank.
    pub isbn: Option<String>,
    /// Category, `None` when blank.
    pub category: Option<String>,
    /// Total copies owned.
    pub quantity: i32,
}

impl BookForm {
    /// Validate and convert into a [`BookDraft`].
    pub fn parse(&self) -> LibraryResult<BookDraft> {
        let title = required_text("title", &self.title)?;
        let author = required_text("author", &self.author)?;
        let quantity = match self.quantity.trim() {
            "" => 1,
            q => match q.parse::<i32>() {
                Ok(n) if n >= 0 => n,
                _ => {
                    return Err(LibraryError::validation(format!(
                        "quantity must be a non-negative integer, got {q:?}"
                    )));
                }
            },
        };
        Ok(BookDraft {
            title,
            author,
            isbn: optional_text(&self.isbn),
            category: optional_text(&self.category),
            quantity,
        })
    }
}

impl BookDraft {
    /// A single-copy book with no ISBN or category.
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            isbn: None,
            category: None,
            quantity: 1,
        }
    }

    /// Set the ISBN.
    pub fn isbn(mut self, isbn: impl Into<String>) -> Self {
        self.isbn = Some(isbn.into());
        self
    }

    /// Set the category.
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the copy count.
    pub fn quantity(mut self, quantity: i32) -> Self {
        self.quantity = quantity;
        self
    }

    /// Re-check the invariants a [`BookForm`] guarantees.
    pub fn validate(&self) -> LibraryResult<()> {
        require_present("title", &self.title)?;
        require_present("author", &self.author)?;
        if self.quantity < 0 {
            return Err(LibraryError::validation(format!(
                "quantity must be a non-negative integer, got {}",
                self.quantity
            )));
        }
        Ok(())
    }
}

// ----------------------- members ---------------------

/// Member details as typed into the form.
#[derive(Debug, Clone, Default)]
pub struct MemberForm {
    /// Name (required).
    pub name: String,
    /// Email (optional).
    pub email: String,
    /// Phone (optional).
    pub phone: String,
}

/// Validated member fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberDraft {
    /// Trimmed, non-empty name.
    pub name: String,
    /// Email, `None` when blank.
    pub email: Option<String>,
    /// Phone, `None` when blank.
    pub phone: Option<String>,
}

impl MemberForm {
    /// Validate and convert into a [`MemberDraft`].
    pub fn parse(&self) -> LibraryResult<MemberDraft> {
        Ok(MemberDraft {
            name: required_text("name", &self.name)?,
            email: optional_text(&self.email),
            phone: optional_text(&self.phone),
        })
    }
}

impl MemberDraft {
    /// A member with only a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: None,
            phone: None,
        }
    }

    /// Set the email.
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set the phone number.
    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Re-check the invariants a [`MemberForm`] guarantees.
    pub fn validate(&self) -> LibraryResult<()> {
        require_present("name", &self.name)
    }
}

// ----------------------- loans -----------------------

/// Issue desk input.
#[derive(Debug, Clone, Default)]
pub struct IssueForm {
    /// Book id (required).
    pub book_id: String,
    /// Member id (required).
    pub member_id: String,
    /// Loan period in days; blank means the configured default.
    pub due_days: String,
}

/// A validated request to lend one copy of a book.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssueRequest {
    /// Book to lend.
    pub book_id: i32,
    /// Borrower.
    pub member_id: i32,
    /// Days until the loan is due.
    pub due_days: NonZeroU32,
}

impl IssueForm {
    /// Validate and convert into an [`IssueRequest`], using
    /// `default_due_days` when the field is blank.
    pub fn parse(&self, default_due_days: NonZeroU32) -> LibraryResult<IssueRequest> {
        let book_id = parse_id("book id", &self.book_id)?;
        let member_id = parse_id("member id", &self.member_id)?;
        let due_days = match self.due_days.trim() {
            "" => default_due_days,
            d => d
                .parse::<u32>()
                .ok()
                .and_then(NonZeroU32::new)
                .ok_or_else(|| {
                    LibraryError::validation(format!(
                        "due days must be a positive integer, got {d:?}"
                    ))
                })?,
        };
        Ok(IssueRequest {
            book_id,
            member_id,
            due_days,
        })
    }
}

impl IssueRequest {
    /// A request with the standard loan period.
    pub fn new(book_id: i32, member_id: i32) -> Self {
        Self {
            book_id,
            member_id,
            due_days: DEFAULT_DUE_DAYS,
        }
    }

    /// Override the loan period.
    pub fn due_in(mut self, days: NonZeroU32) -> Self {
        self.due_days = days;
        self
    }
}
