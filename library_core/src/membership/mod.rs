//! Membership service: the member table.
//!
//! Portable surface; the SQLite implementation lives in [`repo`].

use diesel::SqliteConnection;

use crate::error::LibraryResult;
use crate::forms::MemberDraft;
use crate::models::Member;

pub mod repo;

/// Member registry operations.
pub trait MembershipRepo {
    /// Registers a member with `join_date` = today.
    ///
    /// Errors: `Validation` for a blank name, `DuplicateEmail` when the email
    /// is taken.
    fn add_member(&self, conn: &mut SqliteConnection, draft: &MemberDraft)
    -> LibraryResult<Member>;

    /// Overwrites name, email, and phone of member `id`; `join_date` is kept.
    fn update_member(
        &self,
        conn: &mut SqliteConnection,
        id: i32,
        draft: &MemberDraft,
    ) -> LibraryResult<Member>;

    /// Deletes member `id`. Refused with `OpenLoans` while the member still
    /// holds books; returned loans keep their history with a NULL `member_id`.
    fn delete_member(&self, conn: &mut SqliteConnection, id: i32) -> LibraryResult<()>;

    /// Fetches one member.
    fn get_member(&self, conn: &mut SqliteConnection, id: i32) -> LibraryResult<Member>;

    /// All members in insertion order.
    fn list_members(&self, conn: &mut SqliteConnection) -> LibraryResult<Vec<Member>>;
}
