//! Membership statements for SQLite.
use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::{debug, info};

use crate::circulation::open_loans_for_member;
use crate::clock::{Clock, to_iso_date};
use crate::error::{Entity, LibraryError, LibraryResult, is_unique_violation};
use crate::forms::{MemberDraft, non_blank};
use crate::membership::MembershipRepo;
use crate::models::{Member, MemberChanges, NewMember};
use crate::repo::SqliteRepo;
use crate::schema::members::dsl as m;

fn email_conflict(err: diesel::result::Error, email: Option<&str>) -> LibraryError {
    if is_unique_violation(&err) {
        LibraryError::DuplicateEmail(email.unwrap_or_default().to_string())
    } else {
        err.into()
    }
}

pub(crate) fn find_member(conn: &mut SqliteConnection, id: i32) -> LibraryResult<Member> {
    m::members
        .find(id)
        .select(Member::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| LibraryError::not_found(Entity::Member, id))
}

impl<C: Clock> MembershipRepo for SqliteRepo<C> {
    fn add_member(
        &self,
        conn: &mut SqliteConnection,
        draft: &MemberDraft,
    ) -> LibraryResult<Member> {
        draft.validate()?;

        let join_date = to_iso_date(self.today());
        let row = NewMember {
            name: draft.name.trim(),
            email: non_blank(draft.email.as_ref()),
            phone: non_blank(draft.phone.as_ref()),
            join_date: &join_date,
        };

        let member = diesel::insert_into(m::members)
            .values(&row)
            .returning(Member::as_returning())
            .get_result(conn)
            .map_err(|e| email_conflict(e, row.email))?;

        info!(member_id = member.id, name = %member.name, "member added");
        Ok(member)
    }

    fn update_member(
        &self,
        conn: &mut SqliteConnection,
        id: i32,
        draft: &MemberDraft,
    ) -> LibraryResult<Member> {
        draft.validate()?;

        let changes = MemberChanges {
            name: draft.name.trim(),
            email: non_blank(draft.email.as_ref()),
            phone: non_blank(draft.phone.as_ref()),
        };

        let member = diesel::update(m::members.find(id))
            .set(&changes)
            .returning(Member::as_returning())
            .get_result(conn)
            .optional()
            .map_err(|e| email_conflict(e, changes.email))?
            .ok_or_else(|| LibraryError::not_found(Entity::Member, id))?;

        info!(member_id = id, "member updated");
        Ok(member)
    }

    fn delete_member(&self, conn: &mut SqliteConnection, id: i32) -> LibraryResult<()> {
        conn.immediate_transaction::<_, LibraryError, _>(|conn| {
            let open = open_loans_for_member(conn, id)?;
            if open > 0 {
                return Err(LibraryError::OpenLoans {
                    entity: Entity::Member,
                    id,
                    open,
                });
            }

            let n = diesel::delete(m::members.find(id)).execute(conn)?;
            if n == 0 {
                return Err(LibraryError::not_found(Entity::Member, id));
            }
            info!(member_id = id, "member deleted");
            Ok(())
        })
    }

    fn get_member(&self, conn: &mut SqliteConnection, id: i32) -> LibraryResult<Member> {
        find_member(conn, id)
    }

    fn list_members(&self, conn: &mut SqliteConnection) -> LibraryResult<Vec<Member>> {
        let rows = m::members
            .select(Member::as_select())
            .order(m::id.asc())
            .load(conn)?;
        debug!(count = rows.len(), "listed members");
        Ok(rows)
    }
}
