//! SQLite-backed implementation of the service traits.
//!
//! [`SqliteRepo`] carries no connection: every call receives the
//! `&mut SqliteConnection` it should run on, so the caller decides how long a
//! handle lives. The only state is the [`Clock`] used for issue, return, and
//! join dates.
//!
//! The trait impls live next to their traits:
//! [`crate::catalog::repo`], [`crate::membership::repo`], [`crate::circulation::repo`].

use chrono::NaiveDate;

use crate::clock::{Clock, SystemClock};

/// Repository implementing [`crate::catalog::CatalogRepo`],
/// [`crate::membership::MembershipRepo`], and
/// [`crate::circulation::CirculationRepo`] on SQLite.
#[derive(Debug, Clone, Default)]
pub struct SqliteRepo<C = SystemClock> {
    clock: C,
}

impl SqliteRepo {
    /// Repository dated by the local wall clock.
    pub fn new() -> Self {
        Self { clock: SystemClock }
    }
}

impl<C: Clock> SqliteRepo<C> {
    /// Repository dated by `clock`.
    pub fn with_clock(clock: C) -> Self {
        Self { clock }
    }

    /// Today according to the configured clock.
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }
}
