//! Calendar helpers.
//!
//! Loans and memberships only care about the calendar day, so everything here
//! works on [`NaiveDate`] and the database holds ISO `YYYY-MM-DD` strings.
//! The current day comes from a [`Clock`] so tests can pin it.

use anyhow::Context;
use chrono::{Local, NaiveDate};

/// ISO calendar date format used in every date column.
pub const ISO_DATE: &str = "%Y-%m-%d";

/// Source of "today".
pub trait Clock {
    /// The current calendar day.
    fn today(&self) -> NaiveDate;
}

/// Local wall-clock date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock stuck on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// `2024-03-10` style rendering for storage.
pub fn to_iso_date(date: NaiveDate) -> String {
    date.format(ISO_DATE).to_string()
}

/// Parse a stored `YYYY-MM-DD` column back into a date.
pub fn parse_iso_date(s: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, ISO_DATE).with_context(|| format!("bad iso date: {s}"))
}
