// SPDX-License-Identifier: MIT

//! Shared date-range predicates for entry/member filtering.
//!
//! The chapter's membership year ("legion year") runs July 1 through
//! June 30. That cutoff is a fixed organizational rule, not per-call
//! configuration.

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::Serialize;

/// First month of the legion year (July, 1-based).
const LEGION_YEAR_START_MONTH: u32 = 7;

/// Bound handling for [`is_between`], `Closed` meaning inclusive on both
/// ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bounds {
    Closed,
    Open,
    ClosedOpen,
    OpenClosed,
}

/// Range test over dates with selectable bound handling.
pub fn is_between(date: NaiveDate, start: NaiveDate, end: NaiveDate, bounds: Bounds) -> bool {
    let after_start = match bounds {
        Bounds::Closed | Bounds::ClosedOpen => date >= start,
        Bounds::Open | Bounds::OpenClosed => date > start,
    };
    let before_end = match bounds {
        Bounds::Closed | Bounds::OpenClosed => date <= end,
        Bounds::Open | Bounds::ClosedOpen => date < end,
    };
    after_start && before_end
}

/// An inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// The legion year containing `reference`: starts July 1 of the
    /// reference year when the reference falls in July or later, otherwise
    /// July 1 of the prior year; ends one year minus one day after.
    pub fn legion_year(reference: NaiveDate) -> Self {
        let start_year = if reference.month() >= LEGION_YEAR_START_MONTH {
            reference.year()
        } else {
            reference.year() - 1
        };
        Self::legion_year_starting(start_year)
    }

    /// The legion year starting July 1 of `year`.
    pub fn legion_year_starting(year: i32) -> Self {
        let start = july_first(year);
        let end = start
            .checked_add_months(Months::new(12))
            .and_then(|d| d.checked_sub_days(Days::new(1)))
            .unwrap_or(start);
        Self { start, end }
    }

    /// January 1 through December 31 of `year`.
    pub fn calendar_year(year: i32) -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(year, 12, 31).unwrap_or_default(),
        }
    }

    /// The `days`-day window ending at `reference` (inclusive).
    pub fn last_days(reference: NaiveDate, days: u64) -> Self {
        let start = reference
            .checked_sub_days(Days::new(days.saturating_sub(1)))
            .unwrap_or(reference);
        Self {
            start,
            end: reference,
        }
    }

    /// Closed-range membership test.
    pub fn contains(&self, date: NaiveDate) -> bool {
        is_between(date, self.start, self.end, Bounds::Closed)
    }

    /// The window's midpoint, used as the join-date cutoff for eligibility
    /// exemptions (six months into the window).
    pub fn midpoint(&self) -> NaiveDate {
        self.start
            .checked_add_months(Months::new(6))
            .unwrap_or(self.end)
    }
}

fn july_first(year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, LEGION_YEAR_START_MONTH, 1).unwrap_or_default()
}
