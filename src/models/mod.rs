// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod entry;
pub mod member;
pub mod stats;

pub use entry::{ActivityLogEntry, ActivityType, UnknownActivityType};
pub use member::{EmergencyContact, Entity, Member, MemberRole};
pub use stats::{Breakdown, BreakdownBucket, ClubStats, MemberStats};
