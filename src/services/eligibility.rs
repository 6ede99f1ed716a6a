// SPDX-License-Identifier: MIT

//! Yearly participation-eligibility evaluation.
//!
//! Pure per-member rules over a year window of activity. Rider roles must
//! meet both a ride quota and a separate event quota; rides never count
//! toward the event quota, so riding more than the minimum cannot replace
//! attending events. Non-rider active roles have a flat event quota.
//!
//! Exempt members (lifetime, office holders, joined after the window's
//! midpoint) are skipped here so they can never land in an at-risk report.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::dates::DateWindow;
use crate::models::{ActivityLogEntry, ActivityType, Member};

/// Organization-wide participation minimums. Deployment configuration, not
/// hardcoded business logic (see `Config::thresholds`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thresholds {
    pub min_rides: u32,
    pub min_events: u32,
}

/// Eligibility outcome for one evaluated member.
///
/// `rides` is the quota-qualifying ride count (clipped at `min_rides`);
/// `events` is the qualifying non-ride event count for rider roles, or the
/// total event count for non-rider roles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityResult {
    pub member: Member,
    pub eligible: bool,
    pub rides: u32,
    pub events: u32,
}

/// Whether a member is excluded from the at-risk population for `window`.
pub fn is_exempt(member: &Member, window: &DateWindow) -> bool {
    if member.is_lifetime_member || member.is_officer() {
        return true;
    }
    // Joined in the second half of the evaluation year: too new to hold to
    // the full-year minimums.
    member
        .joined
        .is_some_and(|joined| joined > window.midpoint())
}

/// Evaluate one member against `thresholds`, over entries already filtered
/// to the evaluation window.
pub fn evaluate_member(
    member: &Member,
    entries: &[&ActivityLogEntry],
    thresholds: &Thresholds,
) -> EligibilityResult {
    let total_events = entries.len() as u32;
    let total_rides = entries
        .iter()
        .filter(|e| e.activity_type == ActivityType::Ride)
        .count() as u32;

    let qualifying_rides = total_rides.min(thresholds.min_rides);

    let (eligible, events) = if member.role.is_rider() {
        // All rides are excluded from the event tally: up to min_rides they
        // satisfy the ride quota, past it they count toward nothing.
        let non_ride_events = total_events - total_rides;
        let has_rides = total_rides >= thresholds.min_rides;
        let has_events = non_ride_events >= thresholds.min_events;
        (has_rides && has_events, non_ride_events)
    } else {
        (total_events >= thresholds.min_events, total_events)
    };

    EligibilityResult {
        member: member.clone(),
        eligible,
        rides: qualifying_rides,
        events,
    }
}

/// Evaluate every active-role, non-exempt member for `window`.
///
/// `entries_by_member` is keyed by `Member::log_name`; entries outside the
/// window are ignored, so callers may pass pre-filtered or raw groupings.
pub fn evaluate_eligibility(
    members: &[Member],
    entries_by_member: &HashMap<String, Vec<ActivityLogEntry>>,
    window: &DateWindow,
    thresholds: &Thresholds,
) -> Vec<EligibilityResult> {
    static NO_ENTRIES: Vec<ActivityLogEntry> = Vec::new();

    members
        .iter()
        .filter(|m| m.is_active && m.role.is_active_role())
        .filter(|m| !is_exempt(m, window))
        .map(|member| {
            let in_window: Vec<&ActivityLogEntry> = entries_by_member
                .get(&member.log_name)
                .unwrap_or(&NO_ENTRIES)
                .iter()
                .filter(|e| window.contains(e.date))
                .collect();
            evaluate_member(member, &in_window, thresholds)
        })
        .collect()
}

/// Group raw entries by submitted member name, trimmed.
pub fn group_by_log_name(entries: &[ActivityLogEntry]) -> HashMap<String, Vec<ActivityLogEntry>> {
    let mut grouped: HashMap<String, Vec<ActivityLogEntry>> = HashMap::new();
    for entry in entries {
        grouped
            .entry(entry.name.trim().to_string())
            .or_default()
            .push(entry.clone());
    }
    grouped
}
