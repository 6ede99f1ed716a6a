// SPDX-License-Identifier: MIT

//! Club-wide and per-member statistics over activity log entries.
//!
//! Everything here is a pure function over caller-owned slices: inputs are
//! never mutated and repeated calls on the same input produce identical
//! output. Grouping and summation are insensitive to entry ordering; the
//! only order-sensitive output is `latestEntries`, which depends solely on
//! each entry's `created` timestamp.

use std::collections::HashMap;
use std::str::FromStr;

use crate::models::{ActivityLogEntry, ClubStats, Member, MemberStats};

/// How many recent submissions the dashboard shows.
pub const LATEST_ENTRIES_COUNT: usize = 10;

/// Numeric field a top-N projection can rank by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatKey {
    Events,
    Hours,
    Miles,
    Rides,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown stat key: {0:?}")]
pub struct UnknownStatKey(pub String);

impl FromStr for StatKey {
    type Err = UnknownStatKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "events" => Ok(StatKey::Events),
            "hours" => Ok(StatKey::Hours),
            "miles" => Ok(StatKey::Miles),
            "rides" => Ok(StatKey::Rides),
            _ => Err(UnknownStatKey(s.to_string())),
        }
    }
}

/// Compute club-wide statistics over `entries`.
///
/// `member_filter` restricts which roster members participate (callers
/// usually pass `Member::is_active`-style predicates). Entry disposition:
///
/// - matched to a member passing the filter: counted everywhere;
/// - matched to a member the filter rejects: excluded entirely;
/// - matched to no roster member: counted in club totals and
///   `latestEntries`, never in `entriesByMember`.
pub fn compute_club_stats<F>(
    entries: &[ActivityLogEntry],
    members: &[Member],
    member_filter: F,
) -> ClubStats
where
    F: Fn(&Member) -> bool,
{
    if entries.is_empty() {
        return ClubStats::empty();
    }

    let roster: HashMap<&str, &Member> = members
        .iter()
        .map(|m| (m.log_name.as_str(), m))
        .collect();

    let mut included: Vec<&ActivityLogEntry> = Vec::with_capacity(entries.len());
    let mut by_log_name: HashMap<&str, Vec<&ActivityLogEntry>> = HashMap::new();

    for entry in entries {
        match roster.get(entry.name.trim()) {
            Some(member) if member_filter(member) => {
                included.push(entry);
                by_log_name
                    .entry(member.log_name.as_str())
                    .or_default()
                    .push(entry);
            }
            Some(_) => {} // matched but filtered out
            None => included.push(entry), // club totals only
        }
    }

    // Roster order keeps entriesByMember deterministic regardless of how
    // the entry sequence was permuted.
    let entries_by_member: Vec<MemberStats> = members
        .iter()
        .filter_map(|member| {
            by_log_name
                .get(member.log_name.as_str())
                .map(|member_entries| MemberStats::new(member.clone(), member_entries))
        })
        .collect();

    let breakdown = crate::models::Breakdown::from_entries(included.iter().copied());
    let latest_entries = latest_entries(&included, LATEST_ENTRIES_COUNT);

    ClubStats {
        events: breakdown.all.events,
        hours: breakdown.all.hours,
        miles: breakdown.all.miles,
        breakdown,
        entries_by_member,
        latest_entries,
    }
}

/// Group entries by roster member (matched on `log_name`), one
/// `MemberStats` per member with at least one matching entry.
pub fn group_entries_by_member<F>(
    entries: &[ActivityLogEntry],
    members: &[Member],
    member_filter: F,
) -> Vec<MemberStats>
where
    F: Fn(&Member) -> bool,
{
    compute_club_stats(entries, members, member_filter).entries_by_member
}

/// The `count` most recently submitted entries, newest first.
///
/// Stable with respect to the input sequence so ties on `created` keep
/// their original relative order.
fn latest_entries(entries: &[&ActivityLogEntry], count: usize) -> Vec<ActivityLogEntry> {
    let mut sorted: Vec<&ActivityLogEntry> = entries.to_vec();
    sorted.sort_by(|a, b| b.created.cmp(&a.created));
    sorted.into_iter().take(count).cloned().collect()
}

/// Rank members descending by `key` and take the first `n`.
///
/// Ties preserve the relative order of `stats` (stable sort).
pub fn top_n(stats: &[MemberStats], key: StatKey, n: usize) -> Vec<MemberStats> {
    let mut ranked: Vec<&MemberStats> = stats.iter().collect();
    ranked.sort_by(|a, b| stat_value(b, key).total_cmp(&stat_value(a, key)));
    ranked.into_iter().take(n).cloned().collect()
}

fn stat_value(stats: &MemberStats, key: StatKey) -> f64 {
    match key {
        StatKey::Events => f64::from(stats.events),
        StatKey::Hours => stats.hours,
        StatKey::Miles => stats.miles,
        StatKey::Rides => f64::from(stats.breakdown.ride.events),
    }
}
