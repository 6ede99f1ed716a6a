// SPDX-License-Identifier: MIT

//! Aggregated statistics over activity log entries.
//!
//! `Breakdown` is the pure accumulation primitive: an associative,
//! order-independent fold of entries into per-activity-type totals plus an
//! "All" pseudo-bucket. The wire shapes (`ClubStats`, `MemberStats`) are
//! consumed by existing dashboards, so field names and nesting are fixed.

use serde::{Deserialize, Serialize};

use crate::models::{ActivityLogEntry, ActivityType, Member};

/// Totals for one activity type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreakdownBucket {
    pub events: u32,
    pub hours: f64,
    pub miles: f64,
    /// Always computed; stripped at the response boundary for callers not
    /// authorized to see monetary fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub money: Option<f64>,
}

impl Default for BreakdownBucket {
    fn default() -> Self {
        Self {
            events: 0,
            hours: 0.0,
            miles: 0.0,
            money: Some(0.0),
        }
    }
}

impl BreakdownBucket {
    fn record(&mut self, entry: &ActivityLogEntry) {
        self.events += 1;
        self.hours += sanitize(entry.hours);
        self.miles += sanitize(entry.miles.unwrap_or(0.0));
        *self.money.get_or_insert(0.0) += sanitize(entry.monies.unwrap_or(0.0));
    }
}

/// Negative or non-finite values must not corrupt aggregate totals.
/// They are rejected upstream at normalization; this is the last line.
fn sanitize(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Per-activity-type totals, keyed on the wire by the type name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    #[serde(rename = "Ride")]
    pub ride: BreakdownBucket,
    #[serde(rename = "Meeting")]
    pub meeting: BreakdownBucket,
    #[serde(rename = "Event")]
    pub event: BreakdownBucket,
    #[serde(rename = "Other")]
    pub other: BreakdownBucket,
    #[serde(rename = "All")]
    pub all: BreakdownBucket,
}

impl Breakdown {
    /// Fold a sequence of entries. Processing order never changes the
    /// result, so callers may pass entries in any order.
    pub fn from_entries<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = &'a ActivityLogEntry>,
    {
        let mut breakdown = Breakdown::default();
        for entry in entries {
            breakdown.record(entry);
        }
        breakdown
    }

    /// Add one entry to its own type's bucket and to "All".
    pub fn record(&mut self, entry: &ActivityLogEntry) {
        self.bucket_mut(entry.activity_type).record(entry);
        self.all.record(entry);
    }

    pub fn bucket(&self, activity_type: ActivityType) -> &BreakdownBucket {
        match activity_type {
            ActivityType::Ride => &self.ride,
            ActivityType::Meeting => &self.meeting,
            ActivityType::Event => &self.event,
            ActivityType::Other => &self.other,
        }
    }

    fn bucket_mut(&mut self, activity_type: ActivityType) -> &mut BreakdownBucket {
        match activity_type {
            ActivityType::Ride => &mut self.ride,
            ActivityType::Meeting => &mut self.meeting,
            ActivityType::Event => &mut self.event,
            ActivityType::Other => &mut self.other,
        }
    }

    fn clear_monies(&mut self) {
        self.ride.money = None;
        self.meeting.money = None;
        self.event.money = None;
        self.other.money = None;
        self.all.money = None;
    }
}

/// Aggregated totals for one member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberStats {
    pub member: Member,
    pub events: u32,
    pub hours: f64,
    pub miles: f64,
    pub breakdown: Breakdown,
}

impl MemberStats {
    pub fn new(member: Member, entries: &[&ActivityLogEntry]) -> Self {
        let breakdown = Breakdown::from_entries(entries.iter().copied());
        Self {
            events: breakdown.all.events,
            hours: breakdown.all.hours,
            miles: breakdown.all.miles,
            member,
            breakdown,
        }
    }

    /// Strip monetary fields and PII for non-officer callers.
    pub fn without_monies(mut self) -> Self {
        self.breakdown.clear_monies();
        self.member = self.member.without_contacts();
        self
    }
}

/// Club-wide statistics. The wire shape is fixed: existing dashboards
/// consume `events`/`hours`/`miles`/`breakdown`/`entriesByMember`/
/// `latestEntries` exactly as spelled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubStats {
    pub events: u32,
    pub hours: f64,
    pub miles: f64,
    pub breakdown: Breakdown,
    pub entries_by_member: Vec<MemberStats>,
    pub latest_entries: Vec<ActivityLogEntry>,
}

impl ClubStats {
    /// Empty/zero state for an empty entry set. Never an error.
    pub fn empty() -> Self {
        Self {
            events: 0,
            hours: 0.0,
            miles: 0.0,
            breakdown: Breakdown::default(),
            entries_by_member: Vec::new(),
            latest_entries: Vec::new(),
        }
    }

    /// Strip monetary fields everywhere for non-officer callers.
    pub fn without_monies(mut self) -> Self {
        self.breakdown.clear_monies();
        self.entries_by_member = self
            .entries_by_member
            .into_iter()
            .map(MemberStats::without_monies)
            .collect();
        self.latest_entries = self
            .latest_entries
            .into_iter()
            .map(ActivityLogEntry::without_monies)
            .collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn entry(
        activity_type: ActivityType,
        hours: f64,
        miles: Option<f64>,
        monies: Option<f64>,
    ) -> ActivityLogEntry {
        ActivityLogEntry {
            name: "Doe, John".to_string(),
            activity_name: "Test".to_string(),
            activity_type,
            date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            hours,
            miles,
            monies,
            created: "2024-01-05T12:00:00Z".parse().unwrap(),
        }
    }

    #[test]
    fn test_breakdown_concrete_scenario() {
        // Two rides (2h/40mi, 3h/60mi) and one meeting (1h/0mi).
        let entries = vec![
            entry(ActivityType::Ride, 2.0, Some(40.0), None),
            entry(ActivityType::Meeting, 1.0, Some(0.0), None),
            entry(ActivityType::Ride, 3.0, Some(60.0), None),
        ];

        let b = Breakdown::from_entries(&entries);

        assert_eq!(b.all.events, 3);
        assert_eq!(b.all.hours, 6.0);
        assert_eq!(b.all.miles, 100.0);
        assert_eq!(b.ride.events, 2);
        assert_eq!(b.ride.hours, 5.0);
        assert_eq!(b.ride.miles, 100.0);
        assert_eq!(b.ride.money, Some(0.0));
        assert_eq!(b.meeting.events, 1);
        assert_eq!(b.meeting.hours, 1.0);
        assert_eq!(b.meeting.miles, 0.0);
        assert_eq!(b.event.events, 0);
        assert_eq!(b.other.events, 0);
    }

    #[test]
    fn test_breakdown_is_order_independent() {
        let forward = vec![
            entry(ActivityType::Ride, 2.0, Some(40.0), Some(10.0)),
            entry(ActivityType::Meeting, 1.0, None, None),
            entry(ActivityType::Event, 4.0, Some(12.5), Some(25.0)),
            entry(ActivityType::Other, 0.5, None, Some(5.0)),
        ];
        let mut reversed = forward.clone();
        reversed.reverse();

        assert_eq!(
            Breakdown::from_entries(&forward),
            Breakdown::from_entries(&reversed)
        );
    }

    #[test]
    fn test_per_type_event_counts_sum_to_all() {
        let entries = vec![
            entry(ActivityType::Ride, 1.0, None, None),
            entry(ActivityType::Ride, 1.0, None, None),
            entry(ActivityType::Meeting, 1.0, None, None),
            entry(ActivityType::Event, 1.0, None, None),
            entry(ActivityType::Other, 1.0, None, None),
        ];

        let b = Breakdown::from_entries(&entries);
        let per_type_sum: u32 = ActivityType::ALL.iter().map(|t| b.bucket(*t).events).sum();

        assert_eq!(per_type_sum, b.all.events);
        assert_eq!(b.all.events as usize, entries.len());
    }

    #[test]
    fn test_missing_optionals_count_as_zero() {
        let entries = vec![entry(ActivityType::Meeting, 1.0, None, None)];
        let b = Breakdown::from_entries(&entries);

        assert_eq!(b.all.miles, 0.0);
        assert_eq!(b.all.money, Some(0.0));
    }

    #[test]
    fn test_negative_and_nan_values_do_not_corrupt_sums() {
        let entries = vec![
            entry(ActivityType::Ride, -3.0, Some(f64::NAN), Some(-20.0)),
            entry(ActivityType::Ride, 2.0, Some(10.0), Some(5.0)),
        ];

        let b = Breakdown::from_entries(&entries);
        assert_eq!(b.all.events, 2);
        assert_eq!(b.all.hours, 2.0);
        assert_eq!(b.all.miles, 10.0);
        assert_eq!(b.all.money, Some(5.0));
    }

    #[test]
    fn test_club_stats_without_monies_strips_every_money_field() {
        let entries = vec![entry(ActivityType::Event, 2.0, Some(5.0), Some(100.0))];
        let stats = ClubStats {
            events: 1,
            hours: 2.0,
            miles: 5.0,
            breakdown: Breakdown::from_entries(&entries),
            entries_by_member: Vec::new(),
            latest_entries: entries,
        };

        let redacted = stats.without_monies();
        let json = serde_json::to_value(&redacted).unwrap();

        assert!(json["breakdown"]["All"].get("money").is_none());
        assert!(json["breakdown"]["Event"].get("money").is_none());
        assert!(json["latestEntries"][0].get("monies").is_none());
        // Non-monetary totals survive redaction.
        assert_eq!(json["breakdown"]["All"]["miles"], 5.0);
    }

    #[test]
    fn test_breakdown_wire_keys() {
        let json = serde_json::to_value(Breakdown::default()).unwrap();
        for key in ["Ride", "Meeting", "Event", "Other", "All"] {
            assert!(json.get(key).is_some(), "missing breakdown key {key}");
        }
    }
}
