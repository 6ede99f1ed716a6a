// SPDX-License-Identifier: MIT

//! Activity log entry model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of activity categories.
///
/// Anything outside this set is rejected at the normalization boundary;
/// aggregation code can assume every entry carries a valid type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivityType {
    Ride,
    Meeting,
    Event,
    Other,
}

impl ActivityType {
    /// All variants, in breakdown display order.
    pub const ALL: [ActivityType; 4] = [
        ActivityType::Ride,
        ActivityType::Meeting,
        ActivityType::Event,
        ActivityType::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ActivityType::Ride => "Ride",
            ActivityType::Meeting => "Meeting",
            ActivityType::Event => "Event",
            ActivityType::Other => "Other",
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a log row carries an activity type outside the closed set.
#[derive(Debug, thiserror::Error)]
#[error("unknown activity type: {0:?}")]
pub struct UnknownActivityType(pub String);

impl FromStr for ActivityType {
    type Err = UnknownActivityType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ride" => Ok(ActivityType::Ride),
            "meeting" => Ok(ActivityType::Meeting),
            "event" => Ok(ActivityType::Event),
            "other" => Ok(ActivityType::Other),
            _ => Err(UnknownActivityType(s.to_string())),
        }
    }
}

/// One submitted activity record, normalized from a spreadsheet row.
///
/// Immutable once ingested. `miles` and `monies` distinguish "not recorded"
/// (`None`) from an explicit zero; sums treat `None` as 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogEntry {
    /// Member name as typed at submission time ("Last, First [Suffix]").
    /// May not match any current roster member.
    pub name: String,
    /// Free-text label of the specific activity (e.g. "Monthly Meeting").
    pub activity_name: String,
    pub activity_type: ActivityType,
    /// When the activity occurred.
    pub date: NaiveDate,
    pub hours: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub miles: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monies: Option<f64>,
    /// Submission timestamp, drives "latest entries" ordering.
    pub created: DateTime<Utc>,
}

impl ActivityLogEntry {
    /// Strip the monetary field for callers not authorized to see it.
    pub fn without_monies(mut self) -> Self {
        self.monies = None;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_type_parses_case_insensitively() {
        assert_eq!("Ride".parse::<ActivityType>().unwrap(), ActivityType::Ride);
        assert_eq!(
            "meeting".parse::<ActivityType>().unwrap(),
            ActivityType::Meeting
        );
        assert_eq!(
            " EVENT ".parse::<ActivityType>().unwrap(),
            ActivityType::Event
        );
        assert_eq!(
            "other".parse::<ActivityType>().unwrap(),
            ActivityType::Other
        );
    }

    #[test]
    fn test_activity_type_rejects_unknown_values() {
        let err = "Fundraiser".parse::<ActivityType>().unwrap_err();
        assert!(err.to_string().contains("Fundraiser"));
    }

    #[test]
    fn test_entry_serializes_camel_case_and_omits_unset_fields() {
        let entry = ActivityLogEntry {
            name: "Doe, John".to_string(),
            activity_name: "Monthly Meeting".to_string(),
            activity_type: ActivityType::Meeting,
            date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            hours: 1.5,
            miles: None,
            monies: None,
            created: "2024-01-10T20:00:00Z".parse().unwrap(),
        };

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["activityName"], "Monthly Meeting");
        assert_eq!(json["activityType"], "Meeting");
        assert!(json.get("miles").is_none());
        assert!(json.get("monies").is_none());
    }
}
