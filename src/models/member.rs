// SPDX-License-Identifier: MIT

//! Roster member model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Membership role. Rider roles carry a ride quota on top of the event
/// quota; supporter roles have a flat event quota; retired members are not
/// part of the active-role set at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemberRole {
    Rider,
    Supporter,
    CandidateSupporter,
    Retired,
}

impl MemberRole {
    /// Whether this role is subject to the ride-count minimum.
    pub fn is_rider(self) -> bool {
        matches!(self, MemberRole::Rider)
    }

    /// Static classification of roles that count as "active" for roster
    /// filtering and eligibility evaluation, independent of any member.
    pub fn is_active_role(self) -> bool {
        matches!(
            self,
            MemberRole::Rider | MemberRole::Supporter | MemberRole::CandidateSupporter
        )
    }
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MemberRole::Rider => "Rider",
            MemberRole::Supporter => "Supporter",
            MemberRole::CandidateSupporter => "Candidate Supporter",
            MemberRole::Retired => "Retired",
        };
        f.write_str(s)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown member role: {0:?}")]
pub struct UnknownRole(pub String);

impl FromStr for MemberRole {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rider" => Ok(MemberRole::Rider),
            "supporter" | "support" => Ok(MemberRole::Supporter),
            "candidate supporter" | "candidate" | "prospect" => Ok(MemberRole::CandidateSupporter),
            "retired" => Ok(MemberRole::Retired),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

/// Parent-organization affiliation required for chapter membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Entity {
    Legion,
    Auxiliary,
    SonsOfTheAmericanLegion,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown entity: {0:?}")]
pub struct UnknownEntity(pub String);

impl FromStr for Entity {
    type Err = UnknownEntity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legion" | "american legion" => Ok(Entity::Legion),
            "auxiliary" | "alr auxiliary" => Ok(Entity::Auxiliary),
            "sal" | "sons" | "sons of the american legion" => Ok(Entity::SonsOfTheAmericanLegion),
            _ => Err(UnknownEntity(s.to_string())),
        }
    }
}

/// Emergency contact captured on the roster. Officer-only on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub name: String,
    pub phone: String,
}

/// Normalized roster member.
///
/// Both name forms are fixed once at normalization: `name` for display and
/// `log_name` ("Last, First[ Suffix]") as the key activity-log submissions
/// are matched against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: String,
    pub name: String,
    pub log_name: String,
    pub role: MemberRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub office: Option<String>,
    pub is_active: bool,
    #[serde(rename = "isLifeTimeMember")]
    pub is_lifetime_member: bool,
    pub is_past_president: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub joined: Option<NaiveDate>,
    pub entities: Vec<Entity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_contact: Option<EmergencyContact>,
}

impl Member {
    /// Build the canonical "Last, First[ Suffix]" log-matching key.
    pub fn log_name_of(first: &str, last: &str, suffix: Option<&str>) -> String {
        match suffix {
            Some(sfx) if !sfx.trim().is_empty() => {
                format!("{}, {} {}", last.trim(), first.trim(), sfx.trim())
            }
            _ => format!("{}, {}", last.trim(), first.trim()),
        }
    }

    /// Whether this member holds a chapter office.
    pub fn is_officer(&self) -> bool {
        self.office.is_some()
    }

    /// Strip fields not shown to regular members.
    pub fn without_contacts(mut self) -> Self {
        self.emergency_contact = None;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_name_with_and_without_suffix() {
        assert_eq!(Member::log_name_of("John", "Doe", None), "Doe, John");
        assert_eq!(
            Member::log_name_of(" John ", " Doe ", Some("Jr")),
            "Doe, John Jr"
        );
        assert_eq!(Member::log_name_of("John", "Doe", Some("  ")), "Doe, John");
    }

    #[test]
    fn test_role_classification() {
        assert!(MemberRole::Rider.is_rider());
        assert!(!MemberRole::Supporter.is_rider());

        assert!(MemberRole::Rider.is_active_role());
        assert!(MemberRole::Supporter.is_active_role());
        assert!(MemberRole::CandidateSupporter.is_active_role());
        assert!(!MemberRole::Retired.is_active_role());
    }

    #[test]
    fn test_role_parsing_aliases() {
        assert_eq!(
            "prospect".parse::<MemberRole>().unwrap(),
            MemberRole::CandidateSupporter
        );
        assert_eq!(
            "Support".parse::<MemberRole>().unwrap(),
            MemberRole::Supporter
        );
        assert!("road captain".parse::<MemberRole>().is_err());
    }

    #[test]
    fn test_entity_parsing() {
        assert_eq!("SAL".parse::<Entity>().unwrap(), Entity::SonsOfTheAmericanLegion);
        assert_eq!("Legion".parse::<Entity>().unwrap(), Entity::Legion);
        assert!("vfw".parse::<Entity>().is_err());
    }

    #[test]
    fn test_lifetime_flag_serializes_with_exact_key() {
        let member = Member {
            id: "42".to_string(),
            name: "John Doe".to_string(),
            log_name: "Doe, John".to_string(),
            role: MemberRole::Rider,
            office: None,
            is_active: true,
            is_lifetime_member: true,
            is_past_president: false,
            joined: None,
            entities: vec![Entity::Legion],
            emergency_contact: None,
        };

        let json = serde_json::to_value(&member).unwrap();
        assert_eq!(json["isLifeTimeMember"], true);
        assert_eq!(json["isPastPresident"], false);
        assert!(json.get("office").is_none());
    }
}
