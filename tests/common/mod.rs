// SPDX-License-Identifier: MIT

use chapter_roster::config::Config;
use chapter_roster::middleware::auth::create_jwt;
use chapter_roster::models::{ActivityLogEntry, ActivityType, Member, MemberRole};
use chapter_roster::routes::create_router;
use chapter_roster::services::SheetsService;
use chapter_roster::AppState;
use chrono::{NaiveDate, TimeZone, Utc};
use std::sync::Arc;

/// Create a test app over a mock Sheets backend seeded with `entries` and
/// `members`. Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app(
    entries: Vec<ActivityLogEntry>,
    members: Vec<Member>,
) -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let sheets = SheetsService::new_mock(entries, members);

    let state = Arc::new(AppState { config, sheets });
    (create_router(state.clone()), state)
}

/// Mint a JWT signed with the test config's key.
#[allow(dead_code)]
pub fn test_jwt(member_id: &str, is_officer: bool) -> String {
    let config = Config::test_default();
    create_jwt(member_id, is_officer, &config.jwt_signing_key).expect("JWT creation failed")
}

/// Roster member fixture: an active rider named "Last, First".
#[allow(dead_code)]
pub fn rider(id: &str, first: &str, last: &str) -> Member {
    Member {
        id: id.to_string(),
        name: format!("{} {}", first, last),
        log_name: Member::log_name_of(first, last, None),
        role: MemberRole::Rider,
        office: None,
        is_active: true,
        is_lifetime_member: false,
        is_past_president: false,
        joined: NaiveDate::from_ymd_opt(2020, 1, 15),
        entities: vec![chapter_roster::models::Entity::Legion],
        emergency_contact: None,
    }
}

/// Activity log entry fixture submitted under `name`.
#[allow(dead_code)]
pub fn entry(
    name: &str,
    activity_type: ActivityType,
    date: NaiveDate,
    hours: f64,
    miles: Option<f64>,
) -> ActivityLogEntry {
    ActivityLogEntry {
        name: name.to_string(),
        activity_name: format!("{} on {}", activity_type, date),
        activity_type,
        date,
        hours,
        miles,
        monies: Some(5.0),
        created: Utc.from_utc_datetime(&date.and_hms_opt(12, 0, 0).unwrap()),
    }
}

/// Read a response body into JSON.
#[allow(dead_code)]
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    serde_json::from_slice(&bytes).expect("Body was not valid JSON")
}
