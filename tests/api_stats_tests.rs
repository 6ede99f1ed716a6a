// SPDX-License-Identifier: MIT

//! Club statistics endpoint tests over the mock Sheets backend.
//!
//! Covers the wire contract (camelCase keys, breakdown bucket names),
//! officer-only monetary fields, and window filtering.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use chapter_roster::models::{ActivityType, Member};
use chrono::NaiveDate;
use tower::ServiceExt;

mod common;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn seed() -> (Vec<chapter_roster::models::ActivityLogEntry>, Vec<Member>) {
    let members = vec![
        common::rider("1", "John", "Doe"),
        common::rider("2", "Jane", "Smith"),
    ];
    let entries = vec![
        common::entry("Doe, John", ActivityType::Ride, date(2024, 8, 10), 3.0, Some(120.0)),
        common::entry("Doe, John", ActivityType::Meeting, date(2024, 9, 5), 1.5, None),
        common::entry("Smith, Jane", ActivityType::Event, date(2024, 10, 1), 4.0, None),
        // Prior legion year; excluded by the default window at year=2024
        common::entry("Smith, Jane", ActivityType::Ride, date(2024, 5, 20), 2.0, Some(60.0)),
    ];
    (entries, members)
}

async fn get_json(
    app: axum::Router,
    uri: &str,
    token: &str,
) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(uri)
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    (status, common::body_json(response).await)
}

#[tokio::test]
async fn test_club_stats_wire_shape() {
    let (entries, members) = seed();
    let (app, _) = common::create_test_app(entries, members);
    let token = common::test_jwt("1", true);

    let (status, body) = get_json(app, "/api/stats/club?window=legion&year=2024", &token).await;
    assert_eq!(status, StatusCode::OK);

    // Totals: the 2024-05-20 ride falls in the prior legion year
    assert_eq!(body["events"], 3);
    assert_eq!(body["hours"], 8.5);
    assert_eq!(body["miles"], 120.0);

    // Breakdown buckets use the activity-type display names plus "All"
    assert_eq!(body["breakdown"]["Ride"]["events"], 1);
    assert_eq!(body["breakdown"]["Meeting"]["events"], 1);
    assert_eq!(body["breakdown"]["Event"]["events"], 1);
    assert_eq!(body["breakdown"]["Other"]["events"], 0);
    assert_eq!(body["breakdown"]["All"]["events"], 3);

    // entriesByMember follows roster order
    let by_member = body["entriesByMember"].as_array().unwrap();
    assert_eq!(by_member.len(), 2);
    assert_eq!(by_member[0]["member"]["name"], "John Doe");
    assert_eq!(by_member[1]["member"]["name"], "Jane Smith");

    // latestEntries newest first
    let latest = body["latestEntries"].as_array().unwrap();
    assert_eq!(latest.len(), 3);
    assert_eq!(latest[0]["date"], "2024-10-01");
    assert_eq!(latest[0]["activityType"], "Event");
}

#[tokio::test]
async fn test_club_stats_all_window_includes_everything() {
    let (entries, members) = seed();
    let (app, _) = common::create_test_app(entries, members);
    let token = common::test_jwt("1", true);

    let (status, body) = get_json(app, "/api/stats/club?window=all", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["events"], 4);
    assert_eq!(body["breakdown"]["Ride"]["events"], 2);
}

#[tokio::test]
async fn test_club_stats_monies_redacted_for_non_officers() {
    let (entries, members) = seed();
    let (app, _) = common::create_test_app(entries.clone(), members.clone());
    let token = common::test_jwt("1", false);

    let (status, body) = get_json(app, "/api/stats/club?window=all", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["breakdown"]["All"].get("money").is_none());
    for member_stats in body["entriesByMember"].as_array().unwrap() {
        assert!(member_stats["breakdown"]["All"].get("money").is_none());
    }
    for entry in body["latestEntries"].as_array().unwrap() {
        assert!(entry.get("monies").is_none());
    }

    // Officers see the same aggregation with money intact
    let (app, _) = common::create_test_app(entries, members);
    let officer = common::test_jwt("1", true);
    let (_, body) = get_json(app, "/api/stats/club?window=all", &officer).await;
    assert_eq!(body["breakdown"]["All"]["money"], 20.0);
}

#[tokio::test]
async fn test_club_stats_empty_log() {
    let (app, _) = common::create_test_app(vec![], vec![common::rider("1", "John", "Doe")]);
    let token = common::test_jwt("1", true);

    let (status, body) = get_json(app, "/api/stats/club?window=all", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["events"], 0);
    assert_eq!(body["entriesByMember"].as_array().unwrap().len(), 0);
    assert_eq!(body["latestEntries"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_club_stats_rejects_bad_window() {
    let (app, _) = common::create_test_app(vec![], vec![]);
    let token = common::test_jwt("1", false);

    let (status, body) = get_json(app, "/api/stats/club?window=fiscal", &token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
    assert!(body["details"].as_str().unwrap().contains("window"));
}

#[tokio::test]
async fn test_top_members_ranking() {
    let (entries, members) = seed();
    let (app, _) = common::create_test_app(entries, members);
    let token = common::test_jwt("1", true);

    let (status, body) = get_json(app, "/api/stats/top?key=hours&window=all", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["key"], "hours");

    let top = body["members"].as_array().unwrap();
    assert_eq!(top.len(), 2);
    // Jane: 4.0 + 2.0 hours; John: 3.0 + 1.5
    assert_eq!(top[0]["member"]["name"], "Jane Smith");
    assert_eq!(top[0]["hours"], 6.0);
    assert_eq!(top[1]["member"]["name"], "John Doe");
}

#[tokio::test]
async fn test_top_members_respects_n() {
    let (entries, members) = seed();
    let (app, _) = common::create_test_app(entries, members);
    let token = common::test_jwt("1", true);

    let (status, body) = get_json(app, "/api/stats/top?key=rides&n=1&window=all", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["members"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_top_members_rejects_unknown_key() {
    let (app, _) = common::create_test_app(vec![], vec![]);
    let token = common::test_jwt("1", false);

    let (status, _) = get_json(app, "/api/stats/top?key=karma", &token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
