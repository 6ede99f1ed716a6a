// SPDX-License-Identifier: MIT

//! Google Sheets datastore access and row normalization.
//!
//! The roster and activity log live in a shared spreadsheet. This module
//! is the only place raw rows are touched: every row is mapped into the
//! typed `Member` / `ActivityLogEntry` models here, at the system
//! boundary, and the aggregation/eligibility core never sees column
//! positions or cell strings.
//!
//! Row policy: rows with an unparseable date or a blank name are skipped
//! with a warning (the submission form produced garbage); a row with an
//! activity type outside the closed set is a hard error, because the form
//! constrains that field and an unknown value means the upstream contract
//! is broken. Negative or non-numeric amounts are clamped to zero.

use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use dashmap::DashMap;
use serde::Deserialize;

use crate::error::AppError;
use crate::models::{ActivityLogEntry, ActivityType, EmergencyContact, Member, MemberRole};

/// A1 range of the activity log sheet (header row excluded).
const ACTIVITY_LOG_RANGE: &str = "Activity Log!A2:H";
/// A1 range of the roster sheet (header row excluded).
const ROSTER_RANGE: &str = "Roster!A2:M";

/// How long normalized rows are served from cache before re-fetching.
const CACHE_TTL_SECS: u64 = 60;

// ─────────────────────────────────────────────────────────────────────────────
// SheetsClient - thin HTTP client for the spreadsheets.values API
// ─────────────────────────────────────────────────────────────────────────────

/// Google Sheets API client.
#[derive(Clone)]
pub struct SheetsClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl SheetsClient {
    pub fn new(api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: "https://sheets.googleapis.com/v4".to_string(),
            api_key,
        }
    }

    /// Fetch one A1 range of a spreadsheet.
    pub async fn get_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<ValueRange, AppError> {
        let url = format!(
            "{}/spreadsheets/{}/values/{}",
            self.base_url,
            spreadsheet_id,
            urlencoding::encode(range)
        );

        let response = self
            .http
            .get(&url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("valueRenderOption", "FORMATTED_VALUE"),
            ])
            .send()
            .await
            .map_err(|e| AppError::SheetsApi(e.to_string()))?;

        self.check_response_json(response).await
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                tracing::warn!("Sheets API rate limit hit (429)");
                return Err(AppError::SheetsApi("rate limited".to_string()));
            }

            return Err(AppError::SheetsApi(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::SheetsApi(format!("JSON parse error: {}", e)))
    }
}

/// Response shape of `spreadsheets.values.get`.
#[derive(Debug, Clone, Deserialize)]
pub struct ValueRange {
    #[serde(default)]
    pub values: Vec<Vec<String>>,
}

// ─────────────────────────────────────────────────────────────────────────────
// SheetsService - normalized, cached access to roster and activity log
// ─────────────────────────────────────────────────────────────────────────────

enum Backend {
    Live {
        client: SheetsClient,
        spreadsheet_id: String,
    },
    /// Offline fixtures for tests; no HTTP, no cache.
    Mock {
        entries: Vec<ActivityLogEntry>,
        members: Vec<Member>,
    },
}

struct CachedRows<T> {
    fetched_at: Instant,
    rows: Vec<T>,
}

/// High-level datastore handle. Explicitly constructed and passed through
/// `AppState`; there is no process-global client.
#[derive(Clone)]
pub struct SheetsService {
    backend: Arc<Backend>,
    entry_cache: Arc<DashMap<&'static str, CachedRows<ActivityLogEntry>>>,
    member_cache: Arc<DashMap<&'static str, CachedRows<Member>>>,
    cache_ttl: Duration,
}

impl SheetsService {
    pub fn new(api_key: String, spreadsheet_id: String) -> Self {
        Self {
            backend: Arc::new(Backend::Live {
                client: SheetsClient::new(api_key),
                spreadsheet_id,
            }),
            entry_cache: Arc::new(DashMap::new()),
            member_cache: Arc::new(DashMap::new()),
            cache_ttl: Duration::from_secs(CACHE_TTL_SECS),
        }
    }

    /// Offline service backed by in-memory fixtures (for tests).
    pub fn new_mock(entries: Vec<ActivityLogEntry>, members: Vec<Member>) -> Self {
        Self {
            backend: Arc::new(Backend::Mock { entries, members }),
            entry_cache: Arc::new(DashMap::new()),
            member_cache: Arc::new(DashMap::new()),
            cache_ttl: Duration::ZERO,
        }
    }

    /// All normalized activity log entries.
    pub async fn entries(&self) -> Result<Vec<ActivityLogEntry>, AppError> {
        match self.backend.as_ref() {
            Backend::Mock { entries, .. } => Ok(entries.clone()),
            Backend::Live {
                client,
                spreadsheet_id,
            } => {
                if let Some(cached) = self.entry_cache.get("entries") {
                    if cached.fetched_at.elapsed() < self.cache_ttl {
                        return Ok(cached.rows.clone());
                    }
                }

                let range = client.get_values(spreadsheet_id, ACTIVITY_LOG_RANGE).await?;
                let rows = normalize_entries(&range.values)?;
                tracing::debug!(count = rows.len(), "Activity log fetched");

                self.entry_cache.insert(
                    "entries",
                    CachedRows {
                        fetched_at: Instant::now(),
                        rows: rows.clone(),
                    },
                );
                Ok(rows)
            }
        }
    }

    /// Entries passing a caller-supplied predicate.
    pub async fn entries_where<F>(&self, predicate: F) -> Result<Vec<ActivityLogEntry>, AppError>
    where
        F: Fn(&ActivityLogEntry) -> bool,
    {
        Ok(self.entries().await?.into_iter().filter(|e| predicate(e)).collect())
    }

    /// All normalized roster members.
    pub async fn members(&self) -> Result<Vec<Member>, AppError> {
        match self.backend.as_ref() {
            Backend::Mock { members, .. } => Ok(members.clone()),
            Backend::Live {
                client,
                spreadsheet_id,
            } => {
                if let Some(cached) = self.member_cache.get("members") {
                    if cached.fetched_at.elapsed() < self.cache_ttl {
                        return Ok(cached.rows.clone());
                    }
                }

                let range = client.get_values(spreadsheet_id, ROSTER_RANGE).await?;
                let rows = normalize_members(&range.values, Utc::now().date_naive().year());
                tracing::debug!(count = rows.len(), "Roster fetched");

                self.member_cache.insert(
                    "members",
                    CachedRows {
                        fetched_at: Instant::now(),
                        rows: rows.clone(),
                    },
                );
                Ok(rows)
            }
        }
    }

    /// Members passing a caller-supplied predicate.
    pub async fn members_where<F>(&self, predicate: F) -> Result<Vec<Member>, AppError>
    where
        F: Fn(&Member) -> bool,
    {
        Ok(self.members().await?.into_iter().filter(|m| predicate(m)).collect())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Row normalization
// ─────────────────────────────────────────────────────────────────────────────

// Activity log columns:
// 0 Timestamp | 1 Name | 2 Activity Name | 3 Activity Type | 4 Date
// 5 Hours | 6 Miles | 7 Monies

fn normalize_entries(rows: &[Vec<String>]) -> Result<Vec<ActivityLogEntry>, AppError> {
    let mut entries = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        match entry_from_row(row) {
            Ok(Some(entry)) => entries.push(entry),
            Ok(None) => {
                tracing::warn!(row = i + 2, "Skipping malformed activity log row");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(entries)
}

/// Normalize one log row. `Ok(None)` means the row is malformed and should
/// be skipped; `Err` means the closed activity-type contract was violated.
fn entry_from_row(row: &[String]) -> Result<Option<ActivityLogEntry>, AppError> {
    let name = cell(row, 1);
    if name.is_empty() {
        return Ok(None);
    }

    let activity_type = ActivityType::from_str(cell(row, 3))
        .map_err(|e| AppError::InvalidRow(e.to_string()))?;

    let Some(date) = parse_date(cell(row, 4)) else {
        return Ok(None);
    };
    let Some(created) = parse_timestamp(cell(row, 0)) else {
        return Ok(None);
    };

    Ok(Some(ActivityLogEntry {
        name: name.to_string(),
        activity_name: cell(row, 2).to_string(),
        activity_type,
        date,
        hours: parse_amount(cell(row, 5)).unwrap_or(0.0),
        miles: parse_amount(cell(row, 6)),
        monies: parse_amount(cell(row, 7)),
        created,
    }))
}

// Roster columns:
// 0 Id | 1 Last | 2 First | 3 Suffix | 4 Role | 5 Office | 6 Entities
// 7 Lifetime | 8 Past President | 9 Joined | 10 Paid Through
// 11 EC Name | 12 EC Phone

fn normalize_members(rows: &[Vec<String>], current_year: i32) -> Vec<Member> {
    rows.iter()
        .enumerate()
        .filter_map(|(i, row)| {
            let member = member_from_row(row, current_year);
            if member.is_none() {
                tracing::warn!(row = i + 2, "Skipping malformed roster row");
            }
            member
        })
        .collect()
}

fn member_from_row(row: &[String], current_year: i32) -> Option<Member> {
    let last = cell(row, 1);
    let first = cell(row, 2);
    if last.is_empty() || first.is_empty() {
        return None;
    }

    let role = MemberRole::from_str(cell(row, 4)).ok()?;
    let suffix = non_empty(cell(row, 3));
    let is_lifetime_member = parse_flag(cell(row, 7));

    // Dues standing: paid through the current year, or lifetime.
    let paid_through: Option<i32> = cell(row, 10).parse().ok();
    let is_active = is_lifetime_member || paid_through.is_some_and(|y| y >= current_year);

    let emergency_contact = match (non_empty(cell(row, 11)), non_empty(cell(row, 12))) {
        (Some(name), Some(phone)) => Some(EmergencyContact { name, phone }),
        _ => None,
    };

    Some(Member {
        id: cell(row, 0).to_string(),
        name: match &suffix {
            Some(sfx) => format!("{} {} {}", first, last, sfx),
            None => format!("{} {}", first, last),
        },
        log_name: Member::log_name_of(first, last, suffix.as_deref()),
        role,
        office: non_empty(cell(row, 5)),
        is_active,
        is_lifetime_member,
        is_past_president: parse_flag(cell(row, 8)),
        joined: parse_date(cell(row, 9)),
        entities: cell(row, 6)
            .split(',')
            .filter_map(|s| s.parse().ok())
            .collect(),
        emergency_contact,
    })
}

fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map(|s| s.trim()).unwrap_or("")
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Parse a date cell: ISO ("2024-01-05") or US sheet format ("1/5/2024").
fn parse_date(value: &str) -> Option<NaiveDate> {
    if value.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%m/%d/%Y"))
        .ok()
}

/// Parse a form submission timestamp: RFC3339 or the "1/5/2024 20:15:00"
/// format Google Forms writes.
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if value.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%m/%d/%Y %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Parse a numeric cell, tolerating "$" and thousands separators. Negative
/// and non-finite values are clamped to zero so they cannot corrupt sums.
/// Empty cells stay `None` ("not recorded", distinct from zero).
fn parse_amount(value: &str) -> Option<f64> {
    if value.is_empty() {
        return None;
    }
    let cleaned: String = value.replace(['$', ','], "");
    let parsed: f64 = cleaned.trim().parse().ok()?;
    if parsed.is_finite() && parsed > 0.0 {
        Some(parsed)
    } else {
        tracing::warn!(value, "Clamping negative or non-finite amount to 0");
        Some(0.0)
    }
}

/// Parse a checkbox-style flag cell ("Yes", "TRUE", "x", "1").
fn parse_flag(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "yes" | "y" | "true" | "x" | "1"
    )
}
