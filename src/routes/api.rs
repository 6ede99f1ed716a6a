// SPDX-License-Identifier: MIT

//! API routes for authenticated members.

use crate::dates::DateWindow;
use crate::error::{AppError, Result};
use crate::middleware::auth::AuthMember;
use crate::models::{ActivityLogEntry, ActivityType, ClubStats, Member, MemberStats};
use crate::services::eligibility::{self, EligibilityResult, Thresholds};
use crate::services::stats::{self, StatKey};
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::get,
    Extension, Json, Router,
};
use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const DEFAULT_TOP_N: usize = 5;
const MAX_TOP_N: usize = 50;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/stats/club", get(get_club_stats))
        .route("/api/stats/top", get(get_top_members))
        .route("/api/eligibility", get(get_eligibility_report))
        .route("/api/members", get(get_members))
        .route("/api/activity-log", get(get_activity_log))
}

// ─── Window Selection ────────────────────────────────────────

/// Resolve `?window=` / `?year=` into a date window. `None` means no date
/// restriction ("all").
fn resolve_window(window: Option<&str>, year: Option<i32>) -> Result<Option<DateWindow>> {
    let today = Utc::now().date_naive();
    match window.unwrap_or("legion") {
        "legion" => Ok(Some(match year {
            Some(y) => DateWindow::legion_year_starting(y),
            None => DateWindow::legion_year(today),
        })),
        "calendar" => Ok(Some(match year {
            Some(y) => DateWindow::calendar_year(y),
            None => DateWindow::calendar_year(today.year()),
        })),
        "all" => Ok(None),
        other => Err(AppError::BadRequest(format!(
            "Invalid 'window' parameter: {:?} (expected legion, calendar or all)",
            other
        ))),
    }
}

fn parse_date_param(name: &str, raw: Option<&str>) -> Result<Option<NaiveDate>> {
    raw.map(|value| {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
            AppError::BadRequest(format!(
                "Invalid '{}' parameter: must be a YYYY-MM-DD date",
                name
            ))
        })
    })
    .transpose()
}

// ─── Club Stats ──────────────────────────────────────────────

#[derive(Deserialize)]
struct ClubStatsQuery {
    /// "legion" (default), "calendar" or "all"
    window: Option<String>,
    /// Legion year start / calendar year; defaults to the year containing
    /// today
    year: Option<i32>,
}

/// Club-wide statistics for the dashboard.
///
/// Monetary fields are included only for officers; the aggregation itself
/// always computes them.
async fn get_club_stats(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthMember>,
    Query(params): Query<ClubStatsQuery>,
) -> Result<Json<ClubStats>> {
    let window = resolve_window(params.window.as_deref(), params.year)?;

    tracing::debug!(
        member_id = %auth.member_id,
        window = ?window,
        "Computing club stats"
    );

    let members = state.sheets.members().await?;
    let entries = match window {
        Some(w) => state.sheets.entries_where(|e| w.contains(e.date)).await?,
        None => state.sheets.entries().await?,
    };

    let club_stats = stats::compute_club_stats(&entries, &members, |m| m.is_active);

    if auth.is_officer {
        Ok(Json(club_stats))
    } else {
        Ok(Json(club_stats.without_monies()))
    }
}

// ─── Top Members ─────────────────────────────────────────────

#[derive(Deserialize)]
struct TopMembersQuery {
    /// "events", "hours", "miles" or "rides"
    key: String,
    n: Option<usize>,
    window: Option<String>,
    year: Option<i32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopMembersResponse {
    pub key: String,
    pub members: Vec<MemberStats>,
}

/// Leaderboard: members ranked by a single stat.
async fn get_top_members(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthMember>,
    Query(params): Query<TopMembersQuery>,
) -> Result<Json<TopMembersResponse>> {
    let key: StatKey = params
        .key
        .parse()
        .map_err(|e| AppError::BadRequest(format!("Invalid 'key' parameter: {}", e)))?;
    let n = params.n.unwrap_or(DEFAULT_TOP_N).min(MAX_TOP_N);
    if n == 0 {
        return Err(AppError::BadRequest(
            "'n' must be greater than 0".to_string(),
        ));
    }
    let window = resolve_window(params.window.as_deref(), params.year)?;

    let members = state.sheets.members().await?;
    let entries = match window {
        Some(w) => state.sheets.entries_where(|e| w.contains(e.date)).await?,
        None => state.sheets.entries().await?,
    };

    let by_member = stats::group_entries_by_member(&entries, &members, |m| m.is_active);
    let mut top = stats::top_n(&by_member, key, n);

    if !auth.is_officer {
        top = top.into_iter().map(MemberStats::without_monies).collect();
    }

    Ok(Json(TopMembersResponse {
        key: params.key,
        members: top,
    }))
}

// ─── Eligibility Report ──────────────────────────────────────

#[derive(Deserialize)]
struct EligibilityQuery {
    /// "legion" (default) or "calendar"
    window: Option<String>,
    year: Option<i32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityReport {
    pub window: DateWindow,
    pub thresholds: Thresholds,
    /// Number of members evaluated (active roles, exemptions excluded)
    pub evaluated: usize,
    /// Members below the participation minimums
    pub at_risk: Vec<EligibilityResult>,
}

/// Yearly participation report: which members are at risk of losing
/// active status. Officer only.
async fn get_eligibility_report(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthMember>,
    Query(params): Query<EligibilityQuery>,
) -> Result<Json<EligibilityReport>> {
    if !auth.is_officer {
        return Err(AppError::Forbidden);
    }

    let window = resolve_window(params.window.as_deref(), params.year)?
        .ok_or_else(|| AppError::BadRequest("Eligibility requires a year window".to_string()))?;

    tracing::info!(
        member_id = %auth.member_id,
        start = %window.start,
        end = %window.end,
        "Running eligibility report"
    );

    let members = state.sheets.members().await?;
    let entries = state.sheets.entries_where(|e| window.contains(e.date)).await?;
    let grouped = eligibility::group_by_log_name(&entries);

    let thresholds = state.config.thresholds();
    let results = eligibility::evaluate_eligibility(&members, &grouped, &window, &thresholds);

    let evaluated = results.len();
    let at_risk: Vec<EligibilityResult> =
        results.into_iter().filter(|r| !r.eligible).collect();

    Ok(Json(EligibilityReport {
        window,
        thresholds,
        evaluated,
        at_risk,
    }))
}

// ─── Roster ──────────────────────────────────────────────────

#[derive(Deserialize)]
struct MembersQuery {
    /// Restrict to members in good standing
    #[serde(default)]
    active: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MembersResponse {
    pub members: Vec<Member>,
    pub total: usize,
}

/// Roster listing. Emergency contacts are officer-only.
async fn get_members(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthMember>,
    Query(params): Query<MembersQuery>,
) -> Result<Json<MembersResponse>> {
    let mut members = if params.active {
        state.sheets.members_where(|m| m.is_active).await?
    } else {
        state.sheets.members().await?
    };

    if !auth.is_officer {
        members = members.into_iter().map(Member::without_contacts).collect();
    }

    let total = members.len();
    Ok(Json(MembersResponse { members, total }))
}

// ─── Activity Log ────────────────────────────────────────────

#[derive(Deserialize)]
struct ActivityLogQuery {
    /// Filter by activity type
    r#type: Option<String>,
    /// Inclusive date bounds (YYYY-MM-DD)
    after: Option<String>,
    before: Option<String>,
    /// Filter by submitted member name ("Last, First")
    member: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogResponse {
    pub entries: Vec<ActivityLogEntry>,
    pub total: usize,
}

/// Raw (normalized) activity log with optional filters, newest first.
async fn get_activity_log(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthMember>,
    Query(params): Query<ActivityLogQuery>,
) -> Result<Json<ActivityLogResponse>> {
    let activity_type: Option<ActivityType> = params
        .r#type
        .as_deref()
        .map(|raw| {
            raw.parse()
                .map_err(|e| AppError::BadRequest(format!("Invalid 'type' parameter: {}", e)))
        })
        .transpose()?;
    let after = parse_date_param("after", params.after.as_deref())?;
    let before = parse_date_param("before", params.before.as_deref())?;
    let member = params.member.as_deref().map(str::trim);

    let mut entries = state
        .sheets
        .entries_where(|e| {
            activity_type.is_none_or(|t| e.activity_type == t)
                && after.is_none_or(|d| e.date >= d)
                && before.is_none_or(|d| e.date <= d)
                && member.is_none_or(|name| e.name.trim() == name)
        })
        .await?;

    entries.sort_by(|a, b| b.created.cmp(&a.created));

    if !auth.is_officer {
        entries = entries
            .into_iter()
            .map(ActivityLogEntry::without_monies)
            .collect();
    }

    let total = entries.len();
    Ok(Json(ActivityLogResponse { entries, total }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_window_defaults_to_legion() {
        let window = resolve_window(None, Some(2024)).unwrap().unwrap();
        assert_eq!(window, DateWindow::legion_year_starting(2024));
    }

    #[test]
    fn test_resolve_window_calendar_and_all() {
        let window = resolve_window(Some("calendar"), Some(2024)).unwrap().unwrap();
        assert_eq!(window, DateWindow::calendar_year(2024));

        assert!(resolve_window(Some("all"), None).unwrap().is_none());
    }

    #[test]
    fn test_resolve_window_rejects_unknown_values() {
        let err = resolve_window(Some("fiscal"), None).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_parse_date_param() {
        assert_eq!(
            parse_date_param("after", Some("2024-01-05")).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 5)
        );
        assert!(parse_date_param("after", None).unwrap().is_none());
        assert!(parse_date_param("after", Some("1/5/2024")).is_err());
    }
}
