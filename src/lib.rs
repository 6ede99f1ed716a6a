// SPDX-License-Identifier: MIT

//! Chapter-Roster: activity-log statistics and membership eligibility
//!
//! This crate provides the backend API for a riders chapter portal:
//! it normalizes the chapter's Google Sheets activity log and roster,
//! aggregates participation statistics, and evaluates yearly membership
//! eligibility.

pub mod config;
pub mod dates;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use services::SheetsService;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub sheets: SheetsService,
}
