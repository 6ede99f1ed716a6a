// SPDX-License-Identifier: MIT

//! Application configuration loaded from environment variables.
//!
//! Eligibility thresholds are deployment constants, not business logic:
//! they are read here once and injected into the evaluator.

use std::env;

use crate::services::eligibility::Thresholds;

const DEFAULT_MIN_RIDES: u32 = 6;
const DEFAULT_MIN_EVENTS: u32 = 12;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Spreadsheet holding the roster and activity log sheets
    pub spreadsheet_id: String,
    /// Google Sheets API key
    pub sheets_api_key: String,
    /// Frontend URL for CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// JWT signing key shared with the portal's auth layer (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// Minimum qualifying rides for rider roles per membership year
    pub min_rides: u32,
    /// Minimum qualifying events per membership year
    pub min_events: u32,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            spreadsheet_id: env::var("SHEETS_SPREADSHEET_ID")
                .map_err(|_| ConfigError::Missing("SHEETS_SPREADSHEET_ID"))?,
            sheets_api_key: env::var("SHEETS_API_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("SHEETS_API_KEY"))?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            min_rides: parse_threshold("ELIGIBILITY_MIN_RIDES", DEFAULT_MIN_RIDES)?,
            min_events: parse_threshold("ELIGIBILITY_MIN_EVENTS", DEFAULT_MIN_EVENTS)?,
        })
    }

    /// Eligibility thresholds in the shape the evaluator consumes.
    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            min_rides: self.min_rides,
            min_events: self.min_events,
        }
    }

    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            spreadsheet_id: "test-spreadsheet".to_string(),
            sheets_api_key: "test_api_key".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            min_rides: DEFAULT_MIN_RIDES,
            min_events: DEFAULT_MIN_EVENTS,
        }
    }
}

fn parse_threshold(var: &'static str, default: u32) -> Result<u32, ConfigError> {
    match env::var(var) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(var)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
