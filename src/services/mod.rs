// SPDX-License-Identifier: MIT

//! Services module - business logic layer.

pub mod eligibility;
pub mod sheets;
pub mod stats;

pub use eligibility::{EligibilityResult, Thresholds};
pub use sheets::{SheetsClient, SheetsService};
pub use stats::StatKey;
