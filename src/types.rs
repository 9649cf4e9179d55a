// =============================================================================
// Shared types used across the Meridian market desk
// =============================================================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One trading day's price record for a single ticker.
///
/// Bars are always handled in ascending date order; the bar store validates
/// ordering and uniqueness at ingest so downstream consumers can rely on it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}
