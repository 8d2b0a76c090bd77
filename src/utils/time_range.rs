// ABOUTME: Shared date-window computation for time-ranged Dexcom reads
// ABOUTME: Defaults absent bounds to the trailing 24 hours, truncated to whole seconds

use crate::constants::time_windows::DEFAULT_WINDOW_HOURS;
use chrono::{DateTime, Duration, Utc};

/// A start/end pair in the timestamp format the Dexcom API expects.
///
/// Bounds supplied by a caller are passed through verbatim; absent bounds
/// are filled with the default trailing window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeRange {
    /// Inclusive window start (`startDate` query parameter)
    pub start: String,
    /// Inclusive window end (`endDate` query parameter)
    pub end: String,
}

impl TimeRange {
    /// Build a range from optional caller-supplied bounds, filling each
    /// absent bound from the default trailing window.
    #[must_use]
    pub fn from_params(start: Option<String>, end: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            start: start
                .unwrap_or_else(|| format_timestamp(now - Duration::hours(DEFAULT_WINDOW_HOURS))),
            end: end.unwrap_or_else(|| format_timestamp(now)),
        }
    }

    /// The default trailing 24-hour window ending now.
    #[must_use]
    pub fn last_day() -> Self {
        Self::from_params(None, None)
    }

    /// Query parameters for a time-ranged read.
    #[must_use]
    pub fn query(&self) -> [(&'static str, String); 2] {
        [
            ("startDate", self.start.clone()),
            ("endDate", self.end.clone()),
        ]
    }
}

/// Format an instant the way the Dexcom API expects date parameters:
/// ISO-8601 truncated to whole seconds, no timezone suffix.
#[must_use]
pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.format("%Y-%m-%dT%H:%M:%S").to_string()
}
