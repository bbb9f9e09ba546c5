//! Type definitions for indexer transaction records and report windows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DataError;

/// Mutez per XTZ (the chain's native 6-decimal unit).
pub const MUTEZ_PER_XTZ: u64 = 1_000_000;

/// One applied transfer operation as returned by the indexer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTransaction {
    /// Indexer-assigned operation id (unique, monotonically increasing).
    pub id: u64,
    /// Operation hash.
    pub hash: String,
    /// Inclusion time (UTC).
    pub timestamp: DateTime<Utc>,
    /// Sender address.
    pub sender: String,
    /// Receiver address.
    pub target: String,
    /// Transferred amount in mutez.
    pub amount: u64,
}

/// Half-open reporting window `[start, end)`.
///
/// A transaction timestamped exactly at `start` is inside the window; one
/// timestamped exactly at `end` is not. Fetching and day bucketing both use
/// this same boundary policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportWindow {
    /// First instant inside the window.
    pub start: DateTime<Utc>,
    /// First instant past the window.
    pub end: DateTime<Utc>,
}

impl ReportWindow {
    /// Builds a window, rejecting `start >= end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, DataError> {
        if start >= end {
            return Err(DataError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// Whether `instant` falls inside `[start, end)`.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn instant(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s)
            .expect("test timestamp should parse")
            .with_timezone(&Utc)
    }

    #[test]
    fn window_rejects_inverted_bounds() {
        let start = instant("2024-01-02T00:00:00Z");
        let end = instant("2024-01-01T00:00:00Z");
        assert!(matches!(
            ReportWindow::new(start, end),
            Err(DataError::InvalidWindow { .. })
        ));
    }

    #[test]
    fn window_rejects_empty_range() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert!(ReportWindow::new(at, at).is_err());
    }

    #[test]
    fn window_is_half_open() {
        let window = ReportWindow::new(
            instant("2024-01-01T00:00:00Z"),
            instant("2024-01-02T00:00:00Z"),
        )
        .expect("window should build");

        assert!(window.contains(instant("2024-01-01T00:00:00Z")));
        assert!(window.contains(instant("2024-01-01T23:59:59Z")));
        assert!(!window.contains(instant("2024-01-02T00:00:00Z")));
        assert!(!window.contains(instant("2023-12-31T23:59:59Z")));
    }
}
