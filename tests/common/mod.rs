//! Shared test helpers and fixture factories.

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use tzr_data::{RawTransaction, ReportWindow};

/// Parses an RFC3339 test timestamp.
pub fn instant(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .expect("test timestamp should parse")
        .with_timezone(&Utc)
}

/// Builds a window from two RFC3339 bounds.
pub fn window(start: &str, end: &str) -> ReportWindow {
    ReportWindow::new(instant(start), instant(end)).expect("test window should build")
}

/// Creates a raw transfer fixture.
///
/// # Example
/// ```ignore
/// let tx = raw_tx(1, "2024-01-01T09:00:00Z", "tz1payer", "tz1me", 10_000_000);
/// assert_eq!(tx.amount, 10_000_000);
/// ```
pub fn raw_tx(
    id: u64,
    timestamp: &str,
    sender: &str,
    target: &str,
    amount_mutez: u64,
) -> RawTransaction {
    RawTransaction {
        id,
        hash: format!("op{id:04}"),
        timestamp: instant(timestamp),
        sender: sender.to_string(),
        target: target.to_string(),
        amount: amount_mutez,
    }
}
