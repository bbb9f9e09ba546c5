//! Calendar-day bucketing of classified transfers.
//!
//! Reporting days are UTC. Rows are ascending by date with one row per
//! active day; a zero-fill mode inserts empty rows across the whole window
//! span for continuous charting.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tzr_data::ReportWindow;

use crate::classify::ClassifiedTransaction;
use crate::metrics::Metrics;

/// One calendar day's slice of the report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySummaryRow {
    /// UTC calendar day.
    pub date: NaiveDate,
    /// That day's aggregate, computed with the same rules as the overall
    /// metrics.
    pub metrics: Metrics,
}

/// One chart point: per-day earned plus the running total.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub earned_mutez: u64,
    pub cumulative_earned_mutez: u64,
}

/// Buckets classified transfers by UTC calendar day.
///
/// With `fill_empty_days` set and at least one transaction present, every
/// day of the window span gets a row (zero metrics for inactive days).
/// An empty input always yields an empty sequence.
pub fn build_daily_summary(
    txs: &[ClassifiedTransaction],
    window: &ReportWindow,
    fill_empty_days: bool,
) -> Vec<DailySummaryRow> {
    let mut buckets: BTreeMap<NaiveDate, Metrics> = BTreeMap::new();
    for tx in txs {
        buckets
            .entry(tx.timestamp.date_naive())
            .or_insert(Metrics::ZERO)
            .record(tx);
    }

    if buckets.is_empty() {
        return Vec::new();
    }

    if fill_empty_days {
        // Last covered day comes from the half-open end bound.
        let first_day = window.start.date_naive();
        let last_day = (window.end - Duration::nanoseconds(1)).date_naive();
        let mut day = first_day;
        while day <= last_day {
            buckets.entry(day).or_insert(Metrics::ZERO);
            match day.succ_opt() {
                Some(next) => day = next,
                None => break,
            }
        }
    }

    buckets
        .into_iter()
        .map(|(date, metrics)| DailySummaryRow { date, metrics })
        .collect()
}

/// Builds the chart series parallel to the daily rows.
pub fn build_series(rows: &[DailySummaryRow]) -> Vec<SeriesPoint> {
    let mut cumulative: u64 = 0;
    rows.iter()
        .map(|row| {
            cumulative = cumulative.saturating_add(row.metrics.earned_mutez);
            SeriesPoint {
                date: row.date,
                earned_mutez: row.metrics.earned_mutez,
                cumulative_earned_mutez: cumulative,
            }
        })
        .collect()
}
