//! Report orchestration: resolve, fetch concurrently, classify, aggregate.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use tzr_data::{resolve_selection, Address, RawTransaction, ReportWindow, TzktClient};

use crate::classify::{classify_for_subject, ClassifiedTransaction};
use crate::daily::{build_daily_summary, build_series, DailySummaryRow, SeriesPoint};
use crate::error::ReportError;
use crate::metrics::{aggregate, AddressMetrics, Metrics};

/// Engine knobs beyond the selection and window.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReportOptions {
    /// Insert zero-metric rows for inactive days across the window span.
    pub fill_empty_days: bool,
}

/// The complete result of one report request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Report {
    /// Resolved addresses, selection order.
    pub addresses: Vec<Address>,
    /// The reported window.
    pub window: ReportWindow,
    /// Component-wise sum of the per-address metrics (no cross-address
    /// deduplication).
    pub overall: Metrics,
    /// Per-address metrics, same order as `addresses`.
    pub per_address: Vec<AddressMetrics>,
    /// Every classified view across all addresses, time-ascending.
    pub transactions: Vec<ClassifiedTransaction>,
    /// Daily rows, date-ascending.
    pub daily: Vec<DailySummaryRow>,
    /// Chart-ready series parallel to `daily`.
    pub series: Vec<SeriesPoint>,
    /// False when the window yielded zero transactions.
    pub has_data: bool,
}

/// Runs one full report: resolve the selection, fetch every address's window
/// concurrently, then assemble.
///
/// Fetches are joined with fail-fast semantics: the first failure aborts the
/// join, the remaining fetch futures are dropped, and no partial report is
/// produced.
///
/// # Errors
/// Selection errors from resolution, fetch/decoding errors from the client.
pub async fn run_report(
    client: &TzktClient,
    tokens: &[String],
    window: ReportWindow,
    options: ReportOptions,
) -> Result<Report, ReportError> {
    let addresses = resolve_selection(tokens)?;
    debug!(addresses = addresses.len(), "selection resolved");

    let fetches = addresses
        .iter()
        .map(|address| client.fetch_window(&address.value, &window));
    let fetched = futures::future::try_join_all(fetches).await?;

    let report = assemble_report(addresses, fetched, window, options);
    info!(
        addresses = report.addresses.len(),
        trades = report.overall.trades,
        days = report.daily.len(),
        has_data = report.has_data,
        "report assembled"
    );
    Ok(report)
}

/// Pure assembly stage: classify, aggregate, bucket, and build the series
/// from already-fetched per-address record sequences.
///
/// `fetched` must be parallel to `addresses`. Separated from [`run_report`]
/// so the full engine can run on fixture data.
pub fn assemble_report(
    addresses: Vec<Address>,
    fetched: Vec<Vec<RawTransaction>>,
    window: ReportWindow,
    options: ReportOptions,
) -> Report {
    let mut per_address: Vec<AddressMetrics> = Vec::with_capacity(addresses.len());
    let mut transactions: Vec<ClassifiedTransaction> = Vec::new();

    for (address, raw) in addresses.iter().zip(fetched) {
        // The fetcher already restricts to the window; re-check so upstream
        // slop cannot leak into totals.
        let classified: Vec<ClassifiedTransaction> = raw
            .iter()
            .filter(|tx| window.contains(tx.timestamp))
            .flat_map(|tx| classify_for_subject(tx, &address.value))
            .collect();

        per_address.push(AddressMetrics::new(address.clone(), aggregate(&classified)));
        transactions.extend(classified);
    }

    // Stable sort: equal (timestamp, id) keys keep selection/classification
    // order, so reruns are byte-identical.
    transactions.sort_by(|a, b| (a.timestamp, a.id).cmp(&(b.timestamp, b.id)));

    let overall = per_address
        .iter()
        .fold(Metrics::ZERO, |acc, entry| acc.add(&entry.metrics));
    let daily = build_daily_summary(&transactions, &window, options.fill_empty_days);
    let series = build_series(&daily);
    let has_data = !transactions.is_empty();

    Report {
        addresses,
        window,
        overall,
        per_address,
        transactions,
        daily,
        series,
        has_data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use tzr_data::AddressRole;

    fn instant(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s)
            .expect("test timestamp should parse")
            .with_timezone(&Utc)
    }

    fn address(value: &str, role: AddressRole) -> Address {
        Address {
            value: value.to_string(),
            role,
            alias: None,
        }
    }

    fn raw(id: u64, ts: &str, sender: &str, target: &str, amount: u64) -> RawTransaction {
        RawTransaction {
            id,
            hash: format!("op{id}"),
            timestamp: instant(ts),
            sender: sender.to_string(),
            target: target.to_string(),
            amount,
        }
    }

    fn window() -> ReportWindow {
        ReportWindow::new(
            instant("2024-01-01T00:00:00Z"),
            instant("2024-01-08T00:00:00Z"),
        )
        .expect("window should build")
    }

    #[test]
    fn overall_is_sum_of_per_address() {
        // One transfer between the two selected addresses: it contributes to
        // both sides and therefore twice to the overall sum.
        let a = address("tz1a", AddressRole::Generic);
        let b = address("tz1b", AddressRole::Generic);
        let shared = raw(1, "2024-01-02T10:00:00Z", "tz1a", "tz1b", 7_000_000);

        let report = assemble_report(
            vec![a, b],
            vec![vec![shared.clone()], vec![shared]],
            window(),
            ReportOptions::default(),
        );

        assert_eq!(report.per_address[0].metrics.trades, 1);
        assert_eq!(report.per_address[1].metrics.trades, 1);
        assert_eq!(report.overall.trades, 2);
        assert_eq!(report.overall.volume_mutez, 14_000_000);
        assert_eq!(report.overall.earned_mutez, 7_000_000);

        let summed = report
            .per_address
            .iter()
            .fold(Metrics::ZERO, |acc, entry| acc.add(&entry.metrics));
        assert_eq!(summed, report.overall);
    }

    #[test]
    fn transactions_are_time_ordered() {
        let a = address("tz1a", AddressRole::Generic);
        let fetched = vec![vec![
            raw(5, "2024-01-03T00:00:00Z", "tz1x", "tz1a", 1),
            raw(2, "2024-01-02T00:00:00Z", "tz1a", "tz1y", 1),
            raw(9, "2024-01-02T00:00:00Z", "tz1z", "tz1a", 1),
        ]];

        let report = assemble_report(vec![a], fetched, window(), ReportOptions::default());
        let ids: Vec<u64> = report.transactions.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![2, 9, 5]);
    }

    #[test]
    fn empty_fetch_reports_no_data() {
        let a = address("tz1a", AddressRole::Generic);
        let report = assemble_report(vec![a], vec![vec![]], window(), ReportOptions::default());

        assert!(!report.has_data);
        assert!(report.daily.is_empty());
        assert!(report.series.is_empty());
        assert_eq!(report.overall, Metrics::ZERO);
    }

    #[test]
    fn daily_totals_match_overall() {
        let a = address("tz1a", AddressRole::Generic);
        let fetched = vec![vec![
            raw(1, "2024-01-01T05:00:00Z", "tz1x", "tz1a", 10_000_000),
            raw(2, "2024-01-01T06:00:00Z", "tz1x", "tz1a", 5_000_000),
            raw(3, "2024-01-04T06:00:00Z", "tz1a", "tz1x", 2_000_000),
        ]];

        let report = assemble_report(vec![a], fetched, window(), ReportOptions::default());
        let summed = report
            .daily
            .iter()
            .fold(Metrics::ZERO, |acc, row| acc.add(&row.metrics));
        assert_eq!(summed, report.overall);
    }
}
