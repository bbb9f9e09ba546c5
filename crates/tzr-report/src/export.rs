//! Canonical CSV exports for the transaction and daily-summary tables.
//!
//! Pure formatting over an assembled [`Report`]: nothing is recomputed, so
//! exported totals always equal the displayed ones, and identical inputs
//! produce byte-identical output.

use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

use crate::engine::Report;
use crate::error::ReportError;
use crate::metrics::format_xtz;

/// Which of the two canonical tables to render.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportKind {
    Transactions,
    DailySummary,
}

impl ExportKind {
    /// File-name fragment for derived export paths.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportKind::Transactions => "transactions",
            ExportKind::DailySummary => "daily_summary",
        }
    }
}

/// Renders the requested table as a CSV byte stream.
pub fn export_csv(report: &Report, kind: ExportKind) -> Result<Vec<u8>, ReportError> {
    match kind {
        ExportKind::Transactions => transactions_csv(report),
        ExportKind::DailySummary => daily_summary_csv(report),
    }
}

/// One row per classified view, timestamp-ascending.
/// Columns: hash, timestamp, direction, amount, counterparty.
pub fn transactions_csv(report: &Report) -> Result<Vec<u8>, ReportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["hash", "timestamp", "direction", "amount", "counterparty"])?;

    for tx in &report.transactions {
        let timestamp = tx.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true);
        let amount = format_xtz(tx.amount_mutez);
        writer.write_record([
            tx.hash.as_str(),
            timestamp.as_str(),
            tx.direction.as_str(),
            amount.as_str(),
            tx.counterparty.as_str(),
        ])?;
    }

    finish(writer)
}

/// One row per daily summary row plus a trailing total row taken from the
/// report's overall metrics. Columns: date, trades, volume, earned.
pub fn daily_summary_csv(report: &Report) -> Result<Vec<u8>, ReportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["date", "trades", "volume", "earned"])?;

    for row in &report.daily {
        let date = row.date.to_string();
        let trades = row.metrics.trades.to_string();
        let volume = format_xtz(row.metrics.volume_mutez);
        let earned = format_xtz(row.metrics.earned_mutez);
        writer.write_record([date.as_str(), trades.as_str(), volume.as_str(), earned.as_str()])?;
    }

    let trades = report.overall.trades.to_string();
    let volume = format_xtz(report.overall.volume_mutez);
    let earned = format_xtz(report.overall.earned_mutez);
    writer.write_record(["TOTAL", trades.as_str(), volume.as_str(), earned.as_str()])?;

    finish(writer)
}

fn finish(mut writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>, ReportError> {
    writer.flush()?;
    writer
        .into_inner()
        .map_err(|e| ReportError::Io(e.into_error()))
}
