//! tzr-report crate
//!
//! Post-fetch reporting: direction classification, metric aggregation,
//! daily bucketing with a chart-ready series, canonical CSV exports, and
//! the engine that joins concurrent per-address fetches into one report.

pub mod classify;
pub mod daily;
pub mod engine;
pub mod error;
pub mod export;
pub mod metrics;

pub use classify::{classify_for_subject, ClassifiedTransaction, Direction};
pub use daily::{DailySummaryRow, SeriesPoint};
pub use engine::{assemble_report, run_report, Report, ReportOptions};
pub use error::ReportError;
pub use export::{export_csv, ExportKind};
pub use metrics::{format_xtz, AddressMetrics, Metrics};
