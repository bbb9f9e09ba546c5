use chrono::{DateTime, NaiveDate, Utc};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{eyre, Context, Result};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;
use tzr_data::tzkt::DEFAULT_TZKT_BASE_URL;
use tzr_data::{AddressRole, ReportWindow, TzktClient, KNOWN_ADDRESSES};
use tzr_report::{export_csv, format_xtz, run_report, ExportKind, Report, ReportOptions};

#[derive(Parser, Debug)]
#[command(name = "tzr")]
#[command(about = "Tezos address activity reporter")]
#[command(version)]
struct Cli {
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    verbose: u8,

    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// Indexer base URL.
    #[arg(long, global = true, default_value = DEFAULT_TZKT_BASE_URL)]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch, aggregate, and display activity for the selected addresses.
    Report(ReportArgs),
    /// Render one of the canonical CSV tables to a file.
    Export(ExportArgs),
    /// List the known-address registry.
    Addresses,
}

/// Shared selection and window flags.
#[derive(Args, Debug)]
struct SelectionArgs {
    /// Address to report on: a registry alias or a literal address.
    /// Repeatable.
    #[arg(long = "address", short = 'a', required = true)]
    addresses: Vec<String>,

    /// Window start, RFC3339 or YYYY-MM-DD (midnight UTC). Inclusive.
    #[arg(long)]
    start: String,

    /// Window end, RFC3339 or YYYY-MM-DD (midnight UTC). Exclusive.
    #[arg(long)]
    end: String,

    /// Insert zero rows for days without transactions.
    #[arg(long)]
    fill_empty_days: bool,
}

#[derive(Args, Debug)]
struct ReportArgs {
    #[command(flatten)]
    selection: SelectionArgs,

    /// Output format: table (default) or json.
    #[arg(long, default_value = "table")]
    output: String,
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[command(flatten)]
    selection: SelectionArgs,

    /// Which table to export.
    #[arg(long, value_enum)]
    kind: ExportKindArg,

    /// Output path. Defaults to <address>_<kind>_<start>_to_<end>.csv.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ExportKindArg {
    Transactions,
    DailySummary,
}

impl From<ExportKindArg> for ExportKind {
    fn from(kind: ExportKindArg) -> Self {
        match kind {
            ExportKindArg::Transactions => ExportKind::Transactions,
            ExportKindArg::DailySummary => ExportKind::DailySummary,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet)?;

    let client = TzktClient::new(&cli.api_url).wrap_err("failed to build indexer client")?;

    match cli.command {
        Commands::Report(args) => handle_report(&client, args).await,
        Commands::Export(args) => handle_export(&client, args).await,
        Commands::Addresses => handle_addresses(),
    }
}

fn init_tracing(verbose: u8, quiet: bool) -> Result<()> {
    let level = if quiet {
        Level::WARN
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level.as_str()))
        .wrap_err("failed to initialize tracing filter")?;

    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}

/// Parses an RFC3339 instant or a bare date (midnight UTC).
fn parse_instant(value: &str) -> Result<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Ok(instant.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .wrap_err_with(|| format!("'{value}' is neither RFC3339 nor YYYY-MM-DD"))?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| eyre!("'{value}' has no midnight instant"))?;
    Ok(midnight.and_utc())
}

fn parse_window(selection: &SelectionArgs) -> Result<ReportWindow> {
    let start = parse_instant(&selection.start).wrap_err("invalid --start")?;
    let end = parse_instant(&selection.end).wrap_err("invalid --end")?;
    ReportWindow::new(start, end).wrap_err("invalid report window")
}

async fn fetch_report(client: &TzktClient, selection: &SelectionArgs) -> Result<Report> {
    let window = parse_window(selection)?;
    let options = ReportOptions {
        fill_empty_days: selection.fill_empty_days,
    };

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .wrap_err("failed to create progress style")?,
    );
    pb.set_message("fetching transactions from indexer");
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let report = run_report(client, &selection.addresses, window, options).await;
    pb.finish_and_clear();

    report.wrap_err("report failed")
}

async fn handle_report(client: &TzktClient, args: ReportArgs) -> Result<()> {
    let report = fetch_report(client, &args.selection).await?;

    match args.output.as_str() {
        "json" => {
            let rendered = serde_json::to_string_pretty(&report)
                .wrap_err("failed to serialize report as JSON")?;
            println!("{rendered}");
        }
        "table" => print_report_tables(&report),
        other => return Err(eyre!("unknown output format '{}'; use 'table' or 'json'", other)),
    }

    info!(
        addresses = report.addresses.len(),
        trades = report.overall.trades,
        "report command completed"
    );
    Ok(())
}

fn print_report_tables(report: &Report) {
    if !report.has_data {
        println!("No transactions found in the requested window.");
        return;
    }

    println!("\n=== Overall ===");
    let mut overall = Table::new();
    overall.load_preset(UTF8_BORDERS_ONLY);
    overall.set_header(vec!["Trades", "Volume (XTZ)", "Earned (XTZ)"]);
    overall.add_row(vec![
        report.overall.trades.to_string(),
        format_xtz(report.overall.volume_mutez),
        format_xtz(report.overall.earned_mutez),
    ]);
    println!("{overall}\n");

    println!("=== Per address ===");
    let mut per_address = Table::new();
    per_address.load_preset(UTF8_BORDERS_ONLY);
    per_address.set_header(vec![
        "Address",
        "Alias",
        "Role",
        "Trades",
        "Volume (XTZ)",
        "Earned (XTZ)",
        "Est. volume (XTZ)",
    ]);
    for entry in &report.per_address {
        per_address.add_row(vec![
            entry.address.value.clone(),
            entry.address.alias.clone().unwrap_or_default(),
            role_label(entry.address.role).to_string(),
            entry.metrics.trades.to_string(),
            format_xtz(entry.metrics.volume_mutez),
            format_xtz(entry.metrics.earned_mutez),
            entry
                .estimated_volume_mutez
                .map(format_xtz)
                .unwrap_or_default(),
        ]);
    }
    println!("{per_address}\n");

    println!("=== Daily summary ===");
    let mut daily = Table::new();
    daily.load_preset(UTF8_BORDERS_ONLY);
    daily.set_header(vec!["Date", "Trades", "Volume (XTZ)", "Earned (XTZ)"]);
    for row in &report.daily {
        daily.add_row(vec![
            row.date.to_string(),
            row.metrics.trades.to_string(),
            format_xtz(row.metrics.volume_mutez),
            format_xtz(row.metrics.earned_mutez),
        ]);
    }
    daily.add_row(vec![
        "TOTAL".to_string(),
        report.overall.trades.to_string(),
        format_xtz(report.overall.volume_mutez),
        format_xtz(report.overall.earned_mutez),
    ]);
    println!("{daily}\n");
}

fn role_label(role: AddressRole) -> &'static str {
    match role {
        AddressRole::Generic => "generic",
        AddressRole::FeeOwner => "fee-owner",
    }
}

async fn handle_export(client: &TzktClient, args: ExportArgs) -> Result<()> {
    let report = fetch_report(client, &args.selection).await?;
    let kind: ExportKind = args.kind.into();

    let bytes = export_csv(&report, kind).wrap_err("failed to render export")?;
    let path = match args.out {
        Some(path) => path,
        None => PathBuf::from(format!(
            "{}_{}_{}_to_{}.csv",
            report.addresses[0].value,
            kind.as_str(),
            report.window.start.date_naive(),
            report.window.end.date_naive(),
        )),
    };

    std::fs::write(&path, &bytes)
        .wrap_err_with(|| format!("failed to write {}", path.display()))?;

    println!("Wrote {} ({} bytes)", path.display(), bytes.len());
    info!(
        path = %path.display(),
        bytes = bytes.len(),
        kind = kind.as_str(),
        "export command completed"
    );
    Ok(())
}

fn handle_addresses() -> Result<()> {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Alias", "Address", "Label", "Role"]);
    for known in KNOWN_ADDRESSES {
        table.add_row(vec![
            known.alias.to_string(),
            known.address.to_string(),
            known.label.to_string(),
            role_label(known.role).to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rfc3339_instant() {
        let instant = parse_instant("2024-01-01T12:30:00Z").expect("should parse");
        assert_eq!(instant.to_rfc3339(), "2024-01-01T12:30:00+00:00");
    }

    #[test]
    fn parses_bare_date_as_midnight_utc() {
        let instant = parse_instant("2024-03-15").expect("should parse");
        assert_eq!(instant.to_rfc3339(), "2024-03-15T00:00:00+00:00");
    }

    #[test]
    fn rejects_garbage_instant() {
        assert!(parse_instant("yesterday").is_err());
    }
}
