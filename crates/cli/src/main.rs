//! # dtable-cli
//!
//! Command-line interface for inspecting dtable snapshots: display rows of
//! a table or view, and grouped statistics reports.

mod report;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use dtable_convert::{ConvertError, DTable, DisplayRow, InsertPosition, RowSink};
use dtable_model::{Row, RowPatch, Snapshot};
use dtable_stats::{
    group_statistics, label_display, DateGranularity, StatisticResult, Summary, SummaryKind,
};
use dtable_utils::value_to_string;
use report::{Report, ReportConfig, SummaryEntry};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// dtable - inspect table snapshots
#[derive(Parser)]
#[command(name = "dtable")]
#[command(author, version, about = "Display rows and grouped statistics of table snapshots", long_about = None)]
struct Cli {
    /// Snapshot JSON file
    #[arg(short, long, value_name = "FILE")]
    snapshot: PathBuf,

    /// Output format (table, json)
    #[arg(short = 'f', long = "format", default_value = "table", global = true)]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the display rows of a table or view
    Rows {
        /// Table name
        #[arg(short, long)]
        table: String,

        /// View name; all rows when omitted
        #[arg(long)]
        view: Option<String>,
    },
    /// Print a grouped statistics report
    Stats(StatsArgs),
}

#[derive(Args, Default)]
struct StatsArgs {
    /// Table name
    #[arg(short, long)]
    table: Option<String>,

    /// View name; all rows when omitted
    #[arg(long)]
    view: Option<String>,

    /// Column to group rows by
    #[arg(short, long, value_name = "COLUMN")]
    group_by: Option<String>,

    /// Date bucket size (day, week, month, quarter, year)
    #[arg(long, value_name = "GRANULARITY")]
    date_granularity: Option<DateGranularity>,

    /// Geolocation field to group by (e.g. province, city)
    #[arg(long, value_name = "FIELD")]
    geo_granularity: Option<String>,

    /// Summary to compute per group, repeatable
    #[arg(long = "summary", value_name = "COLUMN:METHOD")]
    summaries: Vec<Summary>,

    /// YAML or JSON report file; flags override its values
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,
}

/// Output format for results.
#[derive(Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    /// JSON output
    Json,
    /// Pretty table output (default)
    #[default]
    Table,
}

/// Snapshot files are only read; writes are refused.
struct ReadOnlySink;

impl RowSink for ReadOnlySink {
    fn insert_row(
        &mut self,
        table_id: &str,
        _anchor_row_id: Option<&str>,
        _position: InsertPosition,
        _patch: RowPatch,
    ) -> dtable_convert::Result<()> {
        Err(ConvertError::Sink(format!("table {table_id} is read-only")))
    }

    fn modify_row(
        &mut self,
        table_id: &str,
        _row_id: &str,
        _patch: RowPatch,
    ) -> dtable_convert::Result<()> {
        Err(ConvertError::Sink(format!("table {table_id} is read-only")))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .init();
    }

    let snapshot = Snapshot::from_json(&cli.snapshot)
        .with_context(|| format!("Failed to load snapshot: {}", cli.snapshot.display()))?;
    tracing::info!(
        path = %cli.snapshot.display(),
        tables = snapshot.tables.len(),
        "loaded snapshot"
    );

    let output = match cli.command {
        Command::Rows { table, view } => {
            render_rows(&snapshot, &table, view.as_deref(), cli.format)?
        }
        Command::Stats(args) => {
            let report = resolve_report(args)?;
            render_stats(&snapshot, &report, cli.format)?
        }
    };
    println!("{output}");
    Ok(())
}

/// Combine the report file (if any) with command-line flags.
fn resolve_report(args: StatsArgs) -> Result<Report> {
    let file = match &args.report {
        Some(path) => ReportConfig::load(path)?,
        None => ReportConfig::default(),
    };
    let flags = ReportConfig {
        table: args.table,
        view: args.view,
        group_by: args.group_by,
        date_granularity: args.date_granularity,
        geo_granularity: args.geo_granularity,
        summaries: args.summaries.into_iter().map(SummaryEntry::Full).collect(),
    };
    file.merge(flags).into_report()
}

/// Render display rows of a table or view.
fn render_rows(
    snapshot: &Snapshot,
    table_name: &str,
    view: Option<&str>,
    format: OutputFormat,
) -> Result<String> {
    let dtable = DTable::new(ReadOnlySink);
    let rows = dtable
        .display_rows(snapshot, table_name, view)
        .with_context(|| format!("Failed to read rows of table '{table_name}'"))?;
    tracing::info!(table = table_name, rows = rows.len(), "converted rows");

    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&rows)?),
        OutputFormat::Table => {
            if rows.is_empty() {
                return Ok("(empty table)".to_string());
            }
            let headers = display_headers(&rows[0]);
            let cells = rows
                .iter()
                .map(|row| row.values().map(value_to_string).collect())
                .collect::<Vec<Vec<String>>>();
            Ok(render_table(&headers, &cells))
        }
    }
}

fn display_headers(row: &DisplayRow) -> Vec<String> {
    row.keys().cloned().collect()
}

#[derive(Serialize)]
struct ReportGroup<'a> {
    display: String,
    #[serde(flatten)]
    result: &'a StatisticResult,
}

fn summary_header(summary: &Summary) -> String {
    match summary.kind {
        SummaryKind::Count => "count".to_string(),
        SummaryKind::Advanced => summary.to_string(),
    }
}

/// Render a grouped statistics report.
fn render_stats(snapshot: &Snapshot, report: &Report, format: OutputFormat) -> Result<String> {
    let table = snapshot.get_table(&report.table)?;
    let rows: Vec<&Row> = match &report.view {
        Some(name) => table.view_rows(table.view_by_name(name)?),
        None => table.rows().iter().collect(),
    };
    let results = group_statistics(
        snapshot,
        table,
        &rows,
        snapshot.formula_results_for(&table.id),
        &report.query,
    )
    .with_context(|| format!("Failed to compute statistics for table '{}'", table.name))?;
    tracing::info!(table = %table.name, groups = results.len(), "computed statistics");

    let column = table.get_column(&report.query.group_by)?;
    let display = |result: &StatisticResult| {
        result.label.as_ref().map_or_else(
            || "(empty)".to_string(),
            |label| label_display(snapshot, column, label),
        )
    };

    match format {
        OutputFormat::Json => {
            let groups: Vec<ReportGroup<'_>> = results
                .iter()
                .map(|result| ReportGroup {
                    display: display(result),
                    result,
                })
                .collect();
            Ok(serde_json::to_string_pretty(&groups)?)
        }
        OutputFormat::Table => {
            let mut headers = vec![column.name.clone(), "rows".to_string()];
            headers.extend(report.query.summaries.iter().map(summary_header));

            let mut cells = Vec::with_capacity(results.len());
            for result in &results {
                let mut line = vec![display(result), result.count.to_string()];
                for summary in &report.query.summaries {
                    let key = &table.get_column(&summary.column)?.key;
                    let total = result.totals.get(key).copied().unwrap_or_default();
                    line.push(total.to_string());
                }
                cells.push(line);
            }
            Ok(render_table(&headers, &cells))
        }
    }
}

/// Lay out rows as aligned columns under a bold header.
fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }
    let pad = |text: &str, width: usize| {
        let fill = width.saturating_sub(text.chars().count());
        format!("{text}{}", " ".repeat(fill))
    };

    let mut out = String::new();
    let header: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(h, w)| pad(h, *w).bold().cyan().to_string())
        .collect();
    out.push_str(header.join("  ").trim_end());
    for row in rows {
        out.push('\n');
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, w)| pad(cell, *w))
            .collect();
        out.push_str(line.join("  ").trim_end());
    }
    out
}
