//! Pipeline functions for programmatic use by the CLI.
//!
//! Each function runs one user-facing operation end to end (load, analyse,
//! build, export) and returns formatted text instead of printing to stdout.
//! "Nothing to report" outcomes come back as `Ok` with an informational
//! message and no file written.

use crate::chart::{segment_slices, zone_bars, ChartSink, TextChart};
use crate::export::{
    timestamped_filename, write_csv, write_detractor_workbook, write_leaderboard_workbook,
    DETRACTOR_FILE_PREFIX, LEADERBOARD_FILE_PREFIX,
};
use crate::leaderboard::{Leaderboard, DEFAULT_CHART_ZONES};
use crate::session::{Analysis, Session};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt::Write;
use std::path::{Path, PathBuf};

/// Configuration shared by the report operations.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Input spreadsheet (xlsx/xls/ods) or CSV
    pub input: PathBuf,
    /// Directory receiving the exported reports
    pub output_dir: PathBuf,
    /// Zones shown in the leaderboard bar chart
    pub top_n: usize,
    /// Also write a CSV copy next to each workbook
    pub csv: bool,
}

impl ReportConfig {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output_dir: PathBuf::from("."),
            top_n: DEFAULT_CHART_ZONES,
            csv: false,
        }
    }
}

/// Result of a report operation.
#[derive(Debug, Clone)]
pub struct ReportOutcome {
    /// Human-readable summary of what happened
    pub message: String,
    /// Files written, empty when there was nothing to export
    pub files: Vec<PathBuf>,
}

impl ReportOutcome {
    fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            files: Vec::new(),
        }
    }
}

fn load_and_analyze(input: &Path) -> Result<(Session, Analysis)> {
    let session = Session::load(input).context("Errore nel caricamento del file")?;
    let analysis = session.analyze().context("Errore durante l'analisi")?;
    Ok((session, analysis))
}

const REPORT_CONTEXT: &str = "Errore nella generazione del report";
const LEADERBOARD_CONTEXT: &str = "Errore nella generazione della classifica";

fn output_path(dir: &Path, prefix: &str, ext: &str) -> PathBuf {
    dir.join(timestamped_filename(prefix, chrono::Local::now(), ext))
}

/// Write the CSV copy of a report next to its workbook.
fn csv_copy<T: Serialize>(
    rows: &[T],
    dir: &Path,
    prefix: &str,
    operation: &'static str,
) -> Result<PathBuf> {
    let path = output_path(dir, prefix, "csv");
    write_csv(rows, &path).context(operation)?;
    Ok(path)
}

// ============================================================================
// Analyze
// ============================================================================

/// Format the headline figures, segment table and donut chart.
pub fn format_summary(analysis: &Analysis) -> Result<String> {
    let s = &analysis.summary;
    let mut out = String::new();

    writeln!(out, "{:=^60}", " Risultati Analisi NPS ")?;
    writeln!(out, "Colonna NPS:        {}", analysis.nps_column)?;
    writeln!(out, "Record Totali:      {}", s.total_records)?;
    writeln!(out, "Risposte NPS:       {}", s.total_responses)?;
    writeln!(out, "Tasso di Risposta:  {:.1}%", s.response_rate)?;
    writeln!(out, "NPS Score:          {:.1}%", s.nps_percent)?;

    writeln!(out)?;
    writeln!(out, "{:<12} {:>10} {:>12}", "Categoria", "Conteggio", "Percentuale")?;
    writeln!(out, "{:-<36}", "")?;
    for share in s.segment_shares() {
        writeln!(
            out,
            "{:<12} {:>10} {:>11.1}%",
            share.category, share.count, share.percentage
        )?;
    }

    writeln!(out)?;
    let mut chart = TextChart::default();
    out.push_str(&chart.donut("Distribuzione NPS", &segment_slices(&s.counts))?);
    Ok(out)
}

/// Load a file and return its formatted NPS summary.
pub fn run_analysis(input: &Path) -> Result<String> {
    let (_, analysis) = load_and_analyze(input)?;
    format_summary(&analysis)
}

// ============================================================================
// Detractor report
// ============================================================================

/// Build the detractor report and export it.
pub fn generate_detractor_report(config: &ReportConfig) -> Result<ReportOutcome> {
    let (session, analysis) = load_and_analyze(&config.input)?;
    detractor_report_for(&session, &analysis, config)
}

fn detractor_report_for(
    session: &Session,
    analysis: &Analysis,
    config: &ReportConfig,
) -> Result<ReportOutcome> {
    let report = match session.detractor_report(analysis) {
        Ok(report) => report,
        Err(e) if e.is_empty_result() => return Ok(ReportOutcome::info(e.to_string())),
        Err(e) => return Err(e).context(REPORT_CONTEXT),
    };

    let xlsx = output_path(&config.output_dir, DETRACTOR_FILE_PREFIX, "xlsx");
    write_detractor_workbook(&report, &xlsx).context(REPORT_CONTEXT)?;
    let mut files = vec![xlsx];

    if config.csv {
        files.push(csv_copy(
            &report.rows,
            &config.output_dir,
            DETRACTOR_FILE_PREFIX,
            REPORT_CONTEXT,
        )?);
    }

    let mut message = format!("Report generato: {} record di detrattori", report.len());
    if report.zone_column.is_none() {
        message.push_str(" (colonna zona non trovata, ordine originale)");
    }
    Ok(ReportOutcome { message, files })
}

// ============================================================================
// Zone leaderboard
// ============================================================================

/// Format the leaderboard table and the top-zones bar chart.
pub fn format_leaderboard(board: &Leaderboard, top_n: usize) -> Result<String> {
    let zone_width = board
        .zones
        .iter()
        .map(|z| z.zone.chars().count())
        .max()
        .unwrap_or(0)
        .max("ZONA_PTL".len());
    let mut out = String::new();

    writeln!(
        out,
        "{:>4} {:<zw$} {:>6} {:>6} {:>6} {:>7} {:>9} {:>9}",
        "Pos",
        "ZONA_PTL",
        "Detr",
        "Neutri",
        "Prom",
        "Totale",
        "NPS %",
        "Riclass%",
        zw = zone_width
    )?;
    for z in &board.zones {
        writeln!(
            out,
            "{:>4} {:<zw$} {:>6} {:>6} {:>6} {:>7} {:>8.2}% {:>8.2}%",
            z.rank,
            z.zone,
            z.detractors,
            z.neutrals,
            z.promoters,
            z.total_responses,
            z.nps_percent,
            z.nps_reclassified_percent,
            zw = zone_width
        )?;
    }

    writeln!(out)?;
    let title = format!("Top {} Zone per NPS Riclassificato", top_n);
    let mut chart = TextChart::default();
    out.push_str(&chart.bar(&title, &zone_bars(board.top(top_n)))?);
    Ok(out)
}

/// Build the zone leaderboard and export it.
pub fn generate_leaderboard(config: &ReportConfig) -> Result<(ReportOutcome, String)> {
    let (session, analysis) = load_and_analyze(&config.input)?;
    leaderboard_for(&session, &analysis, config)
}

fn leaderboard_for(
    session: &Session,
    analysis: &Analysis,
    config: &ReportConfig,
) -> Result<(ReportOutcome, String)> {
    let board = match session.zone_leaderboard(analysis) {
        Ok(board) => board,
        Err(e) if e.is_empty_result() => {
            return Ok((ReportOutcome::info(e.to_string()), String::new()))
        }
        Err(e) => return Err(e).context(LEADERBOARD_CONTEXT),
    };

    let table = format_leaderboard(&board, config.top_n)?;

    let xlsx = output_path(&config.output_dir, LEADERBOARD_FILE_PREFIX, "xlsx");
    write_leaderboard_workbook(&board, &xlsx).context(LEADERBOARD_CONTEXT)?;
    let mut files = vec![xlsx];

    if config.csv {
        files.push(csv_copy(
            &board.zones,
            &config.output_dir,
            LEADERBOARD_FILE_PREFIX,
            LEADERBOARD_CONTEXT,
        )?);
    }

    let message = format!("Classifica generata per {} zone", board.len());
    Ok((ReportOutcome { message, files }, table))
}

// ============================================================================
// Full run
// ============================================================================

/// Analyse once and produce both reports from the same session.
pub fn generate_all(config: &ReportConfig) -> Result<String> {
    let (session, analysis) = load_and_analyze(&config.input)?;
    let mut out = format_summary(&analysis)?;

    let detractors = detractor_report_for(&session, &analysis, config)?;
    writeln!(out)?;
    writeln!(out, "{}", detractors.message)?;
    for f in &detractors.files {
        writeln!(out, "  -> {}", f.display())?;
    }

    writeln!(out)?;
    match leaderboard_for(&session, &analysis, config) {
        Ok((outcome, table)) => {
            out.push_str(&table);
            writeln!(out, "{}", outcome.message)?;
            for f in &outcome.files {
                writeln!(out, "  -> {}", f.display())?;
            }
        }
        // A missing zone column only rules out the leaderboard
        Err(e) => {
            log::warn!("{:#}", e);
            writeln!(out, "{:#}", e)?;
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;
    use crate::table::{CellValue, ResponseTable};

    fn session(columns: &[&str], rows: Vec<Vec<CellValue>>) -> Session {
        let table = ResponseTable::from_rows(columns.iter().map(|c| c.to_string()).collect(), rows);
        Session::from_table("mem.xlsx", table)
    }

    #[test]
    fn test_no_detractors_is_informational() {
        let s = session(&["NPS"], vec![vec![CellValue::Number(9.0)]]);
        let analysis = s.analyze().unwrap();
        let err = s.detractor_report(&analysis).unwrap_err();
        assert!(err.is_empty_result());

        let dir = tempfile::tempdir().unwrap();
        let mut config = ReportConfig::new("mem.xlsx");
        config.output_dir = dir.path().to_path_buf();
        let outcome = detractor_report_for(&s, &analysis, &config).unwrap();
        assert!(outcome.files.is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_leaderboard_missing_zone_is_error() {
        let s = session(&["NPS"], vec![vec![CellValue::Number(9.0)]]);
        let analysis = s.analyze().unwrap();
        let err = s.zone_leaderboard(&analysis).unwrap_err();
        assert!(matches!(err, AnalysisError::MissingColumn { .. }));

        let config = ReportConfig::new("mem.xlsx");
        let err = leaderboard_for(&s, &analysis, &config).unwrap_err();
        let msg = format!("{:#}", err);
        assert!(msg.contains("classifica"));
        assert!(msg.contains("Zona"));
    }

    #[test]
    fn test_csv_copy_failure_names_operation() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        let err = csv_copy(&[1u8], &missing, DETRACTOR_FILE_PREFIX, REPORT_CONTEXT).unwrap_err();
        let msg = format!("{:#}", err);
        assert!(msg.starts_with("Errore nella generazione del report: "));
        assert!(msg.contains("Failed to create"));

        let path = csv_copy(&[1u8], dir.path(), LEADERBOARD_FILE_PREFIX, LEADERBOARD_CONTEXT).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_format_summary() {
        let s = session(
            &["NPS SCORE"],
            vec![
                vec![CellValue::Number(2.0)],
                vec![CellValue::Number(9.0)],
                vec![CellValue::Number(9.0)],
                vec![CellValue::Number(10.0)],
                vec![CellValue::Number(5.0)],
                vec![CellValue::Number(7.0)],
                vec![CellValue::Number(8.0)],
                vec![CellValue::Number(9.0)],
            ],
        );
        let analysis = s.analyze().unwrap();
        let text = format_summary(&analysis).unwrap();
        assert!(text.contains("NPS Score:          25.0%"));
        assert!(text.contains("Tasso di Risposta:  100.0%"));
        assert!(text.contains("Distribuzione NPS"));
    }

    #[test]
    fn test_format_leaderboard_lists_ranks() {
        let s = session(
            &["NPS", "ZONA"],
            vec![
                vec![CellValue::Number(1.0), CellValue::Text("Nord".into())],
                vec![CellValue::Number(10.0), CellValue::Text("Sud".into())],
            ],
        );
        let analysis = s.analyze().unwrap();
        let board = s.zone_leaderboard(&analysis).unwrap();
        let text = format_leaderboard(&board, 1).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[1].trim_start().starts_with("1 Sud"));
        assert!(lines[2].trim_start().starts_with("2 Nord"));
        assert!(text.contains("Top 1 Zone"));
    }
}
