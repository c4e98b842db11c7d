//! Spreadsheet and CSV writers for the two reports.

use crate::detractors::{DetractorReport, DETRACTOR_HEADERS};
use crate::leaderboard::{Leaderboard, LEADERBOARD_HEADERS};
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use rust_xlsxwriter::{Format, Workbook};
use serde::Serialize;
use std::path::Path;

pub const DETRACTOR_SHEET: &str = "DETRATTORI";
pub const LEADERBOARD_SHEET: &str = "CLASSIFICA";
pub const DETRACTOR_FILE_PREFIX: &str = "report_detrattori";
pub const LEADERBOARD_FILE_PREFIX: &str = "report_classifica";

/// Upper bound for auto-sized column widths, in characters.
const MAX_COLUMN_WIDTH: usize = 50;
const PERCENT_COLUMN_WIDTH: f64 = 15.0;

/// `<prefix>_YYYYMMDD_HHMM.<ext>`
pub fn timestamped_filename(prefix: &str, now: DateTime<Local>, ext: &str) -> String {
    format!("{}_{}.{}", prefix, now.format("%Y%m%d_%H%M"), ext)
}

/// Width for a column: longest cell or header plus padding, capped.
fn auto_width<'a>(header: &str, cells: impl Iterator<Item = &'a str>) -> usize {
    let longest = cells
        .map(|c| c.chars().count())
        .max()
        .unwrap_or(0)
        .max(header.chars().count());
    (longest + 2).min(MAX_COLUMN_WIDTH)
}

/// Write the detractor report to a single-sheet workbook.
pub fn write_detractor_workbook(report: &DetractorReport, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let header_fmt = Format::new().set_bold();

    let rendered: Vec<[String; 6]> = report.rows.iter().map(|r| r.cells()).collect();

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(DETRACTOR_SHEET)?;

        for (col, header) in DETRACTOR_HEADERS.iter().enumerate() {
            sheet.write_string_with_format(0, col as u16, *header, &header_fmt)?;
        }

        for (i, (row, cells)) in report.rows.iter().zip(&rendered).enumerate() {
            let r = (i + 1) as u32;
            for (col, cell) in cells.iter().enumerate() {
                if col == 1 {
                    // Score stays numeric so it can be filtered in Excel
                    sheet.write_number(r, col as u16, row.nps_score)?;
                } else {
                    sheet.write_string(r, col as u16, cell)?;
                }
            }
        }

        for (col, header) in DETRACTOR_HEADERS.iter().enumerate() {
            let width = auto_width(header, rendered.iter().map(|cells| cells[col].as_str()));
            sheet.set_column_width(col as u16, width as f64)?;
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!("Wrote {} detractor rows to {}", report.len(), path.display());
    Ok(())
}

/// Write the leaderboard to a single-sheet workbook. Percentages are stored
/// as fractions and displayed with a `0.00%` number format.
pub fn write_leaderboard_workbook(board: &Leaderboard, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let header_fmt = Format::new().set_bold();
    let percent_fmt = Format::new().set_num_format("0.00%");

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(LEADERBOARD_SHEET)?;

        for (col, header) in LEADERBOARD_HEADERS.iter().enumerate() {
            sheet.write_string_with_format(0, col as u16, *header, &header_fmt)?;
        }

        for (i, zone) in board.zones.iter().enumerate() {
            let r = (i + 1) as u32;
            sheet.write_number(r, 0, zone.rank as f64)?;
            sheet.write_string(r, 1, &zone.zone)?;
            sheet.write_number(r, 2, zone.detractors as f64)?;
            sheet.write_number(r, 3, zone.neutrals as f64)?;
            sheet.write_number(r, 4, zone.promoters as f64)?;
            sheet.write_number(r, 5, zone.total_responses as f64)?;
            sheet.write_number_with_format(r, 6, zone.nps_percent / 100.0, &percent_fmt)?;
            sheet.write_number_with_format(
                r,
                7,
                zone.nps_reclassified_percent / 100.0,
                &percent_fmt,
            )?;
        }

        let zone_width = auto_width(
            LEADERBOARD_HEADERS[1],
            board.zones.iter().map(|z| z.zone.as_str()),
        );
        sheet.set_column_width(1, zone_width as f64)?;
        sheet.set_column_width(6, PERCENT_COLUMN_WIDTH)?;
        sheet.set_column_width(7, PERCENT_COLUMN_WIDTH)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!("Wrote {} zones to {}", board.len(), path.display());
    Ok(())
}

/// Write any serializable report rows as CSV, using their serde names as
/// headers.
pub fn write_csv<T: Serialize>(rows: &[T], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
