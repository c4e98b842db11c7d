//! Per-upload context passed explicitly to every report builder.
//!
//! A `Session` owns the table loaded from one file; an `Analysis` holds the
//! results of analysing it. Loading a new file produces a new `Session`, so
//! earlier results are never mixed with a different dataset.

use crate::columns::{Field, NPS_CANDIDATES, ZONE_CANDIDATES};
use crate::detractors::{build_detractor_report, DetractorReport};
use crate::error::AnalysisError;
use crate::leaderboard::{build_zone_leaderboard, Leaderboard};
use crate::summary::NpsSummary;
use crate::table::{load_table, ResponseTable};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct Session {
    source: PathBuf,
    table: ResponseTable,
}

/// Outcome of a successful analysis run.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Header of the column the scores were read from.
    pub nps_column: String,
    pub summary: NpsSummary,
}

impl Session {
    pub fn load(path: &Path) -> Result<Self, AnalysisError> {
        let table = load_table(path)?;
        Ok(Self::from_table(path, table))
    }

    pub fn from_table(source: impl Into<PathBuf>, table: ResponseTable) -> Self {
        Self {
            source: source.into(),
            table,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn table(&self) -> &ResponseTable {
        &self.table
    }

    /// Locate the NPS column and compute the headline figures.
    pub fn analyze(&self) -> Result<Analysis, AnalysisError> {
        log::info!("Columns found: {:?}", self.table.columns());

        let nps_column = Field::Nps.resolve(self.table.columns()).ok_or_else(|| {
            AnalysisError::ColumnNotFound {
                candidates: NPS_CANDIDATES.iter().map(|s| s.to_string()).collect(),
            }
        })?;
        log::info!("Using '{}' as the NPS column", nps_column);

        let summary = NpsSummary::compute(&self.table, nps_column);
        log::debug!("Summary: {:?}", summary);

        Ok(Analysis {
            nps_column: nps_column.to_string(),
            summary,
        })
    }

    /// Detractor report for this session. An empty report comes back as
    /// `EmptyResultSet` so the caller can skip the export.
    pub fn detractor_report(&self, analysis: &Analysis) -> Result<DetractorReport, AnalysisError> {
        let report = build_detractor_report(&self.table, &analysis.nps_column);
        if report.is_empty() {
            return Err(AnalysisError::EmptyResultSet(
                "Nessun detrattore trovato nel dataset",
            ));
        }
        Ok(report)
    }

    /// Zone leaderboard for this session. Fails when no zone column exists.
    pub fn zone_leaderboard(&self, analysis: &Analysis) -> Result<Leaderboard, AnalysisError> {
        let board = build_zone_leaderboard(&self.table, &analysis.nps_column, ZONE_CANDIDATES)?;
        if board.is_empty() {
            return Err(AnalysisError::EmptyResultSet(
                "Nessuna zona con dati NPS sufficienti trovata",
            ));
        }
        Ok(board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::CellValue;

    #[test]
    fn test_analyze_resolves_nps_column() {
        let table = ResponseTable::from_rows(
            vec!["Data".into(), "Valutazione NPS".into()],
            vec![
                vec![CellValue::Text("2024-01-01".into()), CellValue::Number(9.0)],
                vec![CellValue::Text("2024-01-02".into()), CellValue::Number(3.0)],
            ],
        );
        let session = Session::from_table("mem.xlsx", table);
        let analysis = session.analyze().unwrap();
        assert_eq!(analysis.nps_column, "Valutazione NPS");
        assert_eq!(analysis.summary.total_responses, 2);
        assert_eq!(analysis.summary.nps_percent, 0.0);
    }

    #[test]
    fn test_analyze_without_nps_column() {
        let table = ResponseTable::from_rows(vec!["Voto".into()], vec![]);
        let session = Session::from_table("mem.xlsx", table);
        let err = session.analyze().unwrap_err();
        assert!(matches!(err, AnalysisError::ColumnNotFound { .. }));
    }
}
