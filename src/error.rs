//! Error taxonomy for loading and analysis.

use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced by the analysis engine.
///
/// `EmptyResultSet` is informational: callers report it and skip the export
/// rather than treating it as a failure.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The input file could not be read or is not tabular.
    #[error("failed to load '{}': {reason}", path.display())]
    FileLoad { path: PathBuf, reason: String },

    /// No column matched any of the NPS candidate names.
    #[error("NPS column not found (looked for {})", candidates.join(", "))]
    ColumnNotFound { candidates: Vec<String> },

    /// A column required by a specific report is absent.
    #[error("{field} column not found in the dataset")]
    MissingColumn { field: &'static str },

    /// The report has nothing to show.
    #[error("{0}")]
    EmptyResultSet(&'static str),
}

impl AnalysisError {
    pub(crate) fn file_load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        AnalysisError::FileLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// True for the informational "nothing to report" state.
    pub fn is_empty_result(&self) -> bool {
        matches!(self, AnalysisError::EmptyResultSet(_))
    }
}
