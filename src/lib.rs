//! NPS Analyzer
//!
//! Net Promoter Score analysis for customer survey exports.
//!
//! This library provides:
//! - `columns`: Fuzzy header lookup across inconsistently named exports
//! - `nps`: Detractor/neutral/promoter bucketing and NPS arithmetic
//! - `detractors`: Detractor report ordered by zone detractor volume
//! - `leaderboard`: Zone ranking by reclassified NPS
//! - `export`: Excel/CSV writers for both reports
//!
//! Binaries:
//! - `nps-analyzer`: Command-line front end (analyze, detractors, leaderboard, report)

pub mod chart;
pub mod columns;
pub mod detractors;
pub mod error;
pub mod export;
pub mod leaderboard;
pub mod nps;
pub mod pipeline;
pub mod session;
pub mod summary;
pub mod table;

pub use error::AnalysisError;
pub use session::{Analysis, Session};
pub use table::{CellValue, ResponseTable};
