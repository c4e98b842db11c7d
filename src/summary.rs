//! Overall NPS summary for a loaded table.

use crate::nps::{Segment, SegmentCounts};
use crate::table::ResponseTable;
use serde::Serialize;

/// Headline figures for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NpsSummary {
    /// Rows in the table, answered or not.
    pub total_records: usize,
    /// Rows with a usable score.
    pub total_responses: usize,
    /// `total_responses / total_records` in percent; 0 for an empty table.
    pub response_rate: f64,
    pub counts: SegmentCounts,
    pub nps_percent: f64,
}

/// One line of the segment breakdown shown next to the donut chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentShare {
    #[serde(rename = "Categoria")]
    pub category: &'static str,
    #[serde(rename = "Conteggio")]
    pub count: u64,
    #[serde(rename = "Percentuale")]
    pub percentage: f64,
}

impl NpsSummary {
    pub fn compute(table: &ResponseTable, nps_column: &str) -> Self {
        let scores = table.scores(nps_column);
        let total_records = table.len();
        let total_responses = scores.len();
        let counts = SegmentCounts::from_scores(scores);

        let response_rate = if total_records == 0 {
            0.0
        } else {
            total_responses as f64 / total_records as f64 * 100.0
        };

        Self {
            total_records,
            total_responses,
            response_rate,
            nps_percent: counts.nps_percent(),
            counts,
        }
    }

    pub fn segment_shares(&self) -> Vec<SegmentShare> {
        Segment::ALL
            .iter()
            .map(|&segment| SegmentShare {
                category: segment.short_label(),
                count: self.counts.get(segment),
                percentage: self.counts.share_percent(segment),
            })
            .collect()
    }
}
