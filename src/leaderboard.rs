//! Zone leaderboard ranked by the reclassified NPS.

use crate::columns::find_column;
use crate::error::AnalysisError;
use crate::nps::SegmentCounts;
use crate::table::ResponseTable;
use serde::Serialize;
use std::collections::HashMap;

pub const LEADERBOARD_HEADERS: [&str; 8] = [
    "Posizione",
    "ZONA_PTL",
    "Detrattori (0-6)",
    "Neutri (7-8)",
    "Promotori (9-10)",
    "Totale Risposte",
    "NPS %",
    "NPS RICLASSIFICATO%",
];

/// Default number of zones shown in the bar chart.
pub const DEFAULT_CHART_ZONES: usize = 10;

/// Statistics for one zone, with its 1-based position in the ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneStats {
    #[serde(rename = "Posizione")]
    pub rank: usize,
    #[serde(rename = "ZONA_PTL")]
    pub zone: String,
    #[serde(rename = "Detrattori (0-6)")]
    pub detractors: u64,
    #[serde(rename = "Neutri (7-8)")]
    pub neutrals: u64,
    #[serde(rename = "Promotori (9-10)")]
    pub promoters: u64,
    #[serde(rename = "Totale Risposte")]
    pub total_responses: u64,
    #[serde(rename = "NPS %")]
    pub nps_percent: f64,
    #[serde(rename = "NPS RICLASSIFICATO%")]
    pub nps_reclassified_percent: f64,
}

impl ZoneStats {
    fn new(zone: String, counts: SegmentCounts) -> Self {
        Self {
            rank: 0,
            zone,
            detractors: counts.detractors,
            neutrals: counts.neutrals,
            promoters: counts.promoters,
            total_responses: counts.total_responses,
            nps_percent: counts.nps_percent(),
            nps_reclassified_percent: counts.nps_reclassified_percent(),
        }
    }
}

/// Zones in ranking order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Leaderboard {
    pub zone_column: String,
    pub zones: Vec<ZoneStats>,
}

impl Leaderboard {
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// The first `n` zones, for the bar chart.
    pub fn top(&self, n: usize) -> &[ZoneStats] {
        &self.zones[..n.min(self.zones.len())]
    }
}

/// Group responses by zone and rank zones by reclassified NPS, highest first.
///
/// Rows with an empty zone cell are ignored. A zone with no usable score is
/// left out of the ranking. Equal scores keep the order in which the zones
/// first appear in the table.
pub fn build_zone_leaderboard(
    table: &ResponseTable,
    nps_column: &str,
    zone_candidates: &[&str],
) -> Result<Leaderboard, AnalysisError> {
    let zone_column = find_column(zone_candidates, table.columns())
        .ok_or(AnalysisError::MissingColumn { field: "Zona" })?;
    let zone_idx = table
        .column_index(zone_column)
        .ok_or(AnalysisError::MissingColumn { field: "Zona" })?;
    let nps_idx = table.column_index(nps_column);

    // Zone label -> scores, in first-seen order
    let mut order: Vec<String> = Vec::new();
    let mut scores: HashMap<String, Vec<f64>> = HashMap::new();
    for row in table.rows() {
        let cell = &row[zone_idx];
        if cell.is_empty() {
            continue;
        }
        let zone = cell.to_string();
        let entry = scores.entry(zone.clone()).or_insert_with(|| {
            order.push(zone);
            Vec::new()
        });
        if let Some(score) = nps_idx.and_then(|i| row[i].as_score()) {
            entry.push(score);
        }
    }

    let mut zones: Vec<ZoneStats> = Vec::new();
    for zone in order {
        let counts = SegmentCounts::from_scores(scores.remove(&zone).unwrap_or_default());
        // Scores between buckets (6.5, 8.5) classify as nothing
        if counts.total_responses == 0 {
            log::debug!("Zone '{}' has no classified responses, skipping", zone);
            continue;
        }
        zones.push(ZoneStats::new(zone, counts));
    }

    zones.sort_by(|a, b| b.nps_reclassified_percent.total_cmp(&a.nps_reclassified_percent));
    for (i, z) in zones.iter_mut().enumerate() {
        z.rank = i + 1;
    }

    log::info!(
        "Leaderboard built for {} zones from column '{}'",
        zones.len(),
        zone_column
    );
    Ok(Leaderboard {
        zone_column: zone_column.to_string(),
        zones,
    })
}
