//! Detractor report: every response scoring below 7, with its supporting
//! fields, ordered so that zones with the fewest detractors come first.

use crate::columns::Field;
use crate::table::{CellValue, ResponseTable};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Rows with a score strictly below this value enter the report.
///
/// Kept separate from the classifier's `<= 6` detractor bucket: the two only
/// agree for integral scores.
pub const DETRACTOR_THRESHOLD: f64 = 7.0;

/// Written in place of a field whose source column is missing.
pub const PLACEHOLDER: &str = "N/D";

pub const DETRACTOR_HEADERS: [&str; 6] = [
    "LDV",
    "NPS SCORE",
    "ZONA_PTL",
    "NPS - Verbatim Detrattori",
    "CONDIZIONE",
    "CLIENTE",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetractorRow {
    #[serde(rename = "LDV")]
    pub ldv: String,
    #[serde(rename = "NPS SCORE")]
    pub nps_score: f64,
    #[serde(rename = "ZONA_PTL")]
    pub zone: String,
    #[serde(rename = "NPS - Verbatim Detrattori")]
    pub verbatim: String,
    /// "<condition> - <delivery location>", or empty when both are empty.
    #[serde(rename = "CONDIZIONE")]
    pub condition: String,
    #[serde(rename = "CLIENTE")]
    pub customer: String,
}

impl DetractorRow {
    /// Cells in `DETRACTOR_HEADERS` order, rendered as text.
    pub fn cells(&self) -> [String; 6] {
        [
            self.ldv.clone(),
            CellValue::Number(self.nps_score).to_string(),
            self.zone.clone(),
            self.verbatim.clone(),
            self.condition.clone(),
            self.customer.clone(),
        ]
    }
}

/// Detractor rows plus the zone counts used to order them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetractorReport {
    pub rows: Vec<DetractorRow>,
    /// Source column used for zones, if one was found.
    pub zone_column: Option<String>,
    /// Detractors per zone, in the order zones appear in the report.
    pub zone_counts: Vec<(String, usize)>,
}

impl DetractorReport {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Column positions resolved once per report; the schema is the same for
/// every row.
#[derive(Debug, Clone, Copy)]
struct SourceColumns {
    ldv: Option<usize>,
    zone: Option<usize>,
    verbatim: Option<usize>,
    condition: Option<usize>,
    location: Option<usize>,
    customer: Option<usize>,
}

impl SourceColumns {
    fn resolve(table: &ResponseTable) -> Self {
        let find = |field: Field| {
            let found = field.resolve(table.columns());
            match found {
                Some(name) => log::debug!("{} column: '{}'", field.label(), name),
                None => log::debug!("{} column not found, using '{}'", field.label(), PLACEHOLDER),
            }
            found.and_then(|name| table.column_index(name))
        };

        Self {
            ldv: find(Field::Ldv),
            zone: find(Field::Zone),
            verbatim: find(Field::Verbatim),
            condition: find(Field::Condition),
            location: find(Field::Location),
            customer: find(Field::Customer),
        }
    }
}

/// Text of a cell, or the placeholder when its column was not found.
fn field_text(row: &[CellValue], col: Option<usize>) -> String {
    match col {
        Some(i) => row.get(i).map(|c| c.to_string()).unwrap_or_default(),
        None => PLACEHOLDER.to_string(),
    }
}

/// Join package condition and delivery location. Missing columns and empty
/// cells both contribute an empty part.
fn combine_condition(row: &[CellValue], condition: Option<usize>, location: Option<usize>) -> String {
    let part = |col: Option<usize>| {
        col.and_then(|i| row.get(i))
            .map(|c| c.to_string())
            .unwrap_or_default()
    };
    let combined = format!("{} - {}", part(condition), part(location));
    if combined == " - " {
        String::new()
    } else {
        combined
    }
}

/// Build the detractor report for `nps_column`.
///
/// The result may be empty; callers decide how to surface that.
pub fn build_detractor_report(table: &ResponseTable, nps_column: &str) -> DetractorReport {
    let Some(nps_idx) = table.column_index(nps_column) else {
        log::warn!("NPS column '{}' not present in table", nps_column);
        return DetractorReport::default();
    };
    let cols = SourceColumns::resolve(table);

    // (zone key, row) pairs; the key is None when the zone cell is empty
    let mut entries: Vec<(Option<String>, DetractorRow)> = Vec::new();
    for row in table.rows() {
        let Some(score) = row[nps_idx].as_score() else {
            continue;
        };
        if score >= DETRACTOR_THRESHOLD {
            continue;
        }

        let zone_key = cols
            .zone
            .and_then(|i| row.get(i))
            .filter(|c| !c.is_empty())
            .map(|c| c.to_string());

        entries.push((
            zone_key,
            DetractorRow {
                ldv: field_text(row, cols.ldv),
                nps_score: score,
                zone: field_text(row, cols.zone),
                verbatim: field_text(row, cols.verbatim),
                condition: combine_condition(row, cols.condition, cols.location),
                customer: field_text(row, cols.customer),
            },
        ));
    }

    let zone_column = cols.zone.map(|i| table.columns()[i].clone());
    let mut zone_counts = Vec::new();

    if zone_column.is_some() {
        zone_counts = count_by_zone(&entries);
        let rank: HashMap<&str, usize> = zone_counts
            .iter()
            .enumerate()
            .map(|(i, (zone, _))| (zone.as_str(), i))
            .collect();
        // Stable: rows keep their original order within a zone. Rows with no
        // zone sort after every ranked zone.
        let mut ranked: Vec<(usize, DetractorRow)> = entries
            .into_iter()
            .map(|(key, row)| {
                let r = key
                    .as_deref()
                    .and_then(|k| rank.get(k).copied())
                    .unwrap_or(usize::MAX);
                (r, row)
            })
            .collect();
        ranked.sort_by_key(|(r, _)| *r);

        log::info!(
            "Detractor report: {} rows across {} zones",
            ranked.len(),
            zone_counts.len()
        );
        return DetractorReport {
            rows: ranked.into_iter().map(|(_, row)| row).collect(),
            zone_column,
            zone_counts,
        };
    }

    log::info!("Detractor report: {} rows, no zone column", entries.len());
    DetractorReport {
        rows: entries.into_iter().map(|(_, row)| row).collect(),
        zone_column,
        zone_counts,
    }
}

/// Order of zone labels on a tie: numeric codes by value, then text labels.
fn compare_zones(a: &str, b: &str) -> Ordering {
    let num = |s: &str| s.trim().parse::<f64>().ok().filter(|n| n.is_finite());
    match (num(a), num(b)) {
        (Some(x), Some(y)) => x.total_cmp(&y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Detractors per zone, ascending by count, ties by zone label.
fn count_by_zone(entries: &[(Option<String>, DetractorRow)]) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for key in entries.iter().filter_map(|(k, _)| k.as_deref()) {
        *counts.entry(key).or_insert(0) += 1;
    }
    let mut sorted: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(zone, n)| (zone.to_string(), n))
        .collect();
    sorted.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| compare_zones(&a.0, &b.0)));
    sorted
}
