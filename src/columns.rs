//! Tolerant column lookup for spreadsheet exports whose headers vary.

pub const NPS_CANDIDATES: &[&str] = &[
    "NPS SCORE",
    "NPS",
    "SCORE NPS",
    "VALUTAZIONE NPS",
    "NPS_VALUE",
];
pub const LDV_CANDIDATES: &[&str] = &["LDV"];
pub const ZONE_CANDIDATES: &[&str] = &["ZONA_PTL", "ZONA", "AREA"];
pub const VERBATIM_CANDIDATES: &[&str] = &["NPS - VERBATIM DETRATTORI", "VERBATIM", "COMMENTI"];
pub const CONDITION_CANDIDATES: &[&str] = &["CONDIZIONE DEL PACCO", "CONDIZIONE"];
pub const LOCATION_CANDIDATES: &[&str] = &["LUOGO DI CONSEGNA DEL PACCO", "LUOGO CONSEGNA"];
pub const CUSTOMER_CANDIDATES: &[&str] = &["RAGIONE SOCIALE CLIENTE", "CLIENTE"];

/// Semantic fields the reports look up by fuzzy header match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Nps,
    Ldv,
    Zone,
    Verbatim,
    Condition,
    Location,
    Customer,
}

impl Field {
    /// Candidate header fragments, highest priority first.
    pub fn candidates(self) -> &'static [&'static str] {
        match self {
            Field::Nps => NPS_CANDIDATES,
            Field::Ldv => LDV_CANDIDATES,
            Field::Zone => ZONE_CANDIDATES,
            Field::Verbatim => VERBATIM_CANDIDATES,
            Field::Condition => CONDITION_CANDIDATES,
            Field::Location => LOCATION_CANDIDATES,
            Field::Customer => CUSTOMER_CANDIDATES,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Nps => "NPS",
            Field::Ldv => "LDV",
            Field::Zone => "Zona",
            Field::Verbatim => "Verbatim",
            Field::Condition => "Condizione",
            Field::Location => "Luogo consegna",
            Field::Customer => "Cliente",
        }
    }

    /// Resolve this field against a header row.
    pub fn resolve(self, columns: &[String]) -> Option<&str> {
        find_column(self.candidates(), columns)
    }
}

/// Find the first column whose name contains any candidate, ignoring case.
///
/// Columns are scanned in table order and the first hit wins, so an earlier
/// column matching a low-priority candidate beats a later column matching a
/// high-priority one. No match is a normal outcome.
pub fn find_column<'a, S: AsRef<str>>(candidates: &[&str], columns: &'a [S]) -> Option<&'a str> {
    let wanted: Vec<String> = candidates.iter().map(|c| c.to_uppercase()).collect();
    columns.iter().map(|c| c.as_ref()).find(|col| {
        let col_upper = col.to_uppercase();
        wanted.iter().any(|name| col_upper.contains(name.as_str()))
    })
}
