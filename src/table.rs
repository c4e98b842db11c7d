//! In-memory response table and the loaders that produce it.
//!
//! Only the first worksheet of a workbook is read. The first row is the
//! header; every following row becomes one response.

use crate::error::AnalysisError;
use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Field separators recognised in CSV exports, in preference order on a tie.
const CSV_DELIMITERS: [u8; 3] = [b',', b';', b'\t'];

/// A single cell of the response table.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Empty,
}

impl CellValue {
    /// Build a cell from raw text, treating numeric-looking strings as numbers.
    pub fn from_text(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return CellValue::Empty;
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => CellValue::Number(n),
            _ => CellValue::Text(raw.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Numeric NPS value of this cell, if it has one.
    ///
    /// Text is coerced when it parses as a number, including a decimal comma
    /// ("7,5"). Non-finite numbers count as missing.
    pub fn as_score(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) if n.is_finite() => Some(*n),
            CellValue::Number(_) | CellValue::Empty => None,
            CellValue::Text(s) => {
                let normalized = s.trim().replace(',', ".");
                normalized.parse::<f64>().ok().filter(|n| n.is_finite())
            }
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(n) => {
                // Integers without decimals, the way a spreadsheet shows them
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            CellValue::Text(s) => f.write_str(s),
            CellValue::Empty => Ok(()),
        }
    }
}

impl From<&Data> for CellValue {
    fn from(cell: &Data) -> Self {
        match cell {
            Data::Empty | Data::Error(_) => CellValue::Empty,
            Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
                if s.trim().is_empty() {
                    CellValue::Empty
                } else {
                    CellValue::Text(s.clone())
                }
            }
            Data::Float(n) => CellValue::Number(*n),
            Data::Int(n) => CellValue::Number(*n as f64),
            Data::Bool(b) => CellValue::Number(if *b { 1.0 } else { 0.0 }),
            Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        }
    }
}

/// Ordered rows of named columns, as read from one sheet.
///
/// The table is never modified after loading; reports derive new tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseTable {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl ResponseTable {
    /// Build a table from a header and rows. Short rows are padded with
    /// empty cells and long rows truncated to the header width.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, CellValue::Empty);
                row
            })
            .collect();
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell at `row` in the named column, or `None` if either is out of range.
    pub fn get(&self, row: usize, column: &str) -> Option<&CellValue> {
        let col = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// All non-missing scores in a column, in row order.
    pub fn scores(&self, column: &str) -> Vec<f64> {
        match self.column_index(column) {
            Some(col) => self.rows.iter().filter_map(|r| r[col].as_score()).collect(),
            None => Vec::new(),
        }
    }
}

/// Load the first sheet of a spreadsheet or a CSV file.
pub fn load_table(path: &Path) -> Result<ResponseTable, AnalysisError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let table = match ext.as_str() {
        "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => load_workbook(path)?,
        "csv" => load_csv(path)?,
        other => {
            return Err(AnalysisError::file_load(
                path,
                format!("unsupported file type '{}'", other),
            ))
        }
    };

    log::info!(
        "Loaded {} rows x {} columns from {}",
        table.len(),
        table.columns.len(),
        path.display()
    );
    Ok(table)
}

fn load_workbook(path: &Path) -> Result<ResponseTable, AnalysisError> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| AnalysisError::file_load(path, e))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AnalysisError::file_load(path, "workbook contains no sheets"))?
        .map_err(|e| AnalysisError::file_load(path, e))?;

    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| AnalysisError::file_load(path, "first sheet is empty"))?;
    let columns: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(i, cell)| header_name(i, &CellValue::from(cell).to_string()))
        .collect();

    let body: Vec<Vec<CellValue>> = rows
        .map(|row| row.iter().map(CellValue::from).collect())
        .collect();

    Ok(ResponseTable::from_rows(columns, body))
}

fn load_csv(path: &Path) -> Result<ResponseTable, AnalysisError> {
    let delimiter = sniff_delimiter(path)?;
    log::debug!("CSV delimiter for {}: {:?}", path.display(), delimiter as char);
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_path(path)
        .map_err(|e| AnalysisError::file_load(path, e))?;
    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| AnalysisError::file_load(path, e))?
        .iter()
        .enumerate()
        .map(|(i, h)| header_name(i, h))
        .collect();

    let mut body: Vec<Vec<CellValue>> = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| AnalysisError::file_load(path, e))?;
        body.push(record.iter().map(CellValue::from_text).collect());
    }

    Ok(ResponseTable::from_rows(columns, body))
}

/// Pick the separator that occurs most often in the header line, ignoring
/// quoted text. Excel with an Italian locale writes `;`.
fn sniff_delimiter(path: &Path) -> Result<u8, AnalysisError> {
    let file = File::open(path).map_err(|e| AnalysisError::file_load(path, e))?;
    let mut header = String::new();
    BufReader::new(file)
        .read_line(&mut header)
        .map_err(|e| AnalysisError::file_load(path, e))?;

    let mut counts = [0usize; CSV_DELIMITERS.len()];
    let mut quoted = false;
    for b in header.bytes() {
        if b == b'"' {
            quoted = !quoted;
        } else if !quoted {
            if let Some(i) = CSV_DELIMITERS.iter().position(|&d| d == b) {
                counts[i] += 1;
            }
        }
    }

    let best = (1..counts.len()).fold(0, |best, i| {
        if counts[i] > counts[best] {
            i
        } else {
            best
        }
    });
    Ok(CSV_DELIMITERS[best])
}

/// Blank headers get a positional placeholder so every column stays addressable.
fn header_name(idx: usize, raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        format!("Unnamed: {}", idx)
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_display_drops_integral_fraction() {
        assert_eq!(CellValue::Number(9.0).to_string(), "9");
        assert_eq!(CellValue::Number(7.5).to_string(), "7.5");
        assert_eq!(CellValue::Text("Nord".into()).to_string(), "Nord");
        assert_eq!(CellValue::Empty.to_string(), "");
    }

    #[test]
    fn test_as_score_coerces_text() {
        assert_eq!(CellValue::Text(" 8 ".into()).as_score(), Some(8.0));
        assert_eq!(CellValue::Text("6,5".into()).as_score(), Some(6.5));
        assert_eq!(CellValue::Text("n/a".into()).as_score(), None);
        assert_eq!(CellValue::Number(f64::NAN).as_score(), None);
        assert_eq!(CellValue::Empty.as_score(), None);
    }

    #[test]
    fn test_from_rows_pads_short_rows() {
        let table = ResponseTable::from_rows(
            vec!["A".into(), "B".into()],
            vec![vec![CellValue::Number(1.0)]],
        );
        assert_eq!(table.get(0, "B"), Some(&CellValue::Empty));
        assert_eq!(table.get(0, "C"), None);
    }

    #[test]
    fn test_load_csv() {
        use std::io::Write;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("survey.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "LDV,NPS SCORE,,ZONA").unwrap();
        writeln!(f, "A1,9,x,Nord").unwrap();
        writeln!(f, "A2,,y").unwrap();
        f.flush().unwrap();

        let table = load_table(&path).unwrap();
        assert_eq!(table.columns(), &["LDV", "NPS SCORE", "Unnamed: 2", "ZONA"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(0, "NPS SCORE"), Some(&CellValue::Number(9.0)));
        assert_eq!(table.get(1, "NPS SCORE"), Some(&CellValue::Empty));
        assert_eq!(table.get(1, "ZONA"), Some(&CellValue::Empty));
        assert_eq!(table.scores("NPS SCORE"), vec![9.0]);
    }

    #[test]
    fn test_load_semicolon_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.csv");
        std::fs::write(&path, "LDV;NPS SCORE;ZONA\nA;3;Nord\nB;9;Sud\nC;\"7,5\";Sud\n").unwrap();

        let table = load_table(&path).unwrap();
        assert_eq!(table.columns(), &["LDV", "NPS SCORE", "ZONA"]);
        assert_eq!(table.get(1, "ZONA"), Some(&CellValue::Text("Sud".into())));
        assert_eq!(table.scores("NPS SCORE"), vec![3.0, 9.0, 7.5]);
    }

    #[test]
    fn test_load_tab_csv_with_quoted_commas() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.csv");
        std::fs::write(&path, "\"Cliente, S.p.A.\"\tNPS\nACME\t10\n").unwrap();

        let table = load_table(&path).unwrap();
        assert_eq!(table.columns(), &["Cliente, S.p.A.", "NPS"]);
        assert_eq!(table.scores("NPS"), vec![10.0]);
    }

    #[test]
    fn test_load_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("survey.txt");
        std::fs::write(&path, "hello").unwrap();
        let err = load_table(&path).unwrap_err();
        assert!(matches!(err, AnalysisError::FileLoad { .. }));
    }

    #[test]
    fn test_load_missing_workbook() {
        let err = load_table(Path::new("/nonexistent/survey.xlsx")).unwrap_err();
        assert!(matches!(err, AnalysisError::FileLoad { .. }));
    }
}
