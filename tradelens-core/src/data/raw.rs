//! Raw trade-history CSV: one row per account, trade log as a JSON cell.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Serialize;

use super::error::LoadError;

/// The raw input table, read as strings.
///
/// Short rows are padded with empty cells so every row has one cell per
/// header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    label: String,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// Per-column fill statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    pub non_empty: usize,
    pub missing: usize,
}

/// What `inspect` prints: shape, missing values, and the first rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetSummary {
    pub label: String,
    pub total_rows: usize,
    /// Rows dropped because their trade-history cell was empty.
    pub dropped_missing_history: usize,
    /// Fill statistics over the rows that survive the drop.
    pub columns: Vec<ColumnSummary>,
    pub head: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(label: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut r| {
                r.resize(width, String::new());
                r
            })
            .collect();
        Self {
            label: label.into(),
            headers,
            rows,
        }
    }

    /// Read a raw CSV from disk.
    pub fn read_csv(path: &Path) -> Result<Self, LoadError> {
        if !path.exists() {
            return Err(LoadError::MissingInput {
                path: path.to_path_buf(),
            });
        }
        let file = File::open(path).map_err(|e| LoadError::io(path, e))?;
        Self::from_reader(file, path.display().to_string())
    }

    pub fn from_reader<R: Read>(reader: R, label: impl Into<String>) -> Result<Self, LoadError> {
        let label = label.into();
        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers: Vec<String> = rdr
            .headers()
            .map_err(|e| LoadError::csv(label.clone(), e))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record.map_err(|e| LoadError::csv(label.clone(), e))?;
            rows.push(record.iter().map(str::to_string).collect());
        }
        Ok(Self::new(label, headers, rows))
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn require_column(&self, name: &str) -> Result<usize, LoadError> {
        self.column_index(name).ok_or_else(|| LoadError::MissingColumn {
            column: name.to_string(),
            table: self.label.clone(),
        })
    }

    /// Summarize the table after dropping rows with no trade history.
    ///
    /// If `history_column` is absent nothing is dropped.
    pub fn summary(&self, history_column: &str, head: usize) -> DatasetSummary {
        let history_idx = self.column_index(history_column);
        let kept: Vec<&Vec<String>> = self
            .rows
            .iter()
            .filter(|row| match history_idx {
                Some(i) => !is_missing(&row[i]),
                None => true,
            })
            .collect();

        let columns = self
            .headers
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let missing = kept.iter().filter(|row| is_missing(&row[i])).count();
                ColumnSummary {
                    name: name.clone(),
                    non_empty: kept.len() - missing,
                    missing,
                }
            })
            .collect();

        DatasetSummary {
            label: self.label.clone(),
            total_rows: self.rows.len(),
            dropped_missing_history: self.rows.len() - kept.len(),
            columns,
            head: kept.iter().take(head).map(|r| (*r).clone()).collect(),
        }
    }
}

/// Empty cells and the textual null markers pandas writes count as missing.
pub(crate) fn is_missing(cell: &str) -> bool {
    matches!(cell.trim(), "" | "NaN" | "nan" | "null" | "None")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Port_IDs,Trade_History\n\
        1,\"[{\"\"realizedProfit\"\": 1.0}]\"\n\
        2,\n\
        3,\"[]\"\n";

    #[test]
    fn reads_headers_and_rows() {
        let t = RawTable::from_reader(SAMPLE.as_bytes(), "sample").unwrap();
        assert_eq!(t.headers(), &["Port_IDs", "Trade_History"]);
        assert_eq!(t.len(), 3);
        assert_eq!(t.rows()[0][1], "[{\"realizedProfit\": 1.0}]");
        assert_eq!(t.require_column("Trade_History").unwrap(), 1);
    }

    #[test]
    fn missing_column_is_reported() {
        let t = RawTable::from_reader(SAMPLE.as_bytes(), "sample").unwrap();
        let err = t.require_column("Nope").unwrap_err();
        assert!(err.to_string().contains("'Nope'"));
        assert!(err.to_string().contains("sample"));
    }

    #[test]
    fn short_rows_are_padded() {
        let t = RawTable::from_reader("a,b,c\n1\n".as_bytes(), "short").unwrap();
        assert_eq!(t.rows()[0], vec!["1".to_string(), String::new(), String::new()]);
    }

    #[test]
    fn summary_drops_rows_without_history() {
        let t = RawTable::from_reader(SAMPLE.as_bytes(), "sample").unwrap();
        let s = t.summary("Trade_History", 5);
        assert_eq!(s.total_rows, 3);
        assert_eq!(s.dropped_missing_history, 1);
        assert_eq!(s.head.len(), 2);
        assert_eq!(s.columns[1].missing, 0);
        assert_eq!(s.columns[1].non_empty, 2);
    }

    #[test]
    fn read_csv_missing_file() {
        let err = RawTable::read_csv(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, LoadError::MissingInput { .. }));
    }
}
