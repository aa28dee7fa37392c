//! FlatTable: flattened trade rows, one column per JSON field.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use tracing::warn;

use super::error::LoadError;
use super::flatten::{MalformedPolicy, SkippedRow};
use crate::domain::{AccountId, TradeRecord};
use crate::schema::TradeColumns;

/// String-typed flat table. Every row has exactly one cell per column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl FlatTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row, padding or truncating it to the column count.
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.columns.len(), String::new());
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
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
        self.columns.iter().position(|c| c == name)
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let col = self.column_index(column)?;
        self.rows.get(row).map(|r| r[col].as_str())
    }

    fn require_column(&self, name: &str) -> Result<usize, LoadError> {
        self.column_index(name).ok_or_else(|| LoadError::MissingColumn {
            column: name.to_string(),
            table: "flattened trades".to_string(),
        })
    }

    // ─── CSV I/O ────────────────────────────────────────────────────────

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
        let columns = rdr
            .headers()
            .map_err(|e| LoadError::csv(label.clone(), e))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut table = Self::new(columns);
        for record in rdr.records() {
            let record = record.map_err(|e| LoadError::csv(label.clone(), e))?;
            table.push_row(record.iter().map(str::to_string).collect());
        }
        Ok(table)
    }

    pub fn to_writer<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(&self.columns)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn write_csv(&self, path: &Path) -> Result<(), LoadError> {
        let file = File::create(path).map_err(|e| LoadError::io(path, e))?;
        self.to_writer(file)
            .map_err(|e| LoadError::csv(path.display().to_string(), e))
    }

    // ─── Typed projection ───────────────────────────────────────────────

    /// Project every row onto a [`TradeRecord`].
    ///
    /// The account, profit and quantity columns must exist; the time column
    /// is optional. A row with an empty account or a non-numeric profit or
    /// quantity is malformed and handled per `policy`.
    pub fn trade_records(
        &self,
        columns: &TradeColumns,
        policy: MalformedPolicy,
    ) -> Result<(Vec<TradeRecord>, Vec<SkippedRow>), LoadError> {
        let account_idx = self.require_column(&columns.account)?;
        let profit_idx = self.require_column(&columns.profit)?;
        let quantity_idx = self.require_column(&columns.quantity)?;
        let time_idx = self.column_index(&columns.time);

        let mut records = Vec::with_capacity(self.rows.len());
        let mut skipped = Vec::new();

        for (i, row) in self.rows.iter().enumerate() {
            let account = row[account_idx].trim();
            let parsed = if account.is_empty() {
                Err("empty account identifier".to_string())
            } else {
                parse_number(&row[profit_idx], &columns.profit).and_then(|profit| {
                    parse_number(&row[quantity_idx], &columns.quantity).map(|qty| (profit, qty))
                })
            };

            match parsed {
                Ok((realized_profit, quantity)) => records.push(TradeRecord {
                    account: AccountId::from(account),
                    realized_profit,
                    quantity,
                    time: time_idx.and_then(|t| parse_time(&row[t])),
                    row: i,
                }),
                Err(reason) => {
                    let err = LoadError::MalformedRecord {
                        row: i + 1,
                        account: account.to_string(),
                        reason: reason.clone(),
                    };
                    if policy == MalformedPolicy::Fail {
                        return Err(err);
                    }
                    warn!(row = i + 1, account, "{err}");
                    skipped.push(SkippedRow {
                        row: i + 1,
                        account: account.to_string(),
                        reason,
                    });
                }
            }
        }

        Ok((records, skipped))
    }
}

fn parse_number(cell: &str, column: &str) -> Result<f64, String> {
    let text = cell.trim();
    if text.is_empty() {
        return Err(format!("missing '{column}'"));
    }
    match text.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        Ok(_) => Err(format!("'{column}' is not finite: {text}")),
        Err(_) => Err(format!("'{column}' is not a number: {text}")),
    }
}

fn parse_time(cell: &str) -> Option<i64> {
    let text = cell.trim();
    text.parse::<i64>().ok().or_else(|| {
        text.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(|v| v as i64)
    })
}
