//! Flattening of the per-row JSON trade log into a flat table.
//!
//! Each raw row carries one account identifier and a JSON document holding
//! that account's trade history. Flattening turns every trade object into
//! one flat row:
//! - an array of objects yields one row per object, a lone object one row
//! - nested objects become `.`-joined columns (`fee.asset`)
//! - nested arrays are kept as compact JSON text
//! - `null` becomes an empty cell
//!
//! Columns are the union of keys in first-seen order, with the account
//! column appended last. Exports that were written with Python `repr`
//! (single quotes, `True`/`False`/`None`) are normalized to JSON first.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::error::LoadError;
use super::raw::{is_missing, RawTable};
use super::table::FlatTable;

/// What to do with a row whose trade history cannot be parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// Abort the run on the first malformed row.
    Fail,
    /// Record the row in the report and continue.
    #[default]
    Skip,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenOptions {
    pub account_column: String,
    pub history_column: String,
    pub on_malformed: MalformedPolicy,
}

/// A row left out of the output, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRow {
    /// 1-based data row of the table the row came from.
    pub row: usize,
    pub account: String,
    pub reason: String,
}

/// Bookkeeping for one flatten pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlattenReport {
    pub input_rows: usize,
    pub dropped_empty: usize,
    pub skipped: Vec<SkippedRow>,
    pub trade_rows: usize,
}

/// Flatten a raw table into one row per trade.
pub fn flatten(raw: &RawTable, opts: &FlattenOptions) -> Result<(FlatTable, FlattenReport), LoadError> {
    let account_idx = raw.require_column(&opts.account_column)?;
    let history_idx = raw.require_column(&opts.history_column)?;

    let mut report = FlattenReport {
        input_rows: raw.len(),
        ..FlattenReport::default()
    };
    let mut builder = Builder::default();

    for (i, row) in raw.rows().iter().enumerate() {
        let row_no = i + 1;
        let account = row[account_idx].trim();
        let history = &row[history_idx];

        if is_missing(history) {
            report.dropped_empty += 1;
            continue;
        }

        let trades = match parse_history(history) {
            Ok(trades) => trades,
            Err(reason) => {
                let err = LoadError::MalformedRecord {
                    row: row_no,
                    account: account.to_string(),
                    reason: reason.clone(),
                };
                match opts.on_malformed {
                    MalformedPolicy::Fail => return Err(err),
                    MalformedPolicy::Skip => {
                        warn!(row = row_no, account, "{err}");
                        report.skipped.push(SkippedRow {
                            row: row_no,
                            account: account.to_string(),
                            reason,
                        });
                        continue;
                    }
                }
            }
        };

        debug!(row = row_no, account, trades = trades.len(), "flattened trade log");
        for trade in &trades {
            let mut cells = Vec::new();
            flatten_object("", trade, &mut cells);
            cells.retain(|(k, _)| k != &opts.account_column);
            builder.push(account, cells);
        }
    }

    let table = builder.finish(&opts.account_column);
    report.trade_rows = table.len();
    info!(
        input_rows = report.input_rows,
        dropped_empty = report.dropped_empty,
        skipped = report.skipped.len(),
        trade_rows = report.trade_rows,
        columns = table.columns().len(),
        "flattened raw trade history"
    );
    Ok((table, report))
}

/// Parse one trade-history cell into its trade objects.
///
/// Errors are returned as text so they can be attached to the row.
pub fn parse_history(text: &str) -> Result<Vec<Map<String, Value>>, String> {
    let value = match serde_json::from_str::<Value>(text) {
        Ok(v) => v,
        Err(json_err) => match normalize_python_literal(text) {
            Some(normalized) => {
                serde_json::from_str::<Value>(&normalized).map_err(|_| json_err.to_string())?
            }
            None => return Err(json_err.to_string()),
        },
    };

    match value {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::Object(obj) => Ok(obj),
                other => Err(format!(
                    "trade {i} is {}, expected an object",
                    kind_name(&other)
                )),
            })
            .collect(),
        Value::Object(obj) => Ok(vec![obj]),
        other => Err(format!(
            "trade history is {}, expected an array or object",
            kind_name(&other)
        )),
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn flatten_object(prefix: &str, obj: &Map<String, Value>, out: &mut Vec<(String, String)>) {
    for (key, value) in obj {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            Value::Object(inner) => flatten_object(&name, inner, out),
            other => out.push((name, cell_text(other))),
        }
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Rewrite a Python-literal document (`{'a': True}`) as JSON.
///
/// Returns `None` when the text has no Python-only syntax or a string is
/// unterminated.
pub(crate) fn normalize_python_literal(text: &str) -> Option<String> {
    let mut out = String::with_capacity(text.len() + 16);
    let mut chars = text.chars().peekable();
    let mut changed = false;

    while let Some(c) = chars.next() {
        match c {
            '\'' | '"' => {
                let quote = c;
                changed |= quote == '\'';
                out.push('"');
                loop {
                    let ch = chars.next()?;
                    match ch {
                        '\\' => {
                            let escaped = chars.next()?;
                            if escaped == '\'' {
                                out.push('\'');
                            } else {
                                out.push('\\');
                                out.push(escaped);
                            }
                        }
                        ch if ch == quote => break,
                        '"' => out.push_str("\\\""),
                        ch => out.push(ch),
                    }
                }
                out.push('"');
            }
            c if c.is_ascii_alphabetic() => {
                let mut word = String::from(c);
                while let Some(&next) = chars.peek() {
                    if next.is_ascii_alphanumeric() || next == '_' {
                        word.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let replacement = match word.as_str() {
                    "True" => "true",
                    "False" => "false",
                    "None" => "null",
                    _ => {
                        out.push_str(&word);
                        continue;
                    }
                };
                changed = true;
                out.push_str(replacement);
            }
            c => out.push(c),
        }
    }

    changed.then_some(out)
}

/// Accumulates flat rows while the column set grows.
#[derive(Default)]
struct Builder {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<String>>,
    accounts: Vec<String>,
}

impl Builder {
    /// Two paths can flatten to the same column (a literal `"fee.asset"` key
    /// next to a nested `fee.asset`); the first value wins.
    fn push(&mut self, account: &str, cells: Vec<(String, String)>) {
        let mut row = vec![String::new(); self.columns.len()];
        let mut filled = vec![false; self.columns.len()];
        for (name, value) in cells {
            let idx = match self.index.get(&name) {
                Some(&idx) => idx,
                None => {
                    let idx = self.columns.len();
                    self.index.insert(name.clone(), idx);
                    self.columns.push(name);
                    idx
                }
            };
            if idx >= row.len() {
                row.resize(idx + 1, String::new());
                filled.resize(idx + 1, false);
            }
            if filled[idx] {
                warn!(account, column = %self.columns[idx], "duplicate flattened key, keeping the first value");
                continue;
            }
            row[idx] = value;
            filled[idx] = true;
        }
        self.rows.push(row);
        self.accounts.push(account.to_string());
    }

    fn finish(self, account_column: &str) -> FlatTable {
        let width = self.columns.len();
        let mut columns = self.columns;
        columns.push(account_column.to_string());

        let mut table = FlatTable::new(columns);
        for (mut row, account) in self.rows.into_iter().zip(self.accounts) {
            row.resize(width, String::new());
            row.push(account);
            table.push_row(row);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(policy: MalformedPolicy) -> FlattenOptions {
        FlattenOptions {
            account_column: "Port_IDs".into(),
            history_column: "Trade_History".into(),
            on_malformed: policy,
        }
    }

    fn raw(rows: &[(&str, &str)]) -> RawTable {
        RawTable::new(
            "test",
            vec!["Port_IDs".into(), "Trade_History".into()],
            rows.iter()
                .map(|(a, h)| vec![a.to_string(), h.to_string()])
                .collect(),
        )
    }

    #[test]
    fn array_yields_one_row_per_trade() {
        let t = raw(&[(
            "A",
            r#"[{"realizedProfit": 10, "quantity": 100}, {"realizedProfit": -5, "quantity": 50}]"#,
        )]);
        let (table, report) = flatten(&t, &opts(MalformedPolicy::Fail)).unwrap();
        assert_eq!(table.columns(), &["realizedProfit", "quantity", "Port_IDs"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(1, "realizedProfit"), Some("-5"));
        assert_eq!(table.cell(1, "Port_IDs"), Some("A"));
        assert_eq!(report.trade_rows, 2);
    }

    #[test]
    fn union_of_keys_in_first_seen_order() {
        let t = raw(&[
            ("A", r#"[{"a": 1}]"#),
            ("B", r#"[{"b": 2, "a": 3}]"#),
        ]);
        let (table, _) = flatten(&t, &opts(MalformedPolicy::Fail)).unwrap();
        assert_eq!(table.columns(), &["a", "b", "Port_IDs"]);
        assert_eq!(table.rows()[0], vec!["1", "", "A"]);
        assert_eq!(table.rows()[1], vec!["3", "2", "B"]);
    }

    #[test]
    fn nested_objects_are_dotted() {
        let t = raw(&[("A", r#"{"fee": {"amount": 0.5, "asset": "USDT"}, "tags": [1, 2], "x": null}"#)]);
        let (table, _) = flatten(&t, &opts(MalformedPolicy::Fail)).unwrap();
        assert_eq!(table.cell(0, "fee.amount"), Some("0.5"));
        assert_eq!(table.cell(0, "fee.asset"), Some("USDT"));
        assert_eq!(table.cell(0, "tags"), Some("[1,2]"));
        assert_eq!(table.cell(0, "x"), Some(""));
    }

    #[test]
    fn dotted_key_collision_keeps_first_value() {
        let t = raw(&[("A", r#"[{"fee.asset": "BNB", "fee": {"asset": "USDT", "amount": 1}}]"#)]);
        let (table, _) = flatten(&t, &opts(MalformedPolicy::Fail)).unwrap();
        assert_eq!(table.columns(), &["fee.asset", "fee.amount", "Port_IDs"]);
        assert_eq!(table.cell(0, "fee.asset"), Some("BNB"));
        assert_eq!(table.cell(0, "fee.amount"), Some("1"));
    }

    #[test]
    fn empty_history_is_dropped_not_skipped() {
        let t = raw(&[("A", ""), ("B", "[]"), ("C", r#"[{"a": 1}]"#)]);
        let (table, report) = flatten(&t, &opts(MalformedPolicy::Fail)).unwrap();
        assert_eq!(report.dropped_empty, 1);
        assert!(report.skipped.is_empty());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn malformed_row_fails_under_fail_policy() {
        let t = raw(&[("A", r#"[{"a": 1}]"#), ("B", "{not json")]);
        let err = flatten(&t, &opts(MalformedPolicy::Fail)).unwrap_err();
        match err {
            LoadError::MalformedRecord { row, account, .. } => {
                assert_eq!(row, 2);
                assert_eq!(account, "B");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn malformed_row_is_reported_under_skip_policy() {
        let t = raw(&[("A", "[1, 2]"), ("B", r#"[{"a": 1}]"#)]);
        let (table, report) = flatten(&t, &opts(MalformedPolicy::Skip)).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].row, 1);
        assert_eq!(report.skipped[0].account, "A");
        assert!(report.skipped[0].reason.contains("expected an object"));
    }

    #[test]
    fn nested_account_key_yields_to_attached_id() {
        let t = raw(&[("A", r#"[{"Port_IDs": "spoofed", "a": 1}]"#)]);
        let (table, _) = flatten(&t, &opts(MalformedPolicy::Fail)).unwrap();
        assert_eq!(table.columns(), &["a", "Port_IDs"]);
        assert_eq!(table.cell(0, "Port_IDs"), Some("A"));
    }

    #[test]
    fn python_literal_history_is_accepted() {
        let text = "[{'symbol': 'SOLUSDT', 'realizedProfit': 1.5, 'activeBuy': True, 'note': None}]";
        let trades = parse_history(text).unwrap();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0]["symbol"], Value::String("SOLUSDT".into()));
        assert_eq!(trades[0]["activeBuy"], Value::Bool(true));
        assert_eq!(trades[0]["note"], Value::Null);
    }

    #[test]
    fn python_literal_keeps_embedded_quotes() {
        let normalized = normalize_python_literal(r#"{'q': 'say "hi"', 'it\'s': False}"#).unwrap();
        let v: Value = serde_json::from_str(&normalized).unwrap();
        assert_eq!(v["q"], Value::String("say \"hi\"".into()));
        assert_eq!(v["it's"], Value::Bool(false));
    }

    #[test]
    fn plain_json_needs_no_normalization() {
        assert!(normalize_python_literal(r#"{"a": true}"#).is_none());
        assert!(normalize_python_literal("{'unterminated").is_none());
    }

    #[test]
    fn scalar_history_is_rejected() {
        let err = parse_history("42").unwrap_err();
        assert!(err.contains("a number"));
    }
}
