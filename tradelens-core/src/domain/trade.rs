//! TradeRecord: the typed projection of one flattened trade row.

use super::account::AccountId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One historical trade, reduced to the fields the metrics engine reads.
///
/// All other broker fields stay in the [`FlatTable`](crate::FlatTable) the
/// record was projected from; `row` points back into it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub account: AccountId,
    pub realized_profit: f64,
    pub quantity: f64,
    /// Trade time in epoch milliseconds, when the export carries one.
    pub time: Option<i64>,
    /// 0-based position in the flat table.
    pub row: usize,
}

impl TradeRecord {
    pub fn new(account: impl Into<AccountId>, realized_profit: f64, quantity: f64) -> Self {
        Self {
            account: account.into(),
            realized_profit,
            quantity,
            time: None,
            row: 0,
        }
    }

    pub fn with_time(mut self, time_ms: i64) -> Self {
        self.time = Some(time_ms);
        self
    }

    pub fn with_row(mut self, row: usize) -> Self {
        self.row = row;
        self
    }

    /// A winning position closed with strictly positive realized profit.
    pub fn is_winner(&self) -> bool {
        self.realized_profit > 0.0
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.time.and_then(DateTime::from_timestamp_millis)
    }
}
