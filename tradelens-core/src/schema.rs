//! Column names the loader and metrics engine agree on.

use serde::{Deserialize, Serialize};

pub const DEFAULT_ACCOUNT_COLUMN: &str = "Port_IDs";
pub const DEFAULT_HISTORY_COLUMN: &str = "Trade_History";
pub const DEFAULT_PROFIT_COLUMN: &str = "realizedProfit";
pub const DEFAULT_QUANTITY_COLUMN: &str = "quantity";
pub const DEFAULT_TIME_COLUMN: &str = "time";

/// Where each field the metrics engine needs lives in the input tables.
///
/// `account` and `history` name columns of the raw CSV; `profit`,
/// `quantity` and `time` name keys inside the flattened trade objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradeColumns {
    pub account: String,
    pub history: String,
    pub profit: String,
    pub quantity: String,
    pub time: String,
}

impl Default for TradeColumns {
    fn default() -> Self {
        Self {
            account: DEFAULT_ACCOUNT_COLUMN.to_string(),
            history: DEFAULT_HISTORY_COLUMN.to_string(),
            profit: DEFAULT_PROFIT_COLUMN.to_string(),
            quantity: DEFAULT_QUANTITY_COLUMN.to_string(),
            time: DEFAULT_TIME_COLUMN.to_string(),
        }
    }
}

impl TradeColumns {
    /// Name of the first empty column setting, if any.
    pub fn first_empty(&self) -> Option<&'static str> {
        [
            ("account", &self.account),
            ("history", &self.history),
            ("profit", &self.profit),
            ("quantity", &self.quantity),
            ("time", &self.time),
        ]
        .into_iter()
        .find(|(_, v)| v.trim().is_empty())
        .map(|(k, _)| k)
    }
}
