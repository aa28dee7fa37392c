//! Deterministic synthetic trade-history exports for demos and tests.
//!
//! Produces the same shape as a real futures-copy-trading export: one row
//! per account, the account's trades as a JSON array in the history column.

use std::path::Path;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};
use tradelens_core::{RawTable, TradeColumns};

const SYMBOLS: [(&str, &str, f64); 5] = [
    ("BTCUSDT", "BTC", 64_000.0),
    ("ETHUSDT", "ETH", 3_500.0),
    ("SOLUSDT", "SOL", 140.0),
    ("BNBUSDT", "BNB", 600.0),
    ("DOGEUSDT", "DOGE", 0.15),
];

/// Start of the generated trade window, epoch ms (2024-06-01).
const START_MS: i64 = 1_717_200_000_000;

#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticSpec {
    pub accounts: usize,
    pub min_trades: usize,
    pub max_trades: usize,
    /// Fraction of accounts exported with an empty history cell.
    pub empty_rate: f64,
    pub seed: u64,
}

impl Default for SyntheticSpec {
    fn default() -> Self {
        Self {
            accounts: 150,
            min_trades: 1,
            max_trades: 40,
            empty_rate: 0.05,
            seed: 42,
        }
    }
}

/// Generate a raw export table. Same `SyntheticSpec`, same table.
pub fn generate(spec: &SyntheticSpec, columns: &TradeColumns) -> RawTable {
    let mut rng = StdRng::seed_from_u64(spec.seed);
    let max_trades = spec.max_trades.max(spec.min_trades);

    let rows = (0..spec.accounts)
        .map(|_| {
            let account: u64 = rng.gen_range(3_000_000_000_000_000_000..5_000_000_000_000_000_000);
            if rng.gen_bool(spec.empty_rate.clamp(0.0, 1.0)) {
                return vec![account.to_string(), String::new()];
            }
            let n = rng.gen_range(spec.min_trades..=max_trades);
            // Per-account edge: skilled accounts win more often.
            let edge: f64 = rng.gen_range(0.3..0.7);
            let mut time = START_MS + rng.gen_range(0..86_400_000);
            let trades: Vec<Value> = (0..n)
                .map(|_| {
                    time += rng.gen_range(60_000..6 * 3_600_000);
                    trade(&mut rng, columns, time, edge)
                })
                .collect();
            vec![account.to_string(), Value::Array(trades).to_string()]
        })
        .collect();

    RawTable::new(
        "synthetic",
        vec![columns.account.clone(), columns.history.clone()],
        rows,
    )
}

fn trade(rng: &mut StdRng, columns: &TradeColumns, time: i64, edge: f64) -> Value {
    let (symbol, base, ref_price) = SYMBOLS[rng.gen_range(0..SYMBOLS.len())];
    let price = round(ref_price * rng.gen_range(0.9..1.1), 4);
    let notional = round(rng.gen_range(10.0..5_000.0), 2);
    let closing = rng.gen_bool(0.6);
    let profit = if !closing {
        0.0
    } else if rng.gen_bool(edge) {
        round(notional * rng.gen_range(0.001..0.08), 4)
    } else {
        round(-notional * rng.gen_range(0.001..0.06), 4)
    };
    let buy = rng.gen_bool(0.5);

    let mut obj = json!({
        "symbol": symbol,
        "side": if buy { "BUY" } else { "SELL" },
        "price": price,
        "fee": round(-notional * 0.0004, 6),
        "feeAsset": "USDT",
        "quantityAsset": "USDT",
        "realizedProfitAsset": "USDT",
        "baseAsset": base,
        "qty": round(notional / price, 6),
        "positionSide": "BOTH",
        "activeBuy": buy,
    });
    if let Value::Object(map) = &mut obj {
        map.insert(columns.time.clone(), json!(time));
        map.insert(columns.quantity.clone(), json!(notional));
        map.insert(columns.profit.clone(), json!(profit));
    }
    obj
}

fn round(v: f64, places: i32) -> f64 {
    let f = 10f64.powi(places);
    (v * f).round() / f
}

/// Write a raw export CSV. Returns the number of account rows.
pub fn write_csv(path: &Path, table: &RawTable) -> Result<usize> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    wtr.write_record(table.headers())?;
    for row in table.rows() {
        wtr.write_record(row)?;
    }
    wtr.flush().with_context(|| format!("failed to flush {}", path.display()))?;
    Ok(table.len())
}
