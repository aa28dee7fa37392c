//! Domain types for TradeLens

pub mod account;
pub mod trade;

pub use account::AccountId;
pub use trade::TradeRecord;
