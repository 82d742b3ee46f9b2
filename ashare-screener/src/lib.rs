//! Ashare Screener Library
//!
//! Screens listed A-shares for unusual trading activity on the latest trading
//! day: turnover rate above 3% and volume ratio above 1.2. Market data comes
//! from Tushare Pro; matches are exported as a CSV.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 ashare-screener (CLI)                    │
//! ├──────────────────────────────────────────────────────────┤
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐  │
//! │  │ DataProvider │──▶│  Screener    │──▶│  Report      │  │
//! │  │  (Tushare)   │   │  Engine      │   │  (CSV)       │  │
//! │  └──────────────┘   └──────────────┘   └──────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The pass is strictly sequential: one request in flight at a time, with a
//! short pause between symbols.

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod data;
pub mod screener;

pub use data::{
    DailyMetrics, DataProvider, ForecastRecord, ProviderError, StockRecord, TushareAdapter,
};
pub use screener::{
    progress_line, ScreenEvent, ScreenedStock, ScreenerConfig, ScreenerEngine, ScreenerReport,
    ScreenerResult,
};
