//! Turnover / volume-ratio screener.
//!
//! Scans every listed A-share once for the latest trading date and keeps the
//! stocks whose turnover rate and volume ratio both exceed their thresholds.
//!
//! # Flow
//!
//! ```text
//!  stock_basic ──▶ roster
//!  trade_cal   ──▶ latest open date (20-day window)
//!                      │
//!  for each symbol ────┤ daily_basic ──▶ turnover_rate > 3 ?
//!                      │ daily_basic ──▶ volume_ratio  > 1.2 ?
//!                      ▼
//!               matches (roster order) ──▶ selected_stocks.csv
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use ashare_screener::screener::{progress_line, ScreenerConfig, ScreenerEngine, ScreenerReport};
//!
//! let engine = ScreenerEngine::new(ScreenerConfig::default(), provider);
//! let result = engine.run(|event| println!("{}", progress_line(&event))).await?;
//! ScreenerReport::new(&result).export_if_any(Path::new("selected_stocks.csv"))?;
//! ```

pub mod config;
pub mod engine;
pub mod filters;
pub mod report;

pub use config::ScreenerConfig;
pub use engine::{ScreenEvent, ScreenedStock, ScreenerEngine, ScreenerResult};
pub use filters::FAVORABLE_FORECAST_TYPES;
pub use report::{progress_line, ScreenerReport, CSV_HEADERS, UTF8_BOM};
