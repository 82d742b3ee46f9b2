//! Market data module for A-shares.
//!
//! Defines the records the screener consumes and the provider abstraction
//! that supplies them.
//!
//! # Data Sources
//! - **Tushare Pro**: roster (`stock_basic`), trading calendar (`trade_cal`),
//!   daily indicators (`daily_basic`) and earnings forecasts (`forecast`)

mod provider;
mod tushare;

pub use provider::{DataProvider, ProviderError};
pub use tushare::TushareAdapter;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================================================
// Core Data Types
// ============================================================================

/// A listed stock from the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRecord {
    /// Tushare code (e.g., "000001.SZ")
    pub code: String,
    /// Stock name
    pub name: String,
}

impl StockRecord {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

/// Daily indicators for one stock on one trading date.
///
/// Either value may be missing, e.g. for a suspended stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyMetrics {
    /// Stock code
    pub code: String,
    /// Trading date the row belongs to
    pub trade_date: NaiveDate,
    /// Turnover rate (%)
    pub turnover_rate: Option<f64>,
    /// Volume ratio
    pub volume_ratio: Option<f64>,
}

/// An earnings pre-announcement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastRecord {
    /// Stock code
    pub code: String,
    /// Announcement date
    pub ann_date: Option<NaiveDate>,
    /// Reporting period end
    pub end_date: Option<NaiveDate>,
    /// Forecast type label (预增, 预减, 扭亏, ...)
    pub forecast_type: Option<String>,
}
