//! Data provider abstraction.
//!
//! Defines the `DataProvider` trait the screener engine runs against, so the
//! engine can be driven by Tushare in production and by in-memory snapshots
//! in tests.

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use super::{DailyMetrics, ForecastRecord, StockRecord};

// ============================================================================
// Provider Error
// ============================================================================

/// Errors specific to data providers.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// Network error (connection failed, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success HTTP status
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The API answered with a non-zero code (bad token, quota, bad params)
    #[error("API error {code}: {msg}")]
    Api { code: i64, msg: String },

    /// The response could not be interpreted
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Provider is temporarily unavailable
    #[error("Provider unavailable: {0}")]
    Unavailable(String),
}

impl ProviderError {
    /// Check if the error came from the API rejecting the token.
    pub fn is_auth(&self) -> bool {
        // Tushare reports token problems as code -2001
        matches!(
            self,
            Self::Api { code: -2001, .. } | Self::Http { status: 401 | 403, .. }
        )
    }
}

// ============================================================================
// Data Provider Trait
// ============================================================================

/// Source of the four datasets the screener consumes.
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Get the provider name (e.g., "tushare")
    fn name(&self) -> &'static str;

    /// List all currently listed stocks, in provider order.
    async fn list_stocks(&self) -> Result<Vec<StockRecord>, ProviderError>;

    /// Open trading days of `exchange` within `[start, end]`, inclusive.
    async fn open_trade_days(
        &self,
        exchange: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<NaiveDate>, ProviderError>;

    /// Daily indicators for one stock on one date.
    ///
    /// `Ok(None)` means the provider has no row for that pair.
    async fn daily_metrics(
        &self,
        code: &str,
        trade_date: NaiveDate,
    ) -> Result<Option<DailyMetrics>, ProviderError>;

    /// Earnings forecasts for one stock and reporting period.
    async fn forecasts(
        &self,
        code: &str,
        period: NaiveDate,
    ) -> Result<Vec<ForecastRecord>, ProviderError>;
}
