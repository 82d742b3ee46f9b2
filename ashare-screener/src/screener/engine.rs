//! Screener engine module.
//!
//! Runs the sequential screening pass: roster, trading date, per-symbol
//! checks, match accumulation.

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Datelike, Days, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::data::{DailyMetrics, DataProvider, StockRecord};

use super::config::ScreenerConfig;
use super::filters::{
    annual_period, forecast_is_favorable, latest_open_date, turnover_passes, volume_ratio_passes,
};

// ============================================================================
// Screened Stock
// ============================================================================

/// A stock that passed both checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenedStock {
    /// Stock code (e.g., "000001.SZ")
    pub code: String,
    /// Stock name
    pub name: String,
}

impl From<&StockRecord> for ScreenedStock {
    fn from(stock: &StockRecord) -> Self {
        Self {
            code: stock.code.clone(),
            name: stock.name.clone(),
        }
    }
}

// ============================================================================
// Progress Events
// ============================================================================

/// Progress reported while a pass runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenEvent<'a> {
    /// No open trading day in the lookback window; the pass stops.
    TradeDateUnresolved,
    /// Scan starting for this trading date.
    Scanning(NaiveDate),
    /// A stock passed both checks.
    Matched(&'a ScreenedStock),
}

// ============================================================================
// Screener Result
// ============================================================================

/// Result of a screening pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenerResult {
    /// Trading date the metrics were read for; `None` when it could not be resolved
    pub trade_date: Option<NaiveDate>,
    /// Matches, in roster order
    pub stocks: Vec<ScreenedStock>,
    /// Symbols evaluated
    pub total_scanned: usize,
    /// Start time
    pub started_at: DateTime<Utc>,
    /// End time
    pub completed_at: DateTime<Utc>,
    /// Duration in seconds
    pub duration_secs: f64,
}

impl ScreenerResult {
    fn empty(started_at: DateTime<Utc>) -> Self {
        let completed_at = Utc::now();
        Self {
            trade_date: None,
            stocks: Vec::new(),
            total_scanned: 0,
            started_at,
            completed_at,
            duration_secs: elapsed_secs(started_at, completed_at),
        }
    }

    /// Summary string for logging.
    pub fn summary(&self) -> String {
        format!(
            "Screened {} stocks in {:.1}s: {} passed ({:.1}%)",
            self.total_scanned,
            self.duration_secs,
            self.stocks.len(),
            if self.total_scanned > 0 {
                (self.stocks.len() as f64 / self.total_scanned as f64) * 100.0
            } else {
                0.0
            }
        )
    }
}

fn elapsed_secs(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    (end - start).num_milliseconds() as f64 / 1000.0
}

// ============================================================================
// Screener Engine
// ============================================================================

/// The screener engine.
///
/// Orchestrates one pass:
/// 1. Fetch the roster (fatal on failure)
/// 2. Resolve the latest trading date (stop with an empty result if unresolved)
/// 3. Check turnover rate and volume ratio for every symbol, in roster order
/// 4. Collect the symbols that pass both
pub struct ScreenerEngine<P: DataProvider> {
    config: ScreenerConfig,
    provider: Arc<P>,
}

impl<P: DataProvider> ScreenerEngine<P> {
    /// Create a new screener engine.
    pub fn new(config: ScreenerConfig, provider: Arc<P>) -> Self {
        Self { config, provider }
    }

    /// Active configuration.
    pub fn config(&self) -> &ScreenerConfig {
        &self.config
    }

    /// Fetch the roster of listed stocks.
    pub async fn get_stock_list(&self) -> Result<Vec<StockRecord>> {
        let stocks = match self.provider.list_stocks().await {
            Ok(stocks) => stocks,
            Err(e) if e.is_auth() => {
                let msg = format!(
                    "{} rejected the API token; check tushare.token or TUSHARE_TOKEN",
                    self.provider.name()
                );
                return Err(anyhow::Error::new(e).context(msg));
            }
            Err(e) => {
                let msg = format!("Failed to fetch stock list from {}", self.provider.name());
                return Err(anyhow::Error::new(e).context(msg));
            }
        };

        info!(count = stocks.len(), "Stock list loaded");
        Ok(stocks)
    }

    /// Most recent open trading day in the lookback window ending at `today`.
    ///
    /// Provider failures are logged and reported as `None`.
    pub async fn resolve_latest_trade_date(&self, today: NaiveDate) -> Option<NaiveDate> {
        let start = today
            .checked_sub_days(Days::new(u64::from(self.config.lookback_days)))
            .unwrap_or(NaiveDate::MIN);

        match self
            .provider
            .open_trade_days(&self.config.calendar_exchange, start, today)
            .await
        {
            Ok(days) => {
                let latest = latest_open_date(&days);
                if latest.is_none() {
                    warn!(%start, end = %today, "No open trading days in lookback window");
                }
                latest
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch trading calendar");
                None
            }
        }
    }

    /// Turnover rate on `trade_date` above the configured threshold.
    ///
    /// Absent rows, missing values and provider errors all count as `false`.
    pub async fn check_turnover_rate(&self, code: &str, trade_date: NaiveDate) -> bool {
        self.fetch_metrics(code, trade_date)
            .await
            .is_some_and(|m| turnover_passes(&m, self.config.min_turnover_rate))
    }

    /// Volume ratio on `trade_date` above the configured threshold.
    ///
    /// Absent rows, missing values and provider errors all count as `false`.
    pub async fn check_volume_ratio(&self, code: &str, trade_date: NaiveDate) -> bool {
        self.fetch_metrics(code, trade_date)
            .await
            .is_some_and(|m| volume_ratio_passes(&m, self.config.min_volume_ratio))
    }

    /// Whether the latest forecast for `year`'s annual report is favorable
    /// (预增 / 续盈 / 略增).
    ///
    /// Not part of the screening pass.
    pub async fn check_annual_forecast(&self, code: &str, year: i32) -> bool {
        let Some(period) = annual_period(year) else {
            return false;
        };

        match self.provider.forecasts(code, period).await {
            Ok(rows) => forecast_is_favorable(&rows),
            Err(e) => {
                debug!(symbol = code, error = %e, "Forecast lookup failed");
                false
            }
        }
    }

    /// [`check_annual_forecast`](Self::check_annual_forecast) for the current
    /// calendar year (local time).
    pub async fn check_current_annual_forecast(&self, code: &str) -> bool {
        self.check_annual_forecast(code, Local::now().year()).await
    }

    async fn fetch_metrics(&self, code: &str, trade_date: NaiveDate) -> Option<DailyMetrics> {
        match self.provider.daily_metrics(code, trade_date).await {
            Ok(Some(metrics)) => Some(metrics),
            Ok(None) => {
                debug!(symbol = code, %trade_date, "No daily metrics");
                None
            }
            Err(e) => {
                debug!(symbol = code, %trade_date, error = %e, "Daily metrics lookup failed");
                None
            }
        }
    }

    /// Run a screening pass as of today (local time).
    pub async fn run<F>(&self, on_event: F) -> Result<ScreenerResult>
    where
        F: FnMut(ScreenEvent<'_>),
    {
        self.screen_stocks(Local::now().date_naive(), on_event).await
    }

    /// Run a screening pass as of `today`, reporting progress to `on_event`.
    ///
    /// Returns an empty result, without scanning, when the trading date cannot
    /// be resolved.
    pub async fn screen_stocks<F>(
        &self,
        today: NaiveDate,
        mut on_event: F,
    ) -> Result<ScreenerResult>
    where
        F: FnMut(ScreenEvent<'_>),
    {
        let started_at = Utc::now();
        let stocks = self.get_stock_list().await?;

        let Some(trade_date) = self.resolve_latest_trade_date(today).await else {
            on_event(ScreenEvent::TradeDateUnresolved);
            return Ok(ScreenerResult::empty(started_at));
        };

        on_event(ScreenEvent::Scanning(trade_date));
        info!(
            %trade_date,
            symbols = stocks.len(),
            filter = %self.config.summary(),
            "Starting screening pass"
        );

        let mut matches = Vec::new();
        for (index, stock) in stocks.iter().enumerate() {
            if index > 0 && !self.config.request_pause.is_zero() {
                tokio::time::sleep(self.config.request_pause).await;
            }

            let turnover_ok = self.check_turnover_rate(&stock.code, trade_date).await;
            let volume_ok = self.check_volume_ratio(&stock.code, trade_date).await;

            if turnover_ok && volume_ok {
                let screened = ScreenedStock::from(stock);
                debug!(symbol = %screened.code, "Stock matched");
                on_event(ScreenEvent::Matched(&screened));
                matches.push(screened);
            }
        }

        let completed_at = Utc::now();
        let result = ScreenerResult {
            trade_date: Some(trade_date),
            stocks: matches,
            total_scanned: stocks.len(),
            started_at,
            completed_at,
            duration_secs: elapsed_secs(started_at, completed_at),
        };

        info!(%trade_date, "{}", result.summary());
        Ok(result)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_summary() {
        let now = Utc::now();
        let result = ScreenerResult {
            trade_date: NaiveDate::from_ymd_opt(2024, 1, 5),
            stocks: vec![ScreenedStock {
                code: "000001.SZ".into(),
                name: "平安银行".into(),
            }],
            total_scanned: 4,
            started_at: now,
            completed_at: now,
            duration_secs: 1.5,
        };
        assert_eq!(result.summary(), "Screened 4 stocks in 1.5s: 1 passed (25.0%)");
    }

    #[test]
    fn test_empty_result_summary() {
        let result = ScreenerResult::empty(Utc::now());
        assert!(result.trade_date.is_none());
        assert!(result.stocks.is_empty());
        assert!(result.summary().ends_with("0 passed (0.0%)"));
    }

    #[test]
    fn test_screened_stock_from_record() {
        let record = StockRecord::new("600000.SH", "浦发银行");
        let screened = ScreenedStock::from(&record);
        assert_eq!(screened.code, "600000.SH");
        assert_eq!(screened.name, "浦发银行");
    }
}
