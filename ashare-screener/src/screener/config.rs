//! Screener configuration module.
//!
//! Runtime form of the `screener` section of the config file.

use std::time::Duration;

use ashare_common::config::ScreenerSettings;

/// Thresholds and pacing for one screening pass.
#[derive(Debug, Clone)]
pub struct ScreenerConfig {
    /// Turnover rate (%) a stock must exceed
    pub min_turnover_rate: f64,
    /// Volume ratio a stock must exceed
    pub min_volume_ratio: f64,
    /// Exchange whose calendar decides the trading date
    pub calendar_exchange: String,
    /// Calendar days searched backwards for the latest open session
    pub lookback_days: u32,
    /// Pause between symbols
    pub request_pause: Duration,
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self::from(&ScreenerSettings::default())
    }
}

impl From<&ScreenerSettings> for ScreenerConfig {
    fn from(settings: &ScreenerSettings) -> Self {
        Self {
            min_turnover_rate: settings.min_turnover_rate,
            min_volume_ratio: settings.min_volume_ratio,
            calendar_exchange: settings.calendar_exchange.clone(),
            lookback_days: settings.lookback_days,
            request_pause: Duration::from_millis(settings.request_pause_ms),
        }
    }
}

impl ScreenerConfig {
    /// One-line description of the active filter.
    pub fn summary(&self) -> String {
        format!(
            "换手率>{}%, 量比>{}",
            self.min_turnover_rate, self.min_volume_ratio
        )
    }
}
