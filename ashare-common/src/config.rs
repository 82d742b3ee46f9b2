//! Configuration management for the screener.
//!
//! The configuration lives at `~/.ashare-screener/config.json`. A missing file
//! means "all defaults"; the Tushare token then has to come from the
//! environment.
//!
//! # Configuration Priority
//!
//! 1. Environment variables
//! 2. Explicit config file values
//! 3. Default values
//!
//! # Environment Variable Mapping
//!
//! - `TUSHARE_TOKEN` → tushare.token
//! - `TUSHARE_API_URL` → tushare.base_url
//! - `ASHARE_LOG_LEVEL` → observability.log_level
//! - `ASHARE_OUTPUT_PATH` → screener.output_path

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Get the configuration directory path.
pub fn config_dir() -> PathBuf {
    directories::UserDirs::new().map_or_else(
        || PathBuf::from(".ashare-screener"),
        |dirs| dirs.home_dir().join(".ashare-screener"),
    )
}

/// Get the configuration file path.
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Tushare Pro API access
    #[serde(default)]
    pub tushare: TushareConfig,

    /// Screening thresholds and output
    #[serde(default)]
    pub screener: ScreenerSettings,

    /// Logging
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from the default path; a missing file yields defaults.
    pub fn load() -> Result<Self> {
        let path = config_path();
        if !path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Load configuration with environment variable overrides.
    ///
    /// An explicit `path` must exist; the default path may be absent.
    pub fn load_with_env(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::load_from(p)?,
            None => Self::load()?,
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply process environment overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("TUSHARE_TOKEN").filter(|t| !t.trim().is_empty()) {
            self.tushare.token = Some(token);
        }
        if let Some(url) = lookup("TUSHARE_API_URL") {
            self.tushare.base_url = url;
        }
        if let Some(level) = lookup("ASHARE_LOG_LEVEL") {
            self.observability.log_level = level;
        }
        if let Some(path) = lookup("ASHARE_OUTPUT_PATH") {
            self.screener.output_path = path;
        }
    }

    /// Reject values the screening pass cannot work with.
    pub fn validate(&self) -> Result<()> {
        let s = &self.screener;
        if s.lookback_days == 0 {
            return Err(Error::Config("screener.lookback_days must be positive".into()));
        }
        if !(s.min_turnover_rate.is_finite() && s.min_turnover_rate >= 0.0) {
            return Err(Error::Config(format!(
                "screener.min_turnover_rate must be a non-negative number, got {}",
                s.min_turnover_rate
            )));
        }
        if !(s.min_volume_ratio.is_finite() && s.min_volume_ratio >= 0.0) {
            return Err(Error::Config(format!(
                "screener.min_volume_ratio must be a non-negative number, got {}",
                s.min_volume_ratio
            )));
        }
        if s.output_path.trim().is_empty() {
            return Err(Error::Config("screener.output_path must not be empty".into()));
        }
        if self.tushare.timeout_secs == 0 {
            return Err(Error::Config("tushare.timeout_secs must be positive".into()));
        }
        Ok(())
    }
}

// ============================================================================
// Tushare Configuration
// ============================================================================

/// Tushare Pro API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TushareConfig {
    /// API token (opaque credential)
    #[serde(default)]
    pub token: Option<String>,

    /// API endpoint
    #[serde(default = "default_tushare_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl TushareConfig {
    /// The token, trimmed; a missing or blank token is a configuration error.
    pub fn token(&self) -> Result<&str> {
        self.token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                Error::Config("tushare.token is not set (config file or TUSHARE_TOKEN)".into())
            })
    }
}

impl Default for TushareConfig {
    fn default() -> Self {
        Self {
            token: None,
            base_url: default_tushare_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_tushare_url() -> String {
    "http://api.tushare.pro".into()
}

fn default_timeout_secs() -> u64 {
    30
}

// ============================================================================
// Screener Settings
// ============================================================================

/// Screening thresholds and output location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenerSettings {
    /// Turnover rate (%) a stock must exceed
    #[serde(default = "default_min_turnover_rate")]
    pub min_turnover_rate: f64,

    /// Volume ratio a stock must exceed
    #[serde(default = "default_min_volume_ratio")]
    pub min_volume_ratio: f64,

    /// Exchange whose calendar decides the trading date
    #[serde(default = "default_calendar_exchange")]
    pub calendar_exchange: String,

    /// Calendar days searched backwards for the latest open session
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,

    /// Pause between symbols, in milliseconds
    #[serde(default = "default_request_pause_ms")]
    pub request_pause_ms: u64,

    /// CSV output path (`~` is expanded)
    #[serde(default = "default_output_path")]
    pub output_path: String,
}

impl Default for ScreenerSettings {
    fn default() -> Self {
        Self {
            min_turnover_rate: default_min_turnover_rate(),
            min_volume_ratio: default_min_volume_ratio(),
            calendar_exchange: default_calendar_exchange(),
            lookback_days: default_lookback_days(),
            request_pause_ms: default_request_pause_ms(),
            output_path: default_output_path(),
        }
    }
}

impl ScreenerSettings {
    /// Output path with `~` expanded.
    pub fn expanded_output_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.output_path).into_owned())
    }
}

fn default_min_turnover_rate() -> f64 {
    3.0
}

fn default_min_volume_ratio() -> f64 {
    1.2
}

fn default_calendar_exchange() -> String {
    "SSE".into()
}

fn default_lookback_days() -> u32 {
    20
}

fn default_request_pause_ms() -> u64 {
    10
}

fn default_output_path() -> String {
    "selected_stocks.csv".into()
}

// ============================================================================
// Observability Configuration
// ============================================================================

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level", alias = "level")]
    pub log_level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format", alias = "format")]
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

// ============================================================================
// Tests
// ============================================================================
