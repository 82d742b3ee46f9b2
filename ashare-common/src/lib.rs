//! Ashare Common - Shared configuration, error and logging support for the screener.
//!
//! This crate provides:
//! - Configuration types and loading (file + environment overrides)
//! - Error types and handling utilities
//! - Logging setup with noise filtering

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod logging;

pub use config::{Config, ObservabilityConfig, ScreenerSettings, TushareConfig};
pub use error::{Error, Result};

