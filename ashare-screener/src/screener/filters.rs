//! Threshold predicates.
//!
//! Pure functions over fetched rows. All comparisons are strict: a value
//! sitting exactly on the threshold does not pass.

use chrono::NaiveDate;

use crate::data::{DailyMetrics, ForecastRecord};

/// Forecast types that count as favorable: 预增 (pre-increase),
/// 续盈 (continued profit), 略增 (slight increase).
pub const FAVORABLE_FORECAST_TYPES: &[&str] = &["预增", "续盈", "略增"];

/// Turnover rate strictly above `min`. Missing values fail.
pub fn turnover_passes(metrics: &DailyMetrics, min: f64) -> bool {
    metrics.turnover_rate.is_some_and(|v| v > min)
}

/// Volume ratio strictly above `min`. Missing values fail.
pub fn volume_ratio_passes(metrics: &DailyMetrics, min: f64) -> bool {
    metrics.volume_ratio.is_some_and(|v| v > min)
}

/// Most recent forecast by announcement date; on ties the earlier row wins.
pub fn latest_forecast(forecasts: &[ForecastRecord]) -> Option<&ForecastRecord> {
    forecasts.iter().fold(None, |best, f| match best {
        Some(b) if b.ann_date >= f.ann_date => Some(b),
        _ => Some(f),
    })
}

/// Whether the most recent forecast carries a favorable type.
pub fn forecast_is_favorable(forecasts: &[ForecastRecord]) -> bool {
    latest_forecast(forecasts)
        .and_then(|f| f.forecast_type.as_deref())
        .is_some_and(|t| FAVORABLE_FORECAST_TYPES.contains(&t.trim()))
}

/// Latest date among the open days.
pub fn latest_open_date(days: &[NaiveDate]) -> Option<NaiveDate> {
    days.iter().copied().max()
}

/// Year-end reporting period (`{year}-12-31`).
pub fn annual_period(year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, 12, 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(turnover: Option<f64>, ratio: Option<f64>) -> DailyMetrics {
        DailyMetrics {
            code: "000001.SZ".into(),
            trade_date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            turnover_rate: turnover,
            volume_ratio: ratio,
        }
    }

    fn forecast(ann: Option<(i32, u32, u32)>, kind: Option<&str>) -> ForecastRecord {
        ForecastRecord {
            code: "000001.SZ".into(),
            ann_date: ann.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
            end_date: NaiveDate::from_ymd_opt(2024, 12, 31),
            forecast_type: kind.map(str::to_string),
        }
    }

    #[test]
    fn test_turnover_threshold_is_strict() {
        assert!(turnover_passes(&metrics(Some(3.01), None), 3.0));
        assert!(!turnover_passes(&metrics(Some(3.0), None), 3.0));
        assert!(!turnover_passes(&metrics(Some(2.5), None), 3.0));
        assert!(!turnover_passes(&metrics(None, Some(9.0)), 3.0));
    }

    #[test]
    fn test_volume_ratio_threshold_is_strict() {
        assert!(volume_ratio_passes(&metrics(None, Some(1.21)), 1.2));
        assert!(!volume_ratio_passes(&metrics(None, Some(1.2)), 1.2));
        assert!(!volume_ratio_passes(&metrics(Some(9.0), None), 1.2));
    }

    #[test]
    fn test_forecast_favorable_types() {
        for kind in FAVORABLE_FORECAST_TYPES {
            assert!(forecast_is_favorable(&[forecast(Some((2024, 10, 1)), Some(*kind))]));
        }
        assert!(!forecast_is_favorable(&[forecast(Some((2024, 10, 1)), Some("预减"))]));
        assert!(!forecast_is_favorable(&[forecast(Some((2024, 10, 1)), None)]));
        assert!(!forecast_is_favorable(&[]));
    }

    #[test]
    fn test_forecast_uses_most_recent() {
        let rows = vec![
            forecast(Some((2024, 7, 10)), Some("预增")),
            forecast(Some((2024, 10, 20)), Some("首亏")),
        ];
        assert!(!forecast_is_favorable(&rows));

        let rows = vec![
            forecast(Some((2024, 10, 20)), Some("略增")),
            forecast(None, Some("预减")),
        ];
        assert!(forecast_is_favorable(&rows));
    }

    #[test]
    fn test_forecast_tie_keeps_first_row() {
        let rows = vec![
            forecast(Some((2024, 10, 20)), Some("续盈")),
            forecast(Some((2024, 10, 20)), Some("预减")),
        ];
        assert_eq!(latest_forecast(&rows).unwrap().forecast_type.as_deref(), Some("续盈"));
    }

    #[test]
    fn test_latest_open_date() {
        let d = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        assert_eq!(latest_open_date(&[d(3), d(5), d(4)]), Some(d(5)));
        assert_eq!(latest_open_date(&[]), None);
    }

    #[test]
    fn test_annual_period() {
        assert_eq!(annual_period(2026), NaiveDate::from_ymd_opt(2026, 12, 31));
    }
}
