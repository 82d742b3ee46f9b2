//! Tushare Pro API adapter for A-share market data.
//!
//! # API Documentation
//! https://tushare.pro/document/2
//!
//! Every call is a `POST` of `{api_name, token, params, fields}` to a single
//! endpoint. Results come back as a column table:
//!
//! ```json
//! {"code": 0, "msg": "", "data": {"fields": ["ts_code", "name"], "items": [["000001.SZ", "平安银行"]]}}
//! ```
//!
//! # Interfaces Used
//! - Stock roster: `stock_basic`
//! - Trading calendar: `trade_cal`
//! - Daily indicators: `daily_basic`
//! - Earnings forecasts: `forecast`

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::time::Duration;

use ashare_common::config::TushareConfig;

use super::{DailyMetrics, DataProvider, ForecastRecord, ProviderError, StockRecord};

const DEFAULT_BASE_URL: &str = "http://api.tushare.pro";
const DATE_FORMAT: &str = "%Y%m%d";

/// Tushare API adapter
pub struct TushareAdapter {
    /// API token
    token: String,
    /// HTTP client
    client: reqwest::Client,
    /// API base URL
    base_url: String,
}

impl TushareAdapter {
    /// Create a new Tushare adapter with the default endpoint and a 30s timeout
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            client: build_client(Duration::from_secs(30)),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Create from config
    pub fn from_config(config: &TushareConfig) -> ashare_common::Result<Self> {
        Ok(Self::new(config.token()?)
            .with_base_url(config.base_url.clone())
            .with_timeout(Duration::from_secs(config.timeout_secs)))
    }

    /// Override the API endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = build_client(timeout);
        self
    }

    /// Call the Tushare API and return its column table.
    async fn call_api(
        &self,
        api_name: &str,
        params: &HashMap<&str, String>,
        fields: &[&str],
    ) -> Result<TushareTable, ProviderError> {
        let request = TushareRequest {
            api_name: api_name.to_string(),
            token: self.token.clone(),
            params: params.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
            fields: fields.join(","),
        };

        tracing::debug!(api = api_name, ?params, "Calling Tushare");

        let response = self
            .client
            .post(&self.base_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if status == reqwest::StatusCode::SERVICE_UNAVAILABLE {
                return Err(ProviderError::Unavailable(body));
            }
            return Err(ProviderError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let result: TushareResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("{}: {}", api_name, e)))?;

        if result.code != 0 {
            return Err(ProviderError::Api {
                code: result.code,
                msg: result.msg.unwrap_or_default(),
            });
        }

        result
            .data
            .ok_or_else(|| ProviderError::InvalidResponse(format!("{}: missing data", api_name)))
    }
}

fn build_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

#[async_trait]
impl DataProvider for TushareAdapter {
    fn name(&self) -> &'static str {
        "tushare"
    }

    async fn list_stocks(&self) -> Result<Vec<StockRecord>, ProviderError> {
        let mut params = HashMap::new();
        params.insert("exchange", String::new());
        params.insert("list_status", "L".to_string());

        let table = self
            .call_api("stock_basic", &params, &["ts_code", "name"])
            .await?;

        Ok(table
            .records::<StockBasicItem>()?
            .into_iter()
            .map(|item| StockRecord::new(item.ts_code, item.name.unwrap_or_default()))
            .collect())
    }

    async fn open_trade_days(
        &self,
        exchange: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<NaiveDate>, ProviderError> {
        let mut params = HashMap::new();
        params.insert("exchange", exchange.to_string());
        params.insert("start_date", start.format(DATE_FORMAT).to_string());
        params.insert("end_date", end.format(DATE_FORMAT).to_string());
        params.insert("is_open", "1".to_string());

        let table = self
            .call_api("trade_cal", &params, &["exchange", "cal_date", "is_open"])
            .await?;

        table
            .records::<TradeCalItem>()?
            .into_iter()
            .filter(TradeCalItem::is_open)
            .map(|item| parse_date(&item.cal_date))
            .collect()
    }

    async fn daily_metrics(
        &self,
        code: &str,
        trade_date: NaiveDate,
    ) -> Result<Option<DailyMetrics>, ProviderError> {
        let mut params = HashMap::new();
        params.insert("ts_code", code.to_string());
        params.insert("trade_date", trade_date.format(DATE_FORMAT).to_string());

        let fields = ["ts_code", "trade_date", "turnover_rate", "volume_ratio"];
        let table = self.call_api("daily_basic", &params, &fields).await?;

        let Some(item) = table.records::<DailyBasicItem>()?.into_iter().next() else {
            return Ok(None);
        };

        Ok(Some(DailyMetrics {
            code: item.ts_code.unwrap_or_else(|| code.to_string()),
            trade_date: match item.trade_date {
                Some(d) => parse_date(&d)?,
                None => trade_date,
            },
            turnover_rate: item.turnover_rate,
            volume_ratio: item.volume_ratio,
        }))
    }

    async fn forecasts(
        &self,
        code: &str,
        period: NaiveDate,
    ) -> Result<Vec<ForecastRecord>, ProviderError> {
        let mut params = HashMap::new();
        params.insert("ts_code", code.to_string());
        params.insert("period", period.format(DATE_FORMAT).to_string());

        let fields = ["ts_code", "ann_date", "end_date", "type"];
        let table = self.call_api("forecast", &params, &fields).await?;

        table
            .records::<ForecastItem>()?
            .into_iter()
            .map(|item| {
                Ok(ForecastRecord {
                    code: item.ts_code.unwrap_or_else(|| code.to_string()),
                    ann_date: item.ann_date.as_deref().map(parse_date).transpose()?,
                    end_date: item.end_date.as_deref().map(parse_date).transpose()?,
                    forecast_type: item.forecast_type,
                })
            })
            .collect()
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, ProviderError> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|e| ProviderError::InvalidResponse(format!("bad date {:?}: {}", s, e)))
}

// ============================================================================
// API Types
// ============================================================================

#[derive(Debug, Serialize)]
struct TushareRequest {
    api_name: String,
    token: String,
    params: HashMap<String, String>,
    fields: String,
}

#[derive(Debug, Deserialize)]
struct TushareResponse {
    code: i64,
    msg: Option<String>,
    data: Option<TushareTable>,
}

/// Column-oriented result table.
#[derive(Debug, Default, Deserialize)]
struct TushareTable {
    #[serde(default)]
    fields: Vec<String>,
    #[serde(default)]
    items: Vec<Vec<Value>>,
}

impl TushareTable {
    /// Zip every row with the column names and deserialize it.
    fn records<T: DeserializeOwned>(&self) -> Result<Vec<T>, ProviderError> {
        self.items
            .iter()
            .map(|row| {
                if row.len() != self.fields.len() {
                    return Err(ProviderError::InvalidResponse(format!(
                        "row has {} values for {} fields",
                        row.len(),
                        self.fields.len()
                    )));
                }
                let object: Map<String, Value> =
                    self.fields.iter().cloned().zip(row.iter().cloned()).collect();
                serde_json::from_value(Value::Object(object))
                    .map_err(|e| ProviderError::InvalidResponse(e.to_string()))
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct StockBasicItem {
    ts_code: String,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TradeCalItem {
    cal_date: String,
    #[serde(default)]
    is_open: Option<Value>,
}

impl TradeCalItem {
    /// `is_open` arrives as 1/0 or "1"/"0"; a missing flag trusts the
    /// `is_open=1` request filter.
    fn is_open(&self) -> bool {
        match &self.is_open {
            None | Some(Value::Null) => true,
            Some(Value::Number(n)) => n.as_i64() == Some(1),
            Some(Value::String(s)) => s == "1",
            Some(_) => false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct DailyBasicItem {
    #[serde(default)]
    ts_code: Option<String>,
    #[serde(default)]
    trade_date: Option<String>,
    #[serde(default)]
    turnover_rate: Option<f64>,
    #[serde(default)]
    volume_ratio: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ForecastItem {
    #[serde(default)]
    ts_code: Option<String>,
    #[serde(default)]
    ann_date: Option<String>,
    #[serde(default)]
    end_date: Option<String>,
    #[serde(default, rename = "type")]
    forecast_type: Option<String>,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table(value: Value) -> TushareTable {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_tushare_adapter_creation() {
        let adapter = TushareAdapter::new("test_token");
        assert_eq!(adapter.token, "test_token");
        assert_eq!(adapter.base_url, "http://api.tushare.pro");
        assert_eq!(adapter.name(), "tushare");
    }

    #[test]
    fn test_from_config_requires_token() {
        let mut config = TushareConfig::default();
        assert!(TushareAdapter::from_config(&config).is_err());

        config.token = Some("tok".into());
        config.base_url = "http://localhost:9999".into();
        let adapter = TushareAdapter::from_config(&config).unwrap();
        assert_eq!(adapter.token, "tok");
        assert_eq!(adapter.base_url, "http://localhost:9999");
    }

    #[test]
    fn test_request_serialization() {
        let request = TushareRequest {
            api_name: "daily_basic".into(),
            token: "t".into(),
            params: HashMap::from([("ts_code".to_string(), "000001.SZ".to_string())]),
            fields: "ts_code,turnover_rate".into(),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["api_name"], "daily_basic");
        assert_eq!(value["params"]["ts_code"], "000001.SZ");
        assert_eq!(value["fields"], "ts_code,turnover_rate");
    }

    #[test]
    fn test_table_records_maps_columns() {
        let t = table(json!({
            "fields": ["ts_code", "trade_date", "turnover_rate", "volume_ratio"],
            "items": [
                ["000001.SZ", "20240105", 3.52, 1.31],
                ["600000.SH", "20240105", null, 0.8]
            ]
        }));

        let rows: Vec<DailyBasicItem> = t.records().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].turnover_rate, Some(3.52));
        assert_eq!(rows[1].turnover_rate, None);
        assert_eq!(rows[1].volume_ratio, Some(0.8));
    }

    #[test]
    fn test_table_records_rejects_ragged_rows() {
        let t = table(json!({ "fields": ["ts_code", "name"], "items": [["000001.SZ"]] }));
        let err = t.records::<StockBasicItem>().unwrap_err();
        assert!(matches!(err, ProviderError::InvalidResponse(_)));
    }

    #[test]
    fn test_empty_table() {
        let t = table(json!({}));
        assert!(t.records::<StockBasicItem>().unwrap().is_empty());
    }

    #[test]
    fn test_trade_cal_open_flag_variants() {
        let t = table(json!({
            "fields": ["cal_date", "is_open"],
            "items": [["20240102", 1], ["20240103", "1"], ["20240106", 0], ["20240107", "0"]]
        }));
        let open: Vec<String> = t
            .records::<TradeCalItem>()
            .unwrap()
            .into_iter()
            .filter(TradeCalItem::is_open)
            .map(|i| i.cal_date)
            .collect();
        assert_eq!(open, vec!["20240102", "20240103"]);
    }

    #[test]
    fn test_forecast_type_column() {
        let t = table(json!({
            "fields": ["ts_code", "ann_date", "end_date", "type"],
            "items": [["000001.SZ", "20241015", "20241231", "预增"]]
        }));
        let rows: Vec<ForecastItem> = t.records().unwrap();
        assert_eq!(rows[0].forecast_type.as_deref(), Some("预增"));
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("20240105").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()
        );
        assert!(parse_date("2024-01-05").is_err());
    }
}
