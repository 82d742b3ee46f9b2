//! Report output for screener results.
//!
//! - Progress lines while a pass runs
//! - Console listing of the matches
//! - CSV export (UTF-8 with BOM so spreadsheet tools detect the encoding)

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::engine::{ScreenEvent, ScreenedStock, ScreenerResult};

/// UTF-8 byte-order mark.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// CSV header labels: stock code, stock name.
pub const CSV_HEADERS: [&str; 2] = ["股票代码", "股票名称"];

/// Console line for a progress event.
pub fn progress_line(event: &ScreenEvent<'_>) -> String {
    match event {
        ScreenEvent::TradeDateUnresolved => "无法获取最近交易日期".to_string(),
        ScreenEvent::Scanning(date) => {
            format!("\n正在获取 {} 的交易数据\n", date.format("%Y%m%d"))
        }
        ScreenEvent::Matched(stock) => format!("股票 {} ({}) 符合条件！", stock.code, stock.name),
    }
}

/// Report generator for screener results.
pub struct ScreenerReport<'a> {
    result: &'a ScreenerResult,
}

impl<'a> ScreenerReport<'a> {
    /// Create a new report over a screening result.
    pub fn new(result: &'a ScreenerResult) -> Self {
        Self { result }
    }

    /// Whether there is anything to report.
    pub fn has_matches(&self) -> bool {
        !self.result.stocks.is_empty()
    }

    /// Listing printed before the export.
    pub fn to_console(&self) -> String {
        if !self.has_matches() {
            return "\n未找到符合条件的股票\n".to_string();
        }

        let mut out = String::from("\n找到以下符合条件的股票：\n");
        for stock in &self.result.stocks {
            out.push_str(&format!("{} ({})\n", stock.code, stock.name));
        }
        out
    }

    /// Closing lines after a successful export.
    pub fn saved_notice(&self, path: &Path) -> String {
        format!(
            "\n共找到 {} 只股票\n结果已保存到 {}\n",
            self.result.stocks.len(),
            path.display()
        )
    }

    /// Write BOM, header and one row per match.
    pub fn write_csv<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_all(UTF8_BOM).context("Failed to write BOM")?;

        let mut csv_writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        csv_writer
            .write_record(CSV_HEADERS)
            .context("Failed to write CSV header")?;
        for ScreenedStock { code, name } in &self.result.stocks {
            csv_writer
                .write_record([code, name])
                .with_context(|| format!("Failed to write CSV row for {}", code))?;
        }
        csv_writer.flush().context("Failed to flush CSV output")?;
        Ok(())
    }

    /// Save the matches to `path`, replacing any previous file.
    pub fn save_csv(&self, path: &Path) -> Result<PathBuf> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).context("Failed to create report directory")?;
        }

        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        self.write_csv(BufWriter::new(file))?;

        tracing::info!(
            path = %path.display(),
            rows = self.result.stocks.len(),
            "Selected stocks saved"
        );
        Ok(path.to_path_buf())
    }

    /// Save the matches to `path` when there are any.
    ///
    /// Without matches nothing is written and an existing file is left as is.
    pub fn export_if_any(&self, path: &Path) -> Result<Option<PathBuf>> {
        if !self.has_matches() {
            return Ok(None);
        }
        self.save_csv(path).map(Some)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn result_with(stocks: &[(&str, &str)]) -> ScreenerResult {
        let now = Utc::now();
        ScreenerResult {
            trade_date: NaiveDate::from_ymd_opt(2024, 1, 5),
            stocks: stocks
                .iter()
                .map(|(code, name)| ScreenedStock {
                    code: code.to_string(),
                    name: name.to_string(),
                })
                .collect(),
            total_scanned: 10,
            started_at: now,
            completed_at: now,
            duration_secs: 0.0,
        }
    }

    #[test]
    fn test_console_listing() {
        let result = result_with(&[("000001.SZ", "平安银行"), ("600000.SH", "浦发银行")]);
        let report = ScreenerReport::new(&result);
        assert!(report.has_matches());
        assert_eq!(
            report.to_console(),
            "\n找到以下符合条件的股票：\n000001.SZ (平安银行)\n600000.SH (浦发银行)\n"
        );
    }

    #[test]
    fn test_console_no_matches() {
        let result = result_with(&[]);
        let report = ScreenerReport::new(&result);
        assert!(!report.has_matches());
        assert_eq!(report.to_console(), "\n未找到符合条件的股票\n");
    }

    #[test]
    fn test_saved_notice() {
        let result = result_with(&[("000001.SZ", "平安银行")]);
        let notice = ScreenerReport::new(&result).saved_notice(Path::new("selected_stocks.csv"));
        assert_eq!(notice, "\n共找到 1 只股票\n结果已保存到 selected_stocks.csv\n");
    }

    #[test]
    fn test_write_csv_layout() {
        let result = result_with(&[("000001.SZ", "平安银行"), ("300750.SZ", "宁德时代")]);
        let mut buf = Vec::new();
        ScreenerReport::new(&result).write_csv(&mut buf).unwrap();

        assert!(buf.starts_with(UTF8_BOM));
        let text = std::str::from_utf8(&buf[UTF8_BOM.len()..]).unwrap();
        assert_eq!(
            text,
            "股票代码,股票名称\n000001.SZ,平安银行\n300750.SZ,宁德时代\n"
        );
    }

    #[test]
    fn test_write_csv_quotes_names_with_commas() {
        let result = result_with(&[("000002.SZ", "万科,A")]);
        let mut buf = Vec::new();
        ScreenerReport::new(&result).write_csv(&mut buf).unwrap();
        let text = std::str::from_utf8(&buf[UTF8_BOM.len()..]).unwrap();
        assert!(text.ends_with("000002.SZ,\"万科,A\"\n"));
    }

    #[test]
    fn test_save_csv_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.csv");
        let result = result_with(&[("000001.SZ", "平安银行")]);

        let saved = ScreenerReport::new(&result).save_csv(&path).unwrap();
        assert_eq!(saved, path);
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));
    }

    #[test]
    fn test_export_if_any_skips_empty_result() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let result = result_with(&[]);

        assert!(ScreenerReport::new(&result).export_if_any(&path).unwrap().is_none());
        assert!(!path.exists());

        std::fs::write(&path, "previous run").unwrap();
        assert!(ScreenerReport::new(&result).export_if_any(&path).unwrap().is_none());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "previous run");
    }

    #[test]
    fn test_export_if_any_writes_matches() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let result = result_with(&[("000001.SZ", "平安银行")]);

        let saved = ScreenerReport::new(&result).export_if_any(&path).unwrap();
        assert_eq!(saved.as_deref(), Some(path.as_path()));
        assert!(std::fs::read(&path).unwrap().starts_with(UTF8_BOM));
    }

    #[test]
    fn test_progress_lines() {
        let stock = ScreenedStock {
            code: "000001.SZ".into(),
            name: "平安银行".into(),
        };
        assert_eq!(
            progress_line(&ScreenEvent::TradeDateUnresolved),
            "无法获取最近交易日期"
        );
        assert_eq!(
            progress_line(&ScreenEvent::Scanning(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap())),
            "\n正在获取 20240105 的交易数据\n"
        );
        assert_eq!(
            progress_line(&ScreenEvent::Matched(&stock)),
            "股票 000001.SZ (平安银行) 符合条件！"
        );
    }
}
