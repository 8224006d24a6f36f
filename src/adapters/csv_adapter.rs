//! CSV file price adapter.
//!
//! Reads one `<SYMBOL>.csv` file per symbol from a base directory. The header
//! must name a `date` column and an `adj_close` or `close` column; adjusted
//! close wins when both are present. Blank, `NaN`, zero or negative cells are
//! missing values.

use crate::domain::error::PortvisError;
use crate::domain::prices::{is_valid_price, PriceTable};
use crate::domain::tickers::normalize;
use crate::ports::price_port::PricePort;
use chrono::NaiveDate;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

pub struct CsvPriceAdapter {
    base_path: PathBuf,
}

impl CsvPriceAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    /// `Ok(None)` when the symbol has no file.
    fn read_series(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Option<Vec<(NaiveDate, f64)>>, PortvisError> {
        let path = self.csv_path(symbol);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(PortvisError::Data {
                    reason: format!("failed to read {}: {}", path.display(), e),
                });
            }
        };

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr.headers()?.clone();
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let date_col = find("date").ok_or_else(|| PortvisError::Data {
            reason: format!("{}: missing date column", path.display()),
        })?;
        let price_col = find("adj_close")
            .or_else(|| find("close"))
            .ok_or_else(|| PortvisError::Data {
                reason: format!("{}: missing adj_close/close column", path.display()),
            })?;

        let mut points = Vec::new();
        for result in rdr.records() {
            let record = result?;

            let date_str = record.get(date_col).unwrap_or_default().trim();
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                PortvisError::Data {
                    reason: format!("{}: invalid date {:?}: {}", path.display(), date_str, e),
                }
            })?;

            if date < start_date || date >= end_date {
                continue;
            }

            let cell = record.get(price_col).unwrap_or_default().trim();
            if cell.is_empty() || cell.eq_ignore_ascii_case("nan") {
                continue;
            }
            let price: f64 = cell.parse().map_err(|e| PortvisError::Data {
                reason: format!("{}: invalid price {:?}: {}", path.display(), cell, e),
            })?;
            if !is_valid_price(price) {
                tracing::warn!(%symbol, %date, price, "non-positive price treated as missing");
                continue;
            }
            points.push((date, price));
        }

        points.sort_by_key(|(date, _)| *date);
        Ok(Some(points))
    }
}

impl PricePort for CsvPriceAdapter {
    fn fetch_prices(
        &self,
        symbols: &[String],
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceTable, PortvisError> {
        let symbols = normalize(symbols.iter().map(String::as_str));
        if symbols.is_empty() {
            return Ok(PriceTable::empty());
        }

        let mut series = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            match self.read_series(&symbol, start_date, end_date)? {
                Some(points) => {
                    tracing::debug!(%symbol, rows = points.len(), "loaded price series");
                    series.push((symbol, points));
                }
                None => tracing::warn!(%symbol, "no price file, skipping"),
            }
        }

        if series.is_empty() {
            return Ok(PriceTable::empty());
        }
        Ok(PriceTable::from_series(series))
    }
}
