#![allow(dead_code)]

use chrono::NaiveDate;
use portvis::domain::analysis::AnalysisConfig;
use portvis::domain::error::PortvisError;
use portvis::domain::prices::PriceTable;
use portvis::ports::price_port::PricePort;
use std::cell::Cell;
use std::collections::HashMap;
use std::path::Path;

pub struct MockPricePort {
    pub data: HashMap<String, Vec<(NaiveDate, f64)>>,
    pub errors: HashMap<String, String>,
    pub calls: Cell<usize>,
}

impl MockPricePort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            calls: Cell::new(0),
        }
    }

    pub fn with_series(mut self, symbol: &str, start: &str, prices: &[f64]) -> Self {
        let start = NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap();
        let series = prices
            .iter()
            .enumerate()
            .map(|(i, p)| (start + chrono::Duration::days(i as i64), *p))
            .collect();
        self.data.insert(symbol.to_string(), series);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl PricePort for MockPricePort {
    fn fetch_prices(
        &self,
        symbols: &[String],
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceTable, PortvisError> {
        self.calls.set(self.calls.get() + 1);

        let mut series = Vec::new();
        for symbol in symbols {
            if let Some(reason) = self.errors.get(symbol) {
                return Err(PortvisError::Data {
                    reason: reason.clone(),
                });
            }
            if let Some(points) = self.data.get(symbol) {
                let points = points
                    .iter()
                    .filter(|(d, _)| *d >= start_date && *d < end_date)
                    .copied()
                    .collect();
                series.push((symbol.clone(), points));
            }
        }
        if series.is_empty() {
            return Ok(PriceTable::empty());
        }
        Ok(PriceTable::from_series(series))
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn sample_config(tickers: &[&str]) -> AnalysisConfig {
    AnalysisConfig {
        tickers: tickers.iter().map(|t| t.to_string()).collect(),
        start_date: date(2024, 1, 1),
        end_date: date(2024, 12, 31),
        total_invest: 10_000.0,
        risk_free_rate: 0.03,
        index_base: 100.0,
    }
}

/// Deterministic wiggly price path: `count` daily closes starting at `start_price`.
pub fn generate_prices(count: usize, start_price: f64, drift: f64) -> Vec<f64> {
    (0..count)
        .map(|i| {
            let wiggle = if i % 2 == 0 { 1.01 } else { 0.995 };
            start_price * (1.0 + drift).powi(i as i32) * wiggle
        })
        .collect()
}

/// Writes `<SYMBOL>.csv` with `date,close` rows on consecutive days.
pub fn write_price_csv(dir: &Path, symbol: &str, start: &str, prices: &[f64]) {
    let start = NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap();
    let mut content = String::from("date,close\n");
    for (i, p) in prices.iter().enumerate() {
        let d = start + chrono::Duration::days(i as i64);
        content.push_str(&format!("{},{}\n", d.format("%Y-%m-%d"), p));
    }
    std::fs::write(dir.join(format!("{}.csv", symbol)), content).unwrap();
}
