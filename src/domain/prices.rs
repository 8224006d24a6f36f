//! Price and return tables.
//!
//! Both tables are rectangular: a fixed set of symbol columns and one row per
//! trading date, dates strictly increasing. A [`PriceTable`] may carry
//! missing cells; a [`ReturnsTable`] never does.

use crate::domain::error::PortvisError;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq)]
pub struct PriceRow {
    pub date: NaiveDate,
    pub prices: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PriceTable {
    symbols: Vec<String>,
    rows: Vec<PriceRow>,
}

impl PriceTable {
    pub fn new(symbols: Vec<String>, rows: Vec<PriceRow>) -> Result<Self, PortvisError> {
        for (i, row) in rows.iter().enumerate() {
            if row.prices.len() != symbols.len() {
                return Err(PortvisError::invalid(format!(
                    "price row {} has {} cells, expected {}",
                    row.date,
                    row.prices.len(),
                    symbols.len()
                )));
            }
            if let Some(bad) = row.prices.iter().flatten().find(|p| !is_valid_price(**p)) {
                return Err(PortvisError::invalid(format!(
                    "price on {} must be a positive finite number, got {}",
                    row.date, bad
                )));
            }
            if i > 0 && row.date <= rows[i - 1].date {
                return Err(PortvisError::invalid(format!(
                    "price dates must be strictly increasing ({} follows {})",
                    row.date,
                    rows[i - 1].date
                )));
            }
        }
        Ok(Self { symbols, rows })
    }

    /// The "nothing to analyze" table.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Outer-joins per-symbol `(date, price)` series on date.
    ///
    /// Symbols keep the given order. Non-positive or non-finite prices are
    /// treated as missing, and dates on which no symbol has a price are
    /// dropped. Duplicate dates within one series keep the last price.
    pub fn from_series(series: Vec<(String, Vec<(NaiveDate, f64)>)>) -> Self {
        let lookups: Vec<BTreeMap<NaiveDate, f64>> = series
            .iter()
            .map(|(_, points)| {
                points
                    .iter()
                    .copied()
                    .filter(|(_, p)| is_valid_price(*p))
                    .collect()
            })
            .collect();

        let dates: BTreeSet<NaiveDate> = lookups.iter().flat_map(|m| m.keys().copied()).collect();

        let rows = dates
            .into_iter()
            .map(|date| PriceRow {
                date,
                prices: lookups.iter().map(|m| m.get(&date).copied()).collect(),
            })
            .filter(|row| row.prices.iter().any(Option::is_some))
            .collect();

        Self {
            symbols: series.into_iter().map(|(s, _)| s).collect(),
            rows,
        }
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn rows(&self) -> &[PriceRow] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.symbols.is_empty()
    }

    pub fn column(&self, symbol: &str) -> Option<Vec<Option<f64>>> {
        let idx = self.symbols.iter().position(|s| s == symbol)?;
        Some(self.rows.iter().map(|r| r.prices[idx]).collect())
    }
}

/// Prices are positive reals; anything else is a missing observation.
pub fn is_valid_price(price: f64) -> bool {
    price.is_finite() && price > 0.0
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnRow {
    pub date: NaiveDate,
    pub returns: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReturnsTable {
    pub symbols: Vec<String>,
    pub rows: Vec<ReturnRow>,
}

impl ReturnsTable {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, symbol: &str) -> Option<Vec<f64>> {
        let idx = self.symbols.iter().position(|s| s == symbol)?;
        Some(self.rows.iter().map(|r| r.returns[idx]).collect())
    }
}
