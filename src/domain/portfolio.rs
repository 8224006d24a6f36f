//! Portfolio aggregation: weights, daily weighted returns, cumulative index.

use chrono::NaiveDate;

use super::error::PortvisError;
use super::prices::ReturnsTable;

pub const DEFAULT_INDEX_BASE: f64 = 100.0;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Non-negative weights summing to one, one per asset column.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightVector(Vec<f64>);

impl WeightVector {
    pub fn new(weights: Vec<f64>) -> Result<Self, PortvisError> {
        if weights.is_empty() {
            return Err(PortvisError::invalid("weight vector must not be empty"));
        }
        if let Some(w) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(PortvisError::invalid(format!(
                "weights must be finite and non-negative, got {w}"
            )));
        }
        let sum: f64 = weights.iter().sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(PortvisError::invalid(format!(
                "weights must sum to 1.0, got {sum}"
            )));
        }
        Ok(Self(weights))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PortfolioDailySeries {
    pub points: Vec<SeriesPoint>,
}

impl PortfolioDailySeries {
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioIndexSeries {
    pub base: f64,
    pub points: Vec<SeriesPoint>,
}

impl PortfolioIndexSeries {
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn last(&self) -> Option<f64> {
        self.points.last().map(|p| p.value)
    }
}

/// `n` weights of `1/n` each.
pub fn equal_weights(n: usize) -> Result<WeightVector, PortvisError> {
    if n == 0 {
        return Err(PortvisError::invalid(
            "equal weights require at least one asset (n >= 1)",
        ));
    }
    Ok(WeightVector(vec![1.0 / n as f64; n]))
}

/// Weighted sum of each row's asset returns.
pub fn portfolio_daily(
    returns: &ReturnsTable,
    weights: &WeightVector,
) -> Result<PortfolioDailySeries, PortvisError> {
    if weights.len() != returns.symbols.len() {
        return Err(PortvisError::ShapeMismatch {
            weights: weights.len(),
            assets: returns.symbols.len(),
        });
    }

    let points = returns
        .rows
        .iter()
        .map(|row| SeriesPoint {
            date: row.date,
            value: row
                .returns
                .iter()
                .zip(weights.as_slice())
                .map(|(r, w)| r * w)
                .sum(),
        })
        .collect();

    Ok(PortfolioDailySeries { points })
}

/// Compounded growth of `base`: `index[t] = base * Π(1 + r[i])` for `i <= t`.
///
/// Order-sensitive; points are consumed in the order given, which is
/// chronological for any series built by [`portfolio_daily`]. For horizons
/// long enough to overflow the running product, `base * exp(Σ ln_1p(r))`
/// is the equivalent log-space form.
pub fn cumulative_index(daily: &PortfolioDailySeries, base: f64) -> PortfolioIndexSeries {
    let mut growth = 1.0_f64;
    let points = daily
        .points
        .iter()
        .map(|p| {
            growth *= 1.0 + p.value;
            SeriesPoint {
                date: p.date,
                value: growth * base,
            }
        })
        .collect();

    PortfolioIndexSeries { base, points }
}

/// Symbol/weight pairs for display.
pub fn allocation(symbols: &[String], weights: &WeightVector) -> Vec<(String, f64)> {
    symbols
        .iter()
        .cloned()
        .zip(weights.as_slice().iter().copied())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::prices::ReturnRow;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use proptest::prelude::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn daily(values: &[f64]) -> PortfolioDailySeries {
        PortfolioDailySeries {
            points: values
                .iter()
                .enumerate()
                .map(|(i, &value)| SeriesPoint {
                    date: d(i as u32 + 1),
                    value,
                })
                .collect(),
        }
    }

    fn two_asset_returns() -> ReturnsTable {
        ReturnsTable {
            symbols: vec!["A".into(), "B".into()],
            rows: vec![
                ReturnRow {
                    date: d(2),
                    returns: vec![0.10, 0.0],
                },
                ReturnRow {
                    date: d(3),
                    returns: vec![0.0, 0.0],
                },
            ],
        }
    }

    #[test]
    fn equal_weights_zero_fails() {
        assert!(matches!(
            equal_weights(0),
            Err(PortvisError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn equal_weights_four() {
        let w = equal_weights(4).unwrap();
        assert_eq!(w.as_slice(), &[0.25, 0.25, 0.25, 0.25]);
    }

    #[test]
    fn weight_vector_rejects_bad_sum() {
        assert!(WeightVector::new(vec![0.5, 0.4]).is_err());
        assert!(WeightVector::new(vec![1.5, -0.5]).is_err());
        assert!(WeightVector::new(vec![]).is_err());
        assert!(WeightVector::new(vec![0.7, 0.3]).is_ok());
    }

    #[test]
    fn daily_is_weighted_sum() {
        let w = equal_weights(2).unwrap();
        let series = portfolio_daily(&two_asset_returns(), &w).unwrap();
        assert_eq!(series.len(), 2);
        assert_abs_diff_eq!(series.points[0].value, 0.05, epsilon = 1e-12);
        assert_abs_diff_eq!(series.points[1].value, 0.0);
        assert_eq!(series.points[0].date, d(2));
    }

    #[test]
    fn daily_with_custom_weights() {
        let w = WeightVector::new(vec![0.7, 0.3]).unwrap();
        let series = portfolio_daily(&two_asset_returns(), &w).unwrap();
        assert_abs_diff_eq!(series.points[0].value, 0.07, epsilon = 1e-12);
    }

    #[test]
    fn daily_shape_mismatch() {
        let w = equal_weights(3).unwrap();
        let err = portfolio_daily(&two_asset_returns(), &w).unwrap_err();
        assert!(matches!(
            err,
            PortvisError::ShapeMismatch {
                weights: 3,
                assets: 2
            }
        ));
    }

    #[test]
    fn index_compounds_from_base() {
        let index = cumulative_index(&daily(&[0.05, 0.0]), DEFAULT_INDEX_BASE);
        assert_relative_eq!(index.points[0].value, 105.0, epsilon = 1e-9);
        assert_relative_eq!(index.points[1].value, 105.0, epsilon = 1e-9);
        assert_eq!(index.base, 100.0);
    }

    #[test]
    fn index_of_empty_series_is_empty() {
        let index = cumulative_index(&PortfolioDailySeries::default(), 100.0);
        assert!(index.points.is_empty());
        assert_eq!(index.last(), None);
    }

    #[test]
    fn index_is_order_sensitive_in_path() {
        let up_down = cumulative_index(&daily(&[0.10, -0.10]), 100.0);
        let down_up = cumulative_index(&daily(&[-0.10, 0.10]), 100.0);
        assert_relative_eq!(up_down.points[0].value, 110.0, epsilon = 1e-9);
        assert_relative_eq!(down_up.points[0].value, 90.0, epsilon = 1e-9);
    }

    #[test]
    fn allocation_pairs_symbols() {
        let w = equal_weights(2).unwrap();
        let alloc = allocation(&["A".to_string(), "B".to_string()], &w);
        assert_eq!(alloc, vec![("A".to_string(), 0.5), ("B".to_string(), 0.5)]);
    }

    proptest! {
        #[test]
        fn equal_weights_sum_to_one(n in 1usize..2000) {
            let w = equal_weights(n).unwrap();
            let sum: f64 = w.as_slice().iter().sum();
            prop_assert!((sum - 1.0).abs() < 1e-9);
            prop_assert_eq!(w.len(), n);
        }

        #[test]
        fn index_scales_with_base(
            values in prop::collection::vec(-0.2f64..0.2, 0..100),
            k in 0.01f64..10_000.0,
        ) {
            let series = daily_unbounded(&values);
            let scaled = cumulative_index(&series, k);
            let reference = cumulative_index(&series, 100.0);
            for (a, b) in scaled.points.iter().zip(&reference.points) {
                let expected = k / 100.0 * b.value;
                prop_assert!((a.value - expected).abs() <= 1e-9 * expected.abs().max(1.0));
            }
        }
    }

    fn daily_unbounded(values: &[f64]) -> PortfolioDailySeries {
        let start = d(1);
        PortfolioDailySeries {
            points: values
                .iter()
                .enumerate()
                .map(|(i, &value)| SeriesPoint {
                    date: start + chrono::Duration::days(i as i64),
                    value,
                })
                .collect(),
        }
    }
}
