//! Annualized portfolio metrics.

use super::portfolio::PortfolioDailySeries;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricsResult {
    pub expected_return: f64,
    pub volatility: f64,
    pub sharpe: f64,
}

impl MetricsResult {
    /// `(name, value)` rows in export order.
    pub fn rows(&self) -> [(&'static str, f64); 3] {
        [
            ("expected_return", self.expected_return),
            ("volatility", self.volatility),
            ("sharpe", self.sharpe),
        ]
    }
}

/// Annualized mean, annualized sample volatility and Sharpe ratio.
///
/// Volatility uses the sample standard deviation (N-1 denominator); with
/// fewer than two observations it is 0. Zero volatility gives a Sharpe of
/// exactly 0.0 instead of a division fault.
pub fn portfolio_metrics(daily: &PortfolioDailySeries, rf: f64) -> MetricsResult {
    let values = daily.values();
    if values.is_empty() {
        return MetricsResult {
            expected_return: 0.0,
            volatility: 0.0,
            sharpe: 0.0,
        };
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;

    let stddev = if values.len() > 1 {
        let variance = values.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
        variance.sqrt()
    } else {
        0.0
    };

    let expected_return = mean * TRADING_DAYS_PER_YEAR;
    let volatility = stddev * TRADING_DAYS_PER_YEAR.sqrt();

    let sharpe = if volatility != 0.0 {
        (expected_return - rf) / volatility
    } else {
        0.0
    };

    MetricsResult {
        expected_return,
        volatility,
        sharpe,
    }
}
