//! Returns engine: prices to period-over-period fractional returns.

use crate::domain::prices::{PriceTable, ReturnRow, ReturnsTable};

/// `price[t] / price[t-1] - 1` for every symbol.
///
/// The leading row has no predecessor and is dropped, as is every row where
/// any symbol's change is undefined (a missing price on either side, or a
/// non-finite quotient). Fewer than two price rows yields an empty table.
pub fn compute_returns(prices: &PriceTable) -> ReturnsTable {
    let symbols = prices.symbols().to_vec();
    let rows = prices
        .rows()
        .windows(2)
        .filter_map(|w| {
            let returns: Option<Vec<f64>> = w[0]
                .prices
                .iter()
                .zip(&w[1].prices)
                .map(|(prev, curr)| match (prev, curr) {
                    (Some(p), Some(c)) => {
                        let r = c / p - 1.0;
                        r.is_finite().then_some(r)
                    }
                    _ => None,
                })
                .collect();
            returns.map(|returns| ReturnRow {
                date: w[1].date,
                returns,
            })
        })
        .collect();

    ReturnsTable { symbols, rows }
}
