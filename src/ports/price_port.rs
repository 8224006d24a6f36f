//! Price retrieval port trait.

use crate::domain::error::PortvisError;
use crate::domain::prices::PriceTable;
use chrono::NaiveDate;

pub trait PricePort {
    /// Adjusted closing prices for `symbols` on dates in `[start_date, end_date)`.
    ///
    /// Columns follow the normalised symbol order. Returns an empty table
    /// when no data is available.
    fn fetch_prices(
        &self,
        symbols: &[String],
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceTable, PortvisError>;
}
