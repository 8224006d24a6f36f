//! Caching price source.
//!
//! Wraps any [`PricePort`] and caches successful fetches keyed by the
//! symbol list and date range. Concurrent requests for the same key are
//! serialised on a per-key lock, so only one fetch is in flight for it and
//! the waiters are served from the cache. Failed fetches are not cached.

use crate::domain::error::PortvisError;
use crate::domain::prices::PriceTable;
use crate::ports::price_port::PricePort;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

type CacheKey = (Vec<String>, NaiveDate, NaiveDate);
type Slot = Arc<Mutex<Option<PriceTable>>>;

pub struct CachedPriceAdapter<P> {
    inner: P,
    slots: Mutex<HashMap<CacheKey, Slot>>,
}

impl<P: PricePort> CachedPriceAdapter<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Number of keys with a cached table.
    pub fn cached_len(&self) -> usize {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots
            .values()
            .filter(|slot| {
                slot.lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .is_some()
            })
            .count()
    }

    pub fn clear(&self) {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn slot(&self, key: CacheKey) -> Slot {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(key).or_default())
    }
}

impl<P: PricePort> PricePort for CachedPriceAdapter<P> {
    fn fetch_prices(
        &self,
        symbols: &[String],
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceTable, PortvisError> {
        let slot = self.slot((symbols.to_vec(), start_date, end_date));
        let mut cached = slot.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(table) = cached.as_ref() {
            tracing::debug!(symbols = symbols.len(), "price cache hit");
            return Ok(table.clone());
        }

        let table = self.inner.fetch_prices(symbols, start_date, end_date)?;
        *cached = Some(table.clone());
        Ok(table)
    }
}
