//! Ticker list normalisation.

use std::collections::HashSet;

/// Splits a comma-separated ticker list, trims and upper-cases each entry,
/// drops empty entries and removes duplicates keeping the first occurrence.
pub fn clean_tickers(input: &str) -> Vec<String> {
    normalize(input.split(','))
}

/// Same normalisation over already-split symbols.
pub fn normalize<'a, I>(symbols: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    symbols
        .into_iter()
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.clone()))
        .collect()
}
