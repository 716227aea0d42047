//! Selection and rendering of stored entries.
use price_common::{IdentifierSet, Market, PriceStore, StoredEntry};

/// Entries of `store` matching the optional market and code filters, in key order.
pub fn select<'a>(
    store: &'a PriceStore,
    market: Option<Market>,
    codes: Option<&IdentifierSet>,
) -> Vec<&'a StoredEntry> {
    let entries: Box<dyn Iterator<Item = &'a StoredEntry> + 'a> = match market {
        Some(market) => Box::new(store.entries_for(market)),
        None => Box::new(store.entries()),
    };
    entries
        .filter(|entry| codes.is_none_or(|set| set.iter().any(|id| id == &entry.identifier)))
        .collect()
}

/// Requested codes with no stored entry.
pub fn missing<'a>(store: &PriceStore, codes: &'a IdentifierSet) -> Vec<&'a str> {
    codes
        .iter()
        .filter(|id| store.get(id).is_none())
        .map(|id| id.code())
        .collect()
}

/// One display line: code, formatted price, source and observation time.
pub fn render(entry: &StoredEntry) -> String {
    let observed = entry
        .observed_at
        .map(|ts| ts.format("%Y-%m-%d %H:%M %:z").to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{:<8} {:>14} {:<9} {}",
        entry.identifier.code(),
        entry.display_price(),
        entry.source.to_string(),
        observed
    )
}
