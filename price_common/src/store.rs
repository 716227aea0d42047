//! Persisted price map and its JSON document format.
//!
//! Document layout:
//!
//! ```json
//! {
//!   "updatedAt": "2024-05-01T09:05:12+09:00",
//!   "entries": {
//!     "005930": { "price": 71000.0, "source": "primary", "timestamp": "2024-05-01T09:05:00+09:00" }
//!   }
//! }
//! ```
//!
//! Entries that a run did not replace are written back exactly as they were
//! read: same price literal, same timestamp text. Timestamps without an offset
//! (`2024-05-01T09:05`) are read as local time of the entry's market.
//!
//! The older flat layout `{ "updated_at": ..., "prices": { code: number } }` is
//! still read; its prices come back as secondary entries without a timestamp
//! and the next save writes the layout above.
//!
//! Saving goes through a temporary file in the target directory followed by a
//! rename, so a failed or interrupted save leaves the previous document as is.

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, SecondsFormat, TimeZone};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::PriceError;
use crate::identifier::{Identifier, Market};
use crate::quote::{Quote, Source, StoredEntry};

/// Offset-less layouts accepted for stored timestamps.
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<String>,
    entries: BTreeMap<String, EntryRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct EntryRecord {
    price: Number,
    source: Source,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timestamp: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LegacyDocument {
    #[serde(default)]
    updated_at: Option<String>,
    prices: BTreeMap<String, Number>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AnyDocument {
    Current(StoreDocument),
    Legacy(LegacyDocument),
}

/// Last-known price per identifier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceStore {
    updated_at: Option<DateTime<FixedOffset>>,
    updated_at_text: Option<String>,
    entries: BTreeMap<String, StoredEntry>,
    // Records as read from disk, dropped once their entry is replaced.
    persisted: BTreeMap<String, EntryRecord>,
}

impl PriceStore {
    /// Empty store, the state of a first run.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the store at `path`; a missing file yields an empty store.
    pub fn load(path: &Path) -> Result<Self, PriceError> {
        if !path.exists() {
            info!("No price store at {}, starting empty", path.display());
            return Ok(Self::new());
        }
        let text = fs::read_to_string(path)?;
        let store = Self::from_json(&text)?;
        info!(
            "Loaded {} stored prices from {}",
            store.len(),
            path.display()
        );
        Ok(store)
    }

    /// Decode a store document (current or legacy layout).
    pub fn from_json(text: &str) -> Result<Self, PriceError> {
        match serde_json::from_str::<AnyDocument>(text)? {
            AnyDocument::Current(doc) => Self::from_document(doc),
            AnyDocument::Legacy(doc) => {
                info!(
                    "Upgrading legacy price document with {} prices",
                    doc.prices.len()
                );
                Self::from_legacy(doc)
            }
        }
    }

    fn from_document(doc: StoreDocument) -> Result<Self, PriceError> {
        let mut store = Self::with_updated_at(doc.updated_at);
        for (key, record) in doc.entries {
            let identifier = Identifier::from_key(&key);
            let observed_at = record
                .timestamp
                .as_deref()
                .and_then(|raw| parse_timestamp(&key, raw, &identifier.market().timezone()));
            let entry = StoredEntry {
                identifier,
                price: price_value(&key, &record.price)?,
                source: record.source,
                observed_at,
            };
            store.entries.insert(key.clone(), entry);
            store.persisted.insert(key, record);
        }
        Ok(store)
    }

    fn from_legacy(doc: LegacyDocument) -> Result<Self, PriceError> {
        let mut store = Self::with_updated_at(doc.updated_at);
        for (key, price) in doc.prices {
            let entry = StoredEntry {
                identifier: Identifier::from_key(&key),
                price: price_value(&key, &price)?,
                source: Source::Secondary,
                observed_at: None,
            };
            let record = EntryRecord {
                price,
                source: Source::Secondary,
                timestamp: None,
            };
            store.entries.insert(key.clone(), entry);
            store.persisted.insert(key, record);
        }
        Ok(store)
    }

    fn with_updated_at(raw: Option<String>) -> Self {
        Self {
            updated_at: raw
                .as_deref()
                .and_then(|raw| parse_timestamp("updatedAt", raw, &Local)),
            updated_at_text: raw,
            ..Self::default()
        }
    }

    /// Encode the store as a pretty-printed document with sorted keys.
    pub fn to_json(&self) -> Result<String, PriceError> {
        let mut entries = BTreeMap::new();
        for (key, entry) in &self.entries {
            let record = match self.persisted.get(key) {
                Some(record) => record.clone(),
                None => EntryRecord {
                    price: Number::from_f64(entry.price).ok_or_else(|| {
                        PriceError::Format(format!("price {} of {} is not a number", entry.price, key))
                    })?,
                    source: entry.source,
                    timestamp: entry.observed_at.map(format_timestamp),
                },
            };
            entries.insert(key.clone(), record);
        }
        let doc = StoreDocument {
            updated_at: self.updated_at_text.clone(),
            entries,
        };
        Ok(serde_json::to_string_pretty(&doc)?)
    }

    /// Write the store to `path`, replacing the previous document atomically.
    pub fn save(&self, path: &Path) -> Result<(), PriceError> {
        let json = self.to_json()?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let persist_err = |source: std::io::Error| PriceError::Persist {
            path: path.to_path_buf(),
            source,
        };

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(persist_err)?;
        tmp.write_all(json.as_bytes()).map_err(persist_err)?;
        tmp.write_all(b"\n").map_err(persist_err)?;
        tmp.as_file().sync_all().map_err(persist_err)?;
        tmp.persist(path).map_err(|e| persist_err(e.error))?;

        debug!("Wrote {} bytes to {}", json.len() + 1, path.display());
        Ok(())
    }

    /// Stored entry for `identifier`, if any.
    pub fn get(&self, identifier: &Identifier) -> Option<&StoredEntry> {
        self.entries.get(identifier.code())
    }

    /// Overwrite the entry of the quote's identifier; returns the replaced entry.
    pub fn apply(&mut self, quote: Quote) -> Option<StoredEntry> {
        let key = quote.identifier().code().to_string();
        self.persisted.remove(&key);
        self.entries.insert(key, StoredEntry::from(quote))
    }

    /// Record the moment the store was last refreshed.
    pub fn stamp(&mut self, now: DateTime<FixedOffset>) {
        self.updated_at = Some(now);
        self.updated_at_text = Some(format_timestamp(now));
    }

    /// Moment of the last refresh, if known.
    pub fn updated_at(&self) -> Option<DateTime<FixedOffset>> {
        self.updated_at
    }

    /// All entries in key order.
    pub fn entries(&self) -> impl Iterator<Item = &StoredEntry> {
        self.entries.values()
    }

    /// Entries of one market in key order.
    pub fn entries_for(&self, market: Market) -> impl Iterator<Item = &StoredEntry> {
        self.entries
            .values()
            .filter(move |entry| entry.identifier.market() == market)
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn price_value(key: &str, price: &Number) -> Result<f64, PriceError> {
    price
        .as_f64()
        .ok_or_else(|| PriceError::Format(format!("price {} of {} is out of range", price, key)))
}

/// Parse a stored timestamp; offset-less text is local time in `zone`.
fn parse_timestamp<Z: TimeZone>(field: &str, raw: &str, zone: &Z) -> Option<DateTime<FixedOffset>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts);
    }
    if let Ok(ts) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M%:z") {
        return Some(ts);
    }
    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok());
    match naive.and_then(|naive| zone.from_local_datetime(&naive).earliest()) {
        Some(ts) => Some(ts.fixed_offset()),
        None => {
            warn!("Ignoring unparseable timestamp {:?} for {}", raw, field);
            None
        }
    }
}

fn format_timestamp(ts: DateTime<FixedOffset>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
  "updatedAt": "2024-05-01T09:06:00+09:00",
  "entries": {
    "005930": {
      "price": 71000.0,
      "source": "primary",
      "timestamp": "2024-05-01T09:05:00+09:00"
    },
    "AAPL": {
      "price": 151.2,
      "source": "secondary",
      "timestamp": "2024-05-01T16:00:00-04:00"
    }
  }
}"#;

    #[test]
    fn decodes_current_document() {
        let store = PriceStore::from_json(DOC).unwrap();
        assert_eq!(store.len(), 2);

        let samsung = store.get(&Identifier::korea("005930").unwrap()).unwrap();
        assert_eq!(samsung.price, 71000.0);
        assert_eq!(samsung.source, Source::Primary);
        assert_eq!(samsung.identifier.market(), Market::Korea);

        let apple = store.get(&Identifier::us("AAPL").unwrap()).unwrap();
        assert_eq!(apple.source, Source::Secondary);
        assert_eq!(store.entries_for(Market::Us).count(), 1);
    }

    #[test]
    fn reencoding_is_byte_identical() {
        let store = PriceStore::from_json(DOC).unwrap();
        assert_eq!(store.to_json().unwrap(), DOC);
    }

    #[test]
    fn bad_timestamp_becomes_missing() {
        let doc = r#"{"entries": {"005930": {"price": 1.0, "source": "primary", "timestamp": "yesterday"}}}"#;
        let store = PriceStore::from_json(doc).unwrap();
        let entry = store.get(&Identifier::korea("005930").unwrap()).unwrap();
        assert_eq!(entry.observed_at, None);
        assert_eq!(store.updated_at(), None);
    }

    #[test]
    fn unknown_source_is_an_error() {
        let doc = r#"{"entries": {"005930": {"price": 1.0, "source": "tertiary"}}}"#;
        assert!(PriceStore::from_json(doc).is_err());
    }

    #[test]
    fn legacy_prices_become_untimed_secondary_entries() {
        let doc = r#"{"updated_at": "2024-04-30T18:00:00.123456", "prices": {"005930": 70000.0, "AAPL": 150.25}}"#;
        let store = PriceStore::from_json(doc).unwrap();
        assert_eq!(store.len(), 2);
        for entry in store.entries() {
            assert_eq!(entry.source, Source::Secondary);
            assert_eq!(entry.observed_at, None);
        }
        assert!(store.updated_at().is_some());

        let upgraded = store.to_json().unwrap();
        assert!(upgraded.contains(r#""updatedAt": "2024-04-30T18:00:00.123456""#));
        assert!(upgraded.contains(r#""price": 70000.0"#));
    }

    const MIXED: &str = r#"{
  "updatedAt": "2024-05-01T20:05:00Z",
  "entries": {
    "005930": {
      "price": 71000,
      "source": "primary",
      "timestamp": "2024-05-01T09:05"
    },
    "035720": {
      "price": 48250.0,
      "source": "secondary",
      "timestamp": "2024-05-01T15:30:00.5+09:00"
    },
    "AAPL": {
      "price": 150,
      "source": "secondary",
      "timestamp": "2024-05-01T20:00:00Z"
    },
    "MSFT": {
      "price": 410.5,
      "source": "primary",
      "timestamp": "2024-05-01T10:15:30.250000"
    }
  }
}"#;

    #[test]
    fn untouched_entries_keep_their_text() {
        let store = PriceStore::from_json(MIXED).unwrap();
        assert_eq!(store.to_json().unwrap(), MIXED);
    }

    #[test]
    fn offset_less_timestamps_are_market_local() {
        let store = PriceStore::from_json(MIXED).unwrap();
        let at = |key: &str| {
            store
                .get(&Identifier::from_key(key))
                .unwrap()
                .observed_at
                .unwrap()
                .to_rfc3339()
        };
        assert_eq!(at("005930"), "2024-05-01T09:05:00+09:00");
        assert_eq!(at("MSFT"), "2024-05-01T10:15:30.250-04:00");
        assert_eq!(at("AAPL"), "2024-05-01T20:00:00+00:00");
        assert_eq!(at("035720"), "2024-05-01T15:30:00.500+09:00");
        assert_eq!(store.get(&Identifier::from_key("AAPL")).unwrap().price, 150.0);
    }

    #[test]
    fn replaced_entry_is_rewritten_others_are_not() {
        let mut store = PriceStore::from_json(MIXED).unwrap();
        let quote = Quote::new(
            Identifier::korea("005930").unwrap(),
            72000.0,
            Source::Primary,
            DateTime::parse_from_rfc3339("2024-05-02T09:00:00+09:00").unwrap(),
        )
        .unwrap();
        store.apply(quote);

        let json = store.to_json().unwrap();
        assert!(json.contains(r#""timestamp": "2024-05-02T09:00:00+09:00""#));
        assert!(json.contains(r#""price": 72000.0"#));
        assert!(json.contains(r#""price": 150,"#));
        assert!(json.contains(r#""timestamp": "2024-05-01T20:00:00Z""#));
        assert!(json.contains(r#""timestamp": "2024-05-01T10:15:30.250000""#));
    }

    #[test]
    fn apply_replaces_and_returns_previous() {
        let mut store = PriceStore::from_json(DOC).unwrap();
        let quote = Quote::new(
            Identifier::korea("005930").unwrap(),
            72000.0,
            Source::Primary,
            DateTime::parse_from_rfc3339("2024-05-02T09:00:00+09:00").unwrap(),
        )
        .unwrap();
        let previous = store.apply(quote).unwrap();
        assert_eq!(previous.price, 71000.0);
        assert_eq!(
            store.get(&Identifier::korea("005930").unwrap()).unwrap().price,
            72000.0
        );
    }
}
