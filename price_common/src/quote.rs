//! Quote data model and presentation helpers.
//!
//! A `Quote` is what a provider hands back for one identifier: the price, which
//! provider observed it and when. A `StoredEntry` is the same record as kept in
//! the price store, where the observation time may be missing.

use chrono::{DateTime, FixedOffset};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::error::PriceError;
use crate::identifier::{Identifier, Market};

/// Which upstream provider produced a price.
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    ValueEnum,
    Display,
    EnumString,
    Hash,
    Eq,
    PartialEq,
)]
#[value(rename_all = "lower")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Source {
    /// Live, scraped quote page.
    Primary,
    /// Structured chart API; previous close stamped at a synthetic hour.
    Secondary,
}

/// Market quote for a single identifier. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    identifier: Identifier,
    price: f64,
    source: Source,
    observed_at: DateTime<FixedOffset>,
}

impl Quote {
    /// Build a quote, rounding `price` to the identifier's market precision.
    ///
    /// Non-finite prices are refused; zero and negative values pass through.
    pub fn new(
        identifier: Identifier,
        price: f64,
        source: Source,
        observed_at: DateTime<FixedOffset>,
    ) -> Result<Self, PriceError> {
        if !price.is_finite() {
            return Err(PriceError::Format(format!(
                "non-finite price {} for {}",
                price, identifier
            )));
        }
        let price = identifier.market().round_price(price);
        Ok(Self {
            identifier,
            price,
            source,
            observed_at,
        })
    }

    /// Identifier the quote belongs to.
    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    /// Price rounded to the market precision.
    pub fn price(&self) -> f64 {
        self.price
    }

    /// Provider that produced the quote.
    pub fn source(&self) -> Source {
        self.source
    }

    /// Observation instant, in the offset the provider stamped it with.
    pub fn observed_at(&self) -> DateTime<FixedOffset> {
        self.observed_at
    }

    /// Price formatted for display, see [`format_price`].
    pub fn display_price(&self) -> String {
        format_price(self.identifier.market(), self.price)
    }
}

/// A quote as kept in the price store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredEntry {
    /// Identifier rebuilt from the store key.
    pub identifier: Identifier,
    /// Last accepted price.
    pub price: f64,
    /// Provider of the last accepted price.
    pub source: Source,
    /// `None` when the persisted timestamp was missing or unparseable.
    pub observed_at: Option<DateTime<FixedOffset>>,
}

impl StoredEntry {
    /// Price formatted for display, see [`format_price`].
    pub fn display_price(&self) -> String {
        format_price(self.identifier.market(), self.price)
    }
}

impl From<Quote> for StoredEntry {
    fn from(quote: Quote) -> Self {
        Self {
            identifier: quote.identifier,
            price: quote.price,
            source: quote.source,
            observed_at: Some(quote.observed_at),
        }
    }
}

/// Presentation policy: whole won with thousands separators for Korea,
/// dollars with two decimals for the US.
pub fn format_price(market: Market, price: f64) -> String {
    match market {
        Market::Korea => format!("{}원", group_thousands(price.round() as i64)),
        Market::Us => format!("${:.2}", price),
    }
}

fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
