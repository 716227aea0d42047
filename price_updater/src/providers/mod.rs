//! Quote providers.
//!
//! Each provider answers one question: what is the price of this identifier?
//! - `primary`: live price scraped from quote pages (Naver Finance for Korea,
//!   Google Finance for US tickers).
//! - `secondary`: previous close from the Yahoo Finance chart API, stamped at
//!   the market's close hour.
//!
//! `Ok(None)` is a clean miss; `Err(_)` is a provider failure. The provider
//! chain treats both as "not found here" and moves on.

pub mod primary;
pub mod secondary;

pub use primary::ScrapeProvider;
pub use secondary::ChartProvider;

use chrono::{DateTime, FixedOffset, Utc};
use price_common::{Identifier, Market, Quote, Source};

use crate::error::FetchError;

/// Upstream quote provider.
pub trait QuoteProvider {
    /// Name used in logs (e.g. `"naver/google"`).
    fn name(&self) -> &'static str;

    /// Source tag stamped on every quote of this provider.
    fn source(&self) -> Source;

    /// Fetch the current quote for `identifier`.
    fn fetch(&self, identifier: &Identifier) -> Result<Option<Quote>, FetchError>;
}

/// Current instant in the exchange timezone of `market`.
pub(crate) fn market_now(market: Market) -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&market.timezone()).fixed_offset()
}

/// Parse a displayed price such as `71,000`, `$151.20` or `₩ 950`.
pub(crate) fn parse_price_text(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|price| price.is_finite())
}
