//! Primary provider: live prices scraped from quote pages.
//!
//! Pages are probed with a short, ordered list of patterns; the first one that
//! yields a number wins. Korea codes are read from the Naver Finance item page.
//! US tickers are read from Google Finance, which needs the listing exchange in
//! the URL, so the exchanges in [`US_EXCHANGES`] are tried in turn.
//!
//! A scraped price is a live observation: it is stamped with the fetch instant
//! in the market's timezone.

use log::debug;
use price_common::net;
use price_common::{Identifier, Market, Quote, Source};
use regex::Regex;
use reqwest::blocking::Client;

use super::{QuoteProvider, market_now, parse_price_text};
use crate::error::FetchError;
use crate::http;

/// Exchanges probed, in order, for a US ticker.
pub const US_EXCHANGES: [&str; 3] = ["NASDAQ", "NYSE", "NYSEARCA"];

/// A named pattern whose first capture group holds the displayed price.
#[derive(Debug, Clone)]
pub struct HtmlProbe {
    name: &'static str,
    pattern: Regex,
}

impl HtmlProbe {
    /// Compile a probe.
    pub fn new(name: &'static str, pattern: &str) -> Result<Self, FetchError> {
        Ok(Self {
            name,
            pattern: Regex::new(pattern)?,
        })
    }

    fn find(&self, html: &str) -> Option<f64> {
        let captures = self.pattern.captures(html)?;
        parse_price_text(captures.get(1)?.as_str())
    }
}

/// Run `probes` in order over `html`; returns the first price found.
pub fn probe_price(probes: &[HtmlProbe], html: &str) -> Option<f64> {
    probes.iter().find_map(|probe| {
        let price = probe.find(html)?;
        debug!("Probe {} matched {}", probe.name, price);
        Some(price)
    })
}

/// Probes for the Naver Finance item page.
pub fn naver_probes() -> Result<Vec<HtmlProbe>, FetchError> {
    Ok(vec![
        HtmlProbe::new(
            "no_today",
            r#"(?s)<p class="no_today">.*?<span class="blind">([0-9,\.]+)</span>"#,
        )?,
        HtmlProbe::new("blind_summary", r#"<dd>현재가\s*([0-9,\.]+)"#)?,
    ])
}

/// Probes for the Google Finance quote page.
pub fn google_probes() -> Result<Vec<HtmlProbe>, FetchError> {
    Ok(vec![
        HtmlProbe::new("price_div", r#"<div class="YMlKec fxKbKc">([^<]+)</div>"#)?,
        HtmlProbe::new("data_last_price", r#"data-last-price="([0-9\.]+)""#)?,
    ])
}

/// Scrapes live prices from Naver Finance (Korea) and Google Finance (US).
pub struct ScrapeProvider {
    client: Client,
    naver: Vec<HtmlProbe>,
    google: Vec<HtmlProbe>,
}

impl ScrapeProvider {
    /// Build the provider with its compiled probes.
    pub fn new(client: Client) -> Result<Self, FetchError> {
        Ok(Self {
            client,
            naver: naver_probes()?,
            google: google_probes()?,
        })
    }

    fn fetch_korea(&self, code: &str) -> Result<Option<f64>, FetchError> {
        let url = format!("{}?code={}", net::NAVER_ITEM_URL, code);
        Ok(http::get_text(&self.client, &url)?.and_then(|html| probe_price(&self.naver, &html)))
    }

    fn fetch_us(&self, ticker: &str) -> Result<Option<f64>, FetchError> {
        for exchange in US_EXCHANGES {
            let url = format!("{}/{}:{}", net::GOOGLE_QUOTE_URL, ticker, exchange);
            if let Some(price) =
                http::get_text(&self.client, &url)?.and_then(|html| probe_price(&self.google, &html))
            {
                return Ok(Some(price));
            }
            debug!("{} not listed on {}", ticker, exchange);
        }
        Ok(None)
    }
}

impl QuoteProvider for ScrapeProvider {
    fn name(&self) -> &'static str {
        "naver/google"
    }

    fn source(&self) -> Source {
        Source::Primary
    }

    fn fetch(&self, identifier: &Identifier) -> Result<Option<Quote>, FetchError> {
        let market = identifier.market();
        let price = match market {
            Market::Korea => self.fetch_korea(identifier.code())?,
            Market::Us => self.fetch_us(identifier.code())?,
        };
        let Some(price) = price else {
            return Ok(None);
        };
        let quote = Quote::new(identifier.clone(), price, Source::Primary, market_now(market))?;
        Ok(Some(quote))
    }
}
