//! Secondary provider: previous close from the Yahoo Finance chart API.
//!
//! The chart for the last five sessions is requested and the second-to-last
//! close is taken as the previous close. Korea codes are tried on KOSPI
//! (`.KS`) first and KOSDAQ (`.KQ`) second.
//!
//! The chart carries no observation instant for that figure, so the quote is
//! stamped with today's date at the market's close hour. That stamp is
//! synthetic; the reconciliation rules never let it override a same-day live
//! observation.

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};
use log::debug;
use price_common::net;
use price_common::{Identifier, Market, Quote, Source};
use reqwest::blocking::Client;
use serde::Deserialize;

use super::{QuoteProvider, market_now};
use crate::error::FetchError;
use crate::http;

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteIndicator>,
}

#[derive(Debug, Deserialize)]
struct QuoteIndicator {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    #[serde(default)]
    description: Option<String>,
}

/// Yahoo symbols to try for an identifier, in order.
pub fn chart_symbols(identifier: &Identifier) -> Vec<String> {
    match identifier.market() {
        Market::Korea => vec![
            format!("{}.KS", identifier.code()),
            format!("{}.KQ", identifier.code()),
        ],
        Market::Us => vec![identifier.code().to_string()],
    }
}

/// Local close time `(hour, minute)` the synthetic stamp is set to.
pub fn close_hour(market: Market) -> (u32, u32) {
    match market {
        Market::Korea => (15, 30),
        Market::Us => (16, 0),
    }
}

/// Synthetic observation stamp: `day` at the market's close hour, local time.
pub fn synthetic_stamp(market: Market, day: NaiveDate) -> Result<DateTime<FixedOffset>, FetchError> {
    let (hour, minute) = close_hour(market);
    let local = day
        .and_hms_opt(hour, minute, 0)
        .ok_or_else(|| FetchError::Parse(format!("invalid close time {}:{}", hour, minute)))?;
    let stamped = market
        .timezone()
        .from_local_datetime(&local)
        .earliest()
        .ok_or_else(|| FetchError::Parse(format!("{} does not exist in {}", local, market)))?;
    Ok(stamped.fixed_offset())
}

/// Extract the previous close from a chart response body.
///
/// `Ok(None)` when the symbol is unknown or fewer than two closes are present.
pub fn previous_close(body: &str) -> Result<Option<f64>, FetchError> {
    let response: ChartResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Parse(e.to_string()))?;

    if let Some(error) = response.chart.error {
        if error.code.eq_ignore_ascii_case("Not Found") {
            return Ok(None);
        }
        return Err(FetchError::Upstream {
            code: error.code,
            description: error.description.unwrap_or_default(),
        });
    }

    let closes: Vec<f64> = response
        .chart
        .result
        .into_iter()
        .flatten()
        .next()
        .and_then(|result| result.indicators.quote.into_iter().next())
        .map(|quote| quote.close.into_iter().flatten().collect())
        .unwrap_or_default();

    if closes.len() < 2 {
        debug!("Chart has {} closes, need two", closes.len());
        return Ok(None);
    }
    Ok(Some(closes[closes.len() - 2]))
}

/// Reads previous closes from the Yahoo Finance chart API.
pub struct ChartProvider {
    client: Client,
}

impl ChartProvider {
    /// Build the provider.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn fetch_symbol(&self, symbol: &str) -> Result<Option<f64>, FetchError> {
        let url = format!("{}/{}?range=5d&interval=1d", net::YAHOO_CHART_URL, symbol);
        match http::get_text(&self.client, &url)? {
            Some(body) => previous_close(&body),
            None => Ok(None),
        }
    }
}

impl QuoteProvider for ChartProvider {
    fn name(&self) -> &'static str {
        "yahoo-chart"
    }

    fn source(&self) -> Source {
        Source::Secondary
    }

    fn fetch(&self, identifier: &Identifier) -> Result<Option<Quote>, FetchError> {
        let market = identifier.market();
        let symbols = chart_symbols(identifier);
        let mut last_error = None;

        for symbol in &symbols {
            match self.fetch_symbol(symbol) {
                Ok(Some(price)) => {
                    let stamp = synthetic_stamp(market, market_now(market).date_naive())?;
                    let quote = Quote::new(identifier.clone(), price, Source::Secondary, stamp)?;
                    return Ok(Some(quote));
                }
                Ok(None) => debug!("No chart data for {}", symbol),
                Err(e) => {
                    debug!("Chart fetch for {} failed: {}", symbol, e);
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) => Err(e),
            None => Ok(None),
        }
    }
}
