//! Ordered provider fallback for one identifier.
use log::{debug, warn};
use price_common::{Identifier, Quote, Source};
use reqwest::blocking::Client;

use crate::error::FetchError;
use crate::providers::{ChartProvider, QuoteProvider, ScrapeProvider};

/// Result of resolving one identifier through the chain.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// First quote any provider produced.
    Found(Quote),
    /// Every provider missed or failed.
    NotFound,
}

/// Providers tried in priority order until one yields a quote.
///
/// Primary providers always run before secondary ones. Quotes are never merged:
/// the first one wins. A failing provider is logged and skipped, it never
/// aborts the resolution.
pub struct ProviderChain {
    providers: Vec<Box<dyn QuoteProvider>>,
}

impl ProviderChain {
    /// Chain over `providers`, reordered so that primary sources come first.
    pub fn new(mut providers: Vec<Box<dyn QuoteProvider>>) -> Self {
        providers.sort_by_key(|provider| provider.source() == Source::Secondary);
        Self { providers }
    }

    /// Scraped pages first, chart API second.
    pub fn standard(client: Client) -> Result<Self, FetchError> {
        Ok(Self::new(vec![
            Box::new(ScrapeProvider::new(client.clone())?),
            Box::new(ChartProvider::new(client)),
        ]))
    }

    /// Source tags of the providers, in the order they are tried.
    pub fn order(&self) -> Vec<Source> {
        self.providers.iter().map(|provider| provider.source()).collect()
    }

    /// Try each provider in turn and return the first quote.
    pub fn resolve(&self, identifier: &Identifier) -> Resolution {
        for provider in &self.providers {
            match provider.fetch(identifier) {
                Ok(Some(quote)) => {
                    debug!("{} resolved {}", provider.name(), identifier);
                    return Resolution::Found(quote);
                }
                Ok(None) => debug!("{} has no quote for {}", provider.name(), identifier),
                Err(e) => warn!("{} failed for {}: {}", provider.name(), identifier, e),
            }
        }
        Resolution::NotFound
    }
}
