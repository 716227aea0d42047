#![allow(dead_code)]

use chrono::{DateTime, FixedOffset};
use price_common::{Identifier, IdentifierSet, Quote, Source};
use price_updater::error::FetchError;
use price_updater::providers::QuoteProvider;
use price_updater::sheet::IdentifierSource;
use price_updater::{ProviderChain, RunConfig};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;
use std::time::{Duration, Instant};

pub fn at(raw: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(raw).unwrap()
}

/// Provider answering from a fixed table; codes not in the table are misses.
pub struct TableProvider {
    source: Source,
    quotes: HashMap<String, (f64, DateTime<FixedOffset>)>,
    failing: bool,
    pub seen: Rc<RefCell<Vec<String>>>,
    pub called_at: Rc<RefCell<Vec<Instant>>>,
}

impl TableProvider {
    pub fn new(source: Source) -> Self {
        Self {
            source,
            quotes: HashMap::new(),
            failing: false,
            seen: Rc::new(RefCell::new(Vec::new())),
            called_at: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn failing(source: Source) -> Self {
        Self {
            failing: true,
            ..Self::new(source)
        }
    }

    pub fn with(mut self, code: &str, price: f64, observed_at: &str) -> Self {
        self.quotes.insert(code.to_string(), (price, at(observed_at)));
        self
    }
}

impl QuoteProvider for TableProvider {
    fn name(&self) -> &'static str {
        "table"
    }

    fn source(&self) -> Source {
        self.source
    }

    fn fetch(&self, identifier: &Identifier) -> Result<Option<Quote>, FetchError> {
        self.seen.borrow_mut().push(identifier.code().to_string());
        self.called_at.borrow_mut().push(Instant::now());
        if self.failing {
            return Err(FetchError::Status {
                status: 503,
                url: "http://quotes.invalid".to_string(),
            });
        }
        match self.quotes.get(identifier.code()) {
            Some(&(price, observed_at)) => Ok(Some(Quote::new(
                identifier.clone(),
                price,
                self.source,
                observed_at,
            )?)),
            None => Ok(None),
        }
    }
}

pub fn chain(providers: Vec<TableProvider>) -> ProviderChain {
    ProviderChain::new(
        providers
            .into_iter()
            .map(|provider| Box::new(provider) as Box<dyn QuoteProvider>)
            .collect(),
    )
}

/// Identifier source backed by an in-memory list.
pub struct FixedSource(pub IdentifierSet);

impl FixedSource {
    pub fn of(identifiers: &[Identifier]) -> Self {
        Self(identifiers.iter().cloned().collect())
    }
}

impl IdentifierSource for FixedSource {
    fn describe(&self) -> String {
        "fixed list".to_string()
    }

    fn load(&self) -> Result<IdentifierSet, FetchError> {
        Ok(self.0.clone())
    }
}

pub fn config(store_path: &Path) -> RunConfig {
    paced_config(store_path, Duration::ZERO)
}

pub fn paced_config(store_path: &Path, delay: Duration) -> RunConfig {
    RunConfig {
        store_path: store_path.to_path_buf(),
        delay,
    }
}
