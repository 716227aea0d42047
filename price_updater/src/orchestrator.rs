//! One refresh run: load the store, resolve every identifier, reconcile,
//! persist once, report.
//!
//! Identifiers are processed sequentially, Korea before US, in code order
//! within a market. A politeness delay separates consecutive resolutions,
//! whatever their outcome. The store is written once, after every identifier
//! has been processed; a failed write fails the run.

use chrono::Local;
use log::{info, warn};
use price_common::reconcile::{Decision, decide_with_rule};
use price_common::{Identifier, IdentifierSet, PriceError, PriceStore};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use crate::chain::{ProviderChain, Resolution};
use crate::sheet::{IdentifierSource, collect_identifiers};
use crate::summary::{Outcome, RunSummary};

/// Settings of one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Location of the persisted store.
    pub store_path: PathBuf,
    /// Minimum pause between two identifier resolutions.
    pub delay: Duration,
}

/// Resolve and reconcile a single identifier against `store`.
pub fn process(store: &mut PriceStore, identifier: &Identifier, chain: &ProviderChain) -> Outcome {
    let quote = match chain.resolve(identifier) {
        Resolution::Found(quote) => quote,
        Resolution::NotFound => {
            warn!("{}: not found, stored entry left untouched", identifier);
            return Outcome::NotFound;
        }
    };

    let (decision, rule) = decide_with_rule(store.get(identifier), &quote);
    match decision {
        Decision::Accept => {
            info!(
                "{}: updated to {} ({}, {})",
                identifier,
                quote.display_price(),
                quote.source(),
                rule
            );
            store.apply(quote);
            Outcome::Updated
        }
        Decision::Reject => {
            info!(
                "{}: kept stored entry, fetched {} from {} ({})",
                identifier,
                quote.display_price(),
                quote.source(),
                rule
            );
            Outcome::Rejected
        }
    }
}

/// Process every identifier of `identifiers` against `store`.
///
/// Takes the store by value and hands it back updated together with the run
/// counters; nothing is persisted here.
pub fn refresh(
    mut store: PriceStore,
    identifiers: &IdentifierSet,
    chain: &ProviderChain,
    delay: Duration,
) -> (PriceStore, RunSummary) {
    let mut summary = RunSummary::default();

    for (index, identifier) in identifiers.iter().enumerate() {
        if index > 0 && !delay.is_zero() {
            thread::sleep(delay);
        }
        let outcome = process(&mut store, identifier, chain);
        summary.record(identifier.market(), outcome);
    }
    (store, summary)
}

/// Full run: load, refresh, stamp, persist.
///
/// Only loading or persisting the store can fail the run.
pub fn run(
    config: &RunConfig,
    source: &dyn IdentifierSource,
    chain: &ProviderChain,
) -> Result<RunSummary, PriceError> {
    let store = PriceStore::load(&config.store_path)?;
    let identifiers = collect_identifiers(source);
    if identifiers.is_empty() {
        warn!("No identifiers to refresh; the store is saved unchanged");
    }

    let (mut store, summary) = refresh(store, &identifiers, chain, config.delay);
    store.stamp(Local::now().fixed_offset());
    store.save(&config.store_path)?;

    info!(
        "Saved {} prices to {}",
        store.len(),
        config.store_path.display()
    );
    Ok(summary)
}
