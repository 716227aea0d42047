//! Price Viewer: prints the last-known prices kept by `price_updater`.
//!
//! Usage example (CLI):
//! ```bash
//! price_viewer --store ./stock_prices.json --market korea
//! price_viewer --codes ./codes.txt
//! ```
//!
//! The codes file lists Korea codes and US tickers separated by commas, spaces,
//! or new lines. See `price_common::identifier` for details.
#![warn(missing_docs)]
mod args;
mod view;

use crate::args::Args;
use clap::Parser;
use log::{info, warn};
use price_common::identifier::IdentifierParser;
use price_common::{IdentifierSet, PriceError, PriceStore, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

fn main() -> Result<(), PriceError> {
    init_logger();
    let args = Args::parse();

    let store_path = cli_path(&args.store);
    if !store_path.is_file() {
        warn!("No price store at {}", store_path.display());
        return Ok(());
    }
    let store = PriceStore::load(&store_path)?;

    let codes = match &args.codes {
        Some(raw) => {
            let file = File::open(cli_path(raw))?;
            let codes = IdentifierSet::parse_from_file(BufReader::new(file))?;
            info!("Codes: {}", codes.len());
            Some(codes)
        }
        None => None,
    };

    match store.updated_at() {
        Some(ts) => info!("Store updated at {}", ts),
        None => info!("Store never refreshed"),
    }

    for entry in view::select(&store, args.market, codes.as_ref()) {
        println!("{}", view::render(entry));
    }
    if let Some(codes) = &codes {
        for code in view::missing(&store, codes) {
            warn!("{}: no stored price", code);
        }
    }
    Ok(())
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}

/// Path from a CLI argument, with one pair of surrounding quotes removed.
///
/// Windows shells may hand quoted paths through unchanged.
fn cli_path(raw: &str) -> PathBuf {
    let raw = raw.trim();
    let unquoted = ['"', '\'']
        .into_iter()
        .find_map(|quote| raw.strip_prefix(quote)?.strip_suffix(quote))
        .unwrap_or(raw);
    PathBuf::from(unquoted)
}
