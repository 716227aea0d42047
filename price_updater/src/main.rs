//! Price updater: refreshes the stored last-known prices.
//!
//! A run reads the Korea codes and US tickers listed in the account
//! spreadsheet, asks the provider chain for a quote for each of them (scraped
//! quote pages first, chart API second), lets the reconciliation rules decide
//! whether each quote replaces the stored price, and writes the store back once.
//!
//! Usage example (CLI):
//! ```bash
//! price_updater --store ./stock_prices.json --sheet-file ./holdings.csv
//! ```
//!
//! Logging follows `RUST_LOG` (default `info`). The process exits non-zero only
//! when the store cannot be loaded or saved; unreachable providers or an
//! unreachable spreadsheet are logged and skipped.
#![warn(missing_docs)]
use clap::Parser;
use log::{error, info};
use price_updater::ProviderChain;
use price_updater::args::Args;
use price_updater::http::build_client;
use price_updater::orchestrator;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logger();
    let args = Args::parse();
    let config = args.run_config();

    let client = build_client(args.timeout())?;
    let chain = ProviderChain::standard(client.clone())?;
    let source = args.identifier_source(client);

    info!(
        "Refreshing prices in {} (delay {:?}, timeout {:?}, providers {:?})",
        config.store_path.display(),
        config.delay,
        args.timeout(),
        chain.order()
    );

    match orchestrator::run(&config, source.as_ref(), &chain) {
        Ok(summary) => {
            info!("Done: {}", summary);
            Ok(())
        }
        Err(e) => {
            error!("Run failed, previous store left in place: {}", e);
            Err(e.into())
        }
    }
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
