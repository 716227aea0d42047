//! Price updater library.
//!
//! Refreshes the persisted last-known price of every identifier listed in the
//! account spreadsheet:
//! - `sheet`: identifier source (spreadsheet CSV export or local CSV file).
//! - `providers`: primary (scraped pages) and secondary (chart API) quote providers.
//! - `chain`: ordered provider fallback for one identifier.
//! - `orchestrator`: the sequential run: resolve, reconcile, persist, summarize.
//! - `summary`: per-market run counters.
//! - `args`: command-line interface of the `price_updater` binary.
#![warn(missing_docs)]
pub mod args;
pub mod chain;
pub mod error;
pub mod http;
pub mod orchestrator;
pub mod providers;
pub mod sheet;
pub mod summary;

pub use chain::{ProviderChain, Resolution};
pub use error::FetchError;
pub use orchestrator::{RunConfig, refresh, run};
pub use summary::{MarketTally, Outcome, RunSummary};
