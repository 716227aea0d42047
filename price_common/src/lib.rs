//!
//! Common types and utilities shared by the price updater and viewer.
//!
//! This crate aggregates:
//! - `error` — unified error type `PriceError` used across the workspace.
//! - `result` — handy `Result<T, PriceError>` alias.
//! - `identifier` — markets, market-tagged identifiers and identifier sets.
//! - `quote` — provider quotes, stored entries and price formatting.
//! - `reconcile` — the accept/reject decision for an incoming quote.
//! - `store` — the persisted price map and its JSON document.
//! - `net` — upstream endpoints and run defaults.
#![warn(missing_docs)]
pub mod error;
pub mod identifier;
pub mod net;
pub mod quote;
pub mod reconcile;
pub mod result;
pub mod store;

pub use error::PriceError;
pub use identifier::{Identifier, IdentifierSet, Market};
pub use quote::{Quote, Source, StoredEntry};
pub use reconcile::{Decision, decide};
pub use result::Result;
pub use store::PriceStore;
