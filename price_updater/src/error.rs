//! Errors raised while talking to upstream services.
//!
//! None of these abort a run: a failing provider is treated as "not found" by
//! the provider chain, and a failing identifier source degrades to an empty set.
use std::io;

use price_common::PriceError;
use thiserror::Error;

/// Failure of one upstream fetch (quote provider or identifier sheet).
#[derive(Error, Debug)]
pub enum FetchError {
    /// Transport failure, including timeouts and body decoding.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The upstream answered with a non-success status.
    #[error("HTTP status {status} from {url}")]
    Status {
        /// Response status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// The upstream reported an application-level error.
    #[error("Upstream error {code}: {description}")]
    Upstream {
        /// Upstream error code.
        code: String,
        /// Upstream error text.
        description: String,
    },

    /// The response body did not have the expected shape.
    #[error("Parse error: {0}")]
    Parse(String),

    /// An HTML probe pattern failed to compile.
    #[error("Invalid probe pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Local identifier sheet could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Identifier sheet is not valid CSV.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Fetched values did not form a valid quote.
    #[error("Invalid quote: {0}")]
    Quote(#[from] PriceError),
}
