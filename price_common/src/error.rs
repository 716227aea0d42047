//! Error types shared between the updater and the viewer.
//!
//! The `PriceError` enum unifies the failure cases of identifier validation,
//! document (de)serialization, CSV decoding and store persistence, allowing
//! both binaries to propagate a single error type.
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Unified error type shared by the price workspace.
#[derive(Error, Debug)]
pub enum PriceError {
    /// I/O error originating from the standard library (files, directories).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Generic formatting/validation error with a human-readable message.
    #[error("Format error: {0}")]
    Format(String),

    /// A code does not satisfy the rules of the market it was tagged with.
    #[error("Invalid {market} identifier: {code:?}")]
    InvalidIdentifier {
        /// Market the code was tagged with.
        market: String,
        /// Offending raw code.
        code: String,
    },

    /// Failure while encoding/decoding JSON via serde_json.
    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// Failure while reading the identifier sheet.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The store could not be written; the previous document stays in place.
    #[error("Failed to persist price store to {path}: {source}")]
    Persist {
        /// Destination of the store document.
        path: PathBuf,
        /// Underlying I/O failure.
        source: io::Error,
    },
}

