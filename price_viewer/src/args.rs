//! Command-line arguments for the price viewer.
//!
//! This module defines the CLI interface using `clap`. See `main` for end-to-end usage.
use clap::Parser;
use price_common::Market;
use price_common::net;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about = "Print the stored last-known prices", long_about = None)]
pub struct Args {
    /// Path of the JSON price store.
    #[clap(long, default_value = net::DEFAULT_STORE_PATH)]
    pub store: String,

    /// Only show entries of this market.
    #[clap(long, value_enum)]
    pub market: Option<Market>,

    /// Path to a text file with the codes to show.
    /// Codes may be separated by commas, spaces, or new lines.
    #[clap(long)]
    pub codes: Option<String>,
}
