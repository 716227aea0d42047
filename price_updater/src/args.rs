//! Command-line arguments for the price updater.
//!
//! This module defines the CLI interface using `clap`. See `main` for end-to-end usage.
use clap::Parser;
use price_common::net;
use reqwest::blocking::Client;
use std::path::PathBuf;
use std::time::Duration;

use crate::orchestrator::RunConfig;
use crate::sheet::{ColumnLayout, CsvFileSource, IdentifierSource, SheetSource};

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about = "Refresh the stored last-known prices", long_about = None)]
pub struct Args {
    /// Path of the JSON price store to refresh (created if missing).
    #[clap(long, default_value = net::DEFAULT_STORE_PATH)]
    pub store: PathBuf,

    /// Google Sheets spreadsheet id holding the account/code columns.
    #[clap(long, default_value = net::DEFAULT_SHEET_ID)]
    pub sheet_id: String,

    /// Worksheet id inside the spreadsheet.
    #[clap(long, default_value = net::DEFAULT_SHEET_GID)]
    pub gid: String,

    /// Read identifiers from a local CSV file instead of the spreadsheet.
    #[clap(long)]
    pub sheet_file: Option<PathBuf>,

    /// Zero-based index of the account (market) column.
    #[clap(long, default_value_t = net::DEFAULT_ACCOUNT_COLUMN)]
    pub account_column: usize,

    /// Zero-based index of the code column.
    #[clap(long, default_value_t = net::DEFAULT_CODE_COLUMN)]
    pub code_column: usize,

    /// Pause between two identifiers, in milliseconds.
    #[clap(long, default_value_t = net::DEFAULT_POLITENESS_DELAY.as_millis() as u64)]
    pub delay_ms: u64,

    /// Timeout of a single HTTP request, in seconds.
    #[clap(long, default_value_t = net::DEFAULT_REQUEST_TIMEOUT.as_secs())]
    pub timeout_secs: u64,
}

impl Args {
    /// Settings of the run described by these arguments.
    pub fn run_config(&self) -> RunConfig {
        RunConfig {
            store_path: self.store.clone(),
            delay: Duration::from_millis(self.delay_ms),
        }
    }

    /// Request timeout for the HTTP client.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Identifier source selected by `--sheet-file` / `--sheet-id`.
    pub fn identifier_source(&self, client: Client) -> Box<dyn IdentifierSource> {
        let layout = ColumnLayout {
            account: self.account_column,
            code: self.code_column,
        };
        match &self.sheet_file {
            Some(path) => Box::new(CsvFileSource::new(path.clone(), layout)),
            None => Box::new(SheetSource::new(client, &self.sheet_id, &self.gid, layout)),
        }
    }
}
