//! Identifier source: the account/code spreadsheet.
//!
//! The sheet is read as CSV, either from the Google Sheets export of a
//! worksheet or from a local file. Only two columns matter, picked by
//! position: the account (market) column and the code column. Rows whose
//! account is `미국` (or `US`) are US tickers; every other account holds Korea
//! codes. Codes that break their market's rules are dropped.
//!
//! An unreachable or malformed sheet never fails a run: [`collect_identifiers`]
//! degrades it to an empty set.

use csv::ReaderBuilder;
use log::{debug, error, info, warn};
use price_common::net;
use price_common::{Identifier, IdentifierSet, Market};
use reqwest::blocking::Client;
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use crate::error::FetchError;
use crate::http;

/// Account labels that mark a US row.
const US_ACCOUNTS: [&str; 2] = ["미국", "US"];

/// Positions of the columns read from the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    /// Zero-based index of the account/market column.
    pub account: usize,
    /// Zero-based index of the code column.
    pub code: usize,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            account: net::DEFAULT_ACCOUNT_COLUMN,
            code: net::DEFAULT_CODE_COLUMN,
        }
    }
}

/// Something that can produce the identifiers of a run.
pub trait IdentifierSource {
    /// Short description used in logs.
    fn describe(&self) -> String;

    /// Read the identifier set, failing on transport or format problems.
    fn load(&self) -> Result<IdentifierSet, FetchError>;
}

/// Google Sheets worksheet exported as CSV over HTTP.
pub struct SheetSource {
    client: Client,
    url: String,
    layout: ColumnLayout,
}

impl SheetSource {
    /// Source for worksheet `gid` of spreadsheet `sheet_id`.
    pub fn new(client: Client, sheet_id: &str, gid: &str, layout: ColumnLayout) -> Self {
        Self {
            client,
            url: net::sheet_csv_url(sheet_id, gid),
            layout,
        }
    }
}

impl IdentifierSource for SheetSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    fn load(&self) -> Result<IdentifierSet, FetchError> {
        match http::get_text(&self.client, &self.url)? {
            Some(body) => parse_identifier_table(body.as_bytes(), self.layout),
            None => Err(FetchError::Status {
                status: 404,
                url: self.url.clone(),
            }),
        }
    }
}

/// CSV file on disk with the same layout as the sheet export.
pub struct CsvFileSource {
    path: PathBuf,
    layout: ColumnLayout,
}

impl CsvFileSource {
    /// Source reading `path`.
    pub fn new(path: PathBuf, layout: ColumnLayout) -> Self {
        Self { path, layout }
    }
}

impl IdentifierSource for CsvFileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<IdentifierSet, FetchError> {
        let file = File::open(&self.path)?;
        parse_identifier_table(file, self.layout)
    }
}

/// Load identifiers from `source`, degrading any failure to an empty set.
pub fn collect_identifiers(source: &dyn IdentifierSource) -> IdentifierSet {
    match source.load() {
        Ok(set) => {
            info!(
                "Identifiers from {}: {} Korea, {} US",
                source.describe(),
                set.count(Market::Korea),
                set.count(Market::Us)
            );
            set
        }
        Err(e) => {
            error!(
                "Identifier source {} unavailable, continuing with no identifiers: {}",
                source.describe(),
                e
            );
            IdentifierSet::new()
        }
    }
}

/// Parse a CSV table (first row is a header) into an identifier set.
///
/// A header narrower than the requested columns yields an empty set. Rows that
/// are too short, blank in either column, or unreadable are skipped.
pub fn parse_identifier_table<R: Read>(
    reader: R,
    layout: ColumnLayout,
) -> Result<IdentifierSet, FetchError> {
    let mut table = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let width = table.headers()?.len();
    let needed = layout.account.max(layout.code) + 1;
    if width < needed {
        warn!(
            "Sheet has {} columns, need at least {}; no identifiers read",
            width, needed
        );
        return Ok(IdentifierSet::new());
    }

    let mut set = IdentifierSet::new();
    for (row, record) in table.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                debug!("Skipping unreadable sheet row {}: {}", row + 1, e);
                continue;
            }
        };
        let (Some(account), Some(code)) = (record.get(layout.account), record.get(layout.code))
        else {
            continue;
        };
        let (account, code) = (account.trim(), code.trim());
        if account.is_empty() || code.is_empty() {
            continue;
        }

        let market = if US_ACCOUNTS.iter().any(|us| us.eq_ignore_ascii_case(account)) {
            Market::Us
        } else {
            Market::Korea
        };
        match Identifier::new(market, code) {
            Ok(identifier) => {
                set.insert(identifier);
            }
            Err(e) => debug!("Skipping sheet row {}: {}", row + 1, e),
        }
    }
    Ok(set)
}
