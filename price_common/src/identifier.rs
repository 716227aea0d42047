//! Market-tagged security identifiers and helpers shared by the updater and the viewer.

use chrono_tz::Tz;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::io::BufRead;
use strum_macros::{Display, EnumString};

use crate::error::PriceError;

/// Length of a Korea exchange code (e.g. `005930`).
pub const KOREA_CODE_LEN: usize = 6;

/// Market a security is listed on.
///
/// Declaration order matters: identifiers sort Korea before US.
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    ValueEnum,
    Display,
    EnumString,
    Hash,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
)]
#[value(rename_all = "lower")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Market {
    /// KOSPI / KOSDAQ listings, six digit codes.
    Korea,
    /// US listings, alphabetic tickers.
    Us,
}

impl Market {
    /// Exchange-local timezone; calendar dates of quotes are taken here.
    pub fn timezone(self) -> Tz {
        match self {
            Market::Korea => chrono_tz::Asia::Seoul,
            Market::Us => chrono_tz::America::New_York,
        }
    }

    /// Number of decimal places a price is kept with.
    pub fn decimals(self) -> u32 {
        match self {
            Market::Korea => 0,
            Market::Us => 2,
        }
    }

    /// Round `price` to this market's precision.
    pub fn round_price(self, price: f64) -> f64 {
        let factor = 10f64.powi(self.decimals() as i32);
        (price * factor).round() / factor
    }
}

/// A market-tagged security code.
///
/// Built through [`Identifier::new`] (or the market shortcuts), which enforce the
/// per-market code rules. The store uses the bare code as its key, see
/// [`Identifier::from_key`].
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct Identifier {
    market: Market,
    code: String,
}

impl Identifier {
    /// Validate `code` against the rules of `market`.
    pub fn new(market: Market, code: &str) -> Result<Self, PriceError> {
        let code = code.trim();
        let valid = match market {
            Market::Korea => is_korea_code(code),
            Market::Us => !code.is_empty() && !is_all_digits(code),
        };
        if !valid {
            return Err(PriceError::InvalidIdentifier {
                market: market.to_string(),
                code: code.to_string(),
            });
        }
        Ok(Self {
            market,
            code: code.to_string(),
        })
    }

    /// Shortcut for a Korea-market identifier.
    pub fn korea(code: &str) -> Result<Self, PriceError> {
        Self::new(Market::Korea, code)
    }

    /// Shortcut for a US-market identifier.
    pub fn us(code: &str) -> Result<Self, PriceError> {
        Self::new(Market::Us, code)
    }

    /// Rebuild an identifier from a persisted store key.
    ///
    /// Numeric keys belong to Korea, everything else to the US. Keys are taken
    /// as they were written, without re-validation.
    pub fn from_key(key: &str) -> Self {
        let market = if is_all_digits(key) {
            Market::Korea
        } else {
            Market::Us
        };
        Self {
            market,
            code: key.to_string(),
        }
    }

    /// Market this identifier is listed on.
    pub fn market(&self) -> Market {
        self.market
    }

    /// Bare code, also the persisted store key.
    pub fn code(&self) -> &str {
        &self.code
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}

fn is_all_digits(code: &str) -> bool {
    !code.is_empty() && code.chars().all(|c| c.is_ascii_digit())
}

fn is_korea_code(code: &str) -> bool {
    code.len() == KOREA_CODE_LEN && is_all_digits(code)
}

/// Deduplicated identifiers split by market.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierSet {
    korea: BTreeSet<Identifier>,
    us: BTreeSet<Identifier>,
}

impl IdentifierSet {
    /// Empty set, also what an unavailable identifier source degrades to.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an identifier; returns `false` if it was already present.
    pub fn insert(&mut self, identifier: Identifier) -> bool {
        match identifier.market() {
            Market::Korea => self.korea.insert(identifier),
            Market::Us => self.us.insert(identifier),
        }
    }

    /// Korea identifiers in code order.
    pub fn korea(&self) -> impl Iterator<Item = &Identifier> {
        self.korea.iter()
    }

    /// US identifiers in code order.
    pub fn us(&self) -> impl Iterator<Item = &Identifier> {
        self.us.iter()
    }

    /// Processing order of a run: every Korea identifier, then every US one.
    pub fn iter(&self) -> impl Iterator<Item = &Identifier> {
        self.korea.iter().chain(self.us.iter())
    }

    /// Number of identifiers for `market`.
    pub fn count(&self, market: Market) -> usize {
        match market {
            Market::Korea => self.korea.len(),
            Market::Us => self.us.len(),
        }
    }

    /// Total number of identifiers.
    pub fn len(&self) -> usize {
        self.korea.len() + self.us.len()
    }

    /// `true` when neither market has identifiers.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<Identifier> for IdentifierSet {
    fn from_iter<I: IntoIterator<Item = Identifier>>(iter: I) -> Self {
        let mut set = IdentifierSet::new();
        for identifier in iter {
            set.insert(identifier);
        }
        set
    }
}

/// Trait providing file parsing for identifier lists.
pub trait IdentifierParser {
    /// Parses identifiers from a buffered reader.
    ///
    /// Codes may be separated by commas, spaces or new lines. Numeric codes are
    /// Korea codes and must be six digits; anything else is a US ticker.
    fn parse_from_file<R: BufRead>(reader: R) -> Result<IdentifierSet, PriceError>;
}

impl IdentifierParser for IdentifierSet {
    fn parse_from_file<R: BufRead>(reader: R) -> Result<IdentifierSet, PriceError> {
        let mut set = IdentifierSet::new();

        for line_result in reader.lines() {
            let line = line_result.map_err(PriceError::Io)?;
            for token in line.split(|c: char| c == ',' || c.is_whitespace()) {
                if token.is_empty() {
                    continue;
                }
                let market = if is_all_digits(token) {
                    Market::Korea
                } else {
                    Market::Us
                };
                set.insert(Identifier::new(market, token)?);
            }
        }
        Ok(set)
    }
}
