//! Per-run counters, split by market.
use price_common::Market;
use std::fmt;

/// What happened to one identifier during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A quote was accepted and overwrote the stored entry.
    Updated,
    /// A quote was fetched but the stored entry was kept.
    Rejected,
    /// No provider had a quote; the stored entry was left untouched.
    NotFound,
}

/// Counters of one market.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarketTally {
    /// Entries overwritten.
    pub updated: usize,
    /// Quotes fetched but rejected by reconciliation.
    pub rejected: usize,
    /// Identifiers no provider could resolve.
    pub not_found: usize,
}

impl MarketTally {
    /// Identifiers whose stored entry did not change.
    pub fn skipped(&self) -> usize {
        self.rejected + self.not_found
    }

    /// Identifiers processed.
    pub fn total(&self) -> usize {
        self.updated + self.skipped()
    }
}

/// Counters of a whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Korea identifiers.
    pub korea: MarketTally,
    /// US identifiers.
    pub us: MarketTally,
}

impl RunSummary {
    /// Count one identifier's outcome.
    pub fn record(&mut self, market: Market, outcome: Outcome) {
        let tally = self.tally_mut(market);
        match outcome {
            Outcome::Updated => tally.updated += 1,
            Outcome::Rejected => tally.rejected += 1,
            Outcome::NotFound => tally.not_found += 1,
        }
    }

    /// Counters of `market`.
    pub fn tally(&self, market: Market) -> MarketTally {
        match market {
            Market::Korea => self.korea,
            Market::Us => self.us,
        }
    }

    fn tally_mut(&mut self, market: Market) -> &mut MarketTally {
        match market {
            Market::Korea => &mut self.korea,
            Market::Us => &mut self.us,
        }
    }

    /// Entries overwritten across both markets.
    pub fn updated(&self) -> usize {
        self.korea.updated + self.us.updated
    }

    /// Unchanged entries across both markets.
    pub fn skipped(&self) -> usize {
        self.korea.skipped() + self.us.skipped()
    }

    /// Identifiers processed across both markets.
    pub fn total(&self) -> usize {
        self.korea.total() + self.us.total()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "updated {} / skipped {} / total {}",
            self.updated(),
            self.skipped(),
            self.total()
        )?;
        for market in [Market::Korea, Market::Us] {
            let tally = self.tally(market);
            writeln!(
                f,
                "  {}: updated {}, skipped {} (rejected {}, not found {}), total {}",
                market,
                tally.updated,
                tally.skipped(),
                tally.rejected,
                tally.not_found,
                tally.total()
            )?;
        }
        Ok(())
    }
}
