//! Price reconciliation: decides whether a freshly fetched quote replaces the
//! stored one.
//!
//! The decision is evaluated in this order:
//!
//! 1. nothing stored, or the stored entry has no usable timestamp: accept;
//! 2. calendar dates differ (taken in the incoming market's timezone): the
//!    later day wins, state never moves backward in time;
//! 3. same day: the [`SAME_DAY_RULES`] row for the (stored, incoming) source
//!    pair decides.
//!
//! Secondary timestamps are synthesized "previous close" stamps, so a same-day
//! secondary quote never overwrites a primary observation, and a primary
//! observation always upgrades a secondary one regardless of time of day.
//! Within one source the fresher observation wins; for the secondary source
//! that compares synthetic stamps and is only an approximation of freshness.
//!
//! `decide` is pure: no I/O, no clock, no hidden state.

use chrono::{DateTime, FixedOffset};
use std::cmp::Ordering;
use std::fmt;

use crate::quote::{Quote, Source, StoredEntry};

/// Outcome of reconciling one incoming quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Overwrite the stored entry with the incoming quote.
    Accept,
    /// Keep the stored entry.
    Reject,
}

/// The rule that produced a [`Decision`]; reported in logs.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    FirstObservation,
    MissingStoredTimestamp,
    NewerDay,
    OlderDay,
    PrimaryHoldsAgainstSecondary,
    FresherPrimary,
    PrimaryUpgradesSecondary,
    FresherSecondary,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Rule::FirstObservation => "first observation",
            Rule::MissingStoredTimestamp => "stored timestamp missing",
            Rule::NewerDay => "newer day",
            Rule::OlderDay => "older day",
            Rule::PrimaryHoldsAgainstSecondary => "same-day primary holds against secondary",
            Rule::FresherPrimary => "same-day primary freshness",
            Rule::PrimaryUpgradesSecondary => "same-day primary upgrades secondary",
            Rule::FresherSecondary => "same-day secondary freshness",
        };
        f.write_str(text)
    }
}

/// What a same-day row does with the incoming quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameDayPolicy {
    /// Accept whatever the timestamps say.
    Accept,
    /// Reject whatever the timestamps say.
    Reject,
    /// Accept only if the incoming observation is strictly later.
    AcceptIfFresher,
}

/// One row of the same-day decision table.
#[derive(Debug, Clone, Copy)]
pub struct SameDayRule {
    /// Source of the stored entry.
    pub stored: Source,
    /// Source of the incoming quote.
    pub incoming: Source,
    /// What happens to the incoming quote.
    pub policy: SameDayPolicy,
    /// Name reported when this row fires.
    pub rule: Rule,
}

/// Same-day decision table, one row per (stored, incoming) source pair.
pub const SAME_DAY_RULES: [SameDayRule; 4] = [
    SameDayRule {
        stored: Source::Primary,
        incoming: Source::Secondary,
        policy: SameDayPolicy::Reject,
        rule: Rule::PrimaryHoldsAgainstSecondary,
    },
    SameDayRule {
        stored: Source::Primary,
        incoming: Source::Primary,
        policy: SameDayPolicy::AcceptIfFresher,
        rule: Rule::FresherPrimary,
    },
    SameDayRule {
        stored: Source::Secondary,
        incoming: Source::Primary,
        policy: SameDayPolicy::Accept,
        rule: Rule::PrimaryUpgradesSecondary,
    },
    SameDayRule {
        stored: Source::Secondary,
        incoming: Source::Secondary,
        policy: SameDayPolicy::AcceptIfFresher,
        rule: Rule::FresherSecondary,
    },
];

impl SameDayRule {
    /// Row of [`SAME_DAY_RULES`] for a source pair.
    pub fn lookup(stored: Source, incoming: Source) -> &'static SameDayRule {
        let row = match (stored, incoming) {
            (Source::Primary, Source::Secondary) => 0,
            (Source::Primary, Source::Primary) => 1,
            (Source::Secondary, Source::Primary) => 2,
            (Source::Secondary, Source::Secondary) => 3,
        };
        &SAME_DAY_RULES[row]
    }

    fn apply(
        &self,
        stored_at: DateTime<FixedOffset>,
        incoming_at: DateTime<FixedOffset>,
    ) -> Decision {
        match self.policy {
            SameDayPolicy::Accept => Decision::Accept,
            SameDayPolicy::Reject => Decision::Reject,
            SameDayPolicy::AcceptIfFresher if incoming_at > stored_at => Decision::Accept,
            SameDayPolicy::AcceptIfFresher => Decision::Reject,
        }
    }
}

/// Decide whether `incoming` replaces `stored`.
pub fn decide(stored: Option<&StoredEntry>, incoming: &Quote) -> Decision {
    decide_with_rule(stored, incoming).0
}

/// Same as [`decide`], also reporting which rule fired.
pub fn decide_with_rule(stored: Option<&StoredEntry>, incoming: &Quote) -> (Decision, Rule) {
    let Some(stored) = stored else {
        return (Decision::Accept, Rule::FirstObservation);
    };
    let Some(stored_at) = stored.observed_at else {
        return (Decision::Accept, Rule::MissingStoredTimestamp);
    };
    let incoming_at = incoming.observed_at();

    let tz = incoming.identifier().market().timezone();
    let stored_day = stored_at.with_timezone(&tz).date_naive();
    let incoming_day = incoming_at.with_timezone(&tz).date_naive();

    match incoming_day.cmp(&stored_day) {
        Ordering::Greater => (Decision::Accept, Rule::NewerDay),
        Ordering::Less => (Decision::Reject, Rule::OlderDay),
        Ordering::Equal => {
            let row = SameDayRule::lookup(stored.source, incoming.source());
            (row.apply(stored_at, incoming_at), row.rule)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifier::Identifier;

    const SOURCES: [Source; 2] = [Source::Primary, Source::Secondary];

    fn at(ts: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(ts).unwrap()
    }

    fn kr_quote(price: f64, source: Source, ts: &str) -> Quote {
        Quote::new(Identifier::korea("005930").unwrap(), price, source, at(ts)).unwrap()
    }

    fn kr_stored(price: f64, source: Source, ts: Option<&str>) -> StoredEntry {
        StoredEntry {
            identifier: Identifier::korea("005930").unwrap(),
            price,
            source,
            observed_at: ts.map(at),
        }
    }

    /// Korea-local times spread over three days.
    const TIMES: [&str; 6] = [
        "2024-04-30T09:00:00+09:00",
        "2024-04-30T15:30:00+09:00",
        "2024-05-01T09:00:00+09:00",
        "2024-05-01T09:05:00+09:00",
        "2024-05-01T15:30:00+09:00",
        "2024-05-02T00:00:01+09:00",
    ];

    #[test]
    fn first_observation_always_accepted() {
        for source in SOURCES {
            for ts in TIMES {
                let incoming = kr_quote(71000.0, source, ts);
                assert_eq!(
                    decide_with_rule(None, &incoming),
                    (Decision::Accept, Rule::FirstObservation)
                );
            }
        }
    }

    #[test]
    fn missing_stored_timestamp_is_minimum() {
        for stored_source in SOURCES {
            for source in SOURCES {
                let stored = kr_stored(70000.0, stored_source, None);
                let incoming = kr_quote(71000.0, source, TIMES[0]);
                assert_eq!(
                    decide_with_rule(Some(&stored), &incoming),
                    (Decision::Accept, Rule::MissingStoredTimestamp)
                );
            }
        }
    }

    #[test]
    fn older_day_always_rejected() {
        for stored_source in SOURCES {
            for source in SOURCES {
                let stored = kr_stored(70000.0, stored_source, Some("2024-05-01T09:00:00+09:00"));
                let incoming = kr_quote(71000.0, source, "2024-04-30T15:30:00+09:00");
                assert_eq!(
                    decide_with_rule(Some(&stored), &incoming),
                    (Decision::Reject, Rule::OlderDay)
                );
            }
        }
    }

    #[test]
    fn newer_day_always_accepted() {
        for stored_source in SOURCES {
            for source in SOURCES {
                let stored = kr_stored(70000.0, stored_source, Some("2024-05-01T15:30:00+09:00"));
                let incoming = kr_quote(71000.0, source, "2024-05-02T00:00:01+09:00");
                assert_eq!(
                    decide_with_rule(Some(&stored), &incoming),
                    (Decision::Accept, Rule::NewerDay)
                );
            }
        }
    }

    #[test]
    fn same_day_primary_holds_against_secondary() {
        // Regardless of which of the two times is later.
        for (stored_ts, incoming_ts) in [
            ("2024-05-01T09:00:00+09:00", "2024-05-01T15:30:00+09:00"),
            ("2024-05-01T15:30:00+09:00", "2024-05-01T09:00:00+09:00"),
        ] {
            let stored = kr_stored(70000.0, Source::Primary, Some(stored_ts));
            let incoming = kr_quote(69500.0, Source::Secondary, incoming_ts);
            assert_eq!(decide(Some(&stored), &incoming), Decision::Reject);
        }
    }

    #[test]
    fn same_day_primary_upgrades_secondary() {
        for (stored_ts, incoming_ts) in [
            ("2024-05-01T09:00:00+09:00", "2024-05-01T15:30:00+09:00"),
            ("2024-05-01T15:30:00+09:00", "2024-05-01T09:00:00+09:00"),
        ] {
            let stored = kr_stored(70000.0, Source::Secondary, Some(stored_ts));
            let incoming = kr_quote(71000.0, Source::Primary, incoming_ts);
            assert_eq!(
                decide_with_rule(Some(&stored), &incoming),
                (Decision::Accept, Rule::PrimaryUpgradesSecondary)
            );
        }
    }

    #[test]
    fn same_day_same_source_prefers_strictly_fresher() {
        let same_day = &TIMES[2..5];
        for source in SOURCES {
            for &stored_ts in same_day {
                for &incoming_ts in same_day {
                    let stored = kr_stored(70000.0, source, Some(stored_ts));
                    let incoming = kr_quote(71000.0, source, incoming_ts);
                    let expected = if at(incoming_ts) > at(stored_ts) {
                        Decision::Accept
                    } else {
                        Decision::Reject
                    };
                    assert_eq!(decide(Some(&stored), &incoming), expected);
                }
            }
        }
    }

    #[test]
    fn decide_is_idempotent() {
        for stored_source in SOURCES {
            for source in SOURCES {
                for stored_ts in TIMES {
                    for incoming_ts in TIMES {
                        let stored = kr_stored(70000.0, stored_source, Some(stored_ts));
                        let incoming = kr_quote(71000.0, source, incoming_ts);
                        let first = decide_with_rule(Some(&stored), &incoming);
                        let second = decide_with_rule(Some(&stored), &incoming);
                        assert_eq!(first, second);
                    }
                }
            }
        }
    }

    #[test]
    fn dates_are_taken_in_market_timezone() {
        // 23:30 UTC on Apr 30 is already May 1 in Seoul.
        let stored = kr_stored(70000.0, Source::Primary, Some("2024-05-01T09:00:00+09:00"));
        let incoming = kr_quote(71000.0, Source::Secondary, "2024-04-30T23:30:00+00:00");
        assert_eq!(
            decide_with_rule(Some(&stored), &incoming),
            (Decision::Reject, Rule::PrimaryHoldsAgainstSecondary)
        );
    }

    #[test]
    fn non_positive_prices_are_not_validated() {
        let stored = kr_stored(70000.0, Source::Secondary, Some("2024-05-01T15:30:00+09:00"));
        let incoming = kr_quote(0.0, Source::Primary, "2024-05-01T09:00:00+09:00");
        assert_eq!(decide(Some(&stored), &incoming), Decision::Accept);
        let incoming = kr_quote(-5.0, Source::Primary, "2024-05-02T09:00:00+09:00");
        assert_eq!(decide(Some(&stored), &incoming), Decision::Accept);
    }

    #[test]
    fn table_rows_match_their_lookup() {
        for row in SAME_DAY_RULES.iter() {
            let found = SameDayRule::lookup(row.stored, row.incoming);
            assert_eq!(found.rule, row.rule);
            assert_eq!(found.policy, row.policy);
        }
    }
}
