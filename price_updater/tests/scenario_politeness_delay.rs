mod common;

use common::{FixedSource, TableProvider, chain, paced_config};
use price_common::{Identifier, Source};
use price_updater::orchestrator;
use std::rc::Rc;
use std::time::{Duration, Instant};

#[test]
fn scenario_delay_separates_every_resolution() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stock_prices.json");
    let delay = Duration::from_millis(20);

    // 035720 resolves nowhere; the pause before AAPL must still happen.
    let primary = TableProvider::new(Source::Primary)
        .with("005930", 71000.0, "2024-05-01T09:05:00+09:00")
        .with("AAPL", 151.2, "2024-05-01T10:00:00-04:00");
    let called_at = Rc::clone(&primary.called_at);
    let chain = chain(vec![primary, TableProvider::new(Source::Secondary)]);
    let source = FixedSource::of(&[
        Identifier::korea("005930").unwrap(),
        Identifier::korea("035720").unwrap(),
        Identifier::us("AAPL").unwrap(),
    ]);

    let started = Instant::now();
    let summary = orchestrator::run(&paced_config(&path, delay), &source, &chain).unwrap();
    assert!(started.elapsed() >= delay * 2);

    assert_eq!(summary.updated(), 2);
    assert_eq!(summary.korea.not_found, 1);

    let calls = called_at.borrow();
    assert_eq!(calls.len(), 3);
    assert!(calls[1].duration_since(calls[0]) >= delay);
    assert!(calls[2].duration_since(calls[1]) >= delay);
}

#[test]
fn scenario_single_identifier_is_not_delayed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stock_prices.json");
    let delay = Duration::from_secs(5);

    let chain = chain(vec![
        TableProvider::new(Source::Primary).with("005930", 71000.0, "2024-05-01T09:05:00+09:00"),
    ]);
    let source = FixedSource::of(&[Identifier::korea("005930").unwrap()]);

    let started = Instant::now();
    orchestrator::run(&paced_config(&path, delay), &source, &chain).unwrap();
    assert!(started.elapsed() < delay);
}
