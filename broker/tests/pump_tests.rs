use broker::{MockAdapter, MockConfig, QuoteAdapter, pump_quotes};
use market::Feed;

#[test]
fn pump_counts_rejected_quotes_without_advancing_sequence() {
    let feed = Feed::new("NIFTY 50");
    let mut adapter = MockAdapter::with_script("NSE_INDEX_NIFTY", vec![100.0, f64::NAN, -1.0, 0.0, 101.0]);
    adapter.connect().expect("connect");

    let stats = pump_quotes(&feed, &mut adapter, 16).expect("pump");
    assert_eq!(stats.polled, 5);
    assert_eq!(stats.accepted, 2);
    assert_eq!(stats.rejected, 3);

    let snapshot = feed.snapshot();
    assert_eq!(snapshot.sequence, 2);
    let closes = snapshot.bars.iter().map(|b| b.close_price).collect::<Vec<_>>();
    assert_eq!(closes, vec![100.0, 101.0]);
    assert_eq!(feed.metrics().rejected, 3);
}

#[test]
fn pump_stops_at_max_and_resumes() {
    let feed = Feed::new("NIFTY 50");
    let mut adapter = MockAdapter::new(
        "NSE_INDEX_NIFTY",
        MockConfig {
            interval_ms: 0,
            ..MockConfig::default()
        },
    );
    adapter.connect().expect("connect");

    let first = pump_quotes(&feed, &mut adapter, 3).expect("pump");
    assert_eq!(first.polled, 3);
    let second = pump_quotes(&feed, &mut adapter, 4).expect("pump");
    assert_eq!(second.accepted, 4);
    assert_eq!(feed.sequence(), 7);
}

#[test]
fn pump_surfaces_adapter_errors() {
    let feed = Feed::new("NIFTY 50");
    let mut adapter = MockAdapter::with_script("X", vec![1.0]);
    assert!(pump_quotes(&feed, &mut adapter, 1).is_err());
    assert_eq!(feed.sequence(), 0);
}
