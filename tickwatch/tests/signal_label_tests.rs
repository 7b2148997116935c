use tickwatch::{Extreme, Signal, Trend};

#[test]
fn signal_serializes_for_alert_records() {
    let signal = Signal {
        trend: Trend::Bullish,
        extreme: Some(Extreme::Breakdown),
    };
    let json = serde_json::to_string(&signal).expect("serialize");
    assert_eq!(json, r#"{"trend":"Bullish","extreme":"Breakdown"}"#);

    let back: Signal = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, signal);
    assert_eq!(back.label(), "Bullish Trend | Breakdown");
}

#[test]
fn labels_differ_when_either_half_changes() {
    let a = Signal {
        trend: Trend::Bullish,
        extreme: Some(Extreme::Breakout),
    };
    let b = Signal {
        trend: Trend::Bearish,
        extreme: Some(Extreme::Breakout),
    };
    let c = Signal {
        trend: Trend::Bullish,
        extreme: None,
    };
    assert_ne!(a.label(), b.label());
    assert_ne!(a.label(), c.label());
}
