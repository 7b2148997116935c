use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw quote as delivered by a feed, before normalization.
///
/// `price` is NaN when the upstream value was missing or not a number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuoteEvent {
    pub price: f64,
    pub volume: Option<u64>,
}

impl QuoteEvent {
    pub fn new(price: f64, volume: Option<u64>) -> Self {
        Self { price, volume }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub datetime: DateTime<Utc>,
    pub price: f64,
    pub volume: u64,
}

impl Tick {
    pub fn is_valid(&self) -> bool {
        self.price.is_finite() && self.price > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub datetime: DateTime<Utc>,
    pub open_price: f64,
    pub high_price: f64,
    pub low_price: f64,
    pub close_price: f64,
    pub volume: u64,
}

impl Bar {
    pub fn from_tick(tick: &Tick) -> Self {
        Self {
            datetime: tick.datetime,
            open_price: tick.price,
            high_price: tick.price,
            low_price: tick.price,
            close_price: tick.price,
            volume: tick.volume,
        }
    }

    /// Returns a copy of this bar with `tick` folded in. The open and the
    /// bucket timestamp are kept.
    pub fn merge_tick(&self, tick: &Tick) -> Self {
        Self {
            datetime: self.datetime,
            open_price: self.open_price,
            high_price: self.high_price.max(tick.price),
            low_price: self.low_price.min(tick.price),
            close_price: tick.price,
            volume: self.volume.saturating_add(tick.volume),
        }
    }

    pub fn body(&self) -> f64 {
        (self.close_price - self.open_price).abs()
    }

    pub fn total_range(&self) -> f64 {
        self.high_price - self.low_price
    }

    pub fn is_consistent(&self) -> bool {
        self.low_price <= self.open_price.min(self.close_price)
            && self.open_price.max(self.close_price) <= self.high_price
    }
}

/// Floors `datetime` to the start of its `interval_secs` bucket.
pub fn bucket_start(datetime: DateTime<Utc>, interval_secs: u64) -> DateTime<Utc> {
    let interval = interval_secs.max(1) as i64;
    let secs = datetime.timestamp();
    let floored = secs - secs.rem_euclid(interval);
    DateTime::<Utc>::from_timestamp(floored, 0).unwrap_or(datetime)
}
