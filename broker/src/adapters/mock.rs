use std::collections::VecDeque;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tickwatch::QuoteEvent;
use tracing::debug;

use crate::{BrokerError, QuoteAdapter};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MockConfig {
    pub start_price: f64,
    /// Largest relative move per quote (0.001 = 0.1%).
    pub step: f64,
    pub seed: u64,
    /// Minimum spacing between emitted quotes; 0 emits on every poll.
    pub interval_ms: u64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            start_price: 22_000.0,
            step: 0.001,
            seed: 7,
            interval_ms: 500,
        }
    }
}

/// Synthetic quote source. The random walk is a fixed function of the seed,
/// so two adapters built from the same config emit the same prices.
pub struct MockAdapter {
    symbol: String,
    config: MockConfig,
    price: f64,
    state: u64,
    script: Option<VecDeque<f64>>,
    last_emit: Option<Instant>,
    connected: bool,
}

impl MockAdapter {
    pub fn new(symbol: impl Into<String>, config: MockConfig) -> Self {
        Self {
            symbol: symbol.into(),
            price: config.start_price,
            state: config.seed.max(1),
            config,
            script: None,
            last_emit: None,
            connected: false,
        }
    }

    /// Replays `prices` in order, then reports no further quotes.
    pub fn with_script(symbol: impl Into<String>, prices: Vec<f64>) -> Self {
        let mut adapter = Self::new(
            symbol,
            MockConfig {
                interval_ms: 0,
                ..MockConfig::default()
            },
        );
        adapter.script = Some(prices.into());
        adapter
    }

    fn next_unit(&mut self) -> f64 {
        // xorshift64
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        (x >> 11) as f64 / (1u64 << 53) as f64
    }

    fn next_price(&mut self) -> f64 {
        let shock = self.next_unit() * 2.0 - 1.0;
        self.price = (self.price * (1.0 + shock * self.config.step)).max(0.01);
        (self.price * 100.0).round() / 100.0
    }

    fn throttled(&self) -> bool {
        let interval = Duration::from_millis(self.config.interval_ms);
        match self.last_emit {
            Some(last) => !interval.is_zero() && last.elapsed() < interval,
            None => false,
        }
    }
}

impl QuoteAdapter for MockAdapter {
    fn venue(&self) -> &str {
        "MOCK"
    }

    fn connect(&mut self) -> Result<(), BrokerError> {
        self.connected = true;
        debug!(symbol = %self.symbol, scripted = self.script.is_some(), "mock feed connected");
        Ok(())
    }

    fn poll_quote(&mut self) -> Result<Option<QuoteEvent>, BrokerError> {
        if !self.connected {
            return Err(BrokerError::NotConnected);
        }

        if let Some(script) = self.script.as_mut() {
            return Ok(script.pop_front().map(|price| QuoteEvent::new(price, None)));
        }

        if self.throttled() {
            return Ok(None);
        }
        self.last_emit = Some(Instant::now());

        let price = self.next_price();
        let volume = 100 + (self.next_unit() * 900.0) as u64;
        Ok(Some(QuoteEvent::new(price, Some(volume))))
    }

    fn subscribe_symbol(&mut self, symbol: &str) -> Result<(), BrokerError> {
        self.symbol = symbol.to_string();
        Ok(())
    }

    fn heartbeat(&mut self) -> Result<(), BrokerError> {
        if self.connected {
            Ok(())
        } else {
            Err(BrokerError::NotConnected)
        }
    }
}
