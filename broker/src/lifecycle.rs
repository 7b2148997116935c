use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tickwatch::QuoteEvent;
use tracing::{debug, info, warn};

use crate::error::BrokerError;
use crate::protocol::QuoteAdapter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectPolicy {
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub max_retries: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial_delay_ms: 250,
            max_delay_ms: 10_000,
            max_retries: 8,
        }
    }
}

impl ReconnectPolicy {
    /// Exponential backoff before `attempt` (attempt 0 is immediate).
    pub fn delay(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let shift = (attempt - 1).min(10);
        let scaled = self.initial_delay_ms.saturating_mul(1u64 << shift);
        Duration::from_millis(scaled.min(self.max_delay_ms.max(self.initial_delay_ms)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    pub heartbeat_interval_ms: u64,
    pub heartbeat_timeout_ms: u64,
    pub reconnect: ReconnectPolicy,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval_ms: 2_000,
            heartbeat_timeout_ms: 30_000,
            reconnect: ReconnectPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LifecycleStats {
    pub reconnect_total: u64,
    pub connect_failures: u64,
    pub heartbeat_failures: u64,
    pub stream_drops: u64,
    pub subscription_replays: u64,
}

/// Wraps an adapter with reconnect-on-drop, heartbeat supervision and
/// subscription replay.
pub struct ResilientAdapter<A: QuoteAdapter> {
    adapter: A,
    config: LifecycleConfig,
    connected: bool,
    last_seen: Option<Instant>,
    subscriptions: Vec<String>,
    /// Drops since the last delivered quote; offsets the backoff schedule.
    drops: u32,
    stats: LifecycleStats,
}

impl<A: QuoteAdapter> ResilientAdapter<A> {
    pub fn new(adapter: A, config: LifecycleConfig) -> Self {
        Self {
            adapter,
            config,
            connected: false,
            last_seen: None,
            subscriptions: Vec::new(),
            drops: 0,
            stats: LifecycleStats::default(),
        }
    }

    pub fn stats(&self) -> LifecycleStats {
        self.stats.clone()
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn inner(&self) -> &A {
        &self.adapter
    }

    fn ensure_live(&mut self) -> Result<(), BrokerError> {
        if !self.connected {
            return self.reconnect_with_backoff();
        }

        let Some(last) = self.last_seen else {
            return Ok(());
        };
        let elapsed_ms = last.elapsed().as_millis() as u64;
        if elapsed_ms >= self.config.heartbeat_timeout_ms {
            warn!(venue = self.adapter.venue(), elapsed_ms, "feed silent past timeout");
            self.connected = false;
            self.stats.heartbeat_failures += 1;
            return self.reconnect_with_backoff();
        }

        if elapsed_ms >= self.config.heartbeat_interval_ms {
            if let Err(error) = self.adapter.heartbeat() {
                warn!(venue = self.adapter.venue(), %error, "heartbeat failed");
                self.connected = false;
                self.stats.heartbeat_failures += 1;
                return self.reconnect_with_backoff();
            }
        }
        Ok(())
    }

    fn reconnect_with_backoff(&mut self) -> Result<(), BrokerError> {
        let retries = self.config.reconnect.max_retries.max(1);
        for attempt in 0..retries {
            let backoff = self.config.reconnect.delay(attempt.saturating_add(self.drops));
            if !backoff.is_zero() {
                debug!(venue = self.adapter.venue(), attempt, ?backoff, "reconnect backoff");
                thread::sleep(backoff);
            }

            match self.adapter.connect() {
                Ok(()) => {
                    self.connected = true;
                    self.last_seen = Some(Instant::now());
                    self.stats.reconnect_total += 1;
                    self.replay_subscriptions()?;
                    info!(venue = self.adapter.venue(), attempt, "feed connected");
                    return Ok(());
                }
                Err(error) => {
                    self.stats.connect_failures += 1;
                    warn!(venue = self.adapter.venue(), attempt, %error, "connect failed");
                }
            }
        }

        Err(BrokerError::ConnectionFailed(
            "reconnect retries exhausted".to_string(),
        ))
    }

    fn replay_subscriptions(&mut self) -> Result<(), BrokerError> {
        for symbol in &self.subscriptions {
            self.adapter.subscribe_symbol(symbol)?;
            self.stats.subscription_replays += 1;
        }
        Ok(())
    }
}

impl<A: QuoteAdapter> QuoteAdapter for ResilientAdapter<A> {
    fn venue(&self) -> &str {
        self.adapter.venue()
    }

    fn connect(&mut self) -> Result<(), BrokerError> {
        self.reconnect_with_backoff()
    }

    /// Subscriptions requested before the first connect are replayed once
    /// the adapter comes up, and again after every reconnect.
    fn subscribe_symbol(&mut self, symbol: &str) -> Result<(), BrokerError> {
        if !self.subscriptions.iter().any(|x| x == symbol) {
            self.subscriptions.push(symbol.to_string());
        }
        if self.connected {
            self.adapter.subscribe_symbol(symbol)?;
        }
        Ok(())
    }

    fn heartbeat(&mut self) -> Result<(), BrokerError> {
        self.ensure_live()
    }

    fn poll_quote(&mut self) -> Result<Option<QuoteEvent>, BrokerError> {
        self.ensure_live()?;

        match self.adapter.poll_quote() {
            Ok(Some(quote)) => {
                self.last_seen = Some(Instant::now());
                self.drops = 0;
                Ok(Some(quote))
            }
            Ok(None) => Ok(None),
            Err(error) => {
                warn!(venue = self.adapter.venue(), %error, "poll failed, reconnecting");
                self.connected = false;
                self.drops = self.drops.saturating_add(1);
                self.stats.stream_drops += 1;
                self.reconnect_with_backoff()?;
                let retry = self.adapter.poll_quote()?;
                if retry.is_some() {
                    self.last_seen = Some(Instant::now());
                }
                Ok(retry)
            }
        }
    }
}
