use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::Utc;
use crossbeam::queue::SegQueue;
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tickwatch::QuoteEvent;
use tokio::sync::oneshot;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use crate::error::BrokerError;
use crate::protocol::QuoteAdapter;

/// Upper bound on the close handshake when a reader is retired.
const CLOSE_GRACE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WsConfig {
    pub endpoint: String,
    pub guid: String,
    /// The one feed symbol backing the instrument; frames for any other
    /// symbol are dropped.
    pub symbol: String,
    /// Silence longer than this fails the heartbeat.
    pub stale_after_ms: u64,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            endpoint: "wss://api.upstox.com/feed/websocket".to_string(),
            guid: "tickwatch".to_string(),
            symbol: "NSE_INDEX_NIFTY".to_string(),
            stale_after_ms: 15_000,
        }
    }
}

struct Reader {
    cancel: oneshot::Sender<()>,
    thread: JoinHandle<()>,
}

/// Streaming quote adapter. A dedicated reader thread owns the socket and
/// pushes parsed quotes onto a lock-free queue drained by `poll_quote`.
/// At most one reader is alive at a time; it is cancelled and joined on
/// reconnect, on heartbeat failure and on drop.
pub struct WsQuoteAdapter {
    config: WsConfig,
    connected: bool,
    reader: Option<Reader>,
    queue: Arc<SegQueue<QuoteEvent>>,
    ws_running: Arc<AtomicBool>,
    last_message_ms: Arc<AtomicU64>,
}

impl WsQuoteAdapter {
    pub fn new(config: WsConfig) -> Self {
        Self {
            config,
            connected: false,
            reader: None,
            queue: Arc::new(SegQueue::new()),
            ws_running: Arc::new(AtomicBool::new(false)),
            last_message_ms: Arc::new(AtomicU64::new(now_millis())),
        }
    }

    fn stop_reader(&mut self) {
        let Some(reader) = self.reader.take() else {
            return;
        };
        let _ = reader.cancel.send(());
        if reader.thread.join().is_err() {
            warn!("ws reader panicked");
        }
        self.ws_running.store(false, Ordering::Release);
    }

    fn restart_reader(&mut self) {
        self.stop_reader();

        let (cancel, mut cancelled) = oneshot::channel::<()>();
        let queue = Arc::clone(&self.queue);
        let ws_running = Arc::clone(&self.ws_running);
        let last_message_ms = Arc::clone(&self.last_message_ms);
        let endpoint = self.config.endpoint.clone();
        let symbol = self.config.symbol.clone();
        let request = subscribe_request(&self.config.guid, &symbol);

        ws_running.store(true, Ordering::Release);
        let thread = thread::spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(error) => {
                    warn!(%error, "ws reader runtime unavailable");
                    ws_running.store(false, Ordering::Release);
                    return;
                }
            };

            runtime.block_on(async move {
                let connection = tokio::select! {
                    _ = &mut cancelled => {
                        ws_running.store(false, Ordering::Release);
                        return;
                    }
                    result = tokio_tungstenite::connect_async(endpoint.as_str()) => result,
                };
                let (stream, _) = match connection {
                    Ok(ok) => ok,
                    Err(error) => {
                        warn!(%endpoint, %error, "ws connect failed");
                        ws_running.store(false, Ordering::Release);
                        return;
                    }
                };
                info!(%endpoint, %symbol, "ws connected");

                let (mut write, mut read) = stream.split();
                if let Err(error) = write.send(Message::Text(request)).await {
                    warn!(%error, "ws subscribe failed");
                    ws_running.store(false, Ordering::Release);
                    return;
                }

                loop {
                    tokio::select! {
                        _ = &mut cancelled => {
                            let _ = tokio::time::timeout(CLOSE_GRACE, write.send(Message::Close(None))).await;
                            debug!(%endpoint, "ws reader retired");
                            break;
                        }
                        msg = read.next() => match msg {
                            Some(Ok(Message::Text(text))) => {
                                last_message_ms.store(now_millis(), Ordering::Relaxed);
                                if let Some(quote) = parse_quote(&text, &symbol) {
                                    queue.push(quote);
                                }
                            }
                            Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => {
                                last_message_ms.store(now_millis(), Ordering::Relaxed);
                            }
                            Some(Ok(Message::Close(frame))) => {
                                debug!(?frame, "ws closed by peer");
                                break;
                            }
                            Some(Ok(_)) => {}
                            Some(Err(error)) => {
                                warn!(%error, "ws read failed");
                                break;
                            }
                            None => break,
                        },
                    }
                }

                ws_running.store(false, Ordering::Release);
            });
        });

        self.reader = Some(Reader { cancel, thread });
    }
}

impl Drop for WsQuoteAdapter {
    fn drop(&mut self) {
        self.stop_reader();
    }
}

impl QuoteAdapter for WsQuoteAdapter {
    fn venue(&self) -> &str {
        "WS"
    }

    fn connect(&mut self) -> Result<(), BrokerError> {
        if self.config.symbol.trim().is_empty() {
            return Err(BrokerError::ConnectionFailed(
                "no symbol to subscribe".to_string(),
            ));
        }
        self.connected = true;
        self.last_message_ms.store(now_millis(), Ordering::Relaxed);
        self.restart_reader();
        Ok(())
    }

    /// Switches the stream to `symbol`. Only one symbol is followed at a time.
    fn subscribe_symbol(&mut self, symbol: &str) -> Result<(), BrokerError> {
        if !self.connected {
            return Err(BrokerError::NotConnected);
        }
        if self.config.symbol != symbol {
            self.config.symbol = symbol.to_string();
            self.restart_reader();
        }
        Ok(())
    }

    fn heartbeat(&mut self) -> Result<(), BrokerError> {
        if !self.connected {
            return Err(BrokerError::NotConnected);
        }

        let silent_ms = now_millis().saturating_sub(self.last_message_ms.load(Ordering::Relaxed));
        if silent_ms > self.config.stale_after_ms {
            self.connected = false;
            self.stop_reader();
            return Err(BrokerError::AdapterError(format!(
                "no market data for {silent_ms} ms"
            )));
        }
        Ok(())
    }

    fn poll_quote(&mut self) -> Result<Option<QuoteEvent>, BrokerError> {
        if !self.connected {
            return Err(BrokerError::NotConnected);
        }

        if let Some(quote) = self.queue.pop() {
            return Ok(Some(quote));
        }

        if !self.ws_running.load(Ordering::Acquire) {
            self.connected = false;
            self.stop_reader();
            return Err(BrokerError::AdapterError(
                "websocket stream ended".to_string(),
            ));
        }
        Ok(None)
    }
}

fn now_millis() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}

pub(crate) fn subscribe_request(guid: &str, symbol: &str) -> String {
    json!({
        "guid": guid,
        "method": "sub",
        "data": { "symbols": [symbol] },
    })
    .to_string()
}

/// Parses one text frame into a quote.
///
/// Accepts `{"type":"quote","data":{"symbol","ltp","volume"}}` and a bare
/// `{"ltp":..,"volume":..}`. Frames of another type, or tagged with a
/// symbol other than `symbol`, yield `None`. A present but non-numeric
/// `ltp` yields a NaN price so that ingress counts it as rejected.
pub(crate) fn parse_quote(text: &str, symbol: &str) -> Option<QuoteEvent> {
    let value: Value = serde_json::from_str(text).ok()?;

    let payload = match value.get("type").and_then(Value::as_str) {
        Some("quote") => value.get("data").unwrap_or(&value),
        Some(_) => return None,
        None if value.get("ltp").is_some() => &value,
        None => return None,
    };

    if let Some(tagged) = payload.get("symbol").and_then(Value::as_str) {
        if tagged != symbol {
            return None;
        }
    }

    let price = match payload.get("ltp") {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
        _ => f64::NAN,
    };
    let volume = payload.get("volume").and_then(|x| {
        x.as_u64()
            .or_else(|| x.as_f64().filter(|v| *v >= 0.0).map(|v| v as u64))
            .or_else(|| x.as_str().and_then(|s| s.trim().parse::<u64>().ok()))
    });

    Some(QuoteEvent::new(price, volume))
}

#[cfg(test)]
mod tests {
    use market::Feed;

    use super::{WsConfig, WsQuoteAdapter, parse_quote, subscribe_request};
    use crate::error::BrokerError;
    use crate::protocol::QuoteAdapter;

    const NIFTY: &str = "NSE_INDEX_NIFTY";

    #[test]
    fn ws_adapter_requires_connect_before_poll() {
        let mut adapter = WsQuoteAdapter::new(WsConfig::default());
        assert!(matches!(adapter.poll_quote(), Err(BrokerError::NotConnected)));
        assert!(matches!(adapter.heartbeat(), Err(BrokerError::NotConnected)));
        assert!(matches!(
            adapter.subscribe_symbol(NIFTY),
            Err(BrokerError::NotConnected)
        ));
    }

    #[test]
    fn connect_without_symbol_fails() {
        let mut adapter = WsQuoteAdapter::new(WsConfig {
            symbol: " ".to_string(),
            ..WsConfig::default()
        });
        assert!(matches!(
            adapter.connect(),
            Err(BrokerError::ConnectionFailed(_))
        ));
    }

    #[test]
    fn subscribe_request_shape() {
        let raw = subscribe_request("abc", NIFTY);
        let value: serde_json::Value = serde_json::from_str(&raw).expect("valid json");
        assert_eq!(value["guid"], "abc");
        assert_eq!(value["method"], "sub");
        assert_eq!(value["data"]["symbols"], serde_json::json!([NIFTY]));
    }

    #[test]
    fn parse_typed_quote() {
        let text = r#"{"type":"quote","data":{"symbol":"NSE_INDEX_NIFTY","ltp":22150.5,"volume":1200}}"#;
        let quote = parse_quote(text, NIFTY).expect("quote should parse");
        assert_eq!(quote.price, 22150.5);
        assert_eq!(quote.volume, Some(1200));
    }

    #[test]
    fn parse_bare_quote_without_volume() {
        let quote = parse_quote(r#"{"ltp":101}"#, NIFTY).expect("quote should parse");
        assert_eq!(quote.price, 101.0);
        assert_eq!(quote.volume, None);
    }

    #[test]
    fn non_numeric_ltp_becomes_nan() {
        let text = r#"{"type":"quote","data":{"symbol":"NSE_INDEX_NIFTY","ltp":"n/a"}}"#;
        let quote = parse_quote(text, NIFTY).expect("frame is still a quote");
        assert!(quote.price.is_nan());
    }

    #[test]
    fn other_frames_are_skipped() {
        assert!(parse_quote(r#"{"type":"ack","data":{}}"#, NIFTY).is_none());
        assert!(parse_quote(r#"{"status":"ok"}"#, NIFTY).is_none());
        assert!(parse_quote("not json", NIFTY).is_none());
    }

    #[test]
    fn foreign_symbol_never_reaches_the_feed() {
        let feed = Feed::new("NIFTY 50");
        let frames = [
            r#"{"type":"quote","data":{"symbol":"NSE_INDEX_NIFTY","ltp":22150.0}}"#,
            r#"{"type":"quote","data":{"symbol":"NSE_STOCK_RELIANCE","ltp":2900.0}}"#,
            r#"{"type":"quote","data":{"symbol":"NSE_INDEX_NIFTY","ltp":22151.0}}"#,
        ];
        for frame in frames {
            if let Some(quote) = parse_quote(frame, NIFTY) {
                feed.ingest_quote(quote);
            }
        }

        let closes = feed
            .snapshot()
            .bars
            .iter()
            .map(|bar| bar.close_price)
            .collect::<Vec<_>>();
        assert_eq!(closes, vec![22150.0, 22151.0]);
    }
}
