pub mod mock;
pub mod ws;

use serde::{Deserialize, Serialize};

pub use mock::{MockAdapter, MockConfig};
pub use ws::{WsConfig, WsQuoteAdapter};

use crate::lifecycle::{LifecycleConfig, ResilientAdapter};
use crate::protocol::QuoteAdapter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterKind {
    #[default]
    Mock,
    Ws,
}

impl AdapterKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "mock" => Some(Self::Mock),
            "ws" | "websocket" => Some(Self::Ws),
            _ => None,
        }
    }
}

/// Selects and configures the feed collaborator.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    pub kind: AdapterKind,
    pub mock: MockConfig,
    pub ws: WsConfig,
    pub lifecycle: LifecycleConfig,
}

/// Builds the configured adapter wrapped in the reconnect lifecycle.
pub fn build_adapter(config: &AdapterConfig) -> Box<dyn QuoteAdapter> {
    match config.kind {
        AdapterKind::Mock => {
            Box::new(ResilientAdapter::new(
                MockAdapter::new(config.ws.symbol.clone(), config.mock),
                config.lifecycle,
            ))
        }
        AdapterKind::Ws => Box::new(ResilientAdapter::new(
            WsQuoteAdapter::new(config.ws.clone()),
            config.lifecycle,
        )),
    }
}
