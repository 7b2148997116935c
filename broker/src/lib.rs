//! Feed collaborator side: quote adapters, reconnect lifecycle, and the pump
//! that drains adapter quotes into a `market::Feed`.

pub mod adapters;
pub mod error;
pub mod lifecycle;
pub mod protocol;
pub mod pump;

pub use adapters::{
    AdapterConfig, AdapterKind, MockAdapter, MockConfig, WsConfig, WsQuoteAdapter, build_adapter,
};
pub use error::BrokerError;
pub use lifecycle::{LifecycleConfig, LifecycleStats, ReconnectPolicy, ResilientAdapter};
pub use protocol::QuoteAdapter;
pub use pump::{PumpStats, pump_quotes};
