use tickwatch::QuoteEvent;

use crate::error::BrokerError;

/// Feed-side collaborator. `poll_quote` never blocks: `Ok(None)` means no
/// quote is available right now.
pub trait QuoteAdapter: Send {
    fn venue(&self) -> &str;
    fn connect(&mut self) -> Result<(), BrokerError>;
    fn poll_quote(&mut self) -> Result<Option<QuoteEvent>, BrokerError>;

    fn subscribe_symbol(&mut self, _symbol: &str) -> Result<(), BrokerError> {
        Ok(())
    }

    fn heartbeat(&mut self) -> Result<(), BrokerError> {
        Ok(())
    }
}

impl<A: QuoteAdapter + ?Sized> QuoteAdapter for Box<A> {
    fn venue(&self) -> &str {
        (**self).venue()
    }

    fn connect(&mut self) -> Result<(), BrokerError> {
        (**self).connect()
    }

    fn poll_quote(&mut self) -> Result<Option<QuoteEvent>, BrokerError> {
        (**self).poll_quote()
    }

    fn subscribe_symbol(&mut self, symbol: &str) -> Result<(), BrokerError> {
        (**self).subscribe_symbol(symbol)
    }

    fn heartbeat(&mut self) -> Result<(), BrokerError> {
        (**self).heartbeat()
    }
}
