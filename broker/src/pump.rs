use market::{Feed, IngestResult};

use crate::error::BrokerError;
use crate::protocol::QuoteAdapter;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PumpStats {
    pub polled: usize,
    pub accepted: usize,
    pub rejected: usize,
}

/// Drains up to `max` quotes that are available right now into `feed`.
pub fn pump_quotes<A: QuoteAdapter + ?Sized>(
    feed: &Feed,
    adapter: &mut A,
    max: usize,
) -> Result<PumpStats, BrokerError> {
    let mut stats = PumpStats::default();
    while stats.polled < max {
        let Some(quote) = adapter.poll_quote()? else {
            break;
        };
        stats.polled += 1;
        match feed.ingest_quote(quote) {
            IngestResult::Accepted { .. } => stats.accepted += 1,
            IngestResult::Rejected => stats.rejected += 1,
        }
    }
    Ok(stats)
}
