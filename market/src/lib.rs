//! `market` crate 入口。
//!
//! 职责：报价规范化（Tick Ingress）、有界 Bar Buffer 与快照发布、基础指标。
//! 该文件只做模块装配与统一导出，具体实现位于各子模块。
//!
//! 模块分工：
//! - `bar`：快照类型与共享指针。
//! - `ingress`：报价规范化与摄入结果。
//! - `buffer`：有界 bar 序列（单写多读）。
//! - `feed`：统一入口与主流程。
//! - `metrics`：运行指标快照。
//!
//! 快速示例：
//! ```rust
//! use market::{Feed, QuoteEvent};
//!
//! let feed = Feed::new("NIFTY 50");
//! let _ = feed.ingest_quote(QuoteEvent::new(22_150.0, Some(1200)));
//!
//! let snapshot = feed.snapshot();
//! assert_eq!(snapshot.len(), 1);
//! assert_eq!(snapshot.sequence, 1);
//! ```

mod bar;
mod buffer;
mod feed;
mod ingress;
mod metrics;

pub use bar::{Bar, BarSnapshot, QuoteEvent, SharedSnapshot, Tick};
pub use buffer::{AppendOutcome, BarBuffer, BarMode};
pub use feed::{Feed, FeedConfig};
pub use ingress::{IngestResult, TickIngress};
pub use metrics::MarketMetrics;

#[cfg(test)]
mod tests {
	use std::sync::Arc;
	use std::thread;

	use chrono::{Duration, Utc};

	use super::{Feed, FeedConfig, IngestResult, QuoteEvent};

	#[test]
	fn rejected_quotes_are_counted_but_not_buffered() {
		let feed = Feed::new("NIFTY 50");
		assert_eq!(
			feed.ingest_quote(QuoteEvent::new(22_000.0, Some(10))),
			IngestResult::Accepted { sequence: 1 }
		);
		assert_eq!(feed.ingest_quote(QuoteEvent::new(f64::NAN, None)), IngestResult::Rejected);
		assert_eq!(feed.ingest_quote(QuoteEvent::new(-1.0, None)), IngestResult::Rejected);

		let metrics = feed.metrics();
		assert_eq!(metrics.accepted, 1);
		assert_eq!(metrics.rejected, 2);
		assert_eq!(metrics.sequence, 1);
		assert_eq!(metrics.buffer_len, 1);
	}

	#[test]
	fn metrics_track_evictions() {
		let feed = Feed::with_config(
			"NIFTY 50",
			FeedConfig {
				capacity: 4,
				..FeedConfig::default()
			},
		);
		let start = Utc::now();
		for idx in 0..10 {
			feed.ingest_quote_at(
				QuoteEvent::new(100.0 + idx as f64, None),
				start + Duration::seconds(idx),
			);
		}
		let metrics = feed.metrics();
		assert_eq!(metrics.accepted, 10);
		assert_eq!(metrics.evicted, 6);
		assert_eq!(metrics.buffer_len, 4);
		assert_eq!(metrics.buffer_capacity, 4);
	}

	#[test]
	fn readers_never_observe_torn_snapshots() {
		let feed = Arc::new(Feed::with_config(
			"NIFTY 50",
			FeedConfig {
				capacity: 50,
				..FeedConfig::default()
			},
		));

		let writer = {
			let feed = Arc::clone(&feed);
			thread::spawn(move || {
				for idx in 1..=2_000u64 {
					feed.ingest_quote(QuoteEvent::new(idx as f64, Some(idx)));
				}
			})
		};

		let reader = {
			let feed = Arc::clone(&feed);
			thread::spawn(move || {
				let mut last_sequence = 0;
				while last_sequence < 2_000 {
					let snapshot = feed.snapshot();
					assert!(snapshot.sequence >= last_sequence);
					assert_eq!(snapshot.len() as u64, snapshot.sequence.min(50));
					if let Some(last) = snapshot.last() {
						assert_eq!(last.close_price, snapshot.sequence as f64);
					}
					for pair in snapshot.bars.windows(2) {
						assert_eq!(pair[1].close_price, pair[0].close_price + 1.0);
					}
					last_sequence = snapshot.sequence;
				}
			})
		};

		writer.join().expect("writer thread");
		reader.join().expect("reader thread");
	}
}
