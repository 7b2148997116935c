//! `Feed` 主模块。
//!
//! 聚合 ingress、Bar Buffer 与 metrics，提供上游报价摄入与下游快照读取的统一入口。

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
	AppendOutcome, BarBuffer, BarMode, IngestResult, MarketMetrics, QuoteEvent, SharedSnapshot,
	Tick, TickIngress,
};

/// `Feed` 初始化配置。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
	/// Bar Buffer 容量。
	pub capacity: usize,
	/// bar 生成方式。
	pub mode: BarMode,
}

impl Default for FeedConfig {
	fn default() -> Self {
		Self {
			capacity: tickwatch::Const::BUFFER_CAPACITY,
			mode: BarMode::default(),
		}
	}
}

/// 行情摄入与快照入口。
#[derive(Debug)]
pub struct Feed {
	/// 标的名称（用于日志与告警文本）。
	pub instrument: String,
	ingress: TickIngress,
	buffer: BarBuffer,
	accepted: AtomicU64,
	rejected: AtomicU64,
	evicted: AtomicU64,
}

impl Feed {
	/// 使用默认配置创建 `Feed`。
	pub fn new(instrument: impl Into<String>) -> Self {
		Self::with_config(instrument, FeedConfig::default())
	}

	/// 使用完整配置创建 `Feed`。
	pub fn with_config(instrument: impl Into<String>, config: FeedConfig) -> Self {
		Self {
			instrument: instrument.into(),
			ingress: TickIngress,
			buffer: BarBuffer::with_mode(config.capacity, config.mode),
			accepted: AtomicU64::new(0),
			rejected: AtomicU64::new(0),
			evicted: AtomicU64::new(0),
		}
	}

	/// 摄入一条报价，以当前时间作为到达时间。
	pub fn ingest_quote(&self, event: QuoteEvent) -> IngestResult {
		self.ingest_quote_at(event, Utc::now())
	}

	/// 摄入一条报价，使用指定到达时间。
	pub fn ingest_quote_at(&self, event: QuoteEvent, arrived_at: DateTime<Utc>) -> IngestResult {
		match self.ingress.normalize_at(&event, arrived_at) {
			Some(tick) => self.ingest_tick(tick),
			None => {
				self.rejected.fetch_add(1, Ordering::Relaxed);
				debug!(instrument = %self.instrument, price = event.price, "quote rejected");
				IngestResult::Rejected
			}
		}
	}

	/// 直接摄入已规范化的 tick。
	pub fn ingest_tick(&self, tick: Tick) -> IngestResult {
		match self.buffer.append(tick) {
			AppendOutcome::Accepted { sequence, evicted } => {
				self.accepted.fetch_add(1, Ordering::Relaxed);
				self.evicted.fetch_add(evicted as u64, Ordering::Relaxed);
				IngestResult::Accepted { sequence }
			}
			AppendOutcome::Rejected => {
				self.rejected.fetch_add(1, Ordering::Relaxed);
				IngestResult::Rejected
			}
		}
	}

	/// 当前 buffer 快照。
	pub fn snapshot(&self) -> SharedSnapshot {
		self.buffer.snapshot()
	}

	/// 当前序号（用于判断是否有新数据）。
	pub fn sequence(&self) -> u64 {
		self.buffer.sequence()
	}

	pub fn buffer(&self) -> &BarBuffer {
		&self.buffer
	}

	/// 返回当前指标快照。
	pub fn metrics(&self) -> MarketMetrics {
		let snapshot = self.buffer.snapshot();
		MarketMetrics {
			accepted: self.accepted.load(Ordering::Relaxed),
			rejected: self.rejected.load(Ordering::Relaxed),
			evicted: self.evicted.load(Ordering::Relaxed),
			sequence: snapshot.sequence,
			buffer_len: snapshot.len(),
			buffer_capacity: self.buffer.capacity(),
		}
	}
}
