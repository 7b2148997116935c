//! ingress（入站）模块。
//!
//! 将外部 feed 推送的原始报价规范化为 `Tick`：由本模块打上到达时间戳，
//! 非数值或非正价格在此处直接丢弃。

use chrono::{DateTime, Utc};

use crate::{QuoteEvent, Tick};

/// 单次摄入的结果，用于上层统计接收与丢弃行为。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestResult {
	/// 已写入 Bar Buffer，携带写入后的序号。
	Accepted { sequence: u64 },
	/// 报价不合法，未改变 buffer 与序号。
	Rejected,
}

impl IngestResult {
	pub fn is_accepted(&self) -> bool {
		matches!(self, Self::Accepted { .. })
	}
}

/// 报价规范化器（无状态）。
#[derive(Debug, Clone, Copy, Default)]
pub struct TickIngress;

impl TickIngress {
	/// 使用当前时间作为到达时间进行规范化。
	pub fn normalize(&self, event: &QuoteEvent) -> Option<Tick> {
		self.normalize_at(event, Utc::now())
	}

	/// 使用指定到达时间进行规范化；缺失成交量按 0 处理。
	pub fn normalize_at(&self, event: &QuoteEvent, arrived_at: DateTime<Utc>) -> Option<Tick> {
		let tick = Tick {
			datetime: arrived_at,
			price: event.price,
			volume: event.volume.unwrap_or(0),
		};
		tick.is_valid().then_some(tick)
	}
}
