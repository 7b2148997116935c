//! 指标快照模块。
//!
//! 提供 market 关键运行指标的只读快照结构。

/// market 运行指标快照。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarketMetrics {
	/// 成功写入 buffer 的 tick 数量。
	pub accepted: u64,
	/// 因价格非法被丢弃的报价数量。
	pub rejected: u64,
	/// 因超出容量被淘汰的 bar 数量。
	pub evicted: u64,
	/// 当前序号。
	pub sequence: u64,
	/// buffer 当前长度。
	pub buffer_len: usize,
	/// buffer 容量上限。
	pub buffer_capacity: usize,
}
