//! 行情数据结构定义模块。
//!
//! - `Bar` / `Tick` / `QuoteEvent`：直接复用 `tickwatch` 中的定义。
//! - `BarSnapshot`：某一时刻 Bar Buffer 的不可变副本。
//! - `SharedSnapshot`：跨线程发布快照时使用的共享引用类型。

use std::sync::Arc;

pub use tickwatch::{Bar, QuoteEvent, Tick};

/// Bar Buffer 的不可变快照。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BarSnapshot {
	/// 生成该快照时的单调序号（0 表示尚未接收任何 tick）。
	pub sequence: u64,
	/// 按到达顺序排列的 bar，最旧在前。
	pub bars: Vec<Bar>,
}

impl BarSnapshot {
	pub fn len(&self) -> usize {
		self.bars.len()
	}

	pub fn is_empty(&self) -> bool {
		self.bars.is_empty()
	}

	pub fn last(&self) -> Option<&Bar> {
		self.bars.last()
	}
}

/// 发布给读取端的快照指针类型。
pub type SharedSnapshot = Arc<BarSnapshot>;
