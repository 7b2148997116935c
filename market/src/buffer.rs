//! Bar Buffer 模块。
//!
//! 单写多读的有界 bar 序列：写入端在互斥锁内完成追加、合并与淘汰，
//! 随后通过一次引用替换发布新的不可变快照；读取端只会拿到完整快照，
//! 不会观察到写了一半的 bar。

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use serde::{Deserialize, Serialize};
use tickwatch::bucket_start;

use crate::{Bar, BarSnapshot, SharedSnapshot, Tick};

/// bar 的生成方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BarMode {
	/// 每个 tick 独立成为一根 bar（OHLC 全部等于价格）。
	#[default]
	TickAsBar,
	/// 按固定时间桶聚合 K 线；同桶内的 tick 合并到当前 bar。
	Bucketed { interval_secs: u64 },
}

/// 单次 `append` 的结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
	/// 已写入，携带新序号与本次淘汰的 bar 数量。
	Accepted { sequence: u64, evicted: usize },
	/// 价格非法，buffer 与序号均未改变。
	Rejected,
}

/// 有界 bar 序列。
#[derive(Debug)]
pub struct BarBuffer {
	capacity: usize,
	mode: BarMode,
	rows: Mutex<VecDeque<Bar>>,
	published: RwLock<SharedSnapshot>,
	sequence: AtomicU64,
}

impl BarBuffer {
	/// 使用 tick-as-bar 模式创建 buffer。
	pub fn new(capacity: usize) -> Self {
		Self::with_mode(capacity, BarMode::default())
	}

	/// 使用指定模式创建 buffer（容量至少为 1）。
	pub fn with_mode(capacity: usize, mode: BarMode) -> Self {
		let capacity = capacity.max(1);
		Self {
			capacity,
			mode,
			rows: Mutex::new(VecDeque::with_capacity(capacity + 1)),
			published: RwLock::new(Arc::new(BarSnapshot::default())),
			sequence: AtomicU64::new(0),
		}
	}

	/// 追加一个 tick，必要时从头部淘汰，并发布新快照。
	pub fn append(&self, tick: Tick) -> AppendOutcome {
		if !tick.is_valid() {
			return AppendOutcome::Rejected;
		}

		let mut rows = self.rows.lock().expect("bar buffer rows lock poisoned");
		match self.mode {
			BarMode::TickAsBar => rows.push_back(Bar::from_tick(&tick)),
			BarMode::Bucketed { interval_secs } => {
				let bucket = bucket_start(tick.datetime, interval_secs);
				match rows.back_mut() {
					Some(last) if last.datetime == bucket => *last = last.merge_tick(&tick),
					// late ticks open a new bar; arrival order wins over event time
					_ => rows.push_back(Bar {
						datetime: bucket,
						..Bar::from_tick(&tick)
					}),
				}
			}
		}

		let mut evicted = 0usize;
		while rows.len() > self.capacity {
			rows.pop_front();
			evicted += 1;
		}

		let sequence = self.sequence.fetch_add(1, Ordering::AcqRel) + 1;
		let snapshot = Arc::new(BarSnapshot {
			sequence,
			bars: rows.iter().copied().collect(),
		});
		*self
			.published
			.write()
			.expect("bar buffer snapshot lock poisoned") = snapshot;

		AppendOutcome::Accepted { sequence, evicted }
	}

	/// 返回当前已发布的快照。
	pub fn snapshot(&self) -> SharedSnapshot {
		self.published
			.read()
			.expect("bar buffer snapshot lock poisoned")
			.clone()
	}

	/// 已接收 tick 的单调序号。
	pub fn sequence(&self) -> u64 {
		self.sequence.load(Ordering::Acquire)
	}

	pub fn len(&self) -> usize {
		self.snapshot().len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn capacity(&self) -> usize {
		self.capacity
	}

	pub fn mode(&self) -> BarMode {
		self.mode
	}
}

#[cfg(test)]
mod tests {
	use chrono::{DateTime, Duration, TimeZone, Utc};

	use super::{AppendOutcome, BarBuffer, BarMode};
	use crate::Tick;

	fn at(secs: i64) -> DateTime<Utc> {
		Utc.with_ymd_and_hms(2024, 5, 6, 9, 15, 0).unwrap() + Duration::seconds(secs)
	}

	fn tick(secs: i64, price: f64) -> Tick {
		Tick {
			datetime: at(secs),
			price,
			volume: 1,
		}
	}

	#[test]
	fn evicts_from_head_past_capacity() {
		let buffer = BarBuffer::new(3);
		for idx in 0..5 {
			buffer.append(tick(idx, 100.0 + idx as f64));
		}
		let snapshot = buffer.snapshot();
		let closes = snapshot.bars.iter().map(|x| x.close_price).collect::<Vec<_>>();
		assert_eq!(closes, vec![102.0, 103.0, 104.0]);
		assert_eq!(snapshot.sequence, 5);
	}

	#[test]
	fn rejected_tick_leaves_sequence_untouched() {
		let buffer = BarBuffer::new(10);
		assert_eq!(
			buffer.append(tick(0, 100.0)),
			AppendOutcome::Accepted {
				sequence: 1,
				evicted: 0
			}
		);
		assert_eq!(buffer.append(tick(1, 0.0)), AppendOutcome::Rejected);
		assert_eq!(buffer.append(tick(2, -5.0)), AppendOutcome::Rejected);
		assert_eq!(buffer.sequence(), 1);
		assert_eq!(buffer.len(), 1);
	}

	#[test]
	fn old_snapshot_is_not_affected_by_later_appends() {
		let buffer = BarBuffer::new(2);
		buffer.append(tick(0, 100.0));
		let before = buffer.snapshot();
		buffer.append(tick(1, 101.0));
		buffer.append(tick(2, 102.0));
		assert_eq!(before.len(), 1);
		assert_eq!(before.bars[0].close_price, 100.0);
		assert_eq!(buffer.snapshot().len(), 2);
	}

	#[test]
	fn bucketed_mode_merges_ticks_within_interval() {
		let buffer = BarBuffer::with_mode(10, BarMode::Bucketed { interval_secs: 60 });
		buffer.append(tick(1, 100.0));
		buffer.append(tick(20, 104.0));
		buffer.append(tick(40, 98.0));
		buffer.append(tick(59, 101.0));
		buffer.append(tick(61, 102.0));

		let snapshot = buffer.snapshot();
		assert_eq!(snapshot.len(), 2);
		assert_eq!(snapshot.sequence, 5);

		let first = snapshot.bars[0];
		assert_eq!(first.datetime, at(0));
		assert_eq!(first.open_price, 100.0);
		assert_eq!(first.high_price, 104.0);
		assert_eq!(first.low_price, 98.0);
		assert_eq!(first.close_price, 101.0);
		assert_eq!(first.volume, 4);
		assert!(first.is_consistent());

		let second = snapshot.bars[1];
		assert_eq!(second.datetime, at(60));
		assert_eq!(second.open_price, 102.0);
	}
}
