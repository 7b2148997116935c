//! 告警状态。
//!
//! 由 pipeline 独占持有并显式传入 dispatcher，不使用任何进程级全局变量。

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tickwatch::Signal;

/// 一次已触发（已尝试发送）的告警。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
	pub signal: Signal,
	pub label: String,
	pub message: String,
	pub datetime: DateTime<Utc>,
}

impl Alert {
	pub fn new(instrument: &str, signal: Signal, datetime: DateTime<Utc>) -> Self {
		let label = signal.label();
		Self {
			message: format!("{instrument} Alert: {label}"),
			signal,
			label,
			datetime,
		}
	}
}

#[derive(Debug, Clone)]
pub struct AlertState {
	last_signal: Option<Signal>,
	last_dispatched: Option<Alert>,
	history: VecDeque<Alert>,
	history_limit: usize,
}

impl Default for AlertState {
	fn default() -> Self {
		Self::with_history_limit(64)
	}
}

impl AlertState {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_history_limit(history_limit: usize) -> Self {
		let history_limit = history_limit.max(1);
		Self {
			last_signal: None,
			last_dispatched: None,
			history: VecDeque::with_capacity(history_limit),
			history_limit,
		}
	}

	/// 最近一次观察到的（已预热）信号。
	pub fn last_signal(&self) -> Option<&Signal> {
		self.last_signal.as_ref()
	}

	pub fn last_dispatched(&self) -> Option<&Alert> {
		self.last_dispatched.as_ref()
	}

	pub fn last_label(&self) -> Option<&str> {
		self.last_dispatched.as_ref().map(|x| x.label.as_str())
	}

	/// 告警历史，最旧在前。
	pub fn history(&self) -> &VecDeque<Alert> {
		&self.history
	}

	pub(crate) fn observe(&mut self, signal: Signal) -> Option<Signal> {
		self.last_signal.replace(signal)
	}

	pub(crate) fn record(&mut self, alert: Alert) {
		if self.history.len() == self.history_limit {
			self.history.pop_front();
		}
		self.history.push_back(alert.clone());
		self.last_dispatched = Some(alert);
	}
}
