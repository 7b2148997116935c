//! 告警分发。
//!
//! 仅在信号标签发生变化且包含 Breakout/Breakdown 时发送一次通知。
//! 状态在发送前更新，失败的发送只记日志，不回滚也不重试。

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tickwatch::Signal;
use tracing::{info, warn};

use crate::error::NotifyError;
use crate::notify::Notifier;
use crate::state::{Alert, AlertState};

/// `signal` 是否应触发通知：需包含极值标签，且与上一次观察到的信号不同。
pub fn should_dispatch(previous: Option<&Signal>, signal: &Signal) -> bool {
	signal.is_alert_worthy() && previous != Some(signal)
}

pub struct AlertDispatcher {
	instrument: String,
	notifier: Arc<dyn Notifier>,
	timeout: Duration,
}

impl AlertDispatcher {
	pub fn new(instrument: impl Into<String>, notifier: Arc<dyn Notifier>) -> Self {
		Self::with_timeout(instrument, notifier, Duration::from_secs(5))
	}

	pub fn with_timeout(
		instrument: impl Into<String>,
		notifier: Arc<dyn Notifier>,
		timeout: Duration,
	) -> Self {
		Self {
			instrument: instrument.into(),
			notifier,
			timeout,
		}
	}

	pub fn instrument(&self) -> &str {
		&self.instrument
	}

	/// 评估一次信号，返回本次触发的告警（若有）。
	///
	/// `None` 信号（未预热）永远不会触发，也不会改变状态。
	pub async fn evaluate(&self, state: &mut AlertState, signal: Option<Signal>) -> Option<Alert> {
		let signal = signal?;
		let previous = state.observe(signal);
		if !should_dispatch(previous.as_ref(), &signal) {
			return None;
		}

		let alert = Alert::new(&self.instrument, signal, Utc::now());
		state.record(alert.clone());

		match self.deliver(&alert.message).await {
			Ok(()) => info!(instrument = %self.instrument, label = %alert.label, "alert sent"),
			Err(error) => warn!(
				instrument = %self.instrument,
				label = %alert.label,
				%error,
				"alert delivery failed, dropping"
			),
		}
		Some(alert)
	}

	async fn deliver(&self, text: &str) -> Result<(), NotifyError> {
		match tokio::time::timeout(self.timeout, self.notifier.send(text)).await {
			Ok(result) => result,
			Err(_) => Err(NotifyError::Timeout(self.timeout)),
		}
	}
}
