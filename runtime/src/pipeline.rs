//! 单周期处理：snapshot → compute → detect → evaluate。
//!
//! pipeline 独占 `AlertState`；每个周期结束后以一次引用替换发布只读视图，
//! 展示端只读取视图，不接触任何可变状态。

use std::sync::{Arc, RwLock};

use alert::{Alert, AlertDispatcher, AlertState};
use market::{Feed, SharedSnapshot};
use tickwatch::{IndicatorEngine, IndicatorFrame, Signal, SignalDetector};
use tracing::{debug, info};

/// 单个周期的结果。
#[derive(Debug, Clone, PartialEq)]
pub struct CycleOutcome {
	/// 本周期读取的快照序号。
	pub sequence: u64,
	/// 是否重新计算了指标（序号未变时复用上一周期结果）。
	pub recomputed: bool,
	pub signal: Option<Signal>,
	/// 本周期触发的告警。
	pub alert: Option<Alert>,
}

/// 展示端可见的只读视图。
#[derive(Debug, Clone)]
pub struct PipelineView {
	snapshot: SharedSnapshot,
	frame: Arc<IndicatorFrame>,
	signal: Option<Signal>,
	alerts: Vec<Alert>,
	last_alert_label: Option<String>,
	cycles: u64,
}

impl PipelineView {
	fn initial(snapshot: SharedSnapshot) -> Self {
		Self {
			snapshot,
			frame: Arc::new(IndicatorFrame::default()),
			signal: None,
			alerts: Vec::new(),
			last_alert_label: None,
			cycles: 0,
		}
	}

	pub fn snapshot(&self) -> &SharedSnapshot {
		&self.snapshot
	}

	pub fn frame(&self) -> &IndicatorFrame {
		&self.frame
	}

	pub fn signal(&self) -> Option<&Signal> {
		self.signal.as_ref()
	}

	/// 告警历史，最旧在前。
	pub fn alerts(&self) -> &[Alert] {
		&self.alerts
	}

	pub fn last_alert_label(&self) -> Option<&str> {
		self.last_alert_label.as_deref()
	}

	/// 已完成的周期数。
	pub fn cycles(&self) -> u64 {
		self.cycles
	}
}

/// 视图句柄，可跨线程克隆。
#[derive(Debug, Clone)]
pub struct PipelineViewHandle {
	inner: Arc<RwLock<Arc<PipelineView>>>,
}

impl PipelineViewHandle {
	fn new(view: PipelineView) -> Self {
		Self {
			inner: Arc::new(RwLock::new(Arc::new(view))),
		}
	}

	/// 当前视图；返回的 `Arc` 在下次发布后仍然有效且不变。
	pub fn current(&self) -> Arc<PipelineView> {
		Arc::clone(&self.inner.read().expect("pipeline view poisoned"))
	}

	fn publish(&self, view: PipelineView) {
		*self.inner.write().expect("pipeline view poisoned") = Arc::new(view);
	}
}

pub struct Pipeline {
	feed: Arc<Feed>,
	engine: IndicatorEngine,
	detector: SignalDetector,
	dispatcher: AlertDispatcher,
	state: AlertState,
	last_sequence: Option<u64>,
	frame: Arc<IndicatorFrame>,
	signal: Option<Signal>,
	cycles: u64,
	view: PipelineViewHandle,
}

impl Pipeline {
	pub fn new(
		feed: Arc<Feed>,
		engine: IndicatorEngine,
		dispatcher: AlertDispatcher,
		state: AlertState,
	) -> Self {
		let view = PipelineViewHandle::new(PipelineView::initial(feed.snapshot()));
		Self {
			feed,
			engine,
			detector: SignalDetector,
			dispatcher,
			state,
			last_sequence: None,
			frame: Arc::new(IndicatorFrame::default()),
			signal: None,
			cycles: 0,
			view,
		}
	}

	pub fn feed(&self) -> &Arc<Feed> {
		&self.feed
	}

	pub fn alert_state(&self) -> &AlertState {
		&self.state
	}

	pub fn view(&self) -> PipelineViewHandle {
		self.view.clone()
	}

	pub fn cycles(&self) -> u64 {
		self.cycles
	}

	/// 执行一个完整周期。快照序号未变时不重新计算，也不会再次评估告警。
	pub async fn run_cycle(&mut self) -> CycleOutcome {
		let snapshot = self.feed.snapshot();
		let sequence = snapshot.sequence;
		self.cycles += 1;

		if self.last_sequence == Some(sequence) {
			debug!(sequence, "snapshot unchanged, reusing frame");
			self.publish(snapshot);
			return CycleOutcome {
				sequence,
				recomputed: false,
				signal: self.signal,
				alert: None,
			};
		}

		let frame = self.engine.compute(&snapshot.bars);
		let signal = self.detector.detect(&frame);
		if signal != self.signal {
			match signal {
				Some(signal) => info!(instrument = %self.feed.instrument, %signal, sequence, "signal changed"),
				None => debug!(sequence, bars = frame.len(), "warming up"),
			}
		}

		let alert = self.dispatcher.evaluate(&mut self.state, signal).await;

		self.last_sequence = Some(sequence);
		self.frame = Arc::new(frame);
		self.signal = signal;
		self.publish(snapshot);

		CycleOutcome {
			sequence,
			recomputed: true,
			signal,
			alert,
		}
	}

	fn publish(&self, snapshot: SharedSnapshot) {
		self.view.publish(PipelineView {
			snapshot,
			frame: Arc::clone(&self.frame),
			signal: self.signal,
			alerts: self.state.history().iter().cloned().collect(),
			last_alert_label: self.state.last_label().map(str::to_string),
			cycles: self.cycles,
		});
	}
}
