//! 运行时装配与有序停机。

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

use alert::{AlertDispatcher, AlertState, Notifier};
use broker::QuoteAdapter;
use config::AppConfig;
use market::Feed;
use tickwatch::IndicatorEngine;
use tokio::sync::watch;
use tokio::task;
use tracing::info;

use crate::error::RuntimeError;
use crate::feed_activity::{FeedActivityReport, FeedActivitySettings, spawn_feed_activity};
use crate::pipeline::{Pipeline, PipelineViewHandle};
use crate::scheduler::run_pipeline;

/// 停机后的汇总。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeReport {
	pub feed: FeedActivityReport,
	pub cycles: u64,
	pub alerts: usize,
	pub sequence: u64,
}

pub struct LiveRuntime {
	feed: Arc<Feed>,
	view: PipelineViewHandle,
	stop_feed: Arc<AtomicBool>,
	feed_thread: JoinHandle<FeedActivityReport>,
	shutdown: watch::Sender<bool>,
	pipeline: task::JoinHandle<Pipeline>,
}

impl LiveRuntime {
	/// 启动 feed 线程与 pipeline 调度任务。必须在 tokio runtime 内调用。
	pub fn start<A>(
		config: &AppConfig,
		adapter: A,
		notifier: Arc<dyn Notifier>,
	) -> Result<Self, RuntimeError>
	where
		A: QuoteAdapter + 'static,
	{
		config.validate()?;
		let engine = IndicatorEngine::new(config.indicators.clone())?;

		let feed = Arc::new(Feed::with_config(config.instrument.clone(), config.buffer));
		let dispatcher =
			AlertDispatcher::with_timeout(config.instrument.clone(), notifier, config.notify.timeout());
		let state = AlertState::with_history_limit(config.notify.history_limit);
		let pipeline = Pipeline::new(Arc::clone(&feed), engine, dispatcher, state);
		let view = pipeline.view();

		let stop_feed = Arc::new(AtomicBool::new(false));
		let feed_thread = spawn_feed_activity(
			Arc::clone(&feed),
			adapter,
			Arc::clone(&stop_feed),
			FeedActivitySettings {
				batch: config.schedule.feed_batch,
				idle: config.schedule.feed_idle(),
			},
		);

		let (shutdown, shutdown_rx) = watch::channel(false);
		let pipeline = tokio::spawn(run_pipeline(
			pipeline,
			config.schedule.poll_interval(),
			shutdown_rx,
		));

		info!(
			instrument = %config.instrument,
			capacity = config.buffer.capacity,
			poll_interval_secs = config.schedule.poll_interval_secs,
			"live runtime started"
		);

		Ok(Self {
			feed,
			view,
			stop_feed,
			feed_thread,
			shutdown,
			pipeline,
		})
	}

	pub fn feed(&self) -> &Arc<Feed> {
		&self.feed
	}

	pub fn view(&self) -> PipelineViewHandle {
		self.view.clone()
	}

	/// 先停止 feed 线程，再让 pipeline 完成当前周期后退出。
	pub async fn shutdown(self) -> Result<RuntimeReport, RuntimeError> {
		self.stop_feed.store(true, Ordering::Release);
		let feed_thread = self.feed_thread;
		let feed = task::spawn_blocking(move || feed_thread.join())
			.await?
			.map_err(|_| RuntimeError::FeedPanicked)?;

		// 发送失败说明调度任务已经退出，直接等待即可
		let _ = self.shutdown.send(true);
		let pipeline = self.pipeline.await?;

		let report = RuntimeReport {
			feed,
			cycles: pipeline.cycles(),
			alerts: pipeline.alert_state().history().len(),
			sequence: self.feed.sequence(),
		};
		info!(
			cycles = report.cycles,
			alerts = report.alerts,
			sequence = report.sequence,
			"live runtime stopped"
		);
		Ok(report)
	}
}
