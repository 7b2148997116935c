use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

use crate::pipeline::Pipeline;

const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// 按固定间隔驱动 pipeline，直到 `shutdown` 变为 `true` 或发送端被丢弃。
///
/// 周期在 select 分支体内执行，已开始的周期总会完整结束后才检查停止信号。
/// 返回 pipeline 以便调用方检查最终状态。间隔下限为 1 ms。
pub async fn run_pipeline(
	mut pipeline: Pipeline,
	interval: Duration,
	mut shutdown: watch::Receiver<bool>,
) -> Pipeline {
	let interval = interval.max(MIN_INTERVAL);
	let mut ticker = time::interval(interval);
	ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
	info!(interval_ms = interval.as_millis() as u64, "pipeline scheduler started");

	loop {
		if *shutdown.borrow() {
			break;
		}

		tokio::select! {
			biased;
			changed = shutdown.changed() => {
				if changed.is_err() || *shutdown.borrow() {
					break;
				}
			}
			_ = ticker.tick() => {
				let outcome = pipeline.run_cycle().await;
				debug!(
					sequence = outcome.sequence,
					recomputed = outcome.recomputed,
					alert = outcome.alert.is_some(),
					"cycle complete"
				);
			}
		}
	}

	info!(cycles = pipeline.cycles(), "pipeline scheduler stopped");
	pipeline
}
