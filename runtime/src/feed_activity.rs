//! feed 活动：独立线程持续拉取 adapter 报价并写入 `Feed`。

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use broker::{BrokerError, QuoteAdapter, pump_quotes};
use market::Feed;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedActivitySettings {
	/// 单次最多摄入的报价数。
	pub batch: usize,
	/// 无报价或出错后的休眠时间。
	pub idle: Duration,
}

impl Default for FeedActivitySettings {
	fn default() -> Self {
		Self {
			batch: 256,
			idle: Duration::from_millis(50),
		}
	}
}

/// feed 线程退出时的累计统计。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedActivityReport {
	pub polled: usize,
	pub accepted: usize,
	pub rejected: usize,
	pub errors: usize,
}

/// 启动 feed 线程。`stop` 置位后线程在当前批次结束时退出。
pub fn spawn_feed_activity<A>(
	feed: Arc<Feed>,
	mut adapter: A,
	stop: Arc<AtomicBool>,
	settings: FeedActivitySettings,
) -> JoinHandle<FeedActivityReport>
where
	A: QuoteAdapter + 'static,
{
	thread::spawn(move || {
		let mut report = FeedActivityReport::default();
		let batch = settings.batch.max(1);

		if let Err(error) = adapter.connect() {
			report.errors += 1;
			warn!(venue = adapter.venue(), %error, "initial connect failed");
		}
		info!(venue = adapter.venue(), instrument = %feed.instrument, "feed activity started");

		while !stop.load(Ordering::Acquire) {
			match pump_quotes(&feed, &mut adapter, batch) {
				Ok(stats) => {
					report.polled += stats.polled;
					report.accepted += stats.accepted;
					report.rejected += stats.rejected;
					if stats.polled < batch {
						thread::sleep(settings.idle);
					}
				}
				Err(BrokerError::NotConnected) => {
					report.errors += 1;
					if let Err(error) = adapter.connect() {
						debug!(venue = adapter.venue(), %error, "reconnect failed");
					}
					thread::sleep(settings.idle);
				}
				Err(error) => {
					report.errors += 1;
					warn!(venue = adapter.venue(), %error, "feed poll failed");
					thread::sleep(settings.idle);
				}
			}
		}

		info!(
			polled = report.polled,
			accepted = report.accepted,
			rejected = report.rejected,
			errors = report.errors,
			"feed activity stopped"
		);
		report
	})
}
