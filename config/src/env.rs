//! 环境变量覆盖。
//!
//! 所有键以 `TICKWATCH_` 为前缀；无法解析的值被忽略并记录 warn，保留文件或默认值。

use broker::AdapterKind;
use market::BarMode;
use tracing::warn;

use crate::AppConfig;

pub const ENV_INSTRUMENT: &str = "TICKWATCH_INSTRUMENT";
pub const ENV_BUFFER_CAPACITY: &str = "TICKWATCH_BUFFER_CAPACITY";
pub const ENV_BAR_INTERVAL_SECS: &str = "TICKWATCH_BAR_INTERVAL_SECS";
pub const ENV_POLL_INTERVAL_SECS: &str = "TICKWATCH_POLL_INTERVAL_SECS";
pub const ENV_TELEGRAM_BOT_TOKEN: &str = "TICKWATCH_TELEGRAM_BOT_TOKEN";
pub const ENV_TELEGRAM_CHAT_ID: &str = "TICKWATCH_TELEGRAM_CHAT_ID";
pub const ENV_FEED: &str = "TICKWATCH_FEED";
pub const ENV_WS_ENDPOINT: &str = "TICKWATCH_WS_ENDPOINT";
pub const ENV_SYMBOL: &str = "TICKWATCH_SYMBOL";

impl AppConfig {
	/// 使用进程环境变量覆盖配置。
	pub fn apply_process_env(&mut self) {
		self.apply_env(|key| std::env::var(key).ok());
	}

	/// 使用给定查找函数覆盖配置，便于测试注入。
	pub fn apply_env<F>(&mut self, lookup: F)
	where
		F: Fn(&str) -> Option<String>,
	{
		if let Some(value) = non_empty(&lookup, ENV_INSTRUMENT) {
			self.instrument = value;
		}
		if let Some(value) = env_usize(&lookup, ENV_BUFFER_CAPACITY) {
			self.buffer.capacity = value;
		}
		if let Some(value) = lookup(ENV_BAR_INTERVAL_SECS) {
			match value.trim().parse::<u64>() {
				Ok(0) => self.buffer.mode = BarMode::TickAsBar,
				Ok(interval_secs) => self.buffer.mode = BarMode::Bucketed { interval_secs },
				Err(_) => warn!(key = ENV_BAR_INTERVAL_SECS, %value, "ignoring unparsable override"),
			}
		}
		if let Some(value) = env_u64(&lookup, ENV_POLL_INTERVAL_SECS) {
			self.schedule.poll_interval_secs = value;
		}
		if let Some(value) = non_empty(&lookup, ENV_TELEGRAM_BOT_TOKEN) {
			self.notify.bot_token = Some(value);
		}
		if let Some(value) = non_empty(&lookup, ENV_TELEGRAM_CHAT_ID) {
			self.notify.chat_id = Some(value);
		}
		if let Some(value) = non_empty(&lookup, ENV_FEED) {
			match AdapterKind::parse(&value) {
				Some(kind) => self.feed.kind = kind,
				None => warn!(key = ENV_FEED, %value, "ignoring unknown feed kind"),
			}
		}
		if let Some(value) = non_empty(&lookup, ENV_WS_ENDPOINT) {
			self.feed.ws.endpoint = value;
		}
		if let Some(value) = lookup(ENV_SYMBOL) {
			if value.contains(',') {
				warn!(key = ENV_SYMBOL, %value, "one feed symbol per instrument, ignoring list");
			} else if !value.trim().is_empty() {
				self.feed.ws.symbol = value.trim().to_string();
			}
		}
	}
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
	F: Fn(&str) -> Option<String>,
{
	lookup(key)
		.map(|value| value.trim().to_string())
		.filter(|value| !value.is_empty())
}

fn env_usize<F>(lookup: &F, key: &str) -> Option<usize>
where
	F: Fn(&str) -> Option<String>,
{
	let value = lookup(key)?;
	match value.trim().parse::<usize>() {
		Ok(parsed) if parsed > 0 => Some(parsed),
		_ => {
			warn!(key, %value, "ignoring unparsable override");
			None
		}
	}
}

fn env_u64<F>(lookup: &F, key: &str) -> Option<u64>
where
	F: Fn(&str) -> Option<String>,
{
	env_usize(lookup, key).map(|value| value as u64)
}
