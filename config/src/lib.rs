//! `config` crate 入口。
//!
//! 应用配置的唯一来源：文件（YAML / JSON）→ 环境变量覆盖 → 校验。
//! 各子配置沿用所属 crate 的类型，这里只负责组合与一致性检查。

mod env;
mod error;

use std::fs;
use std::path::Path;
use std::time::Duration;

use alert::NotifyConfig;
use broker::{AdapterConfig, AdapterKind};
use market::{BarMode, FeedConfig};
use serde::{Deserialize, Serialize};
use tickwatch::{Const, IndicatorConfig};

pub use env::{
	ENV_BAR_INTERVAL_SECS, ENV_BUFFER_CAPACITY, ENV_FEED, ENV_INSTRUMENT, ENV_POLL_INTERVAL_SECS,
	ENV_SYMBOL, ENV_TELEGRAM_BOT_TOKEN, ENV_TELEGRAM_CHAT_ID, ENV_WS_ENDPOINT,
};
pub use error::ConfigError;

/// 调度配置。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
	/// pipeline 周期（秒）。
	pub poll_interval_secs: u64,
	/// feed 线程无报价时的休眠间隔（毫秒）。
	pub feed_idle_ms: u64,
	/// feed 线程单次最多摄入的报价数。
	pub feed_batch: usize,
}

impl Default for ScheduleConfig {
	fn default() -> Self {
		Self {
			poll_interval_secs: Const::POLL_INTERVAL_SECS,
			feed_idle_ms: 50,
			feed_batch: 256,
		}
	}
}

impl ScheduleConfig {
	pub fn poll_interval(&self) -> Duration {
		Duration::from_secs(self.poll_interval_secs)
	}

	pub fn feed_idle(&self) -> Duration {
		Duration::from_millis(self.feed_idle_ms)
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
	/// 标的名称，出现在告警文本中。
	pub instrument: String,
	pub buffer: FeedConfig,
	pub indicators: IndicatorConfig,
	pub schedule: ScheduleConfig,
	pub notify: NotifyConfig,
	pub feed: AdapterConfig,
}

impl Default for AppConfig {
	fn default() -> Self {
		Self {
			instrument: "NIFTY 50".to_string(),
			buffer: FeedConfig::default(),
			indicators: IndicatorConfig::default(),
			schedule: ScheduleConfig::default(),
			notify: NotifyConfig::default(),
			feed: AdapterConfig::default(),
		}
	}
}

impl AppConfig {
	/// 按扩展名读取 YAML 或 JSON 配置文件。
	pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let text = fs::read_to_string(path)?;

		match path.extension().and_then(|x| x.to_str()) {
			Some("json") => Self::from_json_str(&text),
			Some("yaml") | Some("yml") => Self::from_yaml_str(&text),
			other => Err(ConfigError::UnsupportedFormat(
				other.unwrap_or_default().to_string(),
			)),
		}
	}

	pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
		// 空文档视为全部默认值
		if text.trim().is_empty() {
			return Ok(Self::default());
		}
		Ok(serde_yaml::from_str(text)?)
	}

	pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
		Ok(serde_json::from_str(text)?)
	}

	/// 运行时入口：可选文件 → 进程环境变量 → 校验。
	pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
		let mut config = match path {
			Some(path) => Self::load(path)?,
			None => Self::default(),
		};
		config.apply_process_env();
		config.validate()?;
		Ok(config)
	}

	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.instrument.trim().is_empty() {
			return Err(invalid("instrument must not be empty"));
		}

		self.indicators
			.validate()
			.map_err(|error| ConfigError::Invalid(error.to_string()))?;

		let warm_up = self.indicators.warm_up();
		if self.buffer.capacity < warm_up {
			return Err(ConfigError::Invalid(format!(
				"buffer capacity {} is below the indicator warm-up of {warm_up} bars",
				self.buffer.capacity
			)));
		}

		if let BarMode::Bucketed { interval_secs: 0 } = self.buffer.mode {
			return Err(invalid("bucketed bar interval must be positive"));
		}

		if self.schedule.poll_interval_secs == 0 {
			return Err(invalid("poll interval must be positive"));
		}
		if self.schedule.feed_batch == 0 {
			return Err(invalid("feed batch must be positive"));
		}

		if self.feed.kind == AdapterKind::Ws {
			if self.feed.ws.endpoint.trim().is_empty() {
				return Err(invalid("ws feed requires an endpoint"));
			}
			let symbol = self.feed.ws.symbol.trim();
			if symbol.is_empty() {
				return Err(invalid("ws feed requires a symbol"));
			}
			if symbol.contains(',') {
				return Err(invalid("ws feed follows exactly one symbol"));
			}
		}
		Ok(())
	}
}

fn invalid(message: &str) -> ConfigError {
	ConfigError::Invalid(message.to_string())
}
