//! 通知通道。
//!
//! 核心只依赖 `Notifier` 这一出站接口；具体投递方式（Telegram HTTP、日志）
//! 均为可替换实现，发送失败由调用方记录后丢弃。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::NotifyError;

pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

#[async_trait]
pub trait Notifier: Send + Sync {
	async fn send(&self, text: &str) -> Result<(), NotifyError>;
}

/// 通知配置。凭据原样透传，不做任何解析。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
	pub bot_token: Option<String>,
	pub chat_id: Option<String>,
	pub api_base: String,
	pub timeout_secs: u64,
	pub history_limit: usize,
}

impl Default for NotifyConfig {
	fn default() -> Self {
		Self {
			bot_token: None,
			chat_id: None,
			api_base: TELEGRAM_API_BASE.to_string(),
			timeout_secs: 5,
			history_limit: 64,
		}
	}
}

impl NotifyConfig {
	pub fn timeout(&self) -> Duration {
		Duration::from_secs(self.timeout_secs.max(1))
	}

	pub fn has_credentials(&self) -> bool {
		matches!(
			(self.bot_token.as_deref(), self.chat_id.as_deref()),
			(Some(token), Some(chat)) if !token.is_empty() && !chat.is_empty()
		)
	}
}

/// 有凭据时使用 Telegram，否则退化为日志输出。
pub fn build_notifier(config: &NotifyConfig) -> Result<Arc<dyn Notifier>, NotifyError> {
	match (config.bot_token.as_deref(), config.chat_id.as_deref()) {
		(Some(token), Some(chat_id)) if config.has_credentials() => Ok(Arc::new(
			TelegramNotifier::with_base_url(&config.api_base, token, chat_id, config.timeout())?,
		)),
		_ => Ok(Arc::new(LogNotifier)),
	}
}

/// Telegram bot `sendMessage` 通道。
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
	client: reqwest::Client,
	endpoint: String,
	chat_id: String,
}

impl TelegramNotifier {
	pub fn new(bot_token: &str, chat_id: impl Into<String>) -> Result<Self, NotifyError> {
		Self::with_base_url(TELEGRAM_API_BASE, bot_token, chat_id, Duration::from_secs(5))
	}

	pub fn with_base_url(
		api_base: &str,
		bot_token: &str,
		chat_id: impl Into<String>,
		timeout: Duration,
	) -> Result<Self, NotifyError> {
		let client = reqwest::Client::builder().timeout(timeout).build()?;
		Ok(Self {
			client,
			endpoint: send_message_url(api_base, bot_token),
			chat_id: chat_id.into(),
		})
	}
}

#[async_trait]
impl Notifier for TelegramNotifier {
	async fn send(&self, text: &str) -> Result<(), NotifyError> {
		let response = self
			.client
			.post(&self.endpoint)
			.form(&[("chat_id", self.chat_id.as_str()), ("text", text)])
			.send()
			.await?;

		let status = response.status();
		if !status.is_success() {
			return Err(NotifyError::Status(status.as_u16()));
		}

		let body: TelegramReply = response.json().await?;
		if !body.ok {
			return Err(NotifyError::Rejected(
				body.description.unwrap_or_else(|| "unknown reason".to_string()),
			));
		}
		Ok(())
	}
}

/// `sendMessage` 应答中关心的字段。
#[derive(Debug, Deserialize)]
struct TelegramReply {
	ok: bool,
	#[serde(default)]
	description: Option<String>,
}

/// 仅写日志的通道，用于未配置凭据的场景。
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
	async fn send(&self, text: &str) -> Result<(), NotifyError> {
		info!(target: "alert", message = text, "alert raised");
		Ok(())
	}
}

fn send_message_url(api_base: &str, bot_token: &str) -> String {
	format!("{}/bot{}/sendMessage", api_base.trim_end_matches('/'), bot_token)
}
