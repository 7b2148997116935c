//! `alert` crate 入口。
//!
//! - `state`：告警状态与历史。
//! - `dispatcher`：去重判定与单次发送。
//! - `notify`：出站通知接口及其实现。

mod dispatcher;
mod error;
mod notify;
mod state;

pub use dispatcher::{AlertDispatcher, should_dispatch};
pub use error::NotifyError;
pub use notify::{LogNotifier, Notifier, NotifyConfig, TELEGRAM_API_BASE, TelegramNotifier, build_notifier};
pub use state::{Alert, AlertState};
