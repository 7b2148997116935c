use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
	#[error("http error: {0}")]
	Http(#[from] reqwest::Error),
	#[error("transport answered with status {0}")]
	Status(u16),
	#[error("send timed out after {0:?}")]
	Timeout(Duration),
	#[error("transport rejected message: {0}")]
	Rejected(String),
}
