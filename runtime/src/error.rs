use config::ConfigError;
use thiserror::Error;
use tickwatch::IndicatorError;

#[derive(Debug, Error)]
pub enum RuntimeError {
	#[error(transparent)]
	Config(#[from] ConfigError),
	#[error("indicator setup failed: {0}")]
	Indicator(#[from] IndicatorError),
	#[error("runtime task failed: {0}")]
	Join(#[from] tokio::task::JoinError),
	#[error("feed activity thread panicked")]
	FeedPanicked,
}
