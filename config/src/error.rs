use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("config read failed: {0}")]
	Io(#[from] std::io::Error),
	#[error("invalid yaml: {0}")]
	Yaml(#[from] serde_yaml::Error),
	#[error("invalid json: {0}")]
	Json(#[from] serde_json::Error),
	#[error("unsupported config format: {0}")]
	UnsupportedFormat(String),
	#[error("invalid config: {0}")]
	Invalid(String),
}
