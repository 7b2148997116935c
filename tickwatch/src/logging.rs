use tracing::Level;
use tracing_subscriber::EnvFilter;

pub fn init_logging() {
    init_logging_with(Level::INFO);
}

/// `RUST_LOG` directives take precedence over `level`.
pub fn init_logging_with(level: Level) {
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
