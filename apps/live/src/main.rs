use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use config::AppConfig;
use runtime::{LiveRuntime, PipelineViewHandle};
use tracing::{debug, info, warn};

const ENV_CONFIG_PATH: &str = "TICKWATCH_CONFIG";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
	tickwatch::init_logging();

	let path = std::env::args_os()
		.nth(1)
		.map(PathBuf::from)
		.or_else(|| std::env::var_os(ENV_CONFIG_PATH).map(PathBuf::from));
	let config = AppConfig::resolve(path.as_deref())?;
	info!(
		instrument = %config.instrument,
		feed = ?config.feed.kind,
		config = ?path,
		"tickwatch starting"
	);

	let notifier = alert::build_notifier(&config.notify)?;
	if !config.notify.has_credentials() {
		warn!("telegram credentials missing, alerts go to the log only");
	}
	let adapter = broker::build_adapter(&config.feed);

	let live = LiveRuntime::start(&config, adapter, notifier)?;
	let display = tokio::spawn(report_view(live.view(), config.schedule.poll_interval()));

	tokio::signal::ctrl_c().await?;
	info!("shutdown requested");

	display.abort();
	let report = live.shutdown().await?;
	info!(
		cycles = report.cycles,
		alerts = report.alerts,
		accepted = report.feed.accepted,
		rejected = report.feed.rejected,
		"tickwatch stopped"
	);
	Ok(())
}

/// Console stand-in for the dashboard: logs the latest row of each
/// published view.
async fn report_view(view: PipelineViewHandle, every: Duration) {
	let mut ticker = tokio::time::interval(every);
	let mut last_cycle = 0;
	loop {
		ticker.tick().await;
		let current = view.current();
		if current.cycles() == last_cycle {
			continue;
		}
		last_cycle = current.cycles();

		let Some(row) = current.frame().last_row() else {
			info!(
				bars = current.snapshot().len(),
				warm_up = current.frame().warm_up(),
				"warming up"
			);
			continue;
		};

		info!(
			close = row.close,
			ema_fast = row.ema_fast,
			ema_slow = row.ema_slow,
			band_upper = row.band_upper,
			band_lower = row.band_lower,
			rsi = ?row.rsi,
			signal = current.signal().map(|s| s.label()).unwrap_or_default(),
			last_alert = current.last_alert_label().unwrap_or("-"),
			"latest"
		);

		match current.frame().to_dataframe() {
			Ok(frame) => debug!("indicator frame tail\n{}", frame.tail(Some(5))),
			Err(error) => warn!(%error, "indicator frame export failed"),
		}
	}
}
