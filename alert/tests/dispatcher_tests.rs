use std::sync::{Arc, Mutex};
use std::time::Duration;

use alert::{AlertDispatcher, AlertState, Notifier, NotifyError};
use async_trait::async_trait;
use tickwatch::{Extreme, Signal, Trend};

#[derive(Default)]
struct RecordingNotifier {
	sent: Mutex<Vec<String>>,
}

impl RecordingNotifier {
	fn sent(&self) -> Vec<String> {
		self.sent.lock().expect("recording lock").clone()
	}
}

#[async_trait]
impl Notifier for RecordingNotifier {
	async fn send(&self, text: &str) -> Result<(), NotifyError> {
		self.sent.lock().expect("recording lock").push(text.to_string());
		Ok(())
	}
}

#[derive(Default)]
struct FailingNotifier {
	attempts: Mutex<u32>,
}

#[async_trait]
impl Notifier for FailingNotifier {
	async fn send(&self, _text: &str) -> Result<(), NotifyError> {
		*self.attempts.lock().expect("attempts lock") += 1;
		Err(NotifyError::Status(502))
	}
}

struct StalledNotifier;

#[async_trait]
impl Notifier for StalledNotifier {
	async fn send(&self, _text: &str) -> Result<(), NotifyError> {
		tokio::time::sleep(Duration::from_secs(600)).await;
		Ok(())
	}
}

fn signal(trend: Trend, extreme: Option<Extreme>) -> Option<Signal> {
	Some(Signal { trend, extreme })
}

#[tokio::test]
async fn same_breakout_twice_sends_once() {
	let notifier = Arc::new(RecordingNotifier::default());
	let dispatcher = AlertDispatcher::new("Nifty 50", notifier.clone());
	let mut state = AlertState::new();

	let breakout = signal(Trend::Bullish, Some(Extreme::Breakout));
	assert!(dispatcher.evaluate(&mut state, breakout).await.is_some());
	assert!(dispatcher.evaluate(&mut state, breakout).await.is_none());

	assert_eq!(notifier.sent(), vec!["Nifty 50 Alert: Bullish Trend | Breakout".to_string()]);
	assert_eq!(state.last_label(), Some("Bullish Trend | Breakout"));
}

#[tokio::test]
async fn not_ready_is_never_alert_worthy() {
	let notifier = Arc::new(RecordingNotifier::default());
	let dispatcher = AlertDispatcher::new("Nifty 50", notifier.clone());
	let mut state = AlertState::new();

	assert!(dispatcher.evaluate(&mut state, None).await.is_none());
	assert!(state.last_signal().is_none());
	assert!(state.history().is_empty());
	assert!(notifier.sent().is_empty());
}

#[tokio::test]
async fn fires_on_each_transition_into_an_extreme() {
	let notifier = Arc::new(RecordingNotifier::default());
	let dispatcher = AlertDispatcher::new("Nifty 50", notifier.clone());
	let mut state = AlertState::new();

	let sequence = [
		signal(Trend::Bullish, None),
		signal(Trend::Bullish, Some(Extreme::Breakout)),
		signal(Trend::Bullish, Some(Extreme::Breakout)),
		None,
		signal(Trend::Bullish, Some(Extreme::Breakout)),
		signal(Trend::Bullish, None),
		signal(Trend::Bullish, Some(Extreme::Breakout)),
		signal(Trend::Bearish, Some(Extreme::Breakout)),
		signal(Trend::Bearish, Some(Extreme::Breakdown)),
		signal(Trend::Bearish, Some(Extreme::Breakdown)),
	];
	for item in sequence {
		let _ = dispatcher.evaluate(&mut state, item).await;
	}

	assert_eq!(
		notifier.sent(),
		vec![
			"Nifty 50 Alert: Bullish Trend | Breakout".to_string(),
			"Nifty 50 Alert: Bullish Trend | Breakout".to_string(),
			"Nifty 50 Alert: Bearish Trend | Breakout".to_string(),
			"Nifty 50 Alert: Bearish Trend | Breakdown".to_string(),
		]
	);
	assert_eq!(state.history().len(), 4);
}

#[tokio::test]
async fn failed_send_is_not_retried() {
	let notifier = Arc::new(FailingNotifier::default());
	let dispatcher = AlertDispatcher::new("Nifty 50", notifier.clone());
	let mut state = AlertState::new();

	let breakdown = signal(Trend::Bearish, Some(Extreme::Breakdown));
	let alert = dispatcher.evaluate(&mut state, breakdown).await;
	assert_eq!(alert.map(|x| x.label), Some("Bearish Trend | Breakdown".to_string()));
	assert!(dispatcher.evaluate(&mut state, breakdown).await.is_none());
	assert!(dispatcher.evaluate(&mut state, breakdown).await.is_none());

	assert_eq!(*notifier.attempts.lock().expect("attempts lock"), 1);
	assert_eq!(state.last_label(), Some("Bearish Trend | Breakdown"));
}

#[tokio::test(start_paused = true)]
async fn stalled_transport_times_out_and_keeps_state() {
	let dispatcher =
		AlertDispatcher::with_timeout("Nifty 50", Arc::new(StalledNotifier), Duration::from_secs(3));
	let mut state = AlertState::new();

	let breakout = signal(Trend::Bullish, Some(Extreme::Breakout));
	let started = tokio::time::Instant::now();
	assert!(dispatcher.evaluate(&mut state, breakout).await.is_some());
	assert!(started.elapsed() < Duration::from_secs(10));
	assert!(dispatcher.evaluate(&mut state, breakout).await.is_none());
	assert_eq!(state.history().len(), 1);
}

#[tokio::test]
async fn history_is_bounded() {
	let dispatcher = AlertDispatcher::new("Nifty 50", Arc::new(RecordingNotifier::default()));
	let mut state = AlertState::with_history_limit(2);

	for _ in 0..3 {
		let _ = dispatcher
			.evaluate(&mut state, signal(Trend::Bullish, Some(Extreme::Breakout)))
			.await;
		let _ = dispatcher
			.evaluate(&mut state, signal(Trend::Bearish, Some(Extreme::Breakdown)))
			.await;
	}

	assert_eq!(state.history().len(), 2);
	assert_eq!(state.last_label(), Some("Bearish Trend | Breakdown"));
}
