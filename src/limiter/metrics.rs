// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::_prelude::*;

/// Thread-safe counters for limiter calls.
#[derive(Debug, Default)]
pub struct LimiterMetrics {
	attempts: AtomicU64,
	success: AtomicU64,
	failure: AtomicU64,
	rejected: AtomicU64,
	waits: AtomicU64,
	interrupted: AtomicU64,
	waited_nanos: AtomicU64,
	tokens_charged: AtomicU64,
}
impl LimiterMetrics {
	/// Returns the total number of calls.
	pub fn attempts(&self) -> u64 {
		self.attempts.load(Ordering::Relaxed)
	}

	/// Returns the number of calls that returned a completion.
	pub fn successes(&self) -> u64 {
		self.success.load(Ordering::Relaxed)
	}

	/// Returns the number of calls whose downstream request failed.
	pub fn failures(&self) -> u64 {
		self.failure.load(Ordering::Relaxed)
	}

	/// Returns the number of calls whose messages were rejected before any budget check.
	pub fn rejected(&self) -> u64 {
		self.rejected.load(Ordering::Relaxed)
	}

	/// Returns the number of calls that had to wait for the window to roll over.
	pub fn waits(&self) -> u64 {
		self.waits.load(Ordering::Relaxed)
	}

	/// Returns the number of waits cut short by cancellation.
	pub fn interrupted(&self) -> u64 {
		self.interrupted.load(Ordering::Relaxed)
	}

	/// Returns the sum of all requested waits.
	pub fn total_wait(&self) -> Duration {
		Duration::from_nanos(self.waited_nanos.load(Ordering::Relaxed))
	}

	/// Returns the tokens charged across all windows.
	pub fn tokens_charged(&self) -> u64 {
		self.tokens_charged.load(Ordering::Relaxed)
	}

	pub(crate) fn record_attempt(&self) {
		self.attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_success(&self, tokens: u64) {
		self.success.fetch_add(1, Ordering::Relaxed);
		self.tokens_charged.fetch_add(tokens, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failure.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_rejected(&self) {
		self.rejected.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_wait(&self, wait: Duration) {
		let nanos = u64::try_from(wait.as_nanos()).unwrap_or(u64::MAX);

		self.waits.fetch_add(1, Ordering::Relaxed);
		self.waited_nanos.fetch_add(nanos, Ordering::Relaxed);
	}

	pub(crate) fn record_interrupted(&self) {
		self.interrupted.fetch_add(1, Ordering::Relaxed);
	}
}
