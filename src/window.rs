//! Fixed-window token accounting.
//!
//! [`WindowState`] holds the counter and window anchor. [`WindowState::admit`] runs the
//! rollover and budget check for one call and reports whether the caller must wait first;
//! [`WindowState::charge`] accounts for a call after it succeeds.

// self
use crate::_prelude::*;

/// Mutable per-limiter accounting state.
#[derive(Clone, Debug)]
pub struct WindowState {
	tokens_used: u64,
	window_start: Instant,
}
impl WindowState {
	/// Opens a fresh window anchored at `now`.
	pub fn new(now: Instant) -> Self {
		Self { tokens_used: 0, window_start: now }
	}

	/// Tokens charged in the current window.
	pub fn tokens_used(&self) -> u64 {
		self.tokens_used
	}

	/// Instant the current window opened.
	pub fn window_start(&self) -> Instant {
		self.window_start
	}

	/// Rolls the window over when it has elapsed, then checks `cost` against the budget.
	///
	/// The rollover resets the counter to zero and re-anchors the window at `now`. When the
	/// counter plus `cost` exceeds `budget`, the returned directive asks the caller to wait for
	/// the rest of the window, clamped at zero. The state is not touched by the budget check
	/// itself.
	pub fn admit(
		&mut self,
		now: Instant,
		cost: u64,
		budget: NonZeroU64,
		window: Duration,
	) -> Admission {
		let elapsed = now.saturating_duration_since(self.window_start);

		if elapsed >= window {
			self.tokens_used = 0;
			self.window_start = now;
		}

		if self.tokens_used.saturating_add(cost) <= budget.get() {
			return Admission::Proceed;
		}

		let elapsed = now.saturating_duration_since(self.window_start);

		Admission::Wait(WaitDirective {
			wait: window.saturating_sub(elapsed),
			tokens_used: self.tokens_used,
			estimated: cost,
			budget: budget.get(),
		})
	}

	/// Adds a successful call's charge to the current window.
	pub fn charge(&mut self, tokens: u64) {
		self.tokens_used = self.tokens_used.saturating_add(tokens);
	}

	/// Read-only view of the state at `now`.
	pub fn snapshot(&self, now: Instant, budget: NonZeroU64, window: Duration) -> WindowSnapshot {
		let elapsed = now.saturating_duration_since(self.window_start);

		WindowSnapshot {
			tokens_used: self.tokens_used,
			budget: budget.get(),
			remaining: budget.get().saturating_sub(self.tokens_used),
			elapsed,
			expired: elapsed >= window,
		}
	}
}

/// Result of [`WindowState::admit`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Admission {
	/// The call fits the remaining budget.
	Proceed,
	/// The call must wait for the window to roll over first.
	Wait(WaitDirective),
}
impl Admission {
	/// Wait requested by the decision; zero for [`Admission::Proceed`].
	pub fn wait(&self) -> Duration {
		match self {
			Self::Proceed => Duration::ZERO,
			Self::Wait(directive) => directive.wait,
		}
	}
}

/// Details of a budget-triggered wait.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WaitDirective {
	/// Time left in the current window.
	pub wait: Duration,
	/// Tokens already charged in the window when the check ran.
	pub tokens_used: u64,
	/// Estimated input cost of the call being admitted.
	pub estimated: u64,
	/// Configured budget.
	pub budget: u64,
}
impl WaitDirective {
	/// Wall-clock instant at which the wait ends, relative to `observed_at`.
	pub fn resume_at(&self, observed_at: OffsetDateTime) -> OffsetDateTime {
		observed_at.saturating_add(self.wait.try_into().unwrap_or(time::Duration::MAX))
	}
}

/// Point-in-time view of a limiter's window.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WindowSnapshot {
	/// Tokens charged since the window opened.
	pub tokens_used: u64,
	/// Configured budget.
	pub budget: u64,
	/// Budget left before the next call would have to wait.
	pub remaining: u64,
	/// Time since the window opened.
	pub elapsed: Duration,
	/// The next call will reset the counter before checking its cost.
	pub expired: bool,
}
