//! Observability helpers for limiter calls.
//!
//! # Feature Flags
//!
//! - `tracing` (default) wraps every call in a span named `chat_throttle.issue` with the `model`
//!   and `stage` fields, and emits `warn` events when a budget wait starts or a downstream call
//!   fails.
//! - `metrics` increments the `chat_throttle_issue_total` counter, labeled by `outcome`, and the
//!   `chat_throttle_tokens_charged_total` counter.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Outcome labels recorded for each call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IssueOutcome {
	/// Entry to [`TokenRateLimiter::issue`](crate::limiter::TokenRateLimiter::issue).
	Attempt,
	/// The call had to wait for the window to roll over.
	Waited,
	/// The budget wait was cancelled.
	Interrupted,
	/// Downstream call succeeded and was charged.
	Success,
	/// Messages were rejected by strict normalization.
	Rejected,
	/// The downstream request failed.
	Failure,
}
impl IssueOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			IssueOutcome::Attempt => "attempt",
			IssueOutcome::Waited => "waited",
			IssueOutcome::Interrupted => "interrupted",
			IssueOutcome::Success => "success",
			IssueOutcome::Rejected => "rejected",
			IssueOutcome::Failure => "failure",
		}
	}
}
impl Display for IssueOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
