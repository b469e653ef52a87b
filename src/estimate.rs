//! Token cost estimation for normalized messages.

// self
use crate::{_prelude::*, message::ChatMessage};

/// Estimates the input cost of a request before it is sent.
pub trait TokenEstimator
where
	Self: Send + Sync,
{
	/// Estimated tokens for a single message.
	fn estimate_message(&self, message: &ChatMessage) -> u64;

	/// Estimated tokens for a whole request; the sum of the per-message estimates.
	fn estimate(&self, messages: &[ChatMessage]) -> u64 {
		messages.iter().map(|message| self.estimate_message(message)).sum()
	}
}

/// Fixed characters-per-token heuristic.
///
/// Each message costs `floor(chars / ratio)`, where `chars` counts Unicode scalar values of the
/// content.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CharRatioEstimator {
	chars_per_token: NonZeroU64,
}
impl CharRatioEstimator {
	/// Creates an estimator with the given ratio.
	pub const fn new(chars_per_token: NonZeroU64) -> Self {
		Self { chars_per_token }
	}

	/// Characters counted as one token.
	pub const fn chars_per_token(&self) -> u64 {
		self.chars_per_token.get()
	}
}
impl Default for CharRatioEstimator {
	fn default() -> Self {
		Self::new(NonZeroU64::MIN.saturating_add(3))
	}
}
impl TokenEstimator for CharRatioEstimator {
	fn estimate_message(&self, message: &ChatMessage) -> u64 {
		let chars = u64::try_from(message.content.chars().count()).unwrap_or(u64::MAX);

		chars / self.chars_per_token.get()
	}
}
