//! Construction-time configuration for [`TokenRateLimiter`](crate::limiter::TokenRateLimiter).
//!
//! Build values through [`LimiterConfig::builder`], or deserialize them from any serde format;
//! both paths run the same validation.

/// Builder and serde shape for limiter configuration.
pub mod builder;
pub mod secret;

pub use builder::*;
pub use secret::*;

// self
use crate::{_prelude::*, error::ConfigError};

/// Validated limiter configuration.
///
/// Fields are public for inspection; construct through [`LimiterConfigBuilder::build`] so the
/// invariants below hold.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(try_from = "LimiterConfigBuilder")]
pub struct LimiterConfig {
	/// Credential forwarded to the completion endpoint.
	pub api_key: ApiKey,
	/// Model used when a call does not override it.
	pub model: String,
	/// Estimated tokens allowed per window.
	pub token_budget: NonZeroU64,
	/// Fixed window length; always non-zero.
	pub window: Duration,
	/// Base URL of the OpenAI-compatible API.
	pub base_url: Url,
	/// Characters counted as one token by the default estimator.
	pub chars_per_token: NonZeroU64,
	/// Rejects ambiguous message shapes instead of coercing them to user text.
	pub strict_messages: bool,
	/// Default sampling temperature.
	pub temperature: f32,
	/// Default nucleus sampling mass.
	pub top_p: f32,
	/// Default completion allowance, also charged against the budget after each success.
	pub max_output_tokens: u32,
}
impl LimiterConfig {
	/// Default model identifier.
	pub const DEFAULT_MODEL: &'static str = "llama-3.3-70b-versatile";
	/// Default per-window token budget.
	pub const DEFAULT_TOKEN_BUDGET: u64 = 6_000;
	/// Default window length.
	pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);
	/// Default API base URL.
	pub const DEFAULT_BASE_URL: &'static str = "https://api.groq.com/openai/v1";
	/// Default characters-per-token heuristic.
	pub const DEFAULT_CHARS_PER_TOKEN: u64 = 4;
	/// Default completion allowance.
	pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 512;

	/// Starts a builder for the provided credential.
	pub fn builder(api_key: impl Into<ApiKey>) -> LimiterConfigBuilder {
		LimiterConfigBuilder::new(api_key)
	}

	/// Resolves the chat-completions endpoint under [`base_url`](Self::base_url).
	pub fn completions_endpoint(&self) -> Result<Url, ConfigError> {
		let mut base = self.base_url.clone();

		if !base.path().ends_with('/') {
			let path = format!("{}/", base.path());

			base.set_path(&path);
		}

		base.join("chat/completions").map_err(|source| ConfigError::InvalidBaseUrl {
			url: self.base_url.to_string(),
			source,
		})
	}
}
