// crates.io
use serde::Deserializer;
// self
use crate::{
	_prelude::*,
	config::{ApiKey, LimiterConfig},
	error::ConfigError,
};

/// Builder for [`LimiterConfig`] values.
///
/// Also serves as the serde shape of the configuration: every field except `api_key` has a
/// default, and the window is spelled `window_secs`.
#[derive(Clone, Debug, Deserialize)]
pub struct LimiterConfigBuilder {
	/// Credential forwarded to the completion endpoint.
	pub api_key: ApiKey,
	/// Default model identifier.
	#[serde(default = "default_model")]
	pub model: String,
	/// Estimated tokens allowed per window.
	#[serde(default = "default_token_budget")]
	pub token_budget: u64,
	/// Window length.
	#[serde(default = "default_window", rename = "window_secs", deserialize_with = "secs")]
	pub window: Duration,
	/// Base URL of the OpenAI-compatible API.
	#[serde(default = "default_base_url")]
	pub base_url: String,
	/// Characters per estimated token.
	#[serde(default = "default_chars_per_token")]
	pub chars_per_token: u64,
	/// Strict message normalization toggle.
	#[serde(default)]
	pub strict_messages: bool,
	/// Default sampling temperature.
	#[serde(default = "default_unit")]
	pub temperature: f32,
	/// Default nucleus sampling mass.
	#[serde(default = "default_unit")]
	pub top_p: f32,
	/// Default completion allowance.
	#[serde(default = "default_max_output_tokens")]
	pub max_output_tokens: u32,
}
impl LimiterConfigBuilder {
	/// Creates a builder seeded with defaults and the provided credential.
	pub fn new(api_key: impl Into<ApiKey>) -> Self {
		Self {
			api_key: api_key.into(),
			model: default_model(),
			token_budget: default_token_budget(),
			window: default_window(),
			base_url: default_base_url(),
			chars_per_token: default_chars_per_token(),
			strict_messages: false,
			temperature: default_unit(),
			top_p: default_unit(),
			max_output_tokens: default_max_output_tokens(),
		}
	}

	/// Overrides the default model.
	pub fn model(mut self, model: impl Into<String>) -> Self {
		self.model = model.into();

		self
	}

	/// Overrides the per-window token budget.
	pub fn token_budget(mut self, budget: u64) -> Self {
		self.token_budget = budget;

		self
	}

	/// Overrides the window length.
	pub fn window(mut self, window: Duration) -> Self {
		self.window = window;

		self
	}

	/// Points the limiter at another OpenAI-compatible API.
	pub fn base_url(mut self, url: impl Into<String>) -> Self {
		self.base_url = url.into();

		self
	}

	/// Overrides the characters-per-token heuristic.
	pub fn chars_per_token(mut self, ratio: u64) -> Self {
		self.chars_per_token = ratio;

		self
	}

	/// Enables or disables strict message normalization.
	pub fn strict_messages(mut self, strict: bool) -> Self {
		self.strict_messages = strict;

		self
	}

	/// Overrides the default sampling temperature.
	pub fn temperature(mut self, temperature: f32) -> Self {
		self.temperature = temperature;

		self
	}

	/// Overrides the default nucleus sampling mass.
	pub fn top_p(mut self, top_p: f32) -> Self {
		self.top_p = top_p;

		self
	}

	/// Overrides the default completion allowance.
	pub fn max_output_tokens(mut self, tokens: u32) -> Self {
		self.max_output_tokens = tokens;

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<LimiterConfig, ConfigError> {
		if self.model.trim().is_empty() {
			return Err(ConfigError::EmptyModel);
		}
		if self.window.is_zero() {
			return Err(ConfigError::ZeroWindow);
		}

		let chars_per_token =
			NonZeroU64::new(self.chars_per_token).ok_or(ConfigError::ZeroCharsPerToken)?;
		let token_budget = NonZeroU64::new(self.token_budget).ok_or(ConfigError::ZeroBudget)?;
		let base_url = Url::parse(&self.base_url)
			.map_err(|source| ConfigError::InvalidBaseUrl { url: self.base_url.clone(), source })?;

		Ok(LimiterConfig {
			api_key: self.api_key,
			model: self.model,
			token_budget,
			window: self.window,
			base_url,
			chars_per_token,
			strict_messages: self.strict_messages,
			temperature: self.temperature,
			top_p: self.top_p,
			max_output_tokens: self.max_output_tokens,
		})
	}
}
impl TryFrom<LimiterConfigBuilder> for LimiterConfig {
	type Error = ConfigError;

	fn try_from(builder: LimiterConfigBuilder) -> Result<Self, Self::Error> {
		builder.build()
	}
}

fn default_model() -> String {
	LimiterConfig::DEFAULT_MODEL.into()
}

fn default_token_budget() -> u64 {
	LimiterConfig::DEFAULT_TOKEN_BUDGET
}

fn default_window() -> Duration {
	LimiterConfig::DEFAULT_WINDOW
}

fn default_base_url() -> String {
	LimiterConfig::DEFAULT_BASE_URL.into()
}

fn default_chars_per_token() -> u64 {
	LimiterConfig::DEFAULT_CHARS_PER_TOKEN
}

fn default_unit() -> f32 {
	1.0
}

fn default_max_output_tokens() -> u32 {
	LimiterConfig::DEFAULT_MAX_OUTPUT_TOKENS
}

fn secs<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
	D: Deserializer<'de>,
{
	u64::deserialize(deserializer).map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn builder_defaults_match_observed_wrapper() {
		let config = LimiterConfig::builder("key").build().expect("Defaults should validate.");

		assert_eq!(config.model, "llama-3.3-70b-versatile");
		assert_eq!(config.token_budget.get(), 6_000);
		assert_eq!(config.window, Duration::from_secs(60));
		assert_eq!(config.chars_per_token.get(), 4);
		assert_eq!(config.max_output_tokens, 512);
		assert_eq!(config.temperature, 1.0);
		assert_eq!(config.top_p, 1.0);
		assert!(!config.strict_messages);
	}

	#[test]
	fn builder_rejects_degenerate_values() {
		assert!(matches!(
			LimiterConfig::builder("key").token_budget(0).build(),
			Err(ConfigError::ZeroBudget)
		));
		assert!(matches!(
			LimiterConfig::builder("key").window(Duration::ZERO).build(),
			Err(ConfigError::ZeroWindow)
		));
		assert!(matches!(
			LimiterConfig::builder("key").chars_per_token(0).build(),
			Err(ConfigError::ZeroCharsPerToken)
		));
		assert!(matches!(
			LimiterConfig::builder("key").model("  ").build(),
			Err(ConfigError::EmptyModel)
		));
		assert!(matches!(
			LimiterConfig::builder("key").base_url("not a url").build(),
			Err(ConfigError::InvalidBaseUrl { .. })
		));
	}
}
