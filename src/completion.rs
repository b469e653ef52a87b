//! Downstream request contract shared by the limiter and completion backends.
//!
//! The limiter never talks to the network itself. It resolves [`CompletionOptions`] against
//! its configuration, builds a [`CompletionRequest`], and hands it to whatever
//! [`CompletionBackend`] it was constructed with.

// self
use crate::{_prelude::*, config::LimiterConfig, message::ChatMessage};

/// Boxed future returned by [`CompletionBackend::complete`].
pub type CompletionFuture<'a> = Pin<Box<dyn Future<Output = Result<String>> + 'a + Send>>;

/// Request-issuing capability placed behind the limiter.
///
/// Implementations perform exactly one upstream call per invocation and return the first
/// completion's text. Failures come back as typed [`Error`] values; the limiter propagates them
/// untouched.
pub trait CompletionBackend
where
	Self: 'static + Send + Sync,
{
	/// Issues one completion request.
	fn complete<'a>(&'a self, request: &'a CompletionRequest) -> CompletionFuture<'a>;
}

/// Per-call overrides; unset fields fall back to the limiter configuration.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompletionOptions {
	/// Model identifier.
	pub model: Option<String>,
	/// Sampling temperature.
	pub temperature: Option<f32>,
	/// Completion allowance; also the amount charged on top of the input estimate.
	pub max_output_tokens: Option<u32>,
	/// Nucleus sampling mass.
	pub top_p: Option<f32>,
	/// Stop sequences.
	pub stop: Option<Vec<String>>,
}
impl CompletionOptions {
	/// Overrides the model.
	pub fn with_model(mut self, model: impl Into<String>) -> Self {
		self.model = Some(model.into());

		self
	}

	/// Overrides the temperature.
	pub fn with_temperature(mut self, temperature: f32) -> Self {
		self.temperature = Some(temperature);

		self
	}

	/// Overrides the completion allowance.
	pub fn with_max_output_tokens(mut self, tokens: u32) -> Self {
		self.max_output_tokens = Some(tokens);

		self
	}

	/// Overrides the nucleus sampling mass.
	pub fn with_top_p(mut self, top_p: f32) -> Self {
		self.top_p = Some(top_p);

		self
	}

	/// Sets stop sequences.
	pub fn with_stop<I, S>(mut self, stop: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.stop = Some(stop.into_iter().map(Into::into).collect());

		self
	}
}

/// Fully resolved request handed to a [`CompletionBackend`].
///
/// Serializes as an OpenAI-compatible chat-completions body.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CompletionRequest {
	/// Model identifier.
	pub model: String,
	/// Normalized messages.
	pub messages: Vec<ChatMessage>,
	/// Sampling temperature.
	pub temperature: f32,
	/// Completion allowance.
	#[serde(rename = "max_completion_tokens")]
	pub max_output_tokens: u32,
	/// Nucleus sampling mass.
	pub top_p: f32,
	/// Stop sequences, serialized as `null` when unset.
	pub stop: Option<Vec<String>>,
	/// Streaming flag; always `false`.
	pub stream: bool,
}
impl CompletionRequest {
	/// Resolves `options` against the configuration defaults.
	pub fn resolve(
		config: &LimiterConfig,
		messages: Vec<ChatMessage>,
		options: CompletionOptions,
	) -> Self {
		Self {
			model: options.model.unwrap_or_else(|| config.model.clone()),
			messages,
			temperature: options.temperature.unwrap_or(config.temperature),
			max_output_tokens: options.max_output_tokens.unwrap_or(config.max_output_tokens),
			top_p: options.top_p.unwrap_or(config.top_p),
			stop: options.stop,
			stream: false,
		}
	}
}
