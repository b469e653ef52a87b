//! The token-budgeted gate placed in front of a [`CompletionBackend`].
//!
//! Every call follows the same sequence. The limiter normalizes the messages and estimates
//! their cost. It rolls the window over if it has elapsed. If the estimate would overflow the
//! budget, it waits out the rest of the window once, without re-checking afterwards. It then
//! issues exactly one downstream request, and charges the estimate plus the completion
//! allowance only when that request succeeds.
//!
//! Calls on one limiter are serialized, so the check and the charge of a call can never
//! interleave with another caller's.

/// In-process counters kept by every limiter.
pub mod metrics;

pub use metrics::*;

// crates.io
use tokio_util::sync::CancellationToken;
// self
#[cfg(feature = "reqwest")] use crate::http::ReqwestCompletionBackend;
use crate::{
	_prelude::*,
	completion::{CompletionBackend, CompletionOptions, CompletionRequest},
	config::LimiterConfig,
	estimate::{CharRatioEstimator, TokenEstimator},
	message::{ChatMessage, MessageInput, Normalizer},
	obs::{self, IssueOutcome, IssueSpan},
	window::{Admission, WindowSnapshot, WindowState},
};

/// Client-side rate limiter for a token-budgeted completion API.
pub struct TokenRateLimiter<B>
where
	B: ?Sized + CompletionBackend,
{
	config: LimiterConfig,
	backend: Arc<B>,
	estimator: Arc<dyn TokenEstimator>,
	normalizer: Normalizer,
	state: Mutex<WindowState>,
	gate: AsyncMutex<()>,
	metrics: LimiterMetrics,
}
impl<B> TokenRateLimiter<B>
where
	B: ?Sized + CompletionBackend,
{
	/// Creates a limiter whose first window opens now.
	pub fn new(config: LimiterConfig, backend: impl Into<Arc<B>>) -> Self {
		let estimator = CharRatioEstimator::new(config.chars_per_token);
		let normalizer =
			if config.strict_messages { Normalizer::strict() } else { Normalizer::permissive() };

		Self {
			config,
			backend: backend.into(),
			estimator: Arc::new(estimator),
			normalizer,
			state: Mutex::new(WindowState::new(Instant::now())),
			gate: AsyncMutex::new(()),
			metrics: Default::default(),
		}
	}

	/// Replaces the characters-per-token heuristic with a custom estimator.
	pub fn with_estimator(mut self, estimator: impl 'static + TokenEstimator) -> Self {
		self.estimator = Arc::new(estimator);

		self
	}

	/// Configuration the limiter was built with.
	pub fn config(&self) -> &LimiterConfig {
		&self.config
	}

	/// Backend that receives the forwarded requests.
	pub fn backend(&self) -> &Arc<B> {
		&self.backend
	}

	/// Process-local counters for this limiter.
	pub fn metrics(&self) -> &LimiterMetrics {
		&self.metrics
	}

	/// Point-in-time view of the current window.
	pub fn snapshot(&self) -> WindowSnapshot {
		self.state.lock().snapshot(Instant::now(), self.config.token_budget, self.config.window)
	}

	/// Normalizes `messages` the same way [`issue`](Self::issue) would.
	pub fn normalize(&self, messages: impl Into<MessageInput>) -> Result<Vec<ChatMessage>> {
		Ok(self.normalizer.normalize(messages.into())?)
	}

	/// Estimated input cost of already-normalized messages.
	pub fn estimate(&self, messages: &[ChatMessage]) -> u64 {
		self.estimator.estimate(messages)
	}

	/// Throttles, forwards, and accounts for one completion request.
	///
	/// May suspend the calling task for up to one window before forwarding. Downstream errors
	/// are returned unchanged and leave the window's usage untouched.
	pub async fn issue(
		&self,
		messages: impl Into<MessageInput>,
		options: CompletionOptions,
	) -> Result<String> {
		self.issue_with_cancellation(messages, options, &CancellationToken::new()).await
	}

	/// Same as [`issue`](Self::issue), but a cancelled `cancel` token aborts a pending budget
	/// wait with [`Error::BudgetWaitInterrupted`].
	///
	/// Cancellation only affects the wait; once the request is forwarded it runs to completion.
	pub async fn issue_with_cancellation(
		&self,
		messages: impl Into<MessageInput>,
		options: CompletionOptions,
		cancel: &CancellationToken,
	) -> Result<String> {
		let input = messages.into();
		let span = IssueSpan::new(options.model.as_deref().unwrap_or(&self.config.model), "issue");

		self.metrics.record_attempt();
		obs::record_issue_outcome(IssueOutcome::Attempt);

		let result = span.instrument(self.run(input, options, cancel)).await;

		let outcome = match &result {
			Ok(_) => IssueOutcome::Success,
			Err(Error::Message(_)) => {
				self.metrics.record_rejected();

				IssueOutcome::Rejected
			},
			Err(Error::BudgetWaitInterrupted { .. }) => {
				self.metrics.record_interrupted();

				IssueOutcome::Interrupted
			},
			Err(_) => {
				self.metrics.record_failure();

				IssueOutcome::Failure
			},
		};

		obs::record_issue_outcome(outcome);

		result
	}

	async fn run(
		&self,
		input: MessageInput,
		options: CompletionOptions,
		cancel: &CancellationToken,
	) -> Result<String> {
		let _serial = self.gate.lock().await;
		let messages = self.normalizer.normalize(input)?;
		let estimated = self.estimator.estimate(&messages);
		let admission = self.state.lock().admit(
			Instant::now(),
			estimated,
			self.config.token_budget,
			self.config.window,
		);

		if let Admission::Wait(directive) = admission {
			obs::warn_budget_wait(&directive);
			obs::record_issue_outcome(IssueOutcome::Waited);
			self.metrics.record_wait(directive.wait);
			self.wait_out(directive.wait, cancel).await?;
		}

		let request = CompletionRequest::resolve(&self.config, messages, options);
		let charge = estimated.saturating_add(u64::from(request.max_output_tokens));

		match self.backend.complete(&request).await {
			Ok(text) => {
				self.state.lock().charge(charge);
				self.metrics.record_success(charge);
				obs::record_tokens_charged(charge);

				Ok(text)
			},
			Err(e) => {
				obs::warn_downstream_failure(&e);

				Err(e)
			},
		}
	}

	async fn wait_out(&self, wait: Duration, cancel: &CancellationToken) -> Result<()> {
		let started = Instant::now();

		// `sleep` clamps waits past the clock's range instead of overflowing the deadline.
		tokio::select! {
			biased;

			_ = cancel.cancelled() => Err(Error::BudgetWaitInterrupted {
				remaining: wait.saturating_sub(started.elapsed()),
			}),
			_ = tokio::time::sleep(wait) => Ok(()),
		}
	}
}
#[cfg(feature = "reqwest")]
impl TokenRateLimiter<ReqwestCompletionBackend> {
	/// Creates a limiter that forwards to the configured endpoint over a default reqwest
	/// client.
	pub fn from_config(config: LimiterConfig) -> Result<Self> {
		let backend = ReqwestCompletionBackend::new(&config)?;

		Ok(Self::new(config, backend))
	}
}
impl<B> Debug for TokenRateLimiter<B>
where
	B: ?Sized + CompletionBackend,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenRateLimiter")
			.field("model", &self.config.model)
			.field("token_budget", &self.config.token_budget)
			.field("window", &self.config.window)
			.field("strict_messages", &self.normalizer.is_strict())
			.finish()
	}
}
