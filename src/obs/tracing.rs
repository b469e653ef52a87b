// self
use crate::{_prelude::*, window::WaitDirective};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedIssue<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedIssue<F> = F;

/// A span builder used by limiter calls.
#[derive(Clone, Debug)]
pub struct IssueSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl IssueSpan {
	/// Creates a new span tagged with the target model and stage.
	pub fn new(model: &str, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("chat_throttle.issue", model, stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (model, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedIssue<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Emits the diagnostic for a budget-triggered wait.
pub fn warn_budget_wait(directive: &WaitDirective) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(
			wait_secs = directive.wait.as_secs_f64(),
			tokens_used = directive.tokens_used,
			estimated = directive.estimated,
			budget = directive.budget,
			resume_at = %directive.resume_at(OffsetDateTime::now_utc()),
			"Rate limit approaching. Sleeping for {:.2} seconds.",
			directive.wait.as_secs_f64(),
		);
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = directive;
	}
}

/// Emits the diagnostic for a failed downstream call.
pub fn warn_downstream_failure(error: &Error) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(error = %error, "Completion call failed: {error}");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = error;
	}
}
