// self
use crate::obs::IssueOutcome;

/// Records a call outcome via the global metrics recorder (when enabled).
pub fn record_issue_outcome(outcome: IssueOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("chat_throttle_issue_total", "outcome" => outcome.as_str()).increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = outcome;
	}
}

/// Records tokens charged against the window (when enabled).
pub fn record_tokens_charged(tokens: u64) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("chat_throttle_tokens_charged_total").increment(tokens);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = tokens;
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn recorders_noop_without_global_recorder() {
		record_issue_outcome(IssueOutcome::Failure);
		record_tokens_charged(537);
	}
}
