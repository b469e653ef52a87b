//! Demonstrates a limiter in front of a mock OpenAI-compatible endpoint: two calls fit in the
//! window, the third waits for the window to roll over before it is forwarded.

// std
use std::time::{Duration, Instant};
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::json;
// self
use chat_throttle::{
	completion::CompletionOptions,
	config::LimiterConfig,
	http::ReqwestCompletionBackend,
	limiter::TokenRateLimiter,
	reqwest::Client,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let completion_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/openai/v1/chat/completions");
			then.status(200).header("content-type", "application/json").body(
				"{\"choices\":[{\"message\":{\"role\":\"assistant\",\"content\":\"Noted.\"}}]}",
			);
		})
		.await;
	let config = LimiterConfig::builder("demo-key")
		.base_url(server.url("/openai/v1"))
		.token_budget(100)
		.window(Duration::from_secs(3))
		.max_output_tokens(32)
		.build()?;
	let backend = ReqwestCompletionBackend::with_client(
		Client::builder().timeout(Duration::from_secs(10)).build()?,
		&config,
	)?;
	let limiter = <TokenRateLimiter<ReqwestCompletionBackend>>::new(config, backend);
	let started = Instant::now();

	for turn in 1..=3 {
		let messages = json!([
			{"role": "system", "content": "Answer in one word."},
			["user", format!("Status update #{turn}, please acknowledge.")]
		]);
		let reply = limiter.issue(messages, CompletionOptions::default()).await?;
		let snapshot = limiter.snapshot();

		println!(
			"Turn {turn} after {:.1}s: {reply} ({} of {} tokens used).",
			started.elapsed().as_secs_f64(),
			snapshot.tokens_used,
			snapshot.budget,
		);
	}

	println!(
		"Waited {} time(s) for {:.1}s in total.",
		limiter.metrics().waits(),
		limiter.metrics().total_wait().as_secs_f64(),
	);

	completion_mock.assert_calls_async(3).await;

	Ok(())
}
