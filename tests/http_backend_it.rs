#![cfg(feature = "reqwest")]

// std
use std::time::Duration;
// crates.io
use httpmock::prelude::*;
// self
use chat_throttle::{
	completion::CompletionOptions,
	config::LimiterConfig,
	error::{Error, TransientError},
	http::ReqwestCompletionBackend,
	limiter::TokenRateLimiter,
};

const API_KEY: &str = "gsk-test";

fn build_limiter(server: &MockServer) -> TokenRateLimiter<ReqwestCompletionBackend> {
	let config = LimiterConfig::builder(API_KEY)
		.base_url(server.url("/openai/v1"))
		.build()
		.expect("Mock configuration should build.");

	TokenRateLimiter::from_config(config).expect("Reqwest-backed limiter should build.")
}

#[tokio::test]
async fn completion_text_is_returned_and_charged() {
	let server = MockServer::start_async().await;
	let limiter = build_limiter(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/openai/v1/chat/completions")
				.header("authorization", "Bearer gsk-test")
				.header("content-type", "application/json");
			then.status(200).header("content-type", "application/json").body(
				"{\"id\":\"chatcmpl-1\",\"choices\":[{\"index\":0,\"message\":{\"role\":\"assistant\",\"content\":\"Hello back.\"},\"finish_reason\":\"stop\"}]}",
			);
		})
		.await;
	let text = limiter
		.issue("hello", CompletionOptions::default().with_max_output_tokens(16))
		.await
		.expect("Completion call should succeed.");

	assert_eq!(text, "Hello back.");
	assert_eq!(limiter.snapshot().tokens_used, 1 + 16);

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn rejected_credential_maps_to_authentication_error() {
	let server = MockServer::start_async().await;
	let limiter = build_limiter(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/openai/v1/chat/completions");
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"error\":{\"message\":\"Invalid API Key\",\"type\":\"invalid_request_error\"}}");
		})
		.await;
	let err = limiter
		.issue("hello", CompletionOptions::default())
		.await
		.expect_err("Unauthorized responses should fail.");

	assert!(matches!(
		err,
		Error::Authentication { status: 401, ref message } if message == "Invalid API Key"
	));
	assert_eq!(limiter.snapshot().tokens_used, 0);

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn throttled_response_surfaces_retry_after_without_retrying() {
	let server = MockServer::start_async().await;
	let limiter = build_limiter(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/openai/v1/chat/completions");
			then.status(429)
				.header("retry-after", "7")
				.header("content-type", "application/json")
				.body("{\"error\":{\"message\":\"Rate limit reached for model\"}}");
		})
		.await;
	let err = limiter
		.issue("hello", CompletionOptions::default())
		.await
		.expect_err("Throttled responses should fail.");

	match err {
		Error::Transient(TransientError::Upstream { message, status, retry_after }) => {
			assert_eq!(message, "Rate limit reached for model");
			assert_eq!(status, Some(429));
			assert_eq!(retry_after, Some(Duration::from_secs(7)));
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}

	assert_eq!(limiter.snapshot().tokens_used, 0);

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn malformed_and_empty_bodies_are_transient() {
	let server = MockServer::start_async().await;
	let limiter = build_limiter(&server);
	let mut malformed = server
		.mock_async(|when, then| {
			when.method(POST).path("/openai/v1/chat/completions");
			then.status(200).header("content-type", "application/json").body("{\"choices\":\"nope\"}");
		})
		.await;
	let err = limiter
		.issue("hello", CompletionOptions::default())
		.await
		.expect_err("Malformed bodies should fail.");

	assert!(matches!(
		err,
		Error::Transient(TransientError::ResponseParse { status: Some(200), .. })
	));

	malformed.delete_async().await;

	let empty = server
		.mock_async(|when, then| {
			when.method(POST).path("/openai/v1/chat/completions");
			then.status(200).header("content-type", "application/json").body("{\"choices\":[]}");
		})
		.await;
	let err = limiter
		.issue("hello", CompletionOptions::default())
		.await
		.expect_err("Empty choices should fail.");

	assert!(matches!(err, Error::Transient(TransientError::EmptyCompletion)));
	assert_eq!(limiter.snapshot().tokens_used, 0);
	assert_eq!(limiter.metrics().failures(), 2);

	empty.assert_calls_async(1).await;
}

#[tokio::test]
async fn unreachable_endpoint_is_a_transport_error() {
	let config = LimiterConfig::builder(API_KEY)
		.base_url("http://127.0.0.1:9/v1")
		.build()
		.expect("Configuration should build.");
	let limiter =
		TokenRateLimiter::from_config(config).expect("Reqwest-backed limiter should build.");
	let err = limiter
		.issue("hello", CompletionOptions::default())
		.await
		.expect_err("Closed ports should fail.");

	assert!(matches!(err, Error::Transport(_)));
	assert_eq!(limiter.snapshot().tokens_used, 0);
}
