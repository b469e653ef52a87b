//! Reqwest-backed [`CompletionBackend`] for OpenAI-compatible chat-completion APIs.
//!
//! [`ReqwestCompletionBackend`] posts the resolved [`CompletionRequest`] to
//! `{base_url}/chat/completions` with bearer authentication and returns the first choice's
//! message content. Failures are classified once, here, so the limiter can pass them through
//! untouched:
//!
//! - builder failures become [`ConfigError`];
//! - network failures and timeouts become [`TransportError`];
//! - `401`/`403` become [`Error::Authentication`];
//! - any other non-success status becomes [`TransientError::Upstream`], carrying the
//!   `Retry-After` hint when one is present;
//! - unparseable or empty bodies become [`TransientError::ResponseParse`] or
//!   [`TransientError::EmptyCompletion`].

// crates.io
use reqwest::{
	StatusCode,
	header::{CONTENT_TYPE, HeaderMap, RETRY_AFTER},
};
use time::format_description::well_known::Rfc2822;
// self
use crate::{
	_prelude::*,
	completion::{CompletionBackend, CompletionFuture, CompletionRequest},
	config::{ApiKey, LimiterConfig},
	error::{ConfigError, TransientError, TransportError},
};

const BODY_PREVIEW_LIMIT: usize = 256;

/// Chat-completions client shared across calls; `reqwest` pools connections internally.
#[derive(Clone)]
pub struct ReqwestCompletionBackend {
	client: ReqwestClient,
	endpoint: Url,
	api_key: ApiKey,
}
impl ReqwestCompletionBackend {
	/// Builds a backend with a default reqwest client.
	pub fn new(config: &LimiterConfig) -> Result<Self> {
		let client = ReqwestClient::builder().build().map_err(ConfigError::from)?;

		Self::with_client(client, config)
	}

	/// Wraps an existing reqwest client.
	pub fn with_client(client: ReqwestClient, config: &LimiterConfig) -> Result<Self> {
		let endpoint = config.completions_endpoint()?;

		Ok(Self { client, endpoint, api_key: config.api_key.clone() })
	}

	/// Endpoint every request is posted to.
	pub fn endpoint(&self) -> &Url {
		&self.endpoint
	}

	async fn send(&self, request: &CompletionRequest) -> Result<String> {
		let body = serde_json::to_vec(request).map_err(ConfigError::from)?;
		let response = self
			.client
			.post(self.endpoint.clone())
			.bearer_auth(self.api_key.expose())
			.header(CONTENT_TYPE, "application/json")
			.body(body)
			.send()
			.await
			.map_err(map_reqwest_error)?;
		let status = response.status();
		let retry_after = parse_retry_after(response.headers());
		let bytes = response.bytes().await.map_err(map_reqwest_error)?;

		if !status.is_success() {
			return Err(map_status_error(status, retry_after, &bytes));
		}

		parse_completion(status, &bytes)
	}
}
impl CompletionBackend for ReqwestCompletionBackend {
	fn complete<'a>(&'a self, request: &'a CompletionRequest) -> CompletionFuture<'a> {
		Box::pin(self.send(request))
	}
}
impl Debug for ReqwestCompletionBackend {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ReqwestCompletionBackend")
			.field("endpoint", &self.endpoint.as_str())
			.field("api_key", &self.api_key)
			.finish()
	}
}

#[derive(Deserialize)]
struct CompletionResponse {
	choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
	message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
	content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
	error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
	message: String,
}

fn parse_completion(status: StatusCode, bytes: &[u8]) -> Result<String> {
	let mut deserializer = serde_json::Deserializer::from_slice(bytes);
	let response: CompletionResponse = serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| TransientError::ResponseParse {
			source,
			status: Some(status.as_u16()),
		})?;

	response
		.choices
		.into_iter()
		.next()
		.and_then(|choice| choice.message.content)
		.ok_or_else(|| TransientError::EmptyCompletion.into())
}

fn map_status_error(status: StatusCode, retry_after: Option<Duration>, bytes: &[u8]) -> Error {
	let message = error_message(bytes);

	match status {
		StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN =>
			Error::Authentication { status: status.as_u16(), message },
		_ => TransientError::Upstream { message, status: Some(status.as_u16()), retry_after }.into(),
	}
}

fn map_reqwest_error(err: ReqwestError) -> Error {
	if err.is_builder() {
		return ConfigError::from(err).into();
	}

	TransportError::from(err).into()
}

fn error_message(bytes: &[u8]) -> String {
	if let Ok(envelope) = serde_json::from_slice::<ErrorEnvelope>(bytes) {
		return envelope.error.message;
	}

	let text = String::from_utf8_lossy(bytes);
	let trimmed = text.trim();

	if trimmed.is_empty() {
		return "empty response body".into();
	}

	trimmed.chars().take(BODY_PREVIEW_LIMIT).collect()
}

fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return Some(Duration::from_secs(secs));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta.unsigned_abs());
		}
	}

	None
}

#[cfg(test)]
mod tests {
	// crates.io
	use reqwest::header::HeaderValue;
	// self
	use super::*;

	#[test]
	fn retry_after_accepts_seconds_and_dates() {
		let mut headers = HeaderMap::new();

		headers.insert(RETRY_AFTER, HeaderValue::from_static("17"));

		assert_eq!(parse_retry_after(&headers), Some(Duration::from_secs(17)));

		headers.insert(RETRY_AFTER, HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"));

		assert_eq!(parse_retry_after(&headers), None, "Past dates carry no hint.");

		headers.insert(RETRY_AFTER, HeaderValue::from_static("soon"));

		assert_eq!(parse_retry_after(&headers), None);
	}

	#[test]
	fn completion_body_yields_first_choice() {
		let body = br#"{"choices":[{"message":{"role":"assistant","content":"first"}},
			{"message":{"role":"assistant","content":"second"}}]}"#;

		assert_eq!(parse_completion(StatusCode::OK, body).expect("Body should parse."), "first");
	}

	#[test]
	fn malformed_body_reports_json_path() {
		let err = parse_completion(StatusCode::OK, br#"{"choices":[{"message":{"content":7}}]}"#)
			.expect_err("Numeric content should be rejected.");

		match err {
			Error::Transient(TransientError::ResponseParse { source, status }) => {
				assert_eq!(source.path().to_string(), "choices[0].message.content");
				assert_eq!(status, Some(200));
			},
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}

	#[test]
	fn empty_choices_are_rejected() {
		assert!(matches!(
			parse_completion(StatusCode::OK, br#"{"choices":[]}"#),
			Err(Error::Transient(TransientError::EmptyCompletion))
		));
		assert!(matches!(
			parse_completion(StatusCode::OK, br#"{"choices":[{"message":{"content":null}}]}"#),
			Err(Error::Transient(TransientError::EmptyCompletion))
		));
	}

	#[test]
	fn status_errors_are_classified() {
		let auth = map_status_error(
			StatusCode::UNAUTHORIZED,
			None,
			br#"{"error":{"message":"Invalid API Key","type":"invalid_request_error"}}"#,
		);

		assert!(matches!(
			auth,
			Error::Authentication { status: 401, ref message } if message == "Invalid API Key"
		));

		let throttled = map_status_error(
			StatusCode::TOO_MANY_REQUESTS,
			Some(Duration::from_secs(3)),
			b"slow down",
		);

		match throttled {
			Error::Transient(TransientError::Upstream { message, status, retry_after }) => {
				assert_eq!(message, "slow down");
				assert_eq!(status, Some(429));
				assert_eq!(retry_after, Some(Duration::from_secs(3)));
			},
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}
}
