//! Crate-level error types shared by configuration, normalization, and completion calls.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Caller-supplied messages could not be normalized.
	#[error(transparent)]
	Message(#[from] MessageError),
	/// Temporary upstream failure; the caller decides whether to retry.
	#[error(transparent)]
	Transient(#[from] TransientError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Upstream rejected the API credential.
	#[error("Completion endpoint rejected the credential ({status}): {message}.")]
	Authentication {
		/// HTTP status code returned by the endpoint.
		status: u16,
		/// Provider-supplied message or body preview.
		message: String,
	},
	/// The budget wait was cancelled before the window rolled over.
	#[error("Budget wait was interrupted with {remaining:?} left.")]
	BudgetWaitInterrupted {
		/// Portion of the wait that had not elapsed yet.
		remaining: Duration,
	},
}

/// Configuration and validation failures raised while building a limiter.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Base URL cannot be parsed or joined.
	#[error("Base URL `{url}` is invalid.")]
	InvalidBaseUrl {
		/// Offending URL string.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},

	/// Completion request could not be encoded as JSON.
	#[error("Completion request could not be encoded.")]
	RequestEncode(#[from] serde_json::Error),

	/// Token budget must allow at least one token per window.
	#[error("Token budget must be greater than zero.")]
	ZeroBudget,
	/// Window duration must be positive.
	#[error("Window duration must be greater than zero.")]
	ZeroWindow,
	/// The estimator ratio must be positive.
	#[error("The chars_per_token ratio must be greater than zero.")]
	ZeroCharsPerToken,
	/// Model identifier is empty or whitespace.
	#[error("Model identifier cannot be empty.")]
	EmptyModel,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Message shapes rejected by strict normalization.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum MessageError {
	/// A bare value appeared where a role/content record was expected.
	#[error("Message #{index} is a bare value, not a role/content record.")]
	BareValue {
		/// Position of the element in the input sequence.
		index: usize,
	},
	/// A mapping omitted its `content` key.
	#[error("Message #{index} has no `content` field.")]
	MissingContent {
		/// Position of the element in the input sequence.
		index: usize,
	},
	/// A role or content value was not a string.
	#[error("Message #{index} has a non-string `{field}`.")]
	NonStringField {
		/// Position of the element in the input sequence.
		index: usize,
		/// Field name (`role` or `content`).
		field: &'static str,
	},
	/// The role is outside the known set.
	#[error("Message #{index} uses unknown role `{role}`.")]
	UnknownRole {
		/// Position of the element in the input sequence.
		index: usize,
		/// Role string as supplied.
		role: String,
	},
}

/// Temporary failure variants surfaced by the completion endpoint.
#[derive(Debug, ThisError)]
pub enum TransientError {
	/// Endpoint returned a non-success status other than an authentication failure.
	#[error("Completion endpoint returned an unexpected response: {message}.")]
	Upstream {
		/// Provider-supplied message or body preview.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// Endpoint responded with JSON that does not match the completion schema.
	#[error("Completion endpoint returned malformed JSON.")]
	ResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Response carried no choices or a null message content.
	#[error("Completion endpoint returned no message content.")]
	EmptyCompletion,
}

/// Transport-level failures.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the completion endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
