//! Message shapes accepted from callers and the canonical record forwarded downstream.
//!
//! Callers may hand the limiter a bare string, role/content pairs, role/content mappings, or
//! arbitrary JSON. Each of those resolves once into [`MessageInput`] and is turned into
//! canonical [`ChatMessage`] records by a [`Normalizer`].

pub mod normalize;

pub use normalize::*;

// self
use crate::_prelude::*;

/// Conversation role attached to a [`ChatMessage`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
	/// System or developer instructions.
	System,
	/// End-user turn.
	#[default]
	User,
	/// Model turn.
	Assistant,
	/// Tool output turn.
	Tool,
	/// Any other role string, kept verbatim.
	Other(String),
}
impl Role {
	/// Returns the wire label for the role.
	pub fn as_str(&self) -> &str {
		match self {
			Self::System => "system",
			Self::User => "user",
			Self::Assistant => "assistant",
			Self::Tool => "tool",
			Self::Other(value) => value,
		}
	}

	/// Returns `true` for every role except [`Role::Other`].
	pub fn is_known(&self) -> bool {
		!matches!(self, Self::Other(_))
	}
}
impl From<&str> for Role {
	fn from(value: &str) -> Self {
		match value {
			"system" => Self::System,
			"user" => Self::User,
			"assistant" => Self::Assistant,
			"tool" => Self::Tool,
			other => Self::Other(other.to_owned()),
		}
	}
}
impl From<String> for Role {
	fn from(value: String) -> Self {
		match Self::from(value.as_str()) {
			Self::Other(_) => Self::Other(value),
			known => known,
		}
	}
}
impl From<Role> for String {
	fn from(value: Role) -> Self {
		match value {
			Role::Other(value) => value,
			known => known.as_str().to_owned(),
		}
	}
}
impl Display for Role {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Canonical role/content record forwarded to the completion backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
	/// Conversation role.
	pub role: Role,
	/// Text payload.
	pub content: String,
}
impl ChatMessage {
	/// Creates a message with an explicit role.
	pub fn new(role: impl Into<Role>, content: impl Into<String>) -> Self {
		Self { role: role.into(), content: content.into() }
	}

	/// Creates a `user` message.
	pub fn user(content: impl Into<String>) -> Self {
		Self::new(Role::User, content)
	}

	/// Creates a `system` message.
	pub fn system(content: impl Into<String>) -> Self {
		Self::new(Role::System, content)
	}

	/// Creates an `assistant` message.
	pub fn assistant(content: impl Into<String>) -> Self {
		Self::new(Role::Assistant, content)
	}
}

/// One element of a caller-supplied message sequence.
#[derive(Clone, Debug, PartialEq)]
pub enum MessageShape {
	/// Ordered role/content tuple; extra tuple members are dropped on construction.
	Pair {
		/// First tuple member.
		role: Value,
		/// Second tuple member.
		content: Value,
	},
	/// Mapping that may carry `role` and `content` keys.
	Mapping(Map<String, Value>),
	/// Anything else.
	Scalar(Value),
}
impl<R, C> From<(R, C)> for MessageShape
where
	R: Into<String>,
	C: Into<String>,
{
	fn from((role, content): (R, C)) -> Self {
		Self::Pair { role: Value::String(role.into()), content: Value::String(content.into()) }
	}
}
impl From<ChatMessage> for MessageShape {
	fn from(message: ChatMessage) -> Self {
		let mut map = Map::new();

		map.insert("role".into(), Value::String(message.role.into()));
		map.insert("content".into(), Value::String(message.content));

		Self::Mapping(map)
	}
}
impl From<&str> for MessageShape {
	fn from(value: &str) -> Self {
		Self::Scalar(Value::String(value.to_owned()))
	}
}
impl From<String> for MessageShape {
	fn from(value: String) -> Self {
		Self::Scalar(Value::String(value))
	}
}
impl From<Value> for MessageShape {
	fn from(value: Value) -> Self {
		match value {
			Value::Array(items) if items.len() >= 2 => {
				let mut items = items.into_iter();
				let role = items.next().unwrap_or(Value::Null);
				let content = items.next().unwrap_or(Value::Null);

				Self::Pair { role, content }
			},
			Value::Object(map) => Self::Mapping(map),
			other => Self::Scalar(other),
		}
	}
}

/// Everything [`TokenRateLimiter::issue`](crate::limiter::TokenRateLimiter::issue) accepts as
/// its `messages` argument.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub enum MessageInput {
	/// A single raw text value, sent as one `user` message.
	Text(String),
	/// A sequence whose elements are normalized one by one.
	Sequence(Vec<MessageShape>),
}
impl MessageInput {
	/// Resolves arbitrary JSON into an input shape.
	///
	/// Arrays become sequences; anything else becomes [`MessageInput::Text`] holding the value's
	/// string form.
	pub fn from_value(value: Value) -> Self {
		match value {
			Value::Array(items) => Self::Sequence(items.into_iter().map(MessageShape::from).collect()),
			other => Self::Text(string_form(&other)),
		}
	}

	/// Number of canonical messages this input normalizes into.
	pub fn len(&self) -> usize {
		match self {
			Self::Text(_) => 1,
			Self::Sequence(items) => items.len(),
		}
	}

	/// Returns `true` for an empty sequence.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}
impl From<Value> for MessageInput {
	fn from(value: Value) -> Self {
		Self::from_value(value)
	}
}
impl From<&str> for MessageInput {
	fn from(value: &str) -> Self {
		Self::Text(value.to_owned())
	}
}
impl From<String> for MessageInput {
	fn from(value: String) -> Self {
		Self::Text(value)
	}
}
impl<T> From<Vec<T>> for MessageInput
where
	T: Into<MessageShape>,
{
	fn from(items: Vec<T>) -> Self {
		Self::Sequence(items.into_iter().map(Into::into).collect())
	}
}
impl<T, const N: usize> From<[T; N]> for MessageInput
where
	T: Into<MessageShape>,
{
	fn from(items: [T; N]) -> Self {
		Self::Sequence(items.into_iter().map(Into::into).collect())
	}
}

/// Renders a JSON value the way it is embedded into message content: strings verbatim,
/// everything else as compact JSON.
pub fn string_form(value: &Value) -> String {
	match value {
		Value::String(text) => text.clone(),
		other => other.to_string(),
	}
}
