//! Resolution of [`MessageInput`] into canonical [`ChatMessage`] records.

// self
use crate::{
	_prelude::*,
	error::MessageError,
	message::{ChatMessage, MessageInput, MessageShape, Role, string_form},
};

/// Turns caller input into canonical messages.
///
/// Permissive mode mirrors the wrapper this crate replaces: anything it cannot read as a
/// role/content record becomes user text. Strict mode rejects those shapes with a
/// [`MessageError`] instead.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Normalizer {
	strict: bool,
}
impl Normalizer {
	/// Coerces unrecognized shapes into `user` text.
	pub const fn permissive() -> Self {
		Self { strict: false }
	}

	/// Rejects bare values, content-less mappings, non-string fields, and unknown roles.
	pub const fn strict() -> Self {
		Self { strict: true }
	}

	/// Returns `true` when strict validation is enabled.
	pub const fn is_strict(&self) -> bool {
		self.strict
	}

	/// Normalizes the input; the output has one record per input element, or exactly one for
	/// [`MessageInput::Text`].
	pub fn normalize(&self, input: MessageInput) -> Result<Vec<ChatMessage>, MessageError> {
		match input {
			MessageInput::Text(text) => Ok(vec![ChatMessage::user(text)]),
			MessageInput::Sequence(items) => items
				.into_iter()
				.enumerate()
				.map(|(index, shape)| self.normalize_shape(index, shape))
				.collect(),
		}
	}

	fn normalize_shape(
		&self,
		index: usize,
		shape: MessageShape,
	) -> Result<ChatMessage, MessageError> {
		match shape {
			MessageShape::Pair { role, content } => {
				let role = self.read_role(index, &role)?;
				let content = self.read_content(index, &content)?;

				Ok(ChatMessage { role, content })
			},
			MessageShape::Mapping(map) => {
				let role = match map.get("role") {
					Some(value) => self.read_role(index, value)?,
					None => Role::User,
				};
				let content = match map.get("content") {
					Some(value) => Some(self.read_content(index, value)?),
					None if self.strict => return Err(MessageError::MissingContent { index }),
					None => None,
				};
				let content = content.unwrap_or_else(|| Value::Object(map).to_string());

				Ok(ChatMessage { role, content })
			},
			MessageShape::Scalar(_) if self.strict => Err(MessageError::BareValue { index }),
			MessageShape::Scalar(value) => Ok(ChatMessage::user(string_form(&value))),
		}
	}

	fn read_role(&self, index: usize, value: &Value) -> Result<Role, MessageError> {
		if !self.strict {
			return Ok(Role::from(string_form(value)));
		}

		let Value::String(label) = value else {
			return Err(MessageError::NonStringField { index, field: "role" });
		};
		let role = Role::from(label.as_str());

		if role.is_known() {
			Ok(role)
		} else {
			Err(MessageError::UnknownRole { index, role: label.clone() })
		}
	}

	fn read_content(&self, index: usize, value: &Value) -> Result<String, MessageError> {
		match value {
			Value::String(text) => Ok(text.clone()),
			_ if self.strict => Err(MessageError::NonStringField { index, field: "content" }),
			other => Ok(string_form(other)),
		}
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	fn permissive(input: impl Into<MessageInput>) -> Vec<ChatMessage> {
		Normalizer::permissive().normalize(input.into()).expect("Permissive mode never fails.")
	}

	#[test]
	fn text_wraps_as_single_user_message() {
		assert_eq!(permissive("hello"), vec![ChatMessage::user("hello")]);
	}

	#[test]
	fn pairs_keep_role_and_content() {
		assert_eq!(
			permissive([("system", "rules"), ("user", "hi")]),
			vec![ChatMessage::system("rules"), ChatMessage::user("hi")]
		);
	}

	#[test]
	fn mappings_default_missing_fields() {
		let normalized = permissive(json!([
			{"content": "no role"},
			{"role": "assistant"},
			{"role": "system", "content": "both", "name": "extra"}
		]));

		assert_eq!(normalized.len(), 3);
		assert_eq!(normalized[0], ChatMessage::user("no role"));
		assert_eq!(normalized[1], ChatMessage::assistant("{\"role\":\"assistant\"}"));
		assert_eq!(normalized[2], ChatMessage::system("both"));
	}

	#[test]
	fn scalars_become_user_text() {
		let normalized = permissive(json!([7, null, ["solo"], "plain"]));

		assert_eq!(
			normalized,
			vec![
				ChatMessage::user("7"),
				ChatMessage::user("null"),
				ChatMessage::user("[\"solo\"]"),
				ChatMessage::user("plain"),
			]
		);
	}

	#[test]
	fn non_string_pair_members_use_string_form() {
		let normalized = permissive(json!([[1, {"k": true}]]));

		assert_eq!(normalized, vec![ChatMessage::new("1", "{\"k\":true}")]);
	}

	#[test]
	fn normalization_is_idempotent() {
		let first = permissive(json!([
			["system", "rules"],
			{"role": "narrator", "content": "once upon"},
			"question"
		]));
		let second = permissive(first.clone());

		assert_eq!(first, second);
	}

	#[test]
	fn empty_sequence_normalizes_to_nothing() {
		assert!(permissive(Vec::<ChatMessage>::new()).is_empty());
	}

	#[test]
	fn strict_mode_rejects_ambiguous_shapes() {
		let strict = Normalizer::strict();

		assert_eq!(
			strict.normalize(MessageInput::from_value(json!(["bare"]))),
			Err(MessageError::BareValue { index: 0 })
		);
		assert_eq!(
			strict.normalize(MessageInput::from_value(json!([{"role": "user"}]))),
			Err(MessageError::MissingContent { index: 0 })
		);
		assert_eq!(
			strict.normalize(MessageInput::from_value(json!([["user", "ok"], [3, "x"]]))),
			Err(MessageError::NonStringField { index: 1, field: "role" })
		);
		assert_eq!(
			strict.normalize(MessageInput::from_value(json!([["user", {"nested": 1}]]))),
			Err(MessageError::NonStringField { index: 0, field: "content" })
		);
		assert_eq!(
			strict.normalize(MessageInput::from_value(json!([["robot", "beep"]]))),
			Err(MessageError::UnknownRole { index: 0, role: "robot".into() })
		);
	}

	#[test]
	fn strict_mode_accepts_canonical_records() {
		let strict = Normalizer::strict();

		assert_eq!(
			strict.normalize("hello".into()),
			Ok(vec![ChatMessage::user("hello")])
		);
		assert_eq!(
			strict.normalize(vec![ChatMessage::system("rules"), ChatMessage::user("hi")].into()),
			Ok(vec![ChatMessage::system("rules"), ChatMessage::user("hi")])
		);
	}
}
