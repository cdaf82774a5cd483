use std::collections::BTreeMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Native value held by, assigned to, or read from a field tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
	/// No value; assigning it clears a field.
	#[default]
	Null,
	/// Boolean.
	Bool(bool),
	/// Signed integer.
	I64(i64),
	/// Unsigned integer.
	U64(u64),
	/// Floating point number.
	F64(f64),
	/// Text, also the symbolic name of an enum value.
	String(String),
	/// Raw bytes.
	Bytes(Vec<u8>),
	/// Values of a repeated field.
	List(Vec<Value>),
	/// Field name to value for a message; undefined fields are absent.
	Message(BTreeMap<String, Value>),
}

impl Value {
	/// Build a message value from `(name, value)` pairs.
	pub fn message<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
		Self::Message(entries.into_iter().map(|(key, value)| (key.into(), value)).collect())
	}

	/// Build a list value.
	pub fn list<T: Into<Value>>(items: impl IntoIterator<Item = T>) -> Self {
		Self::List(items.into_iter().map(Into::into).collect())
	}

	/// Short name of the variant, for diagnostics.
	pub fn kind_name(&self) -> &'static str {
		match self {
			Self::Null => "null",
			Self::Bool(_) => "bool",
			Self::I64(_) | Self::U64(_) => "integer",
			Self::F64(_) => "number",
			Self::String(_) => "string",
			Self::Bytes(_) => "bytes",
			Self::List(_) => "list",
			Self::Message(_) => "message",
		}
	}

	/// True for `Null`.
	pub fn is_null(&self) -> bool {
		matches!(self, Self::Null)
	}

	/// Text payload, if this is a string.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::String(value) => Some(value),
			_ => None,
		}
	}

	/// Named field of a message value.
	pub fn get(&self, key: &str) -> Option<&Value> {
		match self {
			Self::Message(fields) => fields.get(key),
			_ => None,
		}
	}

	/// Convert a JSON document into a value tree.
	///
	/// Integral JSON numbers become `I64` (or `U64` above `i64::MAX`), everything else `F64`.
	pub fn from_json(json: &serde_json::Value) -> Self {
		use serde_json::Value as JsonValue;

		match json {
			JsonValue::Null => Self::Null,
			JsonValue::Bool(value) => Self::Bool(*value),
			JsonValue::Number(number) => {
				if let Some(value) = number.as_i64() {
					Self::I64(value)
				} else if let Some(value) = number.as_u64() {
					Self::U64(value)
				} else {
					Self::F64(number.as_f64().unwrap_or(f64::NAN))
				}
			}
			JsonValue::String(value) => Self::String(value.clone()),
			JsonValue::Array(items) => Self::List(items.iter().map(Self::from_json).collect()),
			JsonValue::Object(fields) => Self::Message(fields.iter().map(|(key, value)| (key.clone(), Self::from_json(value))).collect()),
		}
	}

	/// Convert a value tree into JSON; bytes become padded base64 strings.
	pub fn to_json(&self) -> serde_json::Value {
		use serde_json::{Map, Value as JsonValue};

		match self {
			Self::Null => JsonValue::Null,
			Self::Bool(value) => serde_json::json!(value),
			Self::I64(value) => serde_json::json!(value),
			Self::U64(value) => serde_json::json!(value),
			Self::F64(value) => number_json(*value),
			Self::String(value) => serde_json::json!(value),
			Self::Bytes(value) => serde_json::json!(STANDARD.encode(value)),
			Self::List(items) => JsonValue::Array(items.iter().map(Self::to_json).collect()),
			Self::Message(fields) => {
				let mut out = Map::new();
				for (key, value) in fields {
					out.insert(key.clone(), value.to_json());
				}
				JsonValue::Object(out)
			}
		}
	}
}

/// Integral doubles inside the exact range render without a fractional part, like JSON producers
/// that only know one number type.
pub(crate) fn number_json(value: f64) -> serde_json::Value {
	if value.fract() == 0.0 && value.abs() <= MAX_SAFE_INTEGER as f64 {
		return serde_json::json!(value as i64);
	}
	serde_json::Number::from_f64(value).map(serde_json::Value::Number).unwrap_or(serde_json::Value::Null)
}

/// Largest integer exactly representable by an IEEE double.
pub const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

impl From<bool> for Value {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl From<i32> for Value {
	fn from(value: i32) -> Self {
		Self::I64(i64::from(value))
	}
}

impl From<i64> for Value {
	fn from(value: i64) -> Self {
		Self::I64(value)
	}
}

impl From<u32> for Value {
	fn from(value: u32) -> Self {
		Self::U64(u64::from(value))
	}
}

impl From<u64> for Value {
	fn from(value: u64) -> Self {
		Self::U64(value)
	}
}

impl From<f32> for Value {
	fn from(value: f32) -> Self {
		Self::F64(f64::from(value))
	}
}

impl From<f64> for Value {
	fn from(value: f64) -> Self {
		Self::F64(value)
	}
}

impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Self::String(value.to_owned())
	}
}

impl From<String> for Value {
	fn from(value: String) -> Self {
		Self::String(value)
	}
}

impl From<Vec<u8>> for Value {
	fn from(value: Vec<u8>) -> Self {
		Self::Bytes(value)
	}
}

impl From<&[u8]> for Value {
	fn from(value: &[u8]) -> Self {
		Self::Bytes(value.to_vec())
	}
}

#[cfg(test)]
mod tests {
	use super::Value;

	#[test]
	fn json_numbers_map_to_integer_or_float_variants() {
		let json = serde_json::json!({"a": 1, "b": -2, "c": 1.5, "d": 18446744073709551615u64});
		let value = Value::from_json(&json);
		assert_eq!(value.get("a"), Some(&Value::I64(1)));
		assert_eq!(value.get("b"), Some(&Value::I64(-2)));
		assert_eq!(value.get("c"), Some(&Value::F64(1.5)));
		assert_eq!(value.get("d"), Some(&Value::U64(u64::MAX)));
	}

	#[test]
	fn integral_doubles_render_as_json_integers() {
		assert_eq!(Value::F64(123456.0).to_json(), serde_json::json!(123456));
		assert_eq!(Value::F64(53.210243).to_json(), serde_json::json!(53.210243));
		assert_eq!(Value::F64(f64::NAN).to_json(), serde_json::Value::Null);
	}

	#[test]
	fn bytes_render_as_padded_base64() {
		assert_eq!(Value::from(b"Hello".as_slice()).to_json(), serde_json::json!("SGVsbG8="));
	}

	#[test]
	fn message_builder_collects_entries() {
		let value = Value::message([("name", Value::from("Alice")), ("age", Value::from(30))]);
		assert_eq!(value.get("name").and_then(Value::as_str), Some("Alice"));
		assert_eq!(value.get("age"), Some(&Value::I64(30)));
		assert!(value.get("missing").is_none());
	}
}
