use crate::pbf::field::{Field, FieldCore};
use crate::pbf::kind::NumericClass;
use crate::pbf::text::{decode_base64, encode_base64, encode_base64_url, escape_string, strip_field_prefix, unescape_string};
use crate::pbf::value::{MAX_SAFE_INTEGER, number_json};
use crate::pbf::{FieldOptions, PbfError, Result, ScalarKind, Value};

/// A field holding one primitive value, or a list of them when repeated.
#[derive(Debug, Clone)]
pub struct ScalarField {
	core: FieldCore,
	kind: ScalarKind,
	value: Option<Value>,
}

impl ScalarField {
	/// Build an empty field of the given kind.
	pub fn new(kind: ScalarKind, options: FieldOptions) -> Result<Self> {
		Ok(Self {
			core: FieldCore::new(options)?,
			kind,
			value: None,
		})
	}

	/// Primitive kind of this field.
	pub fn kind(&self) -> ScalarKind {
		self.kind
	}

	fn repeated(&self) -> bool {
		self.core.options.repeated
	}

	fn shape_mismatch(&self) -> PbfError {
		PbfError::ShapeMismatch {
			repeated: self.repeated(),
			name: self.name().to_owned(),
		}
	}

	/// Convert one assigned value into this kind's canonical variant and check its range.
	fn normalize(&self, value: Value) -> Result<Value> {
		let name = self.name();
		if let Some(class) = self.kind.numeric_class() {
			return normalize_number(self.kind, class, value, name);
		}

		match (self.kind, value) {
			(ScalarKind::Bool, Value::Bool(value)) => Ok(Value::Bool(value)),
			(ScalarKind::String | ScalarKind::Base64String, Value::String(value)) => Ok(Value::String(value)),
			(ScalarKind::Bytes, Value::Bytes(value)) => Ok(Value::Bytes(value)),
			(ScalarKind::Bytes, Value::String(text)) => decode_base64(&text, name).map(Value::Bytes),
			(kind, other) => Err(PbfError::TypeMismatch {
				expected: kind.type_name(),
				got: other.kind_name(),
				name: name.to_owned(),
			}),
		}
	}

	/// Re-check a stored element without conversion.
	fn check_element(&self, value: &Value) -> Result<()> {
		let name = self.name();
		match (self.kind.numeric_class(), value) {
			(Some(NumericClass::Float), Value::F64(value)) if value.is_nan() => Err(PbfError::NotANumber { name: name.to_owned() }),
			(Some(NumericClass::Float), Value::F64(_)) => Ok(()),
			(Some(NumericClass::Signed32), Value::I64(value)) => check_i32(self.kind, *value, name),
			(Some(NumericClass::Unsigned32), Value::U64(value)) => check_u32(self.kind, *value, name),
			(Some(NumericClass::Signed64), Value::I64(_)) | (Some(NumericClass::Unsigned64), Value::U64(_)) => Ok(()),
			(None, Value::Bool(_)) if self.kind == ScalarKind::Bool => Ok(()),
			(None, Value::String(_)) if matches!(self.kind, ScalarKind::String | ScalarKind::Base64String) => Ok(()),
			(None, Value::Bytes(_)) if self.kind == ScalarKind::Bytes => Ok(()),
			(_, other) => Err(PbfError::TypeMismatch {
				expected: self.kind.type_name(),
				got: other.kind_name(),
				name: name.to_owned(),
			}),
		}
	}

	fn encode_text(&self, value: &Value) -> String {
		match value {
			Value::Bool(value) => value.to_string(),
			Value::I64(value) => value.to_string(),
			Value::U64(value) => value.to_string(),
			Value::F64(value) => value.to_string(),
			Value::String(value) if self.kind == ScalarKind::Base64String => encode_base64_url(value.as_bytes()),
			Value::String(value) => escape_string(value, self.delimiter()),
			Value::Bytes(value) => encode_base64_url(value),
			Value::Null | Value::List(_) | Value::Message(_) => String::new(),
		}
	}

	/// Decode one text payload; `None` means the payload carries no value.
	fn decode_text(&self, text: &str) -> Result<Option<Value>> {
		let name = self.name();
		match self.kind {
			ScalarKind::String => unescape_string(text, name).map(|value| Some(Value::String(value))),
			ScalarKind::Base64String => {
				let bytes = decode_base64(text, name)?;
				let value = String::from_utf8(bytes).map_err(|_| PbfError::InvalidUtf8 { name: name.to_owned() })?;
				Ok(Some(Value::String(value)))
			}
			ScalarKind::Bytes => decode_base64(text, name).map(|bytes| Some(Value::Bytes(bytes))),
			_ if text.is_empty() => Ok(None),
			ScalarKind::Bool => match text {
				"true" => Ok(Some(Value::Bool(true))),
				"false" => Ok(Some(Value::Bool(false))),
				_ => Err(PbfError::MalformedToken {
					token: text.to_owned(),
					name: name.to_owned(),
				}),
			},
			_ => parse_number_text(text, name).map(Some),
		}
	}

	fn element_json(&self, value: &Value) -> serde_json::Value {
		match value {
			Value::F64(value) => number_json(*value),
			Value::Bytes(value) => serde_json::json!(encode_base64(value)),
			other => other.to_json(),
		}
	}

	fn element_from_json(&self, json: &serde_json::Value) -> Result<Value> {
		use serde_json::Value as JsonValue;

		match (self.kind.numeric_class(), json) {
			(Some(_), JsonValue::Number(_)) | (None, JsonValue::Bool(_)) => Ok(Value::from_json(json)),
			// 64-bit integers are commonly carried as JSON strings
			(Some(_), JsonValue::String(text)) => parse_number_text(text, self.name()),
			(None, JsonValue::String(text)) if self.kind == ScalarKind::Bytes => decode_base64(text, self.name()).map(Value::Bytes),
			(None, JsonValue::String(text)) => Ok(Value::String(text.clone())),
			_ => Err(PbfError::InvalidArray {
				expected: self.kind.type_name(),
				name: self.name().to_owned(),
			}),
		}
	}
}

impl Field for ScalarField {
	fn core(&self) -> &FieldCore {
		&self.core
	}

	fn core_mut(&mut self) -> &mut FieldCore {
		&mut self.core
	}

	fn type_letter(&self) -> char {
		self.kind.letter()
	}

	fn is_undefined(&self) -> bool {
		self.value.is_none()
	}

	fn value(&self) -> Value {
		self.value.clone().unwrap_or_default()
	}

	fn set_value(&mut self, value: Value) -> Result<()> {
		let normalized = match value {
			Value::Null => None,
			Value::List(items) => {
				if !self.repeated() {
					return Err(self.shape_mismatch());
				}
				let items = items.into_iter().map(|item| self.normalize(item)).collect::<Result<Vec<_>>>()?;
				(!items.is_empty()).then_some(Value::List(items))
			}
			single => {
				if self.repeated() {
					return Err(self.shape_mismatch());
				}
				Some(self.normalize(single)?)
			}
		};
		self.value = normalized;
		Ok(())
	}

	fn validate(&self) -> Result<()> {
		match &self.value {
			None if self.core.options.required => Err(PbfError::MissingRequired { name: self.name().to_owned() }),
			None => Ok(()),
			Some(Value::List(items)) if self.repeated() => items.iter().try_for_each(|item| self.check_element(item)),
			Some(Value::List(_)) => Err(self.shape_mismatch()),
			Some(_) if self.repeated() => Err(self.shape_mismatch()),
			Some(value) => self.check_element(value),
		}
	}

	fn to_url(&self) -> Result<String> {
		if self.repeated() {
			return Err(PbfError::RepeatedUrl { name: self.name().to_owned() });
		}
		self.validate()?;
		let Some(value) = &self.value else {
			return Ok(String::new());
		};

		let encoded = self.encode_text(value);
		match self.core.options.field_number {
			Some(field_number) => Ok(format!("{}{}{}{}", self.delimiter(), field_number, self.type_letter(), encoded)),
			None => Ok(encoded),
		}
	}

	fn from_url(&mut self, text: &str) -> Result<()> {
		if self.repeated() {
			return Err(PbfError::RepeatedUrl { name: self.name().to_owned() });
		}
		if text.is_empty() {
			self.value = None;
			return Ok(());
		}

		let (prefix_number, payload) = strip_field_prefix(text, self.delimiter(), self.core.options.field_number, self.type_letter(), self.name())?;
		let decoded = self.decode_text(payload)?;
		self.set_value(decoded.unwrap_or_default())?;
		self.core.adopt_number(prefix_number);
		Ok(())
	}

	fn to_array(&self) -> Result<Option<serde_json::Value>> {
		self.validate()?;
		Ok(self.value.as_ref().map(|value| match value {
			Value::List(items) => serde_json::Value::Array(items.iter().map(|item| self.element_json(item)).collect()),
			single => self.element_json(single),
		}))
	}

	fn from_array(&mut self, json: &serde_json::Value) -> Result<()> {
		let value = match json {
			serde_json::Value::Null => Value::Null,
			serde_json::Value::Array(items) => Value::List(items.iter().map(|item| self.element_from_json(item)).collect::<Result<_>>()?),
			single => self.element_from_json(single)?,
		};
		self.set_value(value)
	}
}

/// Parse decimal text as the narrowest exact variant.
fn parse_number_text(text: &str, name: &str) -> Result<Value> {
	if let Ok(value) = text.parse::<i64>() {
		return Ok(Value::I64(value));
	}
	if let Ok(value) = text.parse::<u64>() {
		return Ok(Value::U64(value));
	}
	text.parse::<f64>().map(Value::F64).map_err(|_| PbfError::InvalidNumber {
		text: text.to_owned(),
		name: name.to_owned(),
	})
}

fn normalize_number(kind: ScalarKind, class: NumericClass, value: Value, name: &str) -> Result<Value> {
	match class {
		NumericClass::Float => {
			let value = match value {
				Value::I64(value) => value as f64,
				Value::U64(value) => value as f64,
				Value::F64(value) => value,
				other => return Err(number_mismatch(kind, &other, name)),
			};
			if value.is_nan() {
				return Err(PbfError::NotANumber { name: name.to_owned() });
			}
			Ok(Value::F64(value))
		}
		NumericClass::Signed32 => {
			let value = integer_i64(kind, value, name)?;
			check_i32(kind, value, name)?;
			Ok(Value::I64(value))
		}
		NumericClass::Unsigned32 => {
			let value = integer_u64(kind, value, name)?;
			check_u32(kind, value, name)?;
			Ok(Value::U64(value))
		}
		NumericClass::Signed64 => {
			let value = integer_i64(kind, value, name)?;
			warn_imprecise(kind, value.unsigned_abs(), name);
			Ok(Value::I64(value))
		}
		NumericClass::Unsigned64 => {
			let value = integer_u64(kind, value, name)?;
			warn_imprecise(kind, value, name);
			Ok(Value::U64(value))
		}
	}
}

fn integer_i64(kind: ScalarKind, value: Value, name: &str) -> Result<i64> {
	match value {
		Value::I64(value) => Ok(value),
		Value::U64(value) => i64::try_from(value).map_err(|_| out_of_range(kind, value, name)),
		Value::F64(value) => {
			let value = integral(kind, value, name)?;
			// i64::MAX is not representable; 2^63 is the first double past it
			if value < -(2f64.powi(63)) || value >= 2f64.powi(63) {
				return Err(out_of_range(kind, value, name));
			}
			Ok(value as i64)
		}
		other => Err(number_mismatch(kind, &other, name)),
	}
}

fn integer_u64(kind: ScalarKind, value: Value, name: &str) -> Result<u64> {
	match value {
		Value::I64(value) => u64::try_from(value).map_err(|_| out_of_range(kind, value, name)),
		Value::U64(value) => Ok(value),
		Value::F64(value) => {
			let value = integral(kind, value, name)?;
			if value < 0.0 || value >= 2f64.powi(64) {
				return Err(out_of_range(kind, value, name));
			}
			Ok(value as u64)
		}
		other => Err(number_mismatch(kind, &other, name)),
	}
}

fn integral(kind: ScalarKind, value: f64, name: &str) -> Result<f64> {
	if !value.is_finite() || value.fract() != 0.0 {
		return Err(PbfError::NonInteger {
			value,
			kind: kind.type_name(),
			name: name.to_owned(),
		});
	}
	Ok(value)
}

fn check_i32(kind: ScalarKind, value: i64, name: &str) -> Result<()> {
	if i32::try_from(value).is_err() {
		return Err(out_of_range(kind, value, name));
	}
	Ok(())
}

fn check_u32(kind: ScalarKind, value: u64, name: &str) -> Result<()> {
	if u32::try_from(value).is_err() {
		return Err(out_of_range(kind, value, name));
	}
	Ok(())
}

fn warn_imprecise(kind: ScalarKind, magnitude: u64, name: &str) {
	if magnitude > MAX_SAFE_INTEGER {
		tracing::warn!(field = name, kind = kind.type_name(), magnitude, "64-bit value exceeds 2^53-1 and may lose precision in floating-point consumers");
	}
}

fn out_of_range(kind: ScalarKind, value: impl ToString, name: &str) -> PbfError {
	PbfError::OutOfRange {
		value: value.to_string(),
		kind: kind.type_name(),
		name: name.to_owned(),
	}
}

fn number_mismatch(kind: ScalarKind, value: &Value, name: &str) -> PbfError {
	PbfError::TypeMismatch {
		expected: kind.type_name(),
		got: value.kind_name(),
		name: name.to_owned(),
	}
}
