use crate::pbf::field::{Field, FieldCore};
use crate::pbf::kind::ENUM_LETTER;
use crate::pbf::text::strip_field_prefix;
use crate::pbf::{FieldOptions, PbfError, Result, Value};

/// One code/name pair of an enum table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumCode {
	/// Wire code.
	pub code: i32,
	/// Symbolic name.
	pub value: String,
}

impl EnumCode {
	/// Pair a code with its symbolic name.
	pub fn new(code: i32, value: impl Into<String>) -> Self {
		Self { code, value: value.into() }
	}
}

/// A field storing enum codes and exposing symbolic names.
#[derive(Debug, Clone)]
pub struct EnumField {
	core: FieldCore,
	codes: Vec<EnumCode>,
	/// Single code, or one code per element when repeated.
	value: Option<Vec<i32>>,
}

impl EnumField {
	/// Build an empty field over the given code table.
	pub fn new(codes: Vec<EnumCode>, options: FieldOptions) -> Result<Self> {
		Ok(Self {
			core: FieldCore::new(options)?,
			codes,
			value: None,
		})
	}

	/// Code table, sorted by code.
	pub fn codes(&self) -> &[EnumCode] {
		&self.codes
	}

	/// Stored codes, in order.
	pub fn stored_codes(&self) -> Option<&[i32]> {
		self.value.as_deref()
	}

	/// Name for a code.
	pub fn lookup_code(&self, code: i64) -> Result<&str> {
		self.codes
			.iter()
			.find(|entry| i64::from(entry.code) == code)
			.map(|entry| entry.value.as_str())
			.ok_or_else(|| PbfError::UnknownEnumCode {
				code,
				valid: self.codes.iter().map(|entry| entry.code.to_string()).collect::<Vec<_>>().join(", "),
				name: self.name().to_owned(),
			})
	}

	/// Code for a name.
	pub fn lookup_value(&self, value: &str) -> Result<i32> {
		self.codes
			.iter()
			.find(|entry| entry.value == value)
			.map(|entry| entry.code)
			.ok_or_else(|| PbfError::UnknownEnumName {
				value: value.to_owned(),
				valid: self.codes.iter().map(|entry| entry.value.as_str()).collect::<Vec<_>>().join(", "),
				name: self.name().to_owned(),
			})
	}

	fn repeated(&self) -> bool {
		self.core.options.repeated
	}

	/// Accept a code or a name and return the code.
	fn resolve(&self, value: &Value) -> Result<i32> {
		let code = match value {
			Value::String(name) => return self.lookup_value(name),
			Value::I64(code) => *code,
			Value::U64(code) => i64::try_from(*code).unwrap_or(i64::MAX),
			Value::F64(code) if code.fract() == 0.0 && code.is_finite() => *code as i64,
			Value::F64(code) => {
				return Err(PbfError::NonInteger {
					value: *code,
					kind: "enum",
					name: self.name().to_owned(),
				});
			}
			other => {
				return Err(PbfError::TypeMismatch {
					expected: "enum code or name",
					got: other.kind_name(),
					name: self.name().to_owned(),
				});
			}
		};
		self.lookup_code(code)?;
		Ok(code as i32)
	}

	fn decode_code(&self, text: &str) -> Result<Value> {
		text.parse::<i64>().map(Value::I64).map_err(|_| PbfError::InvalidNumber {
			text: text.to_owned(),
			name: self.name().to_owned(),
		})
	}
}

impl Field for EnumField {
	fn core(&self) -> &FieldCore {
		&self.core
	}

	fn core_mut(&mut self) -> &mut FieldCore {
		&mut self.core
	}

	fn type_letter(&self) -> char {
		ENUM_LETTER
	}

	fn is_undefined(&self) -> bool {
		self.value.is_none()
	}

	/// Symbolic name, or a list of names when repeated.
	fn value(&self) -> Value {
		let Some(codes) = &self.value else {
			return Value::Null;
		};
		let mut names = codes.iter().map(|code| self.lookup_code(i64::from(*code)).map(|name| Value::String(name.to_owned())).unwrap_or(Value::I64(i64::from(*code))));
		if self.repeated() {
			Value::List(names.collect())
		} else {
			names.next().unwrap_or_default()
		}
	}

	fn set_value(&mut self, value: Value) -> Result<()> {
		let codes = match value {
			Value::Null => None,
			Value::List(items) => {
				if !self.repeated() {
					return Err(PbfError::ShapeMismatch {
						repeated: false,
						name: self.name().to_owned(),
					});
				}
				let codes = items.iter().map(|item| self.resolve(item)).collect::<Result<Vec<_>>>()?;
				(!codes.is_empty()).then_some(codes)
			}
			// repeated fields wrap a single assignment
			single => Some(vec![self.resolve(&single)?]),
		};
		self.value = codes;
		Ok(())
	}

	fn validate(&self) -> Result<()> {
		let Some(codes) = &self.value else {
			if self.core.options.required {
				return Err(PbfError::MissingRequired { name: self.name().to_owned() });
			}
			return Ok(());
		};
		if !self.repeated() && codes.len() != 1 {
			return Err(PbfError::ShapeMismatch {
				repeated: false,
				name: self.name().to_owned(),
			});
		}
		codes.iter().try_for_each(|code| self.lookup_code(i64::from(*code)).map(|_| ()))
	}

	fn to_url(&self) -> Result<String> {
		if self.repeated() {
			return Err(PbfError::RepeatedUrl { name: self.name().to_owned() });
		}
		self.validate()?;
		let Some(code) = self.value.as_ref().and_then(|codes| codes.first()) else {
			return Ok(String::new());
		};
		match self.core.options.field_number {
			Some(field_number) => Ok(format!("{}{}{}{}", self.delimiter(), field_number, ENUM_LETTER, code)),
			None => Ok(code.to_string()),
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
		let (prefix_number, payload) = strip_field_prefix(text, self.delimiter(), self.core.options.field_number, ENUM_LETTER, self.name())?;
		let value = if payload.is_empty() { Value::Null } else { self.decode_code(payload)? };
		self.set_value(value)?;
		self.core.adopt_number(prefix_number);
		Ok(())
	}

	fn to_array(&self) -> Result<Option<serde_json::Value>> {
		self.validate()?;
		Ok(self.value.as_ref().map(|codes| match (self.repeated(), codes.as_slice()) {
			(false, [code]) => serde_json::json!(code),
			_ => serde_json::json!(codes),
		}))
	}

	fn from_array(&mut self, json: &serde_json::Value) -> Result<()> {
		let value = Value::from_json(json);
		match &value {
			Value::Null | Value::I64(_) | Value::U64(_) | Value::F64(_) | Value::String(_) => {}
			Value::List(items) if items.iter().all(|item| matches!(item, Value::I64(_) | Value::U64(_) | Value::F64(_) | Value::String(_))) => {}
			_ => {
				return Err(PbfError::InvalidArray {
					expected: "enum code or list of codes",
					name: self.name().to_owned(),
				});
			}
		}
		self.set_value(value)
	}
}
