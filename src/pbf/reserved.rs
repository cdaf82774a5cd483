use crate::pbf::field::{Field, FieldCore};
use crate::pbf::kind::RESERVED_LETTER;
use crate::pbf::{FieldOptions, Result, Value};

/// Placeholder for a slot that must never carry data; every write is discarded.
#[derive(Debug, Clone)]
pub struct ReservedField {
	core: FieldCore,
}

impl ReservedField {
	/// Build a reserved slot.
	pub fn new(options: FieldOptions) -> Result<Self> {
		Ok(Self { core: FieldCore::new(options)? })
	}
}

impl Field for ReservedField {
	fn core(&self) -> &FieldCore {
		&self.core
	}

	fn core_mut(&mut self) -> &mut FieldCore {
		&mut self.core
	}

	fn type_letter(&self) -> char {
		RESERVED_LETTER
	}

	fn is_undefined(&self) -> bool {
		true
	}

	fn value(&self) -> Value {
		Value::Null
	}

	fn set_value(&mut self, _value: Value) -> Result<()> {
		Ok(())
	}

	fn validate(&self) -> Result<()> {
		Ok(())
	}

	fn to_url(&self) -> Result<String> {
		Ok(String::new())
	}

	fn from_url(&mut self, _text: &str) -> Result<()> {
		Ok(())
	}

	fn to_array(&self) -> Result<Option<serde_json::Value>> {
		Ok(None)
	}

	fn from_array(&mut self, _value: &serde_json::Value) -> Result<()> {
		Ok(())
	}
}
