use crate::pbf::options::{check_delimiter, check_field_number};
use crate::pbf::{DEFAULT_DELIMITER, FieldOptions, PbfError, Result, Value};

/// Options plus the field-number lock, shared by every field kind.
#[derive(Debug, Clone)]
pub struct FieldCore {
	pub(crate) options: FieldOptions,
	pub(crate) locked: bool,
}

impl FieldCore {
	/// Check options and build an unlocked core.
	pub fn new(options: FieldOptions) -> Result<Self> {
		options.check()?;
		Ok(Self { options, locked: false })
	}

	/// Configured options.
	pub fn options(&self) -> &FieldOptions {
		&self.options
	}

	/// Adopt a number seen in encoded input when none was configured.
	pub(crate) fn adopt_number(&mut self, field_number: Option<u32>) {
		if self.options.field_number.is_none() {
			self.options.field_number = field_number;
		}
	}
}

/// Capability set common to scalar, enum, reserved, and message fields.
pub trait Field {
	/// Shared options and lock state.
	fn core(&self) -> &FieldCore;

	/// Mutable access to options and lock state.
	fn core_mut(&mut self) -> &mut FieldCore;

	/// One-character wire type tag.
	fn type_letter(&self) -> char;

	/// True iff the field holds no value.
	fn is_undefined(&self) -> bool;

	/// Current value; `Value::Null` when undefined.
	fn value(&self) -> Value;

	/// Replace the value; `Value::Null` clears it.
	fn set_value(&mut self, value: Value) -> Result<()>;

	/// Check shape, required-ness, and value constraints.
	fn validate(&self) -> Result<()>;

	/// Encode into the delimited text format.
	fn to_url(&self) -> Result<String>;

	/// Decode from the delimited text format.
	fn from_url(&mut self, text: &str) -> Result<()>;

	/// Encode into the positional array format; `None` when there is nothing to encode.
	fn to_array(&self) -> Result<Option<serde_json::Value>>;

	/// Decode from the positional array format.
	fn from_array(&mut self, value: &serde_json::Value) -> Result<()>;

	/// Configured options.
	fn options(&self) -> &FieldOptions {
		&self.core().options
	}

	/// Dotted diagnostic path.
	fn name(&self) -> &str {
		&self.core().options.name
	}

	/// Assigned field number.
	fn field_number(&self) -> Result<u32> {
		self.core().options.field_number.ok_or_else(|| PbfError::MissingFieldNumber { name: self.name().to_owned() })
	}

	/// Current token delimiter.
	fn delimiter(&self) -> char {
		self.core().options.delimiter
	}

	/// Change the delimiter; `None` restores the default.
	fn set_delimiter(&mut self, delimiter: Option<char>) -> Result<()> {
		let delimiter = delimiter.unwrap_or(DEFAULT_DELIMITER);
		check_delimiter(delimiter, self.name())?;
		self.core_mut().options.delimiter = delimiter;
		Ok(())
	}

	/// True once a parent message has claimed the number.
	fn is_field_number_locked(&self) -> bool {
		self.core().locked
	}

	/// Freeze the field number.
	fn lock_field_number(&mut self) {
		self.core_mut().locked = true;
	}

	/// Allow renumbering again.
	fn unlock_field_number(&mut self) {
		self.core_mut().locked = false;
	}

	/// Renumber the field; fails while the number is locked.
	fn set_field_number(&mut self, field_number: u32) -> Result<()> {
		let core = self.core_mut();
		if core.locked {
			return Err(PbfError::FieldNumberLocked {
				name: core.options.name.clone(),
			});
		}
		check_field_number(field_number, &core.options.name)?;
		core.options.field_number = Some(field_number);
		Ok(())
	}
}
