use crate::pbf::{PbfError, Result};

/// Delimiter used by the text format when none is configured.
pub const DEFAULT_DELIMITER: char = '!';

/// Per-field configuration shared by every field kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldOptions {
	/// Wire identity of the field; `None` for a root message or a detached field.
	pub field_number: Option<u32>,
	/// Encoding fails when the field holds no value.
	pub required: bool,
	/// The field holds a list of values.
	pub repeated: bool,
	/// Token delimiter for the text format.
	pub delimiter: char,
	/// Dotted path used in diagnostics.
	pub name: String,
}

impl Default for FieldOptions {
	fn default() -> Self {
		Self {
			field_number: None,
			required: false,
			repeated: false,
			delimiter: DEFAULT_DELIMITER,
			name: String::new(),
		}
	}
}

impl FieldOptions {
	/// Options for a field with the given wire number.
	pub fn numbered(field_number: u32) -> Self {
		Self {
			field_number: Some(field_number),
			..Self::default()
		}
	}

	/// Set the diagnostic name.
	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = name.into();
		self
	}

	/// Mark the field required.
	pub fn required(mut self) -> Self {
		self.required = true;
		self
	}

	/// Mark the field repeated.
	pub fn repeated(mut self) -> Self {
		self.repeated = true;
		self
	}

	/// Use a non-default delimiter.
	pub fn with_delimiter(mut self, delimiter: char) -> Self {
		self.delimiter = delimiter;
		self
	}

	/// Check field number and delimiter before a field is built from these options.
	pub fn check(&self) -> Result<()> {
		if let Some(field_number) = self.field_number {
			check_field_number(field_number, &self.name)?;
		}
		check_delimiter(self.delimiter, &self.name)
	}
}

pub(crate) fn check_field_number(field_number: u32, name: &str) -> Result<()> {
	if field_number == 0 {
		return Err(PbfError::InvalidFieldNumber {
			field_number,
			name: name.to_owned(),
		});
	}
	Ok(())
}

/// Characters that appear unescaped in number or base64 payloads, or act as the escape marker.
const UNSAFE_DELIMITERS: [char; 4] = ['*', '-', '_', '.'];

/// Delimiters must be ASCII punctuation that no scalar payload can contain.
pub(crate) fn check_delimiter(delimiter: char, name: &str) -> Result<()> {
	if !delimiter.is_ascii_punctuation() || UNSAFE_DELIMITERS.contains(&delimiter) {
		return Err(PbfError::InvalidDelimiter {
			delimiter,
			name: name.to_owned(),
		});
	}
	Ok(())
}

/// Join a parent path and a child field name.
pub(crate) fn child_path(parent: &str, child: &str) -> String {
	if parent.is_empty() {
		child.to_owned()
	} else {
		format!("{parent}.{child}")
	}
}
