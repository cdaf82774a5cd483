use crate::pbf::field::{Field, FieldCore};
use crate::pbf::kind::MESSAGE_LETTER;
use crate::pbf::options::check_delimiter;
use crate::pbf::schema::ResolvedType;
use crate::pbf::{DEFAULT_DELIMITER, FieldOptions, MessageField, PbfError, Result, SchemaIndex, Value};

/// A repeated message field: an ordered list of messages sharing one field number.
#[derive(Debug, Clone)]
pub struct MessageList {
	core: FieldCore,
	schema: SchemaIndex,
	element_type: ResolvedType,
	items: Vec<MessageField>,
}

impl MessageList {
	/// Build an empty list of messages of `element_type`.
	pub fn new(schema: SchemaIndex, element_type: ResolvedType, options: FieldOptions) -> Result<Self> {
		Ok(Self {
			core: FieldCore::new(options)?,
			schema,
			element_type,
			items: Vec::new(),
		})
	}

	/// Elements in order.
	pub fn items(&self) -> &[MessageField] {
		&self.items
	}

	/// Mutable elements in order.
	pub fn items_mut(&mut self) -> &mut [MessageField] {
		&mut self.items
	}

	/// Number of elements.
	pub fn len(&self) -> usize {
		self.items.len()
	}

	/// True when the list holds no elements.
	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	/// Truncate, or append empty elements, until the list holds exactly `len` messages.
	pub fn resize(&mut self, len: usize) -> Result<()> {
		if len <= self.items.len() {
			self.items.truncate(len);
			return Ok(());
		}
		while self.items.len() < len {
			let options = FieldOptions {
				field_number: self.core.options.field_number,
				required: false,
				repeated: false,
				delimiter: self.core.options.delimiter,
				name: format!("{}[{}]", self.core.options.name, self.items.len()),
			};
			let mut item = MessageField::new(self.schema.clone(), self.element_type.clone(), options)?;
			item.lock_field_number();
			self.items.push(item);
		}
		Ok(())
	}
}

impl Field for MessageList {
	fn core(&self) -> &FieldCore {
		&self.core
	}

	fn core_mut(&mut self) -> &mut FieldCore {
		&mut self.core
	}

	fn type_letter(&self) -> char {
		MESSAGE_LETTER
	}

	fn is_undefined(&self) -> bool {
		self.items.iter().all(MessageField::is_undefined)
	}

	fn value(&self) -> Value {
		if self.items.is_empty() {
			return Value::Null;
		}
		Value::List(self.items.iter().map(MessageField::value).collect())
	}

	/// A list replaces the elements positionally; a single message is wrapped in a one-element list.
	fn set_value(&mut self, value: Value) -> Result<()> {
		let values = match value {
			Value::Null => Vec::new(),
			Value::List(values) => values,
			single => vec![single],
		};
		self.resize(values.len())?;
		for (item, value) in self.items.iter_mut().zip(values) {
			item.set_value(Value::Null)?;
			item.set_value(value)?;
		}
		Ok(())
	}

	fn validate(&self) -> Result<()> {
		if self.core.options.required && self.is_undefined() {
			return Err(PbfError::MissingRequired { name: self.name().to_owned() });
		}
		for item in &self.items {
			if item.options().field_number != self.core.options.field_number {
				return Err(PbfError::FieldNumberMismatch {
					expected: self.field_number()?,
					got: item.field_number()?,
					name: item.name().to_owned(),
				});
			}
			item.validate()?;
		}
		Ok(())
	}

	fn to_url(&self) -> Result<String> {
		Err(PbfError::RepeatedUrl { name: self.name().to_owned() })
	}

	fn from_url(&mut self, _text: &str) -> Result<()> {
		Err(PbfError::RepeatedUrl { name: self.name().to_owned() })
	}

	fn to_array(&self) -> Result<Option<serde_json::Value>> {
		self.validate()?;
		if self.items.is_empty() {
			return Ok(None);
		}
		let items = self.items.iter().map(|item| item.to_array().map(Option::unwrap_or_default)).collect::<Result<Vec<_>>>()?;
		Ok(Some(serde_json::Value::Array(items)))
	}

	fn from_array(&mut self, json: &serde_json::Value) -> Result<()> {
		let items = match json {
			serde_json::Value::Null => &[][..],
			serde_json::Value::Array(items) => items.as_slice(),
			_ => {
				return Err(PbfError::InvalidArray {
					expected: "array of messages",
					name: self.name().to_owned(),
				});
			}
		};
		self.resize(items.len())?;
		for (item, json) in self.items.iter_mut().zip(items) {
			item.from_array(json)?;
		}
		Ok(())
	}

	fn set_delimiter(&mut self, delimiter: Option<char>) -> Result<()> {
		let delimiter = delimiter.unwrap_or(DEFAULT_DELIMITER);
		check_delimiter(delimiter, self.name())?;
		for item in &mut self.items {
			item.set_delimiter(Some(delimiter))?;
		}
		self.core.options.delimiter = delimiter;
		Ok(())
	}
}
