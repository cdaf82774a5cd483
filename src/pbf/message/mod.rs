mod child;
mod list;

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::pbf::field::{Field, FieldCore};
use crate::pbf::kind::MESSAGE_LETTER;
use crate::pbf::options::{check_delimiter, child_path};
use crate::pbf::schema::{FieldType, ResolvedType, TypeDefinition};
use crate::pbf::text::parse_token;
use crate::pbf::{DEFAULT_DELIMITER, EnumCode, EnumField, FieldOptions, PbfError, ReservedField, Result, ScalarField, SchemaIndex, Value};

pub use child::Child;
pub use list::MessageList;

/// One oneof group of a message definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneofGroup {
	/// Group name.
	pub name: String,
	/// Member field names.
	pub members: Vec<String>,
}

impl OneofGroup {
	/// Single-member groups named `_field` stand in for proto3 `optional` and carry no exactly-one rule.
	pub fn is_synthetic(&self) -> bool {
		self.name.starts_with('_') && self.members.len() == 1
	}
}

/// A message field: named children built lazily from a type definition.
#[derive(Debug, Clone)]
pub struct MessageField {
	core: FieldCore,
	schema: SchemaIndex,
	type_path: Vec<String>,
	definition: Arc<TypeDefinition>,
	children: BTreeMap<String, Child>,
	/// `field_number - 1 -> name` for created children.
	indices: Vec<Option<String>>,
	required_fields: Vec<String>,
	oneof_groups: Vec<OneofGroup>,
	groups_by_field: BTreeMap<String, Vec<usize>>,
}

impl MessageField {
	/// Build an empty message of a resolved message type.
	pub fn new(schema: SchemaIndex, message_type: ResolvedType, options: FieldOptions) -> Result<Self> {
		let core = FieldCore::new(options)?;
		let ResolvedType { path, definition } = message_type;
		if definition.is_enum() {
			return Err(PbfError::SchemaNotMessage { type_name: path.join(".") });
		}

		let required_fields = definition.fields.iter().filter(|(_, field)| field.is_required()).map(|(name, _)| name.clone()).collect();
		let oneof_groups: Vec<OneofGroup> = definition
			.oneofs
			.iter()
			.map(|(name, group)| OneofGroup {
				name: name.clone(),
				members: group.oneof.clone(),
			})
			.collect();
		let mut groups_by_field: BTreeMap<String, Vec<usize>> = BTreeMap::new();
		for (index, group) in oneof_groups.iter().enumerate() {
			for member in &group.members {
				groups_by_field.entry(member.clone()).or_default().push(index);
			}
		}

		Ok(Self {
			core,
			schema,
			type_path: path,
			definition,
			children: BTreeMap::new(),
			indices: Vec::new(),
			required_fields,
			oneof_groups,
			groups_by_field,
		})
	}

	/// Definition this message was built from.
	pub fn definition(&self) -> &TypeDefinition {
		&self.definition
	}

	/// Fully qualified type name.
	pub fn type_name(&self) -> String {
		self.type_path.join(".")
	}

	/// Oneof groups declared by the definition.
	pub fn oneof_groups(&self) -> &[OneofGroup] {
		&self.oneof_groups
	}

	/// Children created so far, by name.
	pub fn children(&self) -> &BTreeMap<String, Child> {
		&self.children
	}

	/// A created child, without creating it.
	pub fn field(&self, name: &str) -> Option<&Child> {
		self.children.get(name)
	}

	/// A child, created on demand from the definition.
	pub fn field_mut(&mut self, name: &str) -> Result<&mut Child> {
		self.ensure_child(name)
	}

	/// Current value of one field; `Value::Null` when it was never created or holds nothing.
	pub fn get(&self, name: &str) -> Result<Value> {
		if !self.definition.fields.contains_key(name) {
			return Err(self.unknown_field(name));
		}
		Ok(self.children.get(name).map_or(Value::Null, |child| child.as_field().value()))
	}

	/// Assign one field, enforcing oneof exclusivity first.
	pub fn set(&mut self, name: &str, value: Value) -> Result<()> {
		self.ensure_child(name)?;
		if !value.is_null() {
			self.check_oneof_assignment(name)?;
		}
		self.ensure_child(name)?.as_field_mut().set_value(value)
	}

	/// Grow or shrink a repeated message child to exactly `len` elements.
	pub fn resize(&mut self, name: &str, len: usize) -> Result<()> {
		let path = child_path(self.name(), name);
		match self.ensure_child(name)? {
			Child::List(list) => list.resize(len),
			_ => Err(PbfError::SchemaNotList { name: path }),
		}
	}

	/// Recursive token count announced by this message in the text format.
	pub fn field_count(&self) -> usize {
		self.active_children().map(|(_, child)| child.token_count()).sum()
	}

	/// Every required field holds a value, unless the whole message is absent.
	pub fn check_required(&self) -> Result<()> {
		if self.is_undefined() {
			return Ok(());
		}
		for name in &self.required_fields {
			if !self.is_active(name) {
				return Err(PbfError::MissingRequired {
					name: child_path(self.name(), name),
				});
			}
		}
		Ok(())
	}

	/// Every oneof group has exactly one active member, unless the whole message is absent.
	pub fn check_oneofs(&self) -> Result<()> {
		if self.is_undefined() {
			return Ok(());
		}
		for group in self.oneof_groups.iter().filter(|group| !group.is_synthetic()) {
			let active = group.members.iter().filter(|member| self.is_active(member)).count();
			if active != 1 {
				return Err(PbfError::OneofCardinality {
					group: group.name.clone(),
					active,
					name: self.name().to_owned(),
				});
			}
		}
		Ok(())
	}

	fn is_active(&self, name: &str) -> bool {
		self.children.get(name).is_some_and(|child| !child.as_field().is_undefined())
	}

	fn active_children(&self) -> impl Iterator<Item = (&String, &Child)> {
		self.children.iter().filter(|(_, child)| !child.as_field().is_undefined())
	}

	fn unknown_field(&self, field: &str) -> PbfError {
		PbfError::SchemaUnknownField {
			field: field.to_owned(),
			name: self.name().to_owned(),
		}
	}

	/// Reject a write to `name` while another member of one of its groups holds a value.
	fn check_oneof_assignment(&self, name: &str) -> Result<()> {
		let Some(groups) = self.groups_by_field.get(name) else {
			return Ok(());
		};
		for group in groups.iter().filter_map(|index| self.oneof_groups.get(*index)) {
			if let Some(active) = group.members.iter().find(|member| member.as_str() != name && self.is_active(member)) {
				return Err(PbfError::OneofConflict {
					group: group.name.clone(),
					active: active.clone(),
					attempted: name.to_owned(),
					name: self.name().to_owned(),
				});
			}
		}
		Ok(())
	}

	/// Name of the field carrying `field_number`: created children first, then the full definition.
	fn name_for_number(&self, field_number: u32) -> Option<String> {
		let created = usize::try_from(field_number - 1).ok().and_then(|index| self.indices.get(index)).and_then(|slot| slot.clone());
		created.or_else(|| self.definition.field_name_for(field_number).map(str::to_owned))
	}

	fn ensure_child(&mut self, name: &str) -> Result<&mut Child> {
		if !self.children.contains_key(name) {
			let child = self.create_child(name)?;
			self.children.insert(name.to_owned(), child);
		}
		self.children.get_mut(name).ok_or_else(|| PbfError::SchemaUnknownField {
			field: name.to_owned(),
			name: self.core.options.name.clone(),
		})
	}

	fn create_child(&mut self, name: &str) -> Result<Child> {
		let field = self.definition.fields.get(name).ok_or_else(|| self.unknown_field(name))?;
		let path = child_path(self.name(), name);
		let field_number = field.id.ok_or_else(|| PbfError::SchemaMissingId { name: path.clone() })?;
		let slot = usize::try_from(field_number.saturating_sub(1)).unwrap_or(usize::MAX);
		if let Some(Some(first)) = self.indices.get(slot) {
			return Err(PbfError::SchemaDuplicateNumber {
				field_number,
				first: first.clone(),
				second: name.to_owned(),
				name: self.name().to_owned(),
			});
		}

		let options = FieldOptions {
			field_number: Some(field_number),
			required: field.is_required(),
			repeated: field.is_repeated(),
			delimiter: self.delimiter(),
			name: path.clone(),
		};
		let mut child = match field.field_type() {
			FieldType::Scalar(kind) => Child::Scalar(ScalarField::new(kind, options)?),
			FieldType::Named(type_name) => {
				let resolved = self.schema.lookup(&self.type_path, type_name).ok_or_else(|| PbfError::SchemaUnknownType {
					type_name: type_name.to_owned(),
					name: path.clone(),
				})?;
				if let Some(values) = &resolved.definition.values {
					let mut codes: Vec<EnumCode> = values.iter().map(|(value, code)| EnumCode::new(*code, value.clone())).collect();
					codes.sort_by_key(|entry| entry.code);
					Child::Enum(EnumField::new(codes, options)?)
				} else if options.repeated {
					Child::List(MessageList::new(self.schema.clone(), resolved, options)?)
				} else {
					Child::Message(Box::new(MessageField::new(self.schema.clone(), resolved, options)?))
				}
			}
		};
		child.as_field_mut().lock_field_number();

		if self.indices.len() <= slot {
			self.indices.resize(slot + 1, None);
		}
		self.indices[slot] = Some(name.to_owned());
		tracing::debug!(field = %path, field_number, "created child field");
		Ok(child)
	}

	/// Clear every created child, keeping the children themselves.
	fn clear(&mut self) -> Result<()> {
		for child in self.children.values_mut() {
			child.as_field_mut().set_value(Value::Null)?;
		}
		Ok(())
	}

	/// Children's field numbers are pairwise distinct.
	fn check_unique_numbers(&self) -> Result<()> {
		let mut seen = BTreeSet::new();
		for child in self.children.values() {
			let field_number = child.as_field().field_number()?;
			if !seen.insert(field_number) {
				return Err(PbfError::DuplicateFieldNumber {
					field_number,
					name: self.name().to_owned(),
				});
			}
		}
		Ok(())
	}

	/// Active children sorted by field number.
	fn ordered_active_children(&self) -> Vec<&Child> {
		let mut children: Vec<&Child> = self.active_children().map(|(_, child)| child).collect();
		children.sort_by_key(|child| child.as_field().options().field_number);
		children
	}

	fn encode_url(&self) -> Result<String> {
		let mut encoded = String::new();
		for child in self.ordered_active_children() {
			match child {
				Child::Message(message) => encoded.push_str(&message.encode_url()?),
				other => encoded.push_str(&other.as_field().to_url()?),
			}
		}
		if encoded.is_empty() {
			return Ok(encoded);
		}
		match self.core.options.field_number {
			Some(field_number) => Ok(format!("{}{}{}{}{}", self.delimiter(), field_number, MESSAGE_LETTER, self.field_count(), encoded)),
			None => Ok(encoded),
		}
	}

	/// `None` when the message is absent or holds an emptied repeated message child.
	fn encode_array(&self) -> Result<Option<serde_json::Value>> {
		if self.is_undefined() || self.children.values().any(|child| child.as_list().is_some_and(MessageList::is_empty)) {
			return Ok(None);
		}
		let mut slots: Vec<serde_json::Value> = Vec::new();
		for child in self.ordered_active_children() {
			let field = child.as_field();
			let encoded = match child {
				Child::Message(message) => message.encode_array()?,
				_ => field.to_array()?,
			};
			let Some(encoded) = encoded else {
				continue;
			};
			let slot = usize::try_from(field.field_number()? - 1).unwrap_or(usize::MAX);
			if slots.len() <= slot {
				slots.resize(slot + 1, serde_json::Value::Null);
			}
			slots[slot] = encoded;
		}
		Ok(Some(serde_json::Value::Array(slots)))
	}

	/// Decode one token's payload into the child holding `field_number`.
	fn decode_token(&mut self, field_number: u32, letter: char, payload: &str) -> Result<()> {
		let Some(name) = self.name_for_number(field_number) else {
			if self.definition.is_reserved_number(field_number) {
				tracing::debug!(message = %self.name(), field_number, "skipping reserved url token");
			} else {
				tracing::warn!(message = %self.name(), field_number, "skipping unknown url token");
			}
			return Ok(());
		};

		let path = child_path(self.name(), &name);
		let child = self.ensure_child(&name)?;
		if matches!(child, Child::List(_)) {
			return Err(PbfError::RepeatedUrl { name: path });
		}
		let expected = child.as_field().type_letter();
		if expected != letter {
			return Err(PbfError::TypeLetterMismatch { expected, got: letter, name: path });
		}
		self.check_oneof_assignment(&name)?;
		self.ensure_child(&name)?.as_field_mut().from_url(payload)
	}

	/// Absorb a payload at an index the definition does not map.
	fn skip_array_slot(&self, field_number: u32, json: &serde_json::Value) -> Result<()> {
		if self.definition.is_reserved_number(field_number) {
			tracing::debug!(message = %self.name(), field_number, "skipping reserved array slot");
			let mut reserved = ReservedField::new(FieldOptions::numbered(field_number).with_name(self.name()))?;
			return reserved.from_array(json);
		}
		tracing::warn!(message = %self.name(), field_number, "skipping unknown array slot");
		Ok(())
	}
}

impl Field for MessageField {
	fn core(&self) -> &FieldCore {
		&self.core
	}

	fn core_mut(&mut self) -> &mut FieldCore {
		&mut self.core
	}

	fn type_letter(&self) -> char {
		MESSAGE_LETTER
	}

	/// True when no child holds a value.
	fn is_undefined(&self) -> bool {
		self.children.values().all(|child| child.as_field().is_undefined())
	}

	/// Map of every child holding a value.
	fn value(&self) -> Value {
		Value::Message(self.active_children().map(|(name, child)| (name.clone(), child.as_field().value())).collect())
	}

	/// Merge a message value into the children; `Value::Null` clears every child.
	fn set_value(&mut self, value: Value) -> Result<()> {
		match value {
			Value::Null => self.clear(),
			Value::Message(entries) => {
				for (name, value) in entries {
					self.set(&name, value)?;
				}
				Ok(())
			}
			other => Err(PbfError::TypeMismatch {
				expected: "message",
				got: other.kind_name(),
				name: self.name().to_owned(),
			}),
		}
	}

	fn validate(&self) -> Result<()> {
		let absent = self.is_undefined();
		if absent && self.core.options.required {
			return Err(PbfError::MissingRequired { name: self.name().to_owned() });
		}
		self.check_unique_numbers()?;
		if absent {
			return Ok(());
		}
		self.check_required()?;
		self.check_oneofs()?;
		self.children.values().try_for_each(|child| child.as_field().validate())
	}

	fn to_url(&self) -> Result<String> {
		self.validate()?;
		self.encode_url()
	}

	/// Replace the contents with the decoded child tokens.
	///
	/// The input is the concatenation of this message's child tokens, without the message's own prefix.
	fn from_url(&mut self, text: &str) -> Result<()> {
		self.clear()?;
		let delimiter = self.delimiter();
		let pieces: Vec<&str> = text.split(delimiter).filter(|piece| !piece.is_empty()).collect();

		let mut seen = BTreeSet::new();
		let mut at = 0;
		while at < pieces.len() {
			let token = parse_token(pieces[at], self.name())?;
			if !seen.insert(token.field_number) {
				return Err(PbfError::RepeatedToken {
					field_number: token.field_number,
					name: self.name().to_owned(),
				});
			}

			if token.letter != MESSAGE_LETTER {
				let single = format!("{delimiter}{}", pieces[at]);
				self.decode_token(token.field_number, token.letter, &single)?;
				at += 1;
				continue;
			}

			let count = token.rest.parse::<usize>().map_err(|_| PbfError::MalformedToken {
				token: pieces[at].to_owned(),
				name: self.name().to_owned(),
			})?;
			let available = pieces.len() - at - 1;
			if count > available {
				return Err(PbfError::TruncatedMessage {
					count,
					available,
					name: child_path(self.name(), &token.field_number.to_string()),
				});
			}
			let nested: String = pieces[at + 1..at + 1 + count].iter().flat_map(|piece| [delimiter.to_string(), (*piece).to_owned()]).collect();
			self.decode_token(token.field_number, token.letter, &nested)?;
			at += count + 1;
		}
		Ok(())
	}

	fn to_array(&self) -> Result<Option<serde_json::Value>> {
		self.validate()?;
		self.encode_array()
	}

	/// Replace the contents with the decoded positional array.
	fn from_array(&mut self, json: &serde_json::Value) -> Result<()> {
		let items = match json {
			serde_json::Value::Null => return self.clear(),
			serde_json::Value::Array(items) => items,
			_ => {
				return Err(PbfError::InvalidArray {
					expected: "array",
					name: self.name().to_owned(),
				});
			}
		};
		self.clear()?;

		for (index, item) in items.iter().enumerate() {
			if item.is_null() {
				continue;
			}
			let field_number = u32::try_from(index + 1).map_err(|_| PbfError::InvalidArray {
				expected: "array no longer than the field number range",
				name: self.name().to_owned(),
			})?;
			let Some(name) = self.name_for_number(field_number) else {
				self.skip_array_slot(field_number, item)?;
				continue;
			};
			self.ensure_child(&name)?;
			self.check_oneof_assignment(&name)?;
			self.ensure_child(&name)?.as_field_mut().from_array(item)?;
		}
		Ok(())
	}

	/// Change the delimiter here and in every created child.
	fn set_delimiter(&mut self, delimiter: Option<char>) -> Result<()> {
		let delimiter = delimiter.unwrap_or(DEFAULT_DELIMITER);
		check_delimiter(delimiter, self.name())?;
		for child in self.children.values_mut() {
			child.as_field_mut().set_delimiter(Some(delimiter))?;
		}
		self.core.options.delimiter = delimiter;
		Ok(())
	}
}

#[cfg(test)]
mod tests;
