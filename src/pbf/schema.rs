use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::pbf::{FieldOptions, MessageField, PbfError, Result, ScalarKind};

/// Top level of a JSON schema descriptor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaDocument {
	/// Global type table.
	#[serde(default)]
	pub nested: BTreeMap<String, Arc<TypeDefinition>>,
}

/// One message or enum definition.
///
/// A definition carrying `values` is an enum; anything else is a message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeDefinition {
	/// Message fields by name.
	#[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
	pub fields: BTreeMap<String, FieldDefinition>,
	/// Types scoped inside this one.
	#[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
	pub nested: BTreeMap<String, Arc<TypeDefinition>>,
	/// Oneof groups by name.
	#[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
	pub oneofs: BTreeMap<String, OneofDefinition>,
	/// Enum table, name to code.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub values: Option<BTreeMap<String, i32>>,
	/// Reserved field numbers and names.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub reserved: Vec<ReservedRange>,
}

/// One field declaration inside a message definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
	/// Field number.
	#[serde(default)]
	pub id: Option<u32>,
	/// Scalar type name or a message/enum type reference.
	#[serde(rename = "type")]
	pub type_name: String,
	/// `required`, `repeated`, or both.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub rule: Option<String>,
}

/// Members of one oneof group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OneofDefinition {
	/// Member field names.
	#[serde(alias = "members")]
	pub oneof: Vec<String>,
}

/// Reserved entry: an inclusive number range or a field name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReservedRange {
	/// Inclusive `[from, to]` range of field numbers.
	Range(u32, u32),
	/// Reserved field name.
	Name(String),
}

/// Field type as written in a field declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType<'a> {
	/// Built-in primitive.
	Scalar(ScalarKind),
	/// Message or enum reference, possibly dotted.
	Named(&'a str),
}

/// A type definition together with its fully qualified path.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedType {
	/// Path segments from the global table, e.g. `["Outer", "Inner"]`.
	pub path: Vec<String>,
	/// The definition itself.
	pub definition: Arc<TypeDefinition>,
}

/// Shared, read-only type lookup handle.
///
/// Cloning is cheap; every message built from an index keeps a clone for lazy child resolution.
#[derive(Debug, Clone, Default)]
pub struct SchemaIndex {
	document: Arc<SchemaDocument>,
}

impl FieldDefinition {
	/// True when the rule mentions `required`.
	pub fn is_required(&self) -> bool {
		self.rule.as_deref().is_some_and(|rule| rule.split_whitespace().any(|part| part == "required"))
	}

	/// True when the rule mentions `repeated`.
	pub fn is_repeated(&self) -> bool {
		self.rule.as_deref().is_some_and(|rule| rule.split_whitespace().any(|part| part == "repeated"))
	}

	/// Classify the declared type name.
	pub fn field_type(&self) -> FieldType<'_> {
		FieldType::parse(&self.type_name)
	}
}

impl<'a> FieldType<'a> {
	/// Built-in names map to scalars; everything else is a type reference.
	pub fn parse(type_name: &'a str) -> Self {
		ScalarKind::from_type_name(type_name).map_or(Self::Named(type_name), Self::Scalar)
	}
}

impl TypeDefinition {
	/// True for enum definitions.
	pub fn is_enum(&self) -> bool {
		self.values.is_some()
	}

	/// Name of the field declared with this number, if any.
	pub fn field_name_for(&self, field_number: u32) -> Option<&str> {
		self.fields.iter().find(|(_, field)| field.id == Some(field_number)).map(|(name, _)| name.as_str())
	}

	/// True when the number falls in a reserved range.
	pub fn is_reserved_number(&self, field_number: u32) -> bool {
		self.reserved.iter().any(|entry| matches!(entry, ReservedRange::Range(from, to) if (*from..=*to).contains(&field_number)))
	}
}

impl SchemaIndex {
	/// Wrap an already parsed document.
	pub fn from_document(document: SchemaDocument) -> Self {
		Self { document: Arc::new(document) }
	}

	/// Parse a JSON schema descriptor.
	pub fn from_json_str(text: &str) -> Result<Self> {
		let document: SchemaDocument = serde_json::from_str(text)?;
		Ok(Self::from_document(document))
	}

	/// Read and parse a JSON schema descriptor file.
	pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
		let text = std::fs::read_to_string(path)?;
		Self::from_json_str(&text)
	}

	/// The parsed descriptor.
	pub fn document(&self) -> &SchemaDocument {
		&self.document
	}

	/// Look up a type by its fully qualified (optionally dotted, optionally `.`-prefixed) name.
	pub fn resolve(&self, type_name: &str) -> Option<ResolvedType> {
		self.lookup(&[], type_name)
	}

	/// Resolve a type reference as seen from inside the type at `scope`.
	///
	/// The innermost scope is searched first, then each enclosing scope, then the global table.
	pub fn lookup(&self, scope: &[String], type_name: &str) -> Option<ResolvedType> {
		if let Some(absolute) = type_name.strip_prefix('.') {
			return self.walk(&[], absolute);
		}
		(0..=scope.len()).rev().find_map(|depth| self.walk(&scope[..depth], type_name))
	}

	fn walk(&self, prefix: &[String], type_name: &str) -> Option<ResolvedType> {
		let mut path = prefix.to_vec();
		path.extend(type_name.split('.').map(str::to_owned));

		let (first, rest) = path.split_first()?;
		let mut definition = self.document.nested.get(first)?;
		for segment in rest {
			definition = definition.nested.get(segment)?;
		}
		let definition = Arc::clone(definition);
		Some(ResolvedType { path, definition })
	}

	/// Every defined type name, dotted and sorted.
	pub fn type_names(&self) -> Vec<String> {
		let mut names = Vec::new();
		let mut pending: Vec<(String, &TypeDefinition)> = self.document.nested.iter().map(|(name, definition)| (name.clone(), definition.as_ref())).collect();
		while let Some((name, definition)) = pending.pop() {
			pending.extend(definition.nested.iter().map(|(child, nested)| (format!("{name}.{child}"), nested.as_ref())));
			names.push(name);
		}
		names.sort();
		names
	}

	/// Instantiate an empty root message of the named type.
	pub fn create(&self, type_name: &str) -> Result<MessageField> {
		let resolved = self.resolve(type_name).ok_or_else(|| PbfError::SchemaUnknownType {
			type_name: type_name.to_owned(),
			name: "<root>".to_owned(),
		})?;
		if resolved.definition.is_enum() {
			return Err(PbfError::SchemaNotMessage {
				type_name: type_name.to_owned(),
			});
		}
		let name = resolved.path.join(".");
		MessageField::new(self.clone(), resolved, FieldOptions::default().with_name(name))
	}
}

#[cfg(test)]
mod tests {
	use super::{FieldType, ReservedRange, SchemaIndex};
	use crate::pbf::{ErrorKind, Field, ScalarKind};

	const SCHEMA: &str = r#"{
		"nested": {
			"Outer": {
				"fields": {
					"inner": {"id": 1, "type": "Inner"},
					"tags": {"id": 2, "type": "string", "rule": "repeated"}
				},
				"reserved": [[5, 7], "legacy"],
				"nested": {
					"Inner": {"fields": {"kind": {"id": 1, "type": "Kind"}}},
					"Kind": {"values": {"A": 1, "B": 2}}
				}
			},
			"Kind": {"values": {"Z": 26}}
		}
	}"#;

	#[test]
	fn schema_parses_definitions() {
		let schema = SchemaIndex::from_json_str(SCHEMA).expect("schema parses");
		let outer = schema.resolve("Outer").expect("outer exists");
		assert!(!outer.definition.is_enum());
		assert_eq!(outer.definition.reserved, vec![ReservedRange::Range(5, 7), ReservedRange::Name("legacy".to_owned())]);
		assert!(outer.definition.is_reserved_number(6));
		assert!(!outer.definition.is_reserved_number(8));
		assert_eq!(outer.definition.field_name_for(2), Some("tags"));
		assert!(outer.definition.fields["tags"].is_repeated());
		assert!(!outer.definition.fields["tags"].is_required());
		assert_eq!(outer.definition.fields["tags"].field_type(), FieldType::Scalar(ScalarKind::String));
		assert_eq!(outer.definition.fields["inner"].field_type(), FieldType::Named("Inner"));
	}

	#[test]
	fn lookups_prefer_innermost_scope() {
		let schema = SchemaIndex::from_json_str(SCHEMA).expect("schema parses");
		let scope = vec!["Outer".to_owned(), "Inner".to_owned()];

		let kind = schema.lookup(&scope, "Kind").expect("enclosing scope");
		assert_eq!(kind.path, vec!["Outer", "Kind"]);
		assert!(kind.definition.values.as_ref().is_some_and(|values| values.contains_key("A")));

		let global = schema.lookup(&scope, ".Kind").expect("absolute name");
		assert_eq!(global.path, vec!["Kind"]);
		assert_eq!(schema.resolve("Outer.Inner").expect("dotted").path, vec!["Outer", "Inner"]);
		assert!(schema.resolve("Inner").is_none());
	}

	#[test]
	fn type_names_are_dotted_and_sorted() {
		let schema = SchemaIndex::from_json_str(SCHEMA).expect("schema parses");
		assert_eq!(schema.type_names(), vec!["Kind", "Outer", "Outer.Inner", "Outer.Kind"]);
	}

	#[test]
	fn create_rejects_unknown_and_enum_roots() {
		let schema = SchemaIndex::from_json_str(SCHEMA).expect("schema parses");
		assert_eq!(schema.create("Missing").expect_err("unknown").kind(), ErrorKind::Schema);
		assert_eq!(schema.create("Kind").expect_err("enum root").kind(), ErrorKind::Schema);

		let message = schema.create("Outer.Inner").expect("nested root");
		assert_eq!(message.name(), "Outer.Inner");
		assert!(message.is_undefined());
	}

	#[test]
	fn malformed_json_is_a_json_error() {
		assert_eq!(SchemaIndex::from_json_str("{").expect_err("truncated").kind(), ErrorKind::Json);
		assert_eq!(SchemaIndex::from_path("/nonexistent/schema.json").expect_err("missing file").kind(), ErrorKind::Io);
	}
}
