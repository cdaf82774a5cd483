use std::path::PathBuf;

use pbfish::pbf::{ENUM_LETTER, FieldType, MESSAGE_LETTER, PbfError, ResolvedType, Result, SchemaIndex};

use crate::cmd::util::emit_json;

#[derive(clap::Args)]
pub struct Args {
	/// JSON schema descriptor.
	pub schema: PathBuf,
	/// Describe one type instead of listing them all.
	#[arg(long = "type")]
	pub type_name: Option<String>,
	#[arg(long)]
	pub json: bool,
}

/// List schema types, or the fields of one type with their wire letters.
pub fn run(args: Args) -> Result<()> {
	let Args { schema, type_name, json } = args;
	let index = SchemaIndex::from_path(&schema)?;

	let Some(type_name) = type_name else {
		let types: Vec<TypeSummaryJson> = index
			.type_names()
			.into_iter()
			.filter_map(|name| {
				let resolved = index.resolve(&name)?;
				Some(TypeSummaryJson {
					kind: kind_label(&resolved),
					name,
				})
			})
			.collect();
		if json {
			return emit_json(&types);
		}
		for item in &types {
			println!("{} {}", item.kind, item.name);
		}
		return Ok(());
	};

	let resolved = index.resolve(&type_name).ok_or_else(|| PbfError::SchemaUnknownType {
		type_name: type_name.clone(),
		name: "<root>".to_owned(),
	})?;
	let payload = describe_type(&index, &resolved, type_name);
	if json {
		return emit_json(&payload);
	}

	println!("{} {}", payload.kind, payload.name);
	for field in &payload.fields {
		let number = field.id.map_or_else(|| "?".to_owned(), |id| id.to_string());
		let letter = field.letter.unwrap_or('?');
		println!("  {number:>4} {letter} {} {}{}", field.name, field.type_name, field.rule.as_deref().map(|rule| format!(" ({rule})")).unwrap_or_default());
	}
	for value in &payload.values {
		println!("  {:>4} {}", value.code, value.name);
	}
	for group in &payload.oneofs {
		println!("  oneof {}: {}", group.name, group.members.join(", "));
	}
	Ok(())
}

fn kind_label(resolved: &ResolvedType) -> &'static str {
	if resolved.definition.is_enum() { "enum" } else { "message" }
}

fn describe_type(index: &SchemaIndex, resolved: &ResolvedType, name: String) -> TypeJson {
	let definition = &resolved.definition;

	let mut fields: Vec<FieldJson> = definition
		.fields
		.iter()
		.map(|(field_name, field)| FieldJson {
			name: field_name.clone(),
			id: field.id,
			type_name: field.type_name.clone(),
			rule: field.rule.clone(),
			letter: match field.field_type() {
				FieldType::Scalar(kind) => Some(kind.letter()),
				FieldType::Named(reference) => index.lookup(&resolved.path, reference).map(|target| if target.definition.is_enum() { ENUM_LETTER } else { MESSAGE_LETTER }),
			},
		})
		.collect();
	fields.sort_by_key(|field| field.id);

	let mut values: Vec<EnumValueJson> = definition
		.values
		.iter()
		.flatten()
		.map(|(value_name, code)| EnumValueJson {
			name: value_name.clone(),
			code: *code,
		})
		.collect();
	values.sort_by_key(|value| value.code);

	TypeJson {
		kind: kind_label(resolved),
		name,
		fields,
		values,
		oneofs: definition
			.oneofs
			.iter()
			.map(|(group, members)| OneofJson {
				name: group.clone(),
				members: members.oneof.clone(),
			})
			.collect(),
	}
}

#[derive(serde::Serialize)]
struct TypeSummaryJson {
	kind: &'static str,
	name: String,
}

#[derive(serde::Serialize)]
struct TypeJson {
	kind: &'static str,
	name: String,
	fields: Vec<FieldJson>,
	values: Vec<EnumValueJson>,
	oneofs: Vec<OneofJson>,
}

#[derive(serde::Serialize)]
struct FieldJson {
	name: String,
	id: Option<u32>,
	#[serde(rename = "type")]
	type_name: String,
	rule: Option<String>,
	letter: Option<char>,
}

#[derive(serde::Serialize)]
struct EnumValueJson {
	name: String,
	code: i32,
}

#[derive(serde::Serialize)]
struct OneofJson {
	name: String,
	members: Vec<String>,
}
