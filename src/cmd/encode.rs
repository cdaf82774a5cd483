use std::path::PathBuf;

use pbfish::pbf::{Field, Result, Value};

use crate::cmd::util::{Format, emit_json, load_message, read_json_arg};

#[derive(clap::Args)]
pub struct Args {
	/// JSON schema descriptor.
	pub schema: PathBuf,
	/// Root message type, optionally dotted.
	#[arg(long = "type")]
	pub type_name: String,
	/// Record as JSON, or `@path` to read it from a file.
	#[arg(long)]
	pub value: String,
	#[arg(long, value_enum, default_value_t = Format::Url)]
	pub format: Format,
	/// Token delimiter for the url format.
	#[arg(long)]
	pub delimiter: Option<char>,
	#[arg(long)]
	pub json: bool,
}

/// Encode a JSON record into the url or array format.
pub fn run(args: Args) -> Result<()> {
	let Args {
		schema,
		type_name,
		value,
		format,
		delimiter,
		json,
	} = args;

	let mut message = load_message(&schema, &type_name, delimiter)?;
	message.set_value(Value::from_json(&read_json_arg(&value)?))?;

	let encoded = match format {
		Format::Url => serde_json::Value::String(message.to_url()?),
		Format::Array => message.to_array()?.unwrap_or(serde_json::Value::Array(Vec::new())),
	};

	if json {
		return emit_json(&EncodeJson {
			type_name,
			format,
			field_count: message.field_count(),
			encoded,
		});
	}

	match encoded {
		serde_json::Value::String(text) => println!("{text}"),
		other => println!("{other}"),
	}
	Ok(())
}

#[derive(serde::Serialize)]
struct EncodeJson {
	#[serde(rename = "type")]
	type_name: String,
	format: Format,
	field_count: usize,
	encoded: serde_json::Value,
}
