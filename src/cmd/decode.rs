use std::path::PathBuf;

use pbfish::pbf::{Field, Result};

use crate::cmd::util::{Format, emit_json, load_message, read_json_arg};

#[derive(clap::Args)]
pub struct Args {
	/// JSON schema descriptor.
	pub schema: PathBuf,
	/// Root message type, optionally dotted.
	#[arg(long = "type")]
	pub type_name: String,
	/// Url-format input.
	#[arg(long, conflicts_with = "array", required_unless_present = "array")]
	pub url: Option<String>,
	/// Array-format input as JSON, or `@path`.
	#[arg(long)]
	pub array: Option<String>,
	/// Token delimiter for the url format.
	#[arg(long)]
	pub delimiter: Option<char>,
	#[arg(long)]
	pub json: bool,
}

/// Decode url or array input and print the record as JSON.
pub fn run(args: Args) -> Result<()> {
	let Args {
		schema,
		type_name,
		url,
		array,
		delimiter,
		json,
	} = args;

	let mut message = load_message(&schema, &type_name, delimiter)?;
	let format = match (url, array) {
		(Some(url), _) => {
			message.from_url(&url)?;
			Format::Url
		}
		(None, Some(array)) => {
			message.from_array(&read_json_arg(&array)?)?;
			Format::Array
		}
		(None, None) => Format::Url,
	};
	message.validate()?;

	let value = message.value().to_json();
	if json {
		return emit_json(&DecodeJson { type_name, format, value });
	}
	emit_json(&value)
}

#[derive(serde::Serialize)]
struct DecodeJson {
	#[serde(rename = "type")]
	type_name: String,
	format: Format,
	value: serde_json::Value,
}
