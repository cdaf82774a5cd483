use std::path::Path;

use pbfish::pbf::{Field, MessageField, Result, SchemaIndex};
use serde::Serialize;

/// Wire format selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
	/// Delimited text for URL query parameters.
	Url,
	/// Positional JSON array.
	Array,
}

/// Load a schema file and instantiate an empty root message.
pub(crate) fn load_message(schema: &Path, type_name: &str, delimiter: Option<char>) -> Result<MessageField> {
	let index = SchemaIndex::from_path(schema)?;
	let mut message = index.create(type_name)?;
	if delimiter.is_some() {
		message.set_delimiter(delimiter)?;
	}
	Ok(message)
}

/// Parse an inline JSON argument, or the contents of a file when prefixed with `@`.
pub(crate) fn read_json_arg(text: &str) -> Result<serde_json::Value> {
	let owned;
	let source = match text.strip_prefix('@') {
		Some(path) => {
			owned = std::fs::read_to_string(path)?;
			owned.as_str()
		}
		None => text,
	};
	Ok(serde_json::from_str(source)?)
}

/// Print a payload as pretty JSON on stdout.
pub(crate) fn emit_json<T: Serialize>(payload: &T) -> Result<()> {
	println!("{}", serde_json::to_string_pretty(payload)?);
	Ok(())
}
