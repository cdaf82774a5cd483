use thiserror::Error;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, PbfError>;

/// Coarse error category, used by callers that branch on failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
	/// The schema does not describe the requested field or type.
	Schema,
	/// A value or field tree breaks a field/message invariant.
	Validation,
	/// Encoded input is malformed.
	Format,
	/// The operation is not defined for this field shape.
	Unsupported,
	/// Filesystem failure while loading a schema.
	Io,
	/// Schema or value JSON could not be parsed.
	Json,
}

/// Errors produced while building, validating, encoding, and decoding field trees.
#[derive(Debug, Error)]
pub enum PbfError {
	/// Filesystem or stream IO failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// JSON parse failure for schema or value documents.
	#[error("json: {0}")]
	Json(#[from] serde_json::Error),
	/// Requested root or field type is not defined.
	#[error("unknown type {type_name} referenced from {name}")]
	SchemaUnknownType {
		/// Unresolved type name.
		type_name: String,
		/// Dotted path of the referencing field.
		name: String,
	},
	/// Field name is not declared in the message definition.
	#[error("unknown field {field} in {name}")]
	SchemaUnknownField {
		/// Requested field name.
		field: String,
		/// Dotted path of the message.
		name: String,
	},
	/// Field definition carries no numeric id.
	#[error("field {name} has no id")]
	SchemaMissingId {
		/// Dotted path of the field.
		name: String,
	},
	/// Root type resolves to something that is not a message.
	#[error("type {type_name} is not a message")]
	SchemaNotMessage {
		/// Requested type name.
		type_name: String,
	},
	/// Resize was requested for a child that is not a repeated message.
	#[error("field {name} is not a repeated message and cannot be resized")]
	SchemaNotList {
		/// Dotted path of the child.
		name: String,
	},
	/// Two schema field names share one field number.
	#[error("field number {field_number} is used by both {first} and {second} in {name}")]
	SchemaDuplicateNumber {
		/// Shared field number.
		field_number: u32,
		/// Name already holding the number.
		first: String,
		/// Name attempting to reuse it.
		second: String,
		/// Dotted path of the message.
		name: String,
	},
	/// Field number is zero.
	#[error("invalid field number {field_number} in {name}")]
	InvalidFieldNumber {
		/// Rejected number.
		field_number: u32,
		/// Dotted path of the field.
		name: String,
	},
	/// Field number was required but never assigned.
	#[error("unspecified field number in {name}")]
	MissingFieldNumber {
		/// Dotted path of the field.
		name: String,
	},
	/// Field number change attempted while locked.
	#[error("field number of {name} is locked")]
	FieldNumberLocked {
		/// Dotted path of the field.
		name: String,
	},
	/// Delimiter is not a single usable ASCII punctuation character.
	#[error("invalid delimiter {delimiter:?} in {name}")]
	InvalidDelimiter {
		/// Rejected delimiter.
		delimiter: char,
		/// Dotted path of the field.
		name: String,
	},
	/// Sibling fields share a field number.
	#[error("duplicate field number {field_number} in {name}")]
	DuplicateFieldNumber {
		/// Shared field number.
		field_number: u32,
		/// Dotted path of the message.
		name: String,
	},
	/// A second member of a oneof group was assigned.
	#[error("oneof {group} in {name} already has {active} set, cannot set {attempted}")]
	OneofConflict {
		/// Group name.
		group: String,
		/// Currently active member.
		active: String,
		/// Member being assigned.
		attempted: String,
		/// Dotted path of the message.
		name: String,
	},
	/// A oneof group has zero or several active members.
	#[error("oneof {group} in {name} has {active} active members, expected exactly one")]
	OneofCardinality {
		/// Group name.
		group: String,
		/// Number of active members.
		active: usize,
		/// Dotted path of the message.
		name: String,
	},
	/// Required field holds no value.
	#[error("required field {name} has no value")]
	MissingRequired {
		/// Dotted path of the field.
		name: String,
	},
	/// Repeated field holds a single value, or a singular field holds a list.
	#[error("{name}: {}", shape_message(.repeated))]
	ShapeMismatch {
		/// Whether the field is repeated.
		repeated: bool,
		/// Dotted path of the field.
		name: String,
	},
	/// Value variant does not fit the field kind.
	#[error("{name} expects {expected}, got {got}")]
	TypeMismatch {
		/// Expected logical value kind.
		expected: &'static str,
		/// Actual value kind.
		got: &'static str,
		/// Dotted path of the field.
		name: String,
	},
	/// Integer field received a fractional or non-finite number.
	#[error("non-integer value {value} for {kind} in {name}")]
	NonInteger {
		/// Rejected value.
		value: f64,
		/// Scalar type name.
		kind: &'static str,
		/// Dotted path of the field.
		name: String,
	},
	/// Numeric value falls outside the type's range.
	#[error("value {value} out of range for {kind} in {name}")]
	OutOfRange {
		/// Rejected value, rendered.
		value: String,
		/// Scalar type name.
		kind: &'static str,
		/// Dotted path of the field.
		name: String,
	},
	/// Floating-point field received NaN.
	#[error("NaN value in {name}")]
	NotANumber {
		/// Dotted path of the field.
		name: String,
	},
	/// Enum code is not in the table.
	#[error("invalid enum code {code} in {name}, valid codes are {valid}")]
	UnknownEnumCode {
		/// Rejected code.
		code: i64,
		/// Comma-separated valid codes.
		valid: String,
		/// Dotted path of the field.
		name: String,
	},
	/// Enum name is not in the table.
	#[error("invalid enum value {value} in {name}, valid values are {valid}")]
	UnknownEnumName {
		/// Rejected symbolic name.
		value: String,
		/// Comma-separated valid names.
		valid: String,
		/// Dotted path of the field.
		name: String,
	},
	/// Text token does not match `NUMBER LETTER REST`.
	#[error("invalid url token {token:?} in {name}")]
	MalformedToken {
		/// Offending token.
		token: String,
		/// Dotted path of the field.
		name: String,
	},
	/// Decoded type letter differs from the field's own.
	#[error("field type mismatch in {name}: expected {expected}, got {got}")]
	TypeLetterMismatch {
		/// Field's own type letter.
		expected: char,
		/// Letter found in the input.
		got: char,
		/// Dotted path of the field.
		name: String,
	},
	/// Decoded field number differs from the field's own.
	#[error("field number mismatch in {name}: expected {expected}, got {got}")]
	FieldNumberMismatch {
		/// Field's own number.
		expected: u32,
		/// Number found in the input.
		got: u32,
		/// Dotted path of the field.
		name: String,
	},
	/// Same field number appears twice in one message's token stream.
	#[error("field number {field_number} repeated in url input for {name}")]
	RepeatedToken {
		/// Repeated number.
		field_number: u32,
		/// Dotted path of the message.
		name: String,
	},
	/// Nested message count runs past the end of the input.
	#[error("nested message {name} claims {count} tokens, only {available} remain")]
	TruncatedMessage {
		/// Declared token count.
		count: usize,
		/// Tokens left in the input.
		available: usize,
		/// Dotted path of the nested message.
		name: String,
	},
	/// Escaped text value is malformed.
	#[error("invalid escape in {name}: {text:?}")]
	InvalidEscape {
		/// Offending encoded text.
		text: String,
		/// Dotted path of the field.
		name: String,
	},
	/// Base64 payload could not be decoded.
	#[error("invalid base64 in {name}: {source}")]
	InvalidBase64 {
		/// Underlying decoder error.
		source: base64::DecodeError,
		/// Dotted path of the field.
		name: String,
	},
	/// Decoded text is not UTF-8.
	#[error("invalid utf-8 in {name}")]
	InvalidUtf8 {
		/// Dotted path of the field.
		name: String,
	},
	/// Numeric text could not be parsed.
	#[error("invalid number {text:?} in {name}")]
	InvalidNumber {
		/// Offending text.
		text: String,
		/// Dotted path of the field.
		name: String,
	},
	/// Array-format input has the wrong JSON shape.
	#[error("invalid array input for {name}: expected {expected}")]
	InvalidArray {
		/// Expected JSON shape.
		expected: &'static str,
		/// Dotted path of the field.
		name: String,
	},
	/// Repeated fields have no URL form.
	#[error("repeated field {name} cannot be url encoded")]
	RepeatedUrl {
		/// Dotted path of the field.
		name: String,
	},
}

impl PbfError {
	/// Failure class of this error.
	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::Io(_) => ErrorKind::Io,
			Self::Json(_) => ErrorKind::Json,
			Self::SchemaUnknownType { .. }
			| Self::SchemaUnknownField { .. }
			| Self::SchemaMissingId { .. }
			| Self::SchemaNotMessage { .. }
			| Self::SchemaNotList { .. }
			| Self::SchemaDuplicateNumber { .. } => ErrorKind::Schema,
			Self::InvalidFieldNumber { .. }
			| Self::MissingFieldNumber { .. }
			| Self::FieldNumberLocked { .. }
			| Self::InvalidDelimiter { .. }
			| Self::DuplicateFieldNumber { .. }
			| Self::OneofConflict { .. }
			| Self::OneofCardinality { .. }
			| Self::MissingRequired { .. }
			| Self::ShapeMismatch { .. }
			| Self::TypeMismatch { .. }
			| Self::NonInteger { .. }
			| Self::OutOfRange { .. }
			| Self::NotANumber { .. }
			| Self::UnknownEnumCode { .. }
			| Self::UnknownEnumName { .. } => ErrorKind::Validation,
			Self::MalformedToken { .. }
			| Self::TypeLetterMismatch { .. }
			| Self::FieldNumberMismatch { .. }
			| Self::RepeatedToken { .. }
			| Self::TruncatedMessage { .. }
			| Self::InvalidEscape { .. }
			| Self::InvalidBase64 { .. }
			| Self::InvalidUtf8 { .. }
			| Self::InvalidNumber { .. }
			| Self::InvalidArray { .. } => ErrorKind::Format,
			Self::RepeatedUrl { .. } => ErrorKind::Unsupported,
		}
	}
}

fn shape_message(repeated: &bool) -> &'static str {
	if *repeated {
		"repeated fields must hold a list"
	} else {
		"only repeated fields can hold a list"
	}
}
