/// Primitive field types with a fixed text/array representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
	Bool,
	Bytes,
	Double,
	Fixed32,
	Fixed64,
	Float,
	Int32,
	Int64,
	SFixed32,
	SFixed64,
	SInt32,
	SInt64,
	String,
	/// UTF-8 text carried as URL-safe base64 in the text format.
	Base64String,
	UInt32,
	UInt64,
}

/// Type letter used for message tokens.
pub const MESSAGE_LETTER: char = 'm';
/// Type letter used for enum tokens.
pub const ENUM_LETTER: char = 'e';
/// Type letter reported by reserved slots; never emitted.
pub const RESERVED_LETTER: char = '-';

impl ScalarKind {
	/// Every scalar kind, in schema-name order.
	pub const ALL: [ScalarKind; 16] = [
		Self::Bool,
		Self::Bytes,
		Self::Double,
		Self::Fixed32,
		Self::Fixed64,
		Self::Float,
		Self::Int32,
		Self::Int64,
		Self::SFixed32,
		Self::SFixed64,
		Self::SInt32,
		Self::SInt64,
		Self::String,
		Self::Base64String,
		Self::UInt32,
		Self::UInt64,
	];

	/// Map a schema type name onto a scalar kind.
	pub fn from_type_name(name: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|kind| kind.type_name() == name)
	}

	/// Schema type name.
	pub fn type_name(self) -> &'static str {
		match self {
			Self::Bool => "bool",
			Self::Bytes => "bytes",
			Self::Double => "double",
			Self::Fixed32 => "fixed32",
			Self::Fixed64 => "fixed64",
			Self::Float => "float",
			Self::Int32 => "int32",
			Self::Int64 => "int64",
			Self::SFixed32 => "sfixed32",
			Self::SFixed64 => "sfixed64",
			Self::SInt32 => "sint32",
			Self::SInt64 => "sint64",
			Self::String => "string",
			Self::Base64String => "base64string",
			Self::UInt32 => "uint32",
			Self::UInt64 => "uint64",
		}
	}

	/// One-character wire type tag.
	pub fn letter(self) -> char {
		match self {
			Self::Bool | Self::Bytes => 'b',
			Self::Double => 'd',
			Self::Float => 'f',
			Self::SFixed32 => 'g',
			Self::SFixed64 => 'h',
			Self::Int32 => 'i',
			Self::Int64 => 'j',
			Self::SInt32 => 'n',
			Self::SInt64 => 'o',
			Self::String => 's',
			Self::UInt32 => 'u',
			Self::UInt64 => 'v',
			Self::Fixed32 => 'x',
			Self::Fixed64 => 'y',
			Self::Base64String => 'z',
		}
	}

	pub(crate) fn numeric_class(self) -> Option<NumericClass> {
		match self {
			Self::Double | Self::Float => Some(NumericClass::Float),
			Self::Int32 | Self::SInt32 | Self::SFixed32 => Some(NumericClass::Signed32),
			Self::UInt32 | Self::Fixed32 => Some(NumericClass::Unsigned32),
			Self::Int64 | Self::SInt64 | Self::SFixed64 => Some(NumericClass::Signed64),
			Self::UInt64 | Self::Fixed64 => Some(NumericClass::Unsigned64),
			Self::Bool | Self::Bytes | Self::String | Self::Base64String => None,
		}
	}
}

/// Range and storage family of a numeric kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NumericClass {
	Float,
	Signed32,
	Unsigned32,
	Signed64,
	Unsigned64,
}
