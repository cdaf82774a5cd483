mod enumeration;
mod error;
mod field;
mod kind;
mod message;
mod options;
mod reserved;
mod scalar;
mod schema;
mod text;
mod value;

/// Enum field and its code table entries.
pub use enumeration::{EnumCode, EnumField};
/// Error and result aliases.
pub use error::{ErrorKind, PbfError, Result};
/// Common field capability set and shared state.
pub use field::{Field, FieldCore};
/// Scalar kinds and wire type letters.
pub use kind::{ENUM_LETTER, MESSAGE_LETTER, RESERVED_LETTER, ScalarKind};
/// Message field, its child slots, and repeated message lists.
pub use message::{Child, MessageField, MessageList, OneofGroup};
/// Per-field configuration.
pub use options::{DEFAULT_DELIMITER, FieldOptions};
/// Placeholder for reserved field numbers.
pub use reserved::ReservedField;
/// Primitive fields.
pub use scalar::ScalarField;
/// Schema descriptor types and the type lookup handle.
pub use schema::{FieldDefinition, FieldType, OneofDefinition, ReservedRange, ResolvedType, SchemaDocument, SchemaIndex, TypeDefinition};
/// Native value tree.
pub use value::{MAX_SAFE_INTEGER, Value};
