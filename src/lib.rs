//! Encode and decode records described by a runtime protobuf JSON schema, as compact URL text or positional JSON arrays.

/// Schema index, field tree, and both wire codecs.
pub mod pbf;
