use crate::pbf::{EnumField, Field, MessageField, MessageList, ScalarField};

/// A created child slot of a message.
#[derive(Debug, Clone)]
pub enum Child {
	/// Primitive field.
	Scalar(ScalarField),
	/// Enum field.
	Enum(EnumField),
	/// Singular nested message.
	Message(Box<MessageField>),
	/// Repeated nested message.
	List(MessageList),
}

impl Child {
	/// The child behind its common field capabilities.
	pub fn as_field(&self) -> &dyn Field {
		match self {
			Self::Scalar(field) => field,
			Self::Enum(field) => field,
			Self::Message(field) => &**field,
			Self::List(field) => field,
		}
	}

	/// Mutable access to the common field capabilities.
	pub fn as_field_mut(&mut self) -> &mut dyn Field {
		match self {
			Self::Scalar(field) => field,
			Self::Enum(field) => field,
			Self::Message(field) => &mut **field,
			Self::List(field) => field,
		}
	}

	/// The singular message child, if this is one.
	pub fn as_message(&self) -> Option<&MessageField> {
		match self {
			Self::Message(field) => Some(&**field),
			_ => None,
		}
	}

	/// Mutable singular message child.
	pub fn as_message_mut(&mut self) -> Option<&mut MessageField> {
		match self {
			Self::Message(field) => Some(&mut **field),
			_ => None,
		}
	}

	/// The repeated message child, if this is one.
	pub fn as_list(&self) -> Option<&MessageList> {
		match self {
			Self::List(field) => Some(field),
			_ => None,
		}
	}

	/// Mutable repeated message child.
	pub fn as_list_mut(&mut self) -> Option<&mut MessageList> {
		match self {
			Self::List(field) => Some(field),
			_ => None,
		}
	}

	/// Token count this child contributes to its parent's field count.
	pub(crate) fn token_count(&self) -> usize {
		match self {
			Self::Message(field) => 1 + field.field_count(),
			Self::List(field) => field.items().iter().map(|item| 1 + item.field_count()).sum(),
			Self::Scalar(_) | Self::Enum(_) => 1,
		}
	}
}
