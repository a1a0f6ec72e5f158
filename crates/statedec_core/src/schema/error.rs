use thiserror::Error;

use crate::schema::FieldTag;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, DecodeError>;

/// Errors produced while registering schemas and decoding state buffers.
#[derive(Debug, Error)]
pub enum DecodeError {
	/// Schema registration data violated a descriptor invariant.
	#[error("invalid schema definition for {type_name}: {reason}")]
	SchemaDefinition {
		/// Schema class being registered.
		type_name: Box<str>,
		/// Human-readable description of the violated invariant.
		reason: String,
	},
	/// Wire field index has no entry in the descriptor.
	#[error("unknown field index {index} for {type_name} at offset {at}")]
	UnknownFieldIndex {
		/// Schema class being decoded.
		type_name: Box<str>,
		/// Offending field index byte.
		index: u8,
		/// Byte offset of the index.
		at: usize,
	},
	/// Primitive marker byte is not part of the wire format.
	#[error("unknown primitive marker 0x{marker:02x} at offset {at}")]
	UnknownPrimitiveMarker {
		/// Marker byte read.
		marker: u8,
		/// Byte offset of the marker.
		at: usize,
	},
	/// Decoded value does not fit the declared field slot.
	#[error("field type mismatch on {type_name}.{field}: expected {expected}, got {got}")]
	FieldTypeMismatch {
		/// Schema class owning the field.
		type_name: Box<str>,
		/// Field name.
		field: Box<str>,
		/// Declared field tag.
		expected: FieldTag,
		/// Kind of the value that was offered.
		got: &'static str,
	},
	/// Buffer ended inside a multi-byte value.
	#[error("truncated buffer at offset {at}, need {need} bytes, remaining {rem}")]
	TruncatedBuffer {
		/// Byte offset where the read was attempted.
		at: usize,
		/// Requested bytes.
		need: usize,
		/// Bytes still available.
		rem: usize,
	},
	/// Nested structures exceeded the configured depth.
	#[error("decode depth exceeded (max={max_depth})")]
	DecodeDepthExceeded {
		/// Configured depth ceiling.
		max_depth: u32,
	},
	/// Encoded collection length or change count exceeded the configured limit.
	#[error("collection too large: count={count}, max={max}")]
	CollectionTooLarge {
		/// Encoded count.
		count: u64,
		/// Maximum permitted count.
		max: usize,
	},
	/// Collection length, change count, or position is not a non-negative integer.
	#[error("invalid collection header at offset {at}: {value}")]
	InvalidCollectionHeader {
		/// Byte offset of the number.
		at: usize,
		/// Rendered offending number.
		value: String,
	},
	/// Map key index refers past the keys known before this update.
	#[error("map key index {index} out of range (known keys={known}) at offset {at}")]
	UnknownMapKeyIndex {
		/// Encoded key index.
		index: u64,
		/// Number of keys before the update.
		known: usize,
		/// Byte offset of the index.
		at: usize,
	},
	/// Name-keyed accessor referenced a field the schema does not declare.
	#[error("unknown field {field} on {type_name}")]
	UnknownField {
		/// Schema class name.
		type_name: Box<str>,
		/// Requested field name.
		field: Box<str>,
	},
	/// Field storage does not provide the slot kind its tag requires.
	#[error("field {type_name}.{field} has no {expected} storage")]
	NotACollection {
		/// Schema class name.
		type_name: Box<str>,
		/// Field name.
		field: Box<str>,
		/// Tag whose storage was requested.
		expected: FieldTag,
	},
}

impl DecodeError {
	pub(crate) fn schema(type_name: &str, reason: impl Into<String>) -> Self {
		Self::SchemaDefinition {
			type_name: type_name.into(),
			reason: reason.into(),
		}
	}

	pub(crate) fn mismatch(type_name: &str, field: &str, expected: FieldTag, got: &'static str) -> Self {
		Self::FieldTypeMismatch {
			type_name: type_name.into(),
			field: field.into(),
			expected,
			got,
		}
	}
}
