mod bytes;
mod codec;
mod decode;
mod dynamic;
mod error;
mod instance;
mod mutate;
mod registry;
mod value;

/// Bounded read cursor over an encoded buffer.
pub use bytes::Cursor;
/// Wire markers and primitive readers.
pub use codec::{END_OF_STRUCTURE, INDEX_CHANGE, NIL, is_number_marker, is_string_marker, read_number, read_string, read_value};
/// Decode entry points and options.
pub use decode::{DecodeOptions, decode, decode_with};
/// Descriptor-driven instance for schemas declared at run time.
pub use dynamic::{DynamicInstance, Slot};
/// Error and result aliases.
pub use error::{DecodeError, Result};
/// Instance capability and collection slot traits.
pub use instance::{ArraySlot, FieldMut, FromPrimitive, Instantiate, MapSlot, RefSlot, Schema, SchemaInstance};
/// Object graph mutation helpers used by the decode engine.
pub use mutate::{ResolvedChild, apply_field, array_field, clear_field, map_field, resolve_ref, store, unhandled_field};
/// Type registry types.
pub use registry::{ChildType, FieldDescriptor, FieldTag, MAX_FIELDS, Registry, TypeDescriptor, TypeDescriptorBuilder, TypeTable};
/// Decoded primitive values.
pub use value::{Number, Primitive};
