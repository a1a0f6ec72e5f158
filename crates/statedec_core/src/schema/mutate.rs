use crate::schema::{
	ArraySlot, DecodeError, FieldDescriptor, FieldMut, FieldTag, FromPrimitive, MapSlot, Primitive, Result, SchemaInstance, TypeDescriptor,
};

/// Child instance handed to the decoder for recursion.
pub struct ResolvedChild<'a> {
	/// Existing or newly created child.
	pub instance: &'a mut dyn SchemaInstance,
	/// Whether the child was created by this call.
	pub created: bool,
}

/// Apply one decoded scalar to `instance`.
///
/// The value must match the field's declared tag; nothing is coerced across kinds.
pub fn apply_field<I: SchemaInstance + ?Sized>(instance: &mut I, index: u8, value: Primitive) -> Result<()> {
	let descriptor = instance.descriptor();
	let field = lookup(descriptor, index)?;
	if field.tag != value.tag() {
		return Err(DecodeError::mismatch(descriptor.name(), &field.name, field.tag, value.kind()));
	}
	instance.set_field(index, value)
}

/// Reset one field of `instance` to its empty state.
pub fn clear_field<I: SchemaInstance + ?Sized>(instance: &mut I, index: u8) -> Result<()> {
	lookup(instance.descriptor(), index)?;
	instance.clear_field(index)
}

/// Store `value` into a typed slot, or report a mismatch against field `index`.
///
/// Helper for hand-written [`SchemaInstance::set_field`] implementations.
pub fn store<T: FromPrimitive>(descriptor: &TypeDescriptor, index: u8, slot: &mut T, value: Primitive) -> Result<()> {
	let kind = value.kind();
	match T::from_primitive(value) {
		Some(converted) => {
			*slot = converted;
			Ok(())
		}
		None => {
			let field = lookup(descriptor, index)?;
			Err(DecodeError::mismatch(descriptor.name(), &field.name, field.tag, kind))
		}
	}
}

/// Error for a slot index a hand-written instance does not handle.
pub fn unhandled_field(descriptor: &TypeDescriptor, index: u8) -> DecodeError {
	DecodeError::UnknownField {
		type_name: descriptor.name().into(),
		field: descriptor
			.field(index)
			.map(|field| field.name.clone())
			.unwrap_or_else(|| format!("#{index}").into_boxed_str()),
	}
}

/// Get or create the child behind a `ref` field.
pub fn resolve_ref<'a, I: SchemaInstance + ?Sized>(instance: &'a mut I, index: u8) -> Result<ResolvedChild<'a>> {
	let descriptor = instance.descriptor();
	let (field, child) = container(descriptor, index, FieldTag::Ref)?;
	match instance.field_mut(index)? {
		FieldMut::Ref(slot) => {
			let (instance, created) = slot.child_or_insert(child);
			Ok(ResolvedChild { instance, created })
		}
		_ => Err(not_a_collection(descriptor, field)),
	}
}

/// Borrow the storage behind an `array` field with its item descriptor.
pub fn array_field<'a, I: SchemaInstance + ?Sized>(instance: &'a mut I, index: u8) -> Result<(&'a mut dyn ArraySlot, &'static TypeDescriptor)> {
	let descriptor = instance.descriptor();
	let (field, child) = container(descriptor, index, FieldTag::Array)?;
	match instance.field_mut(index)? {
		FieldMut::Array(slot) => Ok((slot, child)),
		_ => Err(not_a_collection(descriptor, field)),
	}
}

/// Borrow the storage behind a `map` field with its entry descriptor.
pub fn map_field<'a, I: SchemaInstance + ?Sized>(instance: &'a mut I, index: u8) -> Result<(&'a mut dyn MapSlot, &'static TypeDescriptor)> {
	let descriptor = instance.descriptor();
	let (field, child) = container(descriptor, index, FieldTag::Map)?;
	match instance.field_mut(index)? {
		FieldMut::Map(slot) => Ok((slot, child)),
		_ => Err(not_a_collection(descriptor, field)),
	}
}

fn lookup(descriptor: &TypeDescriptor, index: u8) -> Result<&FieldDescriptor> {
	descriptor.field(index).ok_or_else(|| unhandled_field(descriptor, index))
}

fn container(descriptor: &'static TypeDescriptor, index: u8, tag: FieldTag) -> Result<(&'static FieldDescriptor, &'static TypeDescriptor)> {
	let field = lookup(descriptor, index)?;
	if field.tag != tag {
		return Err(DecodeError::mismatch(descriptor.name(), &field.name, field.tag, tag.as_str()));
	}
	let child = field
		.child_descriptor()
		.ok_or_else(|| DecodeError::schema(descriptor.name(), format!("child type of {} is not linked", field.name)))?;
	Ok((field, child))
}

fn not_a_collection(descriptor: &TypeDescriptor, field: &FieldDescriptor) -> DecodeError {
	DecodeError::NotACollection {
		type_name: descriptor.name().into(),
		field: field.name.clone(),
		expected: field.tag,
	}
}
