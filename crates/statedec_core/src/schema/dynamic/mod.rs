use std::fmt;

use indexmap::IndexMap;

use crate::schema::{
	DecodeError, FieldDescriptor, FieldMut, FieldTag, Instantiate, Primitive, Result, SchemaInstance, TypeDescriptor, mutate,
};

/// Storage of one field of a [`DynamicInstance`].
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
	/// `string` field.
	String(String),
	/// `number` field, widened to `f64`.
	Number(f64),
	/// `boolean` field.
	Boolean(bool),
	/// `ref` field.
	Ref(Option<Box<DynamicInstance>>),
	/// `array` field.
	Array(Vec<DynamicInstance>),
	/// `map` field.
	Map(IndexMap<String, DynamicInstance>),
}

impl Slot {
	fn empty(tag: FieldTag) -> Self {
		match tag {
			FieldTag::String => Self::String(String::new()),
			FieldTag::Number => Self::Number(0.0),
			FieldTag::Boolean => Self::Boolean(false),
			FieldTag::Ref => Self::Ref(None),
			FieldTag::Array => Self::Array(Vec::new()),
			FieldTag::Map => Self::Map(IndexMap::new()),
		}
	}

	/// Tag this slot stores.
	pub fn tag(&self) -> FieldTag {
		match self {
			Self::String(_) => FieldTag::String,
			Self::Number(_) => FieldTag::Number,
			Self::Boolean(_) => FieldTag::Boolean,
			Self::Ref(_) => FieldTag::Ref,
			Self::Array(_) => FieldTag::Array,
			Self::Map(_) => FieldTag::Map,
		}
	}
}

/// Schema instance whose layout comes from a run-time descriptor.
#[derive(Clone)]
pub struct DynamicInstance {
	descriptor: &'static TypeDescriptor,
	slots: Vec<Slot>,
}

impl DynamicInstance {
	/// Create an instance with every field empty.
	pub fn new(descriptor: &'static TypeDescriptor) -> Self {
		Self {
			descriptor,
			slots: descriptor.fields().iter().map(|field| Slot::empty(field.tag)).collect(),
		}
	}

	/// Field slots in wire order.
	pub fn slots(&self) -> &[Slot] {
		&self.slots
	}

	/// Fields paired with their slots, in wire order.
	pub fn entries(&self) -> impl Iterator<Item = (&FieldDescriptor, &Slot)> + '_ {
		self.descriptor.fields().iter().zip(self.slots.iter())
	}

	/// Borrow a slot by field name.
	pub fn get(&self, name: &str) -> Result<&Slot> {
		let index = self.field_index(name)?;
		Ok(&self.slots[usize::from(index)])
	}

	/// Read a `string` field.
	pub fn get_string(&self, name: &str) -> Result<&str> {
		match self.get(name)? {
			Slot::String(value) => Ok(value),
			other => Err(self.wrong_slot(name, FieldTag::String, other)),
		}
	}

	/// Read a `number` field.
	pub fn get_number(&self, name: &str) -> Result<f64> {
		match self.get(name)? {
			Slot::Number(value) => Ok(*value),
			other => Err(self.wrong_slot(name, FieldTag::Number, other)),
		}
	}

	/// Read a `boolean` field.
	pub fn get_bool(&self, name: &str) -> Result<bool> {
		match self.get(name)? {
			Slot::Boolean(value) => Ok(*value),
			other => Err(self.wrong_slot(name, FieldTag::Boolean, other)),
		}
	}

	/// Borrow the child of a `ref` field.
	pub fn child(&self, name: &str) -> Result<Option<&DynamicInstance>> {
		match self.get(name)? {
			Slot::Ref(value) => Ok(value.as_deref()),
			other => Err(self.wrong_slot(name, FieldTag::Ref, other)),
		}
	}

	/// Borrow the items of an `array` field.
	pub fn array(&self, name: &str) -> Result<&[DynamicInstance]> {
		match self.get(name)? {
			Slot::Array(value) => Ok(value),
			other => Err(self.wrong_slot(name, FieldTag::Array, other)),
		}
	}

	/// Borrow the entries of a `map` field.
	pub fn map(&self, name: &str) -> Result<&IndexMap<String, DynamicInstance>> {
		match self.get(name)? {
			Slot::Map(value) => Ok(value),
			other => Err(self.wrong_slot(name, FieldTag::Map, other)),
		}
	}

	/// Write a `string` field.
	pub fn set_string(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
		self.set_by_name(name, Primitive::String(value.into()))
	}

	/// Write a `number` field.
	pub fn set_number(&mut self, name: &str, value: f64) -> Result<()> {
		self.set_by_name(name, Primitive::from(value))
	}

	/// Write a `boolean` field.
	pub fn set_bool(&mut self, name: &str, value: bool) -> Result<()> {
		self.set_by_name(name, Primitive::Boolean(value))
	}

	fn wrong_slot(&self, name: &str, expected: FieldTag, got: &Slot) -> DecodeError {
		DecodeError::FieldTypeMismatch {
			type_name: self.descriptor.name().into(),
			field: name.into(),
			expected,
			got: got.tag().as_str(),
		}
	}
}

impl SchemaInstance for DynamicInstance {
	fn descriptor(&self) -> &'static TypeDescriptor {
		self.descriptor
	}

	fn set_field(&mut self, index: u8, value: Primitive) -> Result<()> {
		let descriptor = self.descriptor;
		let slot = self
			.slots
			.get_mut(usize::from(index))
			.ok_or_else(|| mutate::unhandled_field(descriptor, index))?;
		match slot {
			Slot::String(target) => mutate::store(descriptor, index, target, value),
			Slot::Number(target) => mutate::store(descriptor, index, target, value),
			Slot::Boolean(target) => mutate::store(descriptor, index, target, value),
			_ => Err(mutate::unhandled_field(descriptor, index)),
		}
	}

	fn clear_field(&mut self, index: u8) -> Result<()> {
		let field = self.descriptor.field(index).ok_or_else(|| mutate::unhandled_field(self.descriptor, index))?;
		self.slots[usize::from(index)] = Slot::empty(field.tag);
		Ok(())
	}

	fn field_mut(&mut self, index: u8) -> Result<FieldMut<'_>> {
		let descriptor = self.descriptor;
		match self.slots.get_mut(usize::from(index)) {
			Some(Slot::Ref(slot)) => Ok(FieldMut::Ref(slot)),
			Some(Slot::Array(slot)) => Ok(FieldMut::Array(slot)),
			Some(Slot::Map(slot)) => Ok(FieldMut::Map(slot)),
			_ => Err(mutate::unhandled_field(descriptor, index)),
		}
	}
}

impl Instantiate for DynamicInstance {
	fn instantiate(descriptor: &'static TypeDescriptor) -> Self {
		Self::new(descriptor)
	}
}

impl PartialEq for DynamicInstance {
	fn eq(&self, other: &Self) -> bool {
		std::ptr::eq(self.descriptor, other.descriptor) && self.slots == other.slots
	}
}

impl fmt::Debug for DynamicInstance {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut out = f.debug_struct(self.descriptor.name());
		for (field, slot) in self.entries() {
			out.field(&field.name, slot);
		}
		out.finish()
	}
}

#[cfg(test)]
mod tests;
