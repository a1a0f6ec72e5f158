use indexmap::IndexMap;

use crate::schema::{DecodeError, Number, Primitive, Result, TypeDescriptor, mutate};

/// Decodable capability shared by every schema instance.
///
/// Implementations own their fields: scalars by value, children exclusively
/// through the slot types below.
pub trait SchemaInstance {
	/// Descriptor of this instance's schema class.
	fn descriptor(&self) -> &'static TypeDescriptor;

	/// Write a decoded scalar into the slot at `index`.
	fn set_field(&mut self, index: u8, value: Primitive) -> Result<()>;

	/// Reset the slot at `index`: scalars to default, refs to empty, collections cleared.
	fn clear_field(&mut self, index: u8) -> Result<()>;

	/// Borrow the child storage behind a `ref`/`array`/`map` field.
	fn field_mut(&mut self, index: u8) -> Result<FieldMut<'_>>;

	/// Resolve a field name to its wire index.
	fn field_index(&self, name: &str) -> Result<u8> {
		let descriptor = self.descriptor();
		descriptor.index_of(name).ok_or_else(|| DecodeError::UnknownField {
			type_name: descriptor.name().into(),
			field: name.into(),
		})
	}

	/// Set a scalar field by name, with the same checks the decoder applies.
	fn set_by_name(&mut self, name: &str, value: Primitive) -> Result<()> {
		let index = self.field_index(name)?;
		mutate::apply_field(self, index, value)
	}
}

/// Compiled schema type with a process-wide descriptor.
pub trait Schema: SchemaInstance + Default {
	/// Return the descriptor, built once on first use.
	fn describe() -> &'static TypeDescriptor;
}

/// Construction of a fresh child for a descriptor.
pub trait Instantiate: SchemaInstance + Sized {
	/// Build a default instance of `descriptor`'s class.
	fn instantiate(descriptor: &'static TypeDescriptor) -> Self;
}

impl<T: Schema> Instantiate for T {
	fn instantiate(_descriptor: &'static TypeDescriptor) -> Self {
		T::default()
	}
}

/// Mutable view of a container field's storage.
pub enum FieldMut<'a> {
	/// Single optional child.
	Ref(&'a mut dyn RefSlot),
	/// Ordered children.
	Array(&'a mut dyn ArraySlot),
	/// Keyed children.
	Map(&'a mut dyn MapSlot),
}

/// Storage for a `ref` field.
pub trait RefSlot {
	/// Borrow the current child, if any.
	fn child(&self) -> Option<&dyn SchemaInstance>;
	/// Return the existing child or create a default one; `true` when created.
	fn child_or_insert(&mut self, descriptor: &'static TypeDescriptor) -> (&mut dyn SchemaInstance, bool);
	/// Drop the child.
	fn clear(&mut self);
}

/// Storage for an `array` field.
pub trait ArraySlot {
	/// Number of items.
	fn len(&self) -> usize;
	/// Return the item at `position`, filling any gap with default items; `true` when created.
	fn item_mut(&mut self, position: usize, descriptor: &'static TypeDescriptor) -> (&mut dyn SchemaInstance, bool);
	/// Replace the item at `position` with a fresh default item.
	fn reset_item(&mut self, position: usize, descriptor: &'static TypeDescriptor);
	/// Exchange two existing items.
	fn swap_items(&mut self, a: usize, b: usize);
	/// Drop items at and past `len`.
	fn truncate(&mut self, len: usize);
}

/// Storage for a `map` field.
pub trait MapSlot {
	/// Keys in insertion order.
	fn keys(&self) -> Vec<String>;
	/// Return the entry for `key`, creating a default one when absent; `true` when created.
	fn entry_mut(&mut self, key: &str, descriptor: &'static TypeDescriptor) -> (&mut dyn SchemaInstance, bool);
	/// Remove `key`, returning whether it existed.
	fn remove(&mut self, key: &str) -> bool;
	/// Move the entry under `from` to `to`, replacing any entry already there.
	fn rename(&mut self, from: &str, to: &str) -> bool;
	/// Remove every entry.
	fn clear(&mut self);
}

impl<T: Instantiate> RefSlot for Option<Box<T>> {
	fn child(&self) -> Option<&dyn SchemaInstance> {
		self.as_deref().map(|child| child as &dyn SchemaInstance)
	}

	fn child_or_insert(&mut self, descriptor: &'static TypeDescriptor) -> (&mut dyn SchemaInstance, bool) {
		let created = self.is_none();
		let child = self.get_or_insert_with(|| Box::new(T::instantiate(descriptor)));
		(child.as_mut() as &mut dyn SchemaInstance, created)
	}

	fn clear(&mut self) {
		*self = None;
	}
}

impl<T: Instantiate> ArraySlot for Vec<T> {
	fn len(&self) -> usize {
		Vec::len(self)
	}

	fn item_mut(&mut self, position: usize, descriptor: &'static TypeDescriptor) -> (&mut dyn SchemaInstance, bool) {
		let created = position >= Vec::len(self);
		while Vec::len(self) <= position {
			self.push(T::instantiate(descriptor));
		}
		(&mut self[position] as &mut dyn SchemaInstance, created)
	}

	fn reset_item(&mut self, position: usize, descriptor: &'static TypeDescriptor) {
		if position < Vec::len(self) {
			self[position] = T::instantiate(descriptor);
		} else {
			let _ = self.item_mut(position, descriptor);
		}
	}

	fn swap_items(&mut self, a: usize, b: usize) {
		self.swap(a, b);
	}

	fn truncate(&mut self, len: usize) {
		Vec::truncate(self, len);
	}
}

impl<T: Instantiate> MapSlot for IndexMap<String, T> {
	fn keys(&self) -> Vec<String> {
		IndexMap::keys(self).cloned().collect()
	}

	fn entry_mut(&mut self, key: &str, descriptor: &'static TypeDescriptor) -> (&mut dyn SchemaInstance, bool) {
		let created = !self.contains_key(key);
		let entry = self.entry(key.to_owned()).or_insert_with(|| T::instantiate(descriptor));
		(entry as &mut dyn SchemaInstance, created)
	}

	fn remove(&mut self, key: &str) -> bool {
		self.shift_remove(key).is_some()
	}

	fn rename(&mut self, from: &str, to: &str) -> bool {
		match self.shift_remove(from) {
			Some(item) => {
				self.insert(to.to_owned(), item);
				true
			}
			None => false,
		}
	}

	fn clear(&mut self) {
		IndexMap::clear(self);
	}
}

/// Conversion from a decoded scalar into a typed field slot.
///
/// Returns `None` when the value cannot be represented without coercion.
pub trait FromPrimitive: Sized {
	/// Convert `value`, or refuse.
	fn from_primitive(value: Primitive) -> Option<Self>;
}

impl FromPrimitive for String {
	fn from_primitive(value: Primitive) -> Option<Self> {
		match value {
			Primitive::String(v) => Some(v),
			_ => None,
		}
	}
}

impl FromPrimitive for bool {
	fn from_primitive(value: Primitive) -> Option<Self> {
		match value {
			Primitive::Boolean(v) => Some(v),
			_ => None,
		}
	}
}

impl FromPrimitive for f64 {
	fn from_primitive(value: Primitive) -> Option<Self> {
		match value {
			Primitive::Number(v) => Some(v.as_f64()),
			_ => None,
		}
	}
}

impl FromPrimitive for f32 {
	fn from_primitive(value: Primitive) -> Option<Self> {
		f64::from_primitive(value).map(|v| v as f32)
	}
}

impl FromPrimitive for Number {
	fn from_primitive(value: Primitive) -> Option<Self> {
		match value {
			Primitive::Number(v) => Some(v),
			_ => None,
		}
	}
}

macro_rules! integer_from_primitive {
	($($ty:ty => $wide:ident),* $(,)?) => {
		$(
			impl FromPrimitive for $ty {
				fn from_primitive(value: Primitive) -> Option<Self> {
					match value {
						Primitive::Number(v) => v.$wide().and_then(|wide| <$ty>::try_from(wide).ok()),
						_ => None,
					}
				}
			}
		)*
	};
}

integer_from_primitive! {
	i8 => as_i64,
	i16 => as_i64,
	i32 => as_i64,
	i64 => as_i64,
	u8 => as_u64,
	u16 => as_u64,
	u32 => as_u64,
	u64 => as_u64,
}
