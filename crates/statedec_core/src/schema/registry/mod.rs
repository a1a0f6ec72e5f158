use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::OnceLock;

use indexmap::IndexMap;
use tracing::debug;

use crate::schema::{DecodeError, Result, Schema};

/// Maximum number of fields per schema class.
///
/// Index bytes `0xc0` (nil) and `0xc1` (end of structure) are reserved on the
/// wire, so indices stop just below them.
pub const MAX_FIELDS: usize = 0xc0;

/// Wire-level field type marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldTag {
	/// Length-prefixed string.
	String,
	/// Any numeric encoding.
	Number,
	/// Boolean.
	Boolean,
	/// Single nested schema instance.
	Ref,
	/// Ordered collection of schema instances.
	Array,
	/// String-keyed collection of schema instances.
	Map,
}

impl FieldTag {
	/// Render tag as its declaration name.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::String => "string",
			Self::Number => "number",
			Self::Boolean => "boolean",
			Self::Ref => "ref",
			Self::Array => "array",
			Self::Map => "map",
		}
	}

	/// Parse a declaration name.
	pub fn parse(name: &str) -> Option<Self> {
		Some(match name {
			"string" => Self::String,
			"number" => Self::Number,
			"boolean" => Self::Boolean,
			"ref" => Self::Ref,
			"array" => Self::Array,
			"map" => Self::Map,
			_ => return None,
		})
	}

	/// Return whether fields of this tag hold child schema instances.
	pub fn is_container(self) -> bool {
		matches!(self, Self::Ref | Self::Array | Self::Map)
	}
}

impl fmt::Display for FieldTag {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Lazily resolved descriptor of a contained schema class.
pub enum ChildType {
	/// Compiled schema type exposing its own descriptor.
	Static(fn() -> &'static TypeDescriptor),
	/// Named type linked by [`Registry::install`].
	Linked {
		/// Declared child type name.
		name: Box<str>,
		/// Target filled once every table in the set is installed.
		target: OnceLock<&'static TypeDescriptor>,
	},
}

impl ChildType {
	/// Child type of a compiled schema.
	pub fn of<T: Schema>() -> Self {
		Self::Static(T::describe)
	}

	/// Child type referenced by name, linked at install time.
	pub fn named(name: impl Into<Box<str>>) -> Self {
		Self::Linked {
			name: name.into(),
			target: OnceLock::new(),
		}
	}

	/// Resolve the child descriptor; `None` only for an unlinked named type.
	pub fn resolve(&self) -> Option<&'static TypeDescriptor> {
		match self {
			Self::Static(describe) => Some(describe()),
			Self::Linked { target, .. } => target.get().copied(),
		}
	}
}

impl fmt::Debug for ChildType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Static(describe) => write!(f, "ChildType({})", describe().name()),
			Self::Linked { name, .. } => write!(f, "ChildType({name})"),
		}
	}
}

/// One registered field.
#[derive(Debug)]
pub struct FieldDescriptor {
	/// Wire index.
	pub index: u8,
	/// Field name.
	pub name: Box<str>,
	/// Declared tag.
	pub tag: FieldTag,
	/// Contained schema type, present exactly for container tags.
	pub child: Option<ChildType>,
}

impl FieldDescriptor {
	/// Resolve the contained schema descriptor.
	pub fn child_descriptor(&self) -> Option<&'static TypeDescriptor> {
		self.child.as_ref().and_then(ChildType::resolve)
	}
}

/// Immutable per-class field metadata.
#[derive(Debug)]
pub struct TypeDescriptor {
	name: Box<str>,
	fields: Vec<FieldDescriptor>,
	by_name: HashMap<Box<str>, u8>,
}

impl TypeDescriptor {
	/// Start declaring fields in wire order.
	pub fn builder(name: &str) -> TypeDescriptorBuilder {
		TypeDescriptorBuilder {
			name: name.into(),
			fields: Vec::new(),
		}
	}

	/// Build a descriptor from order/tag/child tables and validate them.
	pub fn from_tables<S, T, C>(name: &str, order: S, tags: T, children: C) -> Result<Self>
	where
		S: IntoIterator,
		S::Item: Into<Box<str>>,
		T: IntoIterator<Item = (u8, FieldTag)>,
		C: IntoIterator<Item = (u8, ChildType)>,
	{
		let order: Vec<Box<str>> = order.into_iter().map(Into::into).collect();

		let mut tag_table = BTreeMap::new();
		let mut tag_count = 0_usize;
		for (index, tag) in tags {
			tag_count += 1;
			if tag_table.insert(index, tag).is_some() {
				return Err(DecodeError::schema(name, format!("duplicate tag for field index {index}")));
			}
		}

		let mut child_table = BTreeMap::new();
		for (index, child) in children {
			if child_table.insert(index, child).is_some() {
				return Err(DecodeError::schema(name, format!("duplicate child type for field index {index}")));
			}
		}

		if order.len() != tag_count {
			return Err(DecodeError::schema(
				name,
				format!("field order has {} names but {} tags", order.len(), tag_count),
			));
		}
		if order.len() > MAX_FIELDS {
			return Err(DecodeError::schema(name, format!("{} fields exceed the limit of {MAX_FIELDS}", order.len())));
		}

		let mut by_name = HashMap::with_capacity(order.len());
		let mut fields = Vec::with_capacity(order.len());
		for (position, field_name) in order.into_iter().enumerate() {
			let index = position as u8;
			let tag = tag_table
				.remove(&index)
				.ok_or_else(|| DecodeError::schema(name, format!("field indices are not dense: missing tag for index {index}")))?;
			if field_name.is_empty() {
				return Err(DecodeError::schema(name, format!("field {index} has an empty name")));
			}
			if by_name.insert(field_name.clone(), index).is_some() {
				return Err(DecodeError::schema(name, format!("duplicate field name {field_name}")));
			}

			let child = child_table.remove(&index);
			match (tag.is_container(), child.is_some()) {
				(true, false) => {
					return Err(DecodeError::schema(name, format!("{tag} field {field_name} has no child type")));
				}
				(false, true) => {
					return Err(DecodeError::schema(name, format!("{tag} field {field_name} cannot have a child type")));
				}
				_ => {}
			}

			fields.push(FieldDescriptor {
				index,
				name: field_name,
				tag,
				child,
			});
		}

		if let Some(index) = child_table.keys().next() {
			return Err(DecodeError::schema(name, format!("child type declared for unknown field index {index}")));
		}

		Ok(Self {
			name: name.into(),
			fields,
			by_name,
		})
	}

	/// Schema class name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Fields in wire order.
	pub fn fields(&self) -> &[FieldDescriptor] {
		&self.fields
	}

	/// Look up a field by wire index.
	pub fn field(&self, index: u8) -> Option<&FieldDescriptor> {
		self.fields.get(usize::from(index))
	}

	/// Look up a field index by name.
	pub fn index_of(&self, name: &str) -> Option<u8> {
		self.by_name.get(name).copied()
	}

	/// Look up a field by name.
	pub fn field_by_name(&self, name: &str) -> Option<&FieldDescriptor> {
		self.index_of(name).and_then(|index| self.field(index))
	}
}

/// Fluent declaration of fields in wire order.
pub struct TypeDescriptorBuilder {
	name: Box<str>,
	fields: Vec<(Box<str>, FieldTag, Option<ChildType>)>,
}

impl TypeDescriptorBuilder {
	/// Append a scalar field.
	pub fn field(mut self, name: &str, tag: FieldTag) -> Self {
		self.fields.push((name.into(), tag, None));
		self
	}

	/// Append a `ref`/`array`/`map` field holding `child` instances.
	pub fn child(mut self, name: &str, tag: FieldTag, child: ChildType) -> Self {
		self.fields.push((name.into(), tag, Some(child)));
		self
	}

	/// Validate and freeze the declaration.
	pub fn build(self) -> Result<TypeDescriptor> {
		let mut order = Vec::with_capacity(self.fields.len());
		let mut tags = Vec::with_capacity(self.fields.len());
		let mut children = Vec::new();
		for (position, (name, tag, child)) in self.fields.into_iter().enumerate() {
			let index = u8::try_from(position).map_err(|_| DecodeError::schema(&self.name, format!("more than {MAX_FIELDS} fields")))?;
			order.push(name);
			tags.push((index, tag));
			if let Some(child) = child {
				children.push((index, child));
			}
		}
		TypeDescriptor::from_tables(&self.name, order, tags, children)
	}
}

/// Declarative registration data for one schema class known only at run time.
#[derive(Debug, Clone, Default)]
pub struct TypeTable {
	/// Schema class name.
	pub name: String,
	/// Field names in wire order.
	pub order: Vec<String>,
	/// Field index to tag.
	pub tags: BTreeMap<u8, FieldTag>,
	/// Field index to contained schema class name.
	pub child_types: BTreeMap<u8, String>,
}

/// Set of run-time declared descriptors, linked by name.
#[derive(Debug, Default)]
pub struct Registry {
	types: IndexMap<Box<str>, &'static TypeDescriptor>,
}

impl Registry {
	/// Validate, link, and install a set of type tables.
	///
	/// Child types may reference any table in the set, including the table
	/// itself. Installed descriptors live for the rest of the process.
	pub fn install(tables: Vec<TypeTable>) -> Result<Self> {
		let mut built: IndexMap<Box<str>, TypeDescriptor> = IndexMap::with_capacity(tables.len());
		for table in tables {
			if built.contains_key(table.name.as_str()) {
				return Err(DecodeError::schema(&table.name, "type declared twice"));
			}
			let children = table.child_types.into_iter().map(|(index, name)| (index, ChildType::named(name)));
			let descriptor = TypeDescriptor::from_tables(&table.name, table.order, table.tags, children)?;
			built.insert(table.name.into_boxed_str(), descriptor);
		}

		for descriptor in built.values() {
			for field in &descriptor.fields {
				if let Some(ChildType::Linked { name, .. }) = &field.child
					&& !built.contains_key(name)
				{
					return Err(DecodeError::schema(
						descriptor.name(),
						format!("field {} references undeclared type {name}", field.name),
					));
				}
			}
		}

		let types: IndexMap<Box<str>, &'static TypeDescriptor> = built
			.into_iter()
			.map(|(name, descriptor)| (name, &*Box::leak(Box::new(descriptor))))
			.collect();

		for descriptor in types.values() {
			for field in &descriptor.fields {
				if let Some(ChildType::Linked { name, target }) = &field.child
					&& let Some(linked) = types.get(name)
				{
					let _ = target.set(*linked);
				}
			}
		}

		debug!(types = types.len(), "installed schema registry");
		Ok(Self { types })
	}

	/// Look up an installed descriptor by class name.
	pub fn get(&self, name: &str) -> Option<&'static TypeDescriptor> {
		self.types.get(name).copied()
	}

	/// Iterate installed descriptors in declaration order.
	pub fn iter(&self) -> impl Iterator<Item = &'static TypeDescriptor> + '_ {
		self.types.values().copied()
	}

	/// Number of installed descriptors.
	pub fn len(&self) -> usize {
		self.types.len()
	}

	/// Return whether no descriptors are installed.
	pub fn is_empty(&self) -> bool {
		self.types.is_empty()
	}
}

#[cfg(test)]
mod tests;
