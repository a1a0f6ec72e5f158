use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use statedec::schema::{DynamicInstance, FieldTag, Registry, Slot, TypeTable};
use tracing::debug;

use crate::error::{CliError, Result};

/// On-disk schema file: every type the state graph can contain.
#[derive(Debug, Deserialize)]
pub(crate) struct SchemaFile {
	pub types: Vec<TypeJson>,
}

/// One schema class in registration-table form.
#[derive(Debug, Deserialize)]
pub(crate) struct TypeJson {
	pub name: String,
	pub order: Vec<String>,
	pub types: BTreeMap<u8, String>,
	#[serde(default)]
	pub child_types: BTreeMap<u8, String>,
}

impl TypeJson {
	fn into_table(self) -> Result<TypeTable> {
		let mut tags = BTreeMap::new();
		for (index, tag) in self.types {
			let parsed = FieldTag::parse(&tag).ok_or_else(|| CliError::UnknownTag {
				type_name: self.name.clone(),
				tag,
			})?;
			tags.insert(index, parsed);
		}
		Ok(TypeTable {
			name: self.name,
			order: self.order,
			tags,
			child_types: self.child_types,
		})
	}
}

/// Parse a schema file and install every type it declares.
pub(crate) fn load_registry(path: &Path) -> Result<Registry> {
	let raw = std::fs::read(path)?;
	let file: SchemaFile = serde_json::from_slice(&raw)?;
	let tables = file.types.into_iter().map(TypeJson::into_table).collect::<Result<Vec<_>>>()?;
	let registry = Registry::install(tables)?;
	debug!(path = %path.display(), types = registry.len(), "loaded schema file");
	Ok(registry)
}

/// Print a serializable payload as pretty JSON on stdout.
pub(crate) fn emit_json<T: Serialize>(payload: &T) -> Result<()> {
	println!("{}", serde_json::to_string_pretty(payload)?);
	Ok(())
}

/// Render an instance as a JSON object keyed by field name.
pub(crate) fn instance_json(instance: &DynamicInstance) -> Value {
	let mut out = Map::new();
	for (field, slot) in instance.entries() {
		out.insert(field.name.to_string(), slot_json(slot));
	}
	Value::Object(out)
}

fn slot_json(slot: &Slot) -> Value {
	match slot {
		Slot::String(value) => Value::String(value.clone()),
		Slot::Number(value) => number_json(*value),
		Slot::Boolean(value) => Value::Bool(*value),
		Slot::Ref(child) => child.as_deref().map(instance_json).unwrap_or(Value::Null),
		Slot::Array(items) => Value::Array(items.iter().map(instance_json).collect()),
		Slot::Map(entries) => Value::Object(entries.iter().map(|(key, item)| (key.clone(), instance_json(item))).collect()),
	}
}

/// Integral numbers render without a fractional part; non-finite ones as `null`.
fn number_json(value: f64) -> Value {
	const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;
	if value.fract() == 0.0 && value.abs() <= MAX_SAFE_INTEGER {
		return Value::from(value as i64);
	}
	serde_json::Number::from_f64(value).map(Value::Number).unwrap_or(Value::Null)
}

/// Render a number the way text output prints it.
pub(crate) fn number_text(value: f64) -> String {
	match number_json(value) {
		Value::Null => value.to_string(),
		other => other.to_string(),
	}
}

/// Limit a string to `max_len` characters, marking the cut.
pub(crate) fn truncate(input: &str, max_len: usize) -> String {
	if input.chars().count() <= max_len {
		return input.to_owned();
	}
	let out: String = input.chars().take(max_len).collect();
	format!("{out}...")
}
