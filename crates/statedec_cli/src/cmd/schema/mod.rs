use std::path::PathBuf;

use statedec::schema::{FieldDescriptor, TypeDescriptor};

use crate::cmd::util::{emit_json, load_registry};
use crate::error::{CliError, Result};

#[derive(clap::Args)]
pub struct Args {
	pub schema: PathBuf,
	#[arg(long = "type")]
	pub type_name: Option<String>,
	#[arg(long)]
	pub json: bool,
}

/// Print the installed types and their wire field layout.
pub fn run(args: Args) -> Result<()> {
	let Args { schema, type_name, json } = args;

	let registry = load_registry(&schema)?;
	let selected: Vec<&'static TypeDescriptor> = match type_name {
		Some(name) => vec![registry.get(&name).ok_or(CliError::UnknownType { name })?],
		None => registry.iter().collect(),
	};

	if json {
		let payload = SchemaJson {
			path: schema.display().to_string(),
			types: selected.iter().map(|item| type_json(item)).collect(),
		};
		return emit_json(&payload);
	}

	println!("schema: {}", schema.display());
	println!("types: {}", registry.len());
	for item in selected {
		println!("{} ({} fields)", item.name(), item.fields().len());
		for field in item.fields() {
			match child_name(field) {
				Some(child) => println!("  {} {}: {} {}", field.index, field.name, field.tag, child),
				None => println!("  {} {}: {}", field.index, field.name, field.tag),
			}
		}
	}

	Ok(())
}

fn child_name(field: &FieldDescriptor) -> Option<&'static str> {
	field.child_descriptor().map(TypeDescriptor::name)
}

fn type_json(item: &TypeDescriptor) -> TypeJson {
	TypeJson {
		name: item.name().to_owned(),
		fields: item
			.fields()
			.iter()
			.map(|field| FieldJson {
				index: field.index,
				name: field.name.to_string(),
				tag: field.tag.as_str(),
				child: child_name(field),
			})
			.collect(),
	}
}

#[derive(serde::Serialize)]
struct SchemaJson {
	path: String,
	types: Vec<TypeJson>,
}

#[derive(serde::Serialize)]
struct TypeJson {
	name: String,
	fields: Vec<FieldJson>,
}

#[derive(serde::Serialize)]
struct FieldJson {
	index: u8,
	name: String,
	#[serde(rename = "type")]
	tag: &'static str,
	child: Option<&'static str>,
}

#[cfg(test)]
mod tests;
