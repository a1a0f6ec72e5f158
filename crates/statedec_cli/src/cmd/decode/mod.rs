use std::path::PathBuf;

use statedec::schema::{DecodeOptions, DynamicInstance, SchemaInstance, Slot, decode_with};
use tracing::warn;

use crate::cmd::input::read_buffer;
use crate::cmd::util::{emit_json, instance_json, load_registry, number_text, truncate};
use crate::error::{CliError, Result};

#[derive(clap::Args)]
pub struct Args {
	pub schema: PathBuf,
	pub buffer: PathBuf,
	#[arg(long = "type")]
	pub type_name: String,
	#[arg(long)]
	pub hex: bool,
	#[arg(long)]
	pub json: bool,
	#[arg(long = "max-depth")]
	pub max_depth: Option<u32>,
	#[arg(long = "max-items")]
	pub max_items: Option<usize>,
}

/// Output truncation limits for decoded state trees.
#[derive(Debug, Clone, Copy)]
pub struct PrintOptions {
	/// Maximum number of Unicode scalar values printed for strings.
	pub max_string_len: usize,
	/// Maximum number of items printed for arrays and maps.
	pub max_items: usize,
}

impl Default for PrintOptions {
	fn default() -> Self {
		Self {
			max_string_len: 200,
			max_items: 16,
		}
	}
}

/// Decode a buffer into a fresh instance of the named root type and print it.
pub fn run(args: Args) -> Result<()> {
	let Args {
		schema,
		buffer,
		type_name,
		hex,
		json,
		max_depth,
		max_items,
	} = args;

	let registry = load_registry(&schema)?;
	let descriptor = registry.get(&type_name).ok_or(CliError::UnknownType { name: type_name })?;
	let (compression, bytes) = read_buffer(&buffer, hex)?;

	let mut decode_options = DecodeOptions::default();
	if let Some(max_depth) = max_depth {
		decode_options.max_depth = max_depth;
	}
	let mut root = DynamicInstance::new(descriptor);
	let consumed = decode_with(&mut root, &bytes, &decode_options)?;
	if consumed < bytes.len() {
		warn!(consumed, len = bytes.len(), "trailing bytes after root end marker");
	}

	if json {
		let payload = DecodeJson {
			buffer: buffer.display().to_string(),
			compression: compression.as_str(),
			root_type: descriptor.name().to_owned(),
			len: bytes.len(),
			consumed,
			state: instance_json(&root),
		};
		return emit_json(&payload);
	}

	let mut print_options = PrintOptions::default();
	if let Some(max_items) = max_items {
		print_options.max_items = max_items;
	}

	println!("buffer: {}", buffer.display());
	println!("compression: {}", compression.as_str());
	println!("len: {}", bytes.len());
	println!("consumed: {consumed}");
	println!("decoded:");
	print!("{}", render_instance(&root, 0, print_options));

	Ok(())
}

/// Render an instance as an indented field tree.
pub fn render_instance(instance: &DynamicInstance, indent: usize, options: PrintOptions) -> String {
	let pad = " ".repeat(indent);
	let mut out = format!("{pad}{} {{\n", instance.descriptor().name());
	for (field, slot) in instance.entries() {
		out.push_str(&format!("{pad}  {} = ", field.name));
		render_slot(&mut out, slot, indent + 2, options);
	}
	out.push_str(&format!("{pad}}}\n"));
	out
}

fn render_slot(out: &mut String, slot: &Slot, indent: usize, options: PrintOptions) {
	let pad = " ".repeat(indent);
	match slot {
		Slot::String(value) => out.push_str(&format!("\"{}\"\n", truncate(value, options.max_string_len))),
		Slot::Number(value) => out.push_str(&format!("{}\n", number_text(*value))),
		Slot::Boolean(value) => out.push_str(&format!("{value}\n")),
		Slot::Ref(None) => out.push_str("null\n"),
		Slot::Ref(Some(child)) => {
			out.push('\n');
			out.push_str(&render_instance(child, indent + 2, options));
		}
		Slot::Array(items) => {
			out.push_str(&format!("[{} items]\n", items.len()));
			for (position, item) in items.iter().enumerate().take(options.max_items) {
				out.push_str(&format!("{pad}  [{position}]\n"));
				out.push_str(&render_instance(item, indent + 4, options));
			}
			if items.len() > options.max_items {
				out.push_str(&format!("{pad}  ... {} more\n", items.len() - options.max_items));
			}
		}
		Slot::Map(entries) => {
			out.push_str(&format!("{{{} entries}}\n", entries.len()));
			for (key, item) in entries.iter().take(options.max_items) {
				out.push_str(&format!("{pad}  \"{key}\"\n"));
				out.push_str(&render_instance(item, indent + 4, options));
			}
			if entries.len() > options.max_items {
				out.push_str(&format!("{pad}  ... {} more\n", entries.len() - options.max_items));
			}
		}
	}
}

#[derive(serde::Serialize)]
struct DecodeJson {
	buffer: String,
	compression: &'static str,
	root_type: String,
	len: usize,
	consumed: usize,
	state: serde_json::Value,
}
