//! Shared test helpers for workspace crates.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use indexmap::IndexMap;
use statedec::schema::{
	ChildType, END_OF_STRUCTURE, FieldMut, FieldTag, INDEX_CHANGE, NIL, Primitive, Result, Schema, SchemaInstance, TypeDescriptor, store, unhandled_field,
};

/// Resolve the workspace root path.
pub fn workspace_root() -> PathBuf {
	let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
	manifest_dir
		.join("..")
		.join("..")
		.canonicalize()
		.unwrap_or_else(|_| manifest_dir.join("..").join(".."))
}

/// Resolve a fixture path under `<workspace>/fixtures`.
pub fn fixture_path(name: &str) -> PathBuf {
	workspace_root().join("fixtures").join(name)
}

/// Resolve the workspace target directory.
pub fn target_dir() -> PathBuf {
	std::env::var_os("CARGO_TARGET_DIR")
		.map(PathBuf::from)
		.unwrap_or_else(|| workspace_root().join("target"))
}

/// Write `bytes` to a scratch file under the target directory and return its path.
pub fn write_scratch(name: &str, bytes: &[u8]) -> PathBuf {
	let dir = target_dir().join("statedec-scratch");
	std::fs::create_dir_all(&dir).expect("scratch dir is writable");
	let path = dir.join(name);
	std::fs::write(&path, bytes).expect("scratch file is writable");
	path
}

/// Hand encoder for state buffers, one wire token per call.
#[derive(Debug, Clone, Default)]
pub struct BufferBuilder {
	bytes: Vec<u8>,
}

impl BufferBuilder {
	/// Start an empty buffer.
	pub fn new() -> Self {
		Self::default()
	}

	/// Field index byte.
	pub fn field(mut self, index: u8) -> Self {
		self.bytes.push(index);
		self
	}

	/// Nil marker; precedes a field index to clear it or a map key to delete it.
	pub fn nil(mut self) -> Self {
		self.bytes.push(NIL);
		self
	}

	/// End-of-structure marker.
	pub fn end(mut self) -> Self {
		self.bytes.push(END_OF_STRUCTURE);
		self
	}

	/// Index-change marker; follow with the previous position or key index.
	pub fn index_change(mut self) -> Self {
		self.bytes.push(INDEX_CHANGE);
		self
	}

	/// String in its smallest encoding.
	pub fn string(mut self, value: &str) -> Self {
		let len = value.len();
		if len < 32 {
			self.bytes.push(0xa0 | len as u8);
		} else if let Ok(len) = u8::try_from(len) {
			self.bytes.extend([0xd9, len]);
		} else if let Ok(len) = u16::try_from(len) {
			self.bytes.push(0xda);
			self.bytes.extend(len.to_le_bytes());
		} else {
			self.bytes.push(0xdb);
			self.bytes.extend((len as u32).to_le_bytes());
		}
		self.bytes.extend_from_slice(value.as_bytes());
		self
	}

	/// Non-negative integer in its smallest encoding.
	pub fn uint(mut self, value: u64) -> Self {
		if value <= 0x7f {
			self.bytes.push(value as u8);
		} else if let Ok(v) = u8::try_from(value) {
			self.bytes.extend([0xcc, v]);
		} else if let Ok(v) = u16::try_from(value) {
			self.bytes.push(0xcd);
			self.bytes.extend(v.to_le_bytes());
		} else if let Ok(v) = u32::try_from(value) {
			self.bytes.push(0xce);
			self.bytes.extend(v.to_le_bytes());
		} else {
			self.bytes.push(0xcf);
			self.bytes.extend(value.to_le_bytes());
		}
		self
	}

	/// Signed integer in its smallest encoding.
	pub fn int(mut self, value: i64) -> Self {
		if let Ok(unsigned) = u64::try_from(value) {
			return self.uint(unsigned);
		}
		if value >= -32 {
			self.bytes.push(value as i8 as u8);
		} else if let Ok(v) = i8::try_from(value) {
			self.bytes.extend([0xd0, v as u8]);
		} else if let Ok(v) = i16::try_from(value) {
			self.bytes.push(0xd1);
			self.bytes.extend(v.to_le_bytes());
		} else if let Ok(v) = i32::try_from(value) {
			self.bytes.push(0xd2);
			self.bytes.extend(v.to_le_bytes());
		} else {
			self.bytes.push(0xd3);
			self.bytes.extend(value.to_le_bytes());
		}
		self
	}

	/// `float32` value.
	pub fn float32(mut self, value: f32) -> Self {
		self.bytes.push(0xca);
		self.bytes.extend(value.to_le_bytes());
		self
	}

	/// `float64` value.
	pub fn float64(mut self, value: f64) -> Self {
		self.bytes.push(0xcb);
		self.bytes.extend(value.to_le_bytes());
		self
	}

	/// Boolean as `0xc2`/`0xc3`.
	pub fn bool(mut self, value: bool) -> Self {
		self.bytes.push(if value { 0xc3 } else { 0xc2 });
		self
	}

	/// Bytes appended as-is.
	pub fn raw(mut self, bytes: &[u8]) -> Self {
		self.bytes.extend_from_slice(bytes);
		self
	}

	/// Finish the buffer.
	pub fn build(self) -> Vec<u8> {
		self.bytes
	}
}

/// Player entity used by the sample room state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Player {
	/// Display name.
	pub name: String,
	/// Horizontal position.
	pub x: i32,
	/// Vertical position.
	pub y: i32,
}

impl Schema for Player {
	fn describe() -> &'static TypeDescriptor {
		static DESCRIPTOR: OnceLock<TypeDescriptor> = OnceLock::new();
		DESCRIPTOR.get_or_init(|| {
			TypeDescriptor::builder("Player")
				.field("name", FieldTag::String)
				.field("x", FieldTag::Number)
				.field("y", FieldTag::Number)
				.build()
				.expect("Player schema is valid")
		})
	}
}

impl SchemaInstance for Player {
	fn descriptor(&self) -> &'static TypeDescriptor {
		Self::describe()
	}

	fn set_field(&mut self, index: u8, value: Primitive) -> Result<()> {
		let descriptor = Self::describe();
		match index {
			0 => store(descriptor, index, &mut self.name, value),
			1 => store(descriptor, index, &mut self.x, value),
			2 => store(descriptor, index, &mut self.y, value),
			_ => Err(unhandled_field(descriptor, index)),
		}
	}

	fn clear_field(&mut self, index: u8) -> Result<()> {
		match index {
			0 => self.name.clear(),
			1 => self.x = 0,
			2 => self.y = 0,
			_ => return Err(unhandled_field(Self::describe(), index)),
		}
		Ok(())
	}

	fn field_mut(&mut self, index: u8) -> Result<FieldMut<'_>> {
		Err(unhandled_field(Self::describe(), index))
	}
}

/// Sample room state covering every field kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct State {
	/// `fieldString`, index 0.
	pub field_string: String,
	/// `number`, index 1.
	pub number: f32,
	/// `player`, index 2.
	pub player: Option<Box<Player>>,
	/// `arrayOfPlayers`, index 3.
	pub array_of_players: Vec<Player>,
	/// `mapOfPlayers`, index 4.
	pub map_of_players: IndexMap<String, Player>,
}

impl Schema for State {
	fn describe() -> &'static TypeDescriptor {
		static DESCRIPTOR: OnceLock<TypeDescriptor> = OnceLock::new();
		DESCRIPTOR.get_or_init(|| {
			TypeDescriptor::builder("State")
				.field("fieldString", FieldTag::String)
				.field("number", FieldTag::Number)
				.child("player", FieldTag::Ref, ChildType::of::<Player>())
				.child("arrayOfPlayers", FieldTag::Array, ChildType::of::<Player>())
				.child("mapOfPlayers", FieldTag::Map, ChildType::of::<Player>())
				.build()
				.expect("State schema is valid")
		})
	}
}

impl SchemaInstance for State {
	fn descriptor(&self) -> &'static TypeDescriptor {
		Self::describe()
	}

	fn set_field(&mut self, index: u8, value: Primitive) -> Result<()> {
		let descriptor = Self::describe();
		match index {
			0 => store(descriptor, index, &mut self.field_string, value),
			1 => store(descriptor, index, &mut self.number, value),
			_ => Err(unhandled_field(descriptor, index)),
		}
	}

	fn clear_field(&mut self, index: u8) -> Result<()> {
		match index {
			0 => self.field_string.clear(),
			1 => self.number = 0.0,
			2 => self.player = None,
			3 => self.array_of_players.clear(),
			4 => self.map_of_players.clear(),
			_ => return Err(unhandled_field(Self::describe(), index)),
		}
		Ok(())
	}

	fn field_mut(&mut self, index: u8) -> Result<FieldMut<'_>> {
		match index {
			2 => Ok(FieldMut::Ref(&mut self.player)),
			3 => Ok(FieldMut::Array(&mut self.array_of_players)),
			4 => Ok(FieldMut::Map(&mut self.map_of_players)),
			_ => Err(unhandled_field(Self::describe(), index)),
		}
	}
}

/// Encode `player`'s fields followed by the end marker.
pub fn encode_player(out: BufferBuilder, player: &Player) -> BufferBuilder {
	out.field(0)
		.string(&player.name)
		.field(1)
		.int(i64::from(player.x))
		.field(2)
		.int(i64::from(player.y))
		.end()
}

/// Encode a full snapshot of `state`, as a server sends on join.
pub fn encode_state(state: &State) -> Vec<u8> {
	let mut out = BufferBuilder::new()
		.field(0)
		.string(&state.field_string)
		.field(1)
		.float32(state.number);

	if let Some(player) = &state.player {
		out = encode_player(out.field(2), player);
	}

	let len = state.array_of_players.len() as u64;
	out = out.field(3).uint(len).uint(len);
	for (position, player) in state.array_of_players.iter().enumerate() {
		out = encode_player(out.uint(position as u64), player);
	}

	out = out.field(4).uint(state.map_of_players.len() as u64);
	for (key, player) in &state.map_of_players {
		out = encode_player(out.string(key), player);
	}

	out.build()
}
