use tracing::{debug, debug_span, trace};

use crate::schema::bytes::Cursor;
use crate::schema::codec::{self, END_OF_STRUCTURE, INDEX_CHANGE, NIL};
use crate::schema::{ArraySlot, DecodeError, FieldTag, Result, SchemaInstance, TypeDescriptor, mutate};

/// Runtime limits for decoding.
#[derive(Debug, Clone)]
pub struct DecodeOptions {
	/// Maximum structure nesting depth, root included.
	pub max_depth: u32,
	/// Maximum encoded collection length, change count, or array position.
	pub max_collection_len: usize,
}

impl Default for DecodeOptions {
	fn default() -> Self {
		Self {
			max_depth: 32,
			max_collection_len: 1 << 20,
		}
	}
}

/// Apply every field update in `bytes` to `instance` with default limits.
///
/// Returns the number of bytes consumed. Decoding stops at the end of the
/// buffer or after a root-level end-of-structure marker.
pub fn decode(instance: &mut dyn SchemaInstance, bytes: &[u8]) -> Result<usize> {
	decode_with(instance, bytes, &DecodeOptions::default())
}

/// Apply every field update in `bytes` to `instance`.
///
/// On error, fields applied earlier in the same call stay applied and any
/// child created along the way stays a valid default instance.
pub fn decode_with(instance: &mut dyn SchemaInstance, bytes: &[u8], opt: &DecodeOptions) -> Result<usize> {
	let span = debug_span!("decode", type_name = instance.descriptor().name(), len = bytes.len());
	let _guard = span.enter();

	let mut cursor = Cursor::new(bytes);
	decode_structure(instance, &mut cursor, opt, 0)?;
	debug!(consumed = cursor.pos(), "decode finished");
	Ok(cursor.pos())
}

fn decode_structure(instance: &mut dyn SchemaInstance, cursor: &mut Cursor<'_>, opt: &DecodeOptions, depth: u32) -> Result<()> {
	if depth >= opt.max_depth && !cursor.is_at_end() {
		return Err(DecodeError::DecodeDepthExceeded { max_depth: opt.max_depth });
	}

	let descriptor = instance.descriptor();
	while !cursor.is_at_end() {
		let is_nil = cursor.eat(NIL);
		let at = cursor.pos();
		let index = cursor.read_u8()?;
		if index == END_OF_STRUCTURE && !is_nil {
			break;
		}

		let field = descriptor.field(index).ok_or_else(|| DecodeError::UnknownFieldIndex {
			type_name: descriptor.name().into(),
			index,
			at,
		})?;

		if is_nil {
			mutate::clear_field(instance, index)?;
			trace!(type_name = descriptor.name(), field = %field.name, "cleared field");
			continue;
		}

		match field.tag {
			FieldTag::String | FieldTag::Number | FieldTag::Boolean => {
				let value = codec::read_value(cursor, field.tag)?;
				mutate::apply_field(instance, index, value)?;
			}
			FieldTag::Ref => {
				let child = mutate::resolve_ref(instance, index)?;
				if child.created {
					trace!(type_name = descriptor.name(), field = %field.name, "created ref child");
				}
				decode_structure(child.instance, cursor, opt, depth + 1)?;
			}
			FieldTag::Array => decode_array(instance, index, cursor, opt, depth)?,
			FieldTag::Map => decode_map(instance, index, cursor, opt, depth)?,
		}
	}

	Ok(())
}

fn decode_array(instance: &mut dyn SchemaInstance, index: u8, cursor: &mut Cursor<'_>, opt: &DecodeOptions, depth: u32) -> Result<()> {
	let (slot, child) = mutate::array_field(instance, index)?;
	let new_len = read_count(cursor, opt)?;
	let changes = read_count(cursor, opt)?.min(new_len);

	let mut places = Placement::new(slot.len());
	for _ in 0..changes {
		let position = read_count(cursor, opt)?;
		let moved_from = if cursor.eat(INDEX_CHANGE) { Some(read_count(cursor, opt)?) } else { None };

		if places.settle(slot, child, position, moved_from) {
			trace!(position, "created array item");
		}
		let (item, _) = slot.item_mut(position, child);
		decode_structure(item, cursor, opt, depth + 1)?;
	}

	slot.truncate(new_len);
	Ok(())
}

fn decode_map(instance: &mut dyn SchemaInstance, index: u8, cursor: &mut Cursor<'_>, opt: &DecodeOptions, depth: u32) -> Result<()> {
	let (slot, child) = mutate::map_field(instance, index)?;
	let changes = read_count(cursor, opt)?;
	let previous_keys = slot.keys();

	for _ in 0..changes {
		if matches!(cursor.peek(), None | Some(END_OF_STRUCTURE)) {
			break;
		}

		let is_delete = cursor.eat(NIL);
		let previous = if cursor.eat(INDEX_CHANGE) {
			Some(read_key_index(cursor, &previous_keys)?)
		} else {
			None
		};
		let key = match cursor.peek() {
			Some(marker) if codec::is_number_marker(marker) => read_key_index(cursor, &previous_keys)?,
			_ => codec::read_string(cursor)?,
		};

		if is_delete {
			slot.remove(&key);
			trace!(key = %key, "removed map entry");
			continue;
		}

		if let Some(previous) = previous
			&& previous != key
		{
			slot.rename(&previous, &key);
		}

		let (entry, created) = slot.entry_mut(&key, child);
		if created {
			trace!(key = %key, "created map entry");
		}
		decode_structure(entry, cursor, opt, depth + 1)?;
	}

	Ok(())
}

fn read_count(cursor: &mut Cursor<'_>, opt: &DecodeOptions) -> Result<usize> {
	let at = cursor.pos();
	let number = codec::read_number(cursor)?;
	let count = number.as_u64().ok_or_else(|| DecodeError::InvalidCollectionHeader {
		at,
		value: number.to_string(),
	})?;
	match usize::try_from(count) {
		Ok(count) if count <= opt.max_collection_len => Ok(count),
		_ => Err(DecodeError::CollectionTooLarge {
			count,
			max: opt.max_collection_len,
		}),
	}
}

fn read_key_index(cursor: &mut Cursor<'_>, previous_keys: &[String]) -> Result<String> {
	let at = cursor.pos();
	let number = codec::read_number(cursor)?;
	let index = number.as_u64().ok_or_else(|| DecodeError::InvalidCollectionHeader {
		at,
		value: number.to_string(),
	})?;
	usize::try_from(index)
		.ok()
		.and_then(|index| previous_keys.get(index))
		.cloned()
		.ok_or(DecodeError::UnknownMapKeyIndex {
			index,
			known: previous_keys.len(),
			at,
		})
}

/// Tracks where the items an array held before this update currently sit.
///
/// Moved and updated items are always resolved against their pre-update
/// positions; moving swaps items so no item is ever held twice.
struct Placement {
	/// Pre-update index -> current position, `None` once replaced.
	location: Vec<Option<usize>>,
	/// Current position -> item sitting there.
	occupant: Vec<Option<Occupant>>,
	saw_move: bool,
}

#[derive(Debug, Clone, Copy)]
enum Occupant {
	/// Item that held this pre-update index.
	Original(usize),
	/// Item created earlier in the same update.
	Fresh,
}

impl Placement {
	fn new(len: usize) -> Self {
		Self {
			location: (0..len).map(Some).collect(),
			occupant: (0..len).map(|index| Some(Occupant::Original(index))).collect(),
			saw_move: false,
		}
	}

	/// Bring the right item to `position`; returns `true` when a fresh item was placed.
	fn settle(&mut self, slot: &mut dyn ArraySlot, child: &'static TypeDescriptor, position: usize, moved_from: Option<usize>) -> bool {
		self.saw_move |= moved_from.is_some();
		if self.occupant.len() <= position {
			self.occupant.resize(position + 1, None);
		}
		if moved_from.is_none() && matches!(self.occupant[position], Some(Occupant::Fresh)) {
			return false;
		}

		let source = match moved_from {
			Some(from) => Some(from),
			None if !self.saw_move => Some(position),
			None => None,
		};
		let current = source.and_then(|from| self.location.get(from).copied().flatten().map(|at| (from, at)));

		let Some((from, at)) = current else {
			if let Some(Occupant::Original(previous)) = self.occupant[position] {
				self.location[previous] = None;
			}
			self.occupant[position] = Some(Occupant::Fresh);
			slot.reset_item(position, child);
			return true;
		};

		if at != position {
			let _ = slot.item_mut(position, child);
			slot.swap_items(at, position);
			let displaced = self.occupant[position];
			if let Some(Occupant::Original(displaced)) = displaced {
				self.location[displaced] = Some(at);
			}
			self.occupant[at] = displaced;
			self.occupant[position] = Some(Occupant::Original(from));
			self.location[from] = Some(position);
		}
		false
	}
}
