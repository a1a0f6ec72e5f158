use crate::schema::bytes::Cursor;
use crate::schema::{DecodeError, FieldTag, Number, Primitive, Result};

/// Marker preceding a field index to clear that field, or a map key to delete it.
pub const NIL: u8 = 0xc0;
/// Field-index byte that terminates the current structure.
pub const END_OF_STRUCTURE: u8 = 0xc1;
/// Collection item prefix announcing the item's previous position or key index.
pub const INDEX_CHANGE: u8 = 0xd4;

const FIXSTR_MASK: u8 = 0x1f;

/// Return whether `marker` starts a numeric value.
pub fn is_number_marker(marker: u8) -> bool {
	marker <= 0x7f || marker >= 0xe0 || (0xca..=0xd3).contains(&marker)
}

/// Return whether `marker` starts a string value.
pub fn is_string_marker(marker: u8) -> bool {
	(0xa0..=0xbf).contains(&marker) || (0xd9..=0xdb).contains(&marker)
}

/// Decode one scalar for a field declared with `tag`, advancing past it.
///
/// The marker selects the encoding; `tag` only widens what is accepted:
/// boolean fields also take positive fixint `0`/`1`. The returned value may
/// still be of another kind than `tag`, which the mutator rejects.
pub fn read_value(cursor: &mut Cursor<'_>, tag: FieldTag) -> Result<Primitive> {
	let at = cursor.pos();
	let marker = cursor.read_u8()?;

	if tag == FieldTag::Boolean && marker <= 0x01 {
		return Ok(Primitive::Boolean(marker == 0x01));
	}

	match marker {
		0xc2 => Ok(Primitive::Boolean(false)),
		0xc3 => Ok(Primitive::Boolean(true)),
		_ if is_string_marker(marker) => read_string_body(cursor, marker).map(Primitive::String),
		_ if is_number_marker(marker) => read_number_body(cursor, marker, at).map(Primitive::Number),
		_ => Err(DecodeError::UnknownPrimitiveMarker { marker, at }),
	}
}

/// Decode one numeric value.
pub fn read_number(cursor: &mut Cursor<'_>) -> Result<Number> {
	let at = cursor.pos();
	let marker = cursor.read_u8()?;
	read_number_body(cursor, marker, at)
}

/// Decode one length-prefixed string.
pub fn read_string(cursor: &mut Cursor<'_>) -> Result<String> {
	let at = cursor.pos();
	let marker = cursor.read_u8()?;
	if !is_string_marker(marker) {
		return Err(DecodeError::UnknownPrimitiveMarker { marker, at });
	}
	read_string_body(cursor, marker)
}

fn read_number_body(cursor: &mut Cursor<'_>, marker: u8, at: usize) -> Result<Number> {
	Ok(match marker {
		0x00..=0x7f => Number::UInt(u64::from(marker)),
		0xe0..=0xff => Number::Int(i64::from(marker as i8)),
		0xca => Number::Float(f64::from(cursor.read_f32_le()?)),
		0xcb => Number::Float(cursor.read_f64_le()?),
		0xcc => Number::UInt(u64::from(cursor.read_u8()?)),
		0xcd => Number::UInt(u64::from(cursor.read_u16_le()?)),
		0xce => Number::UInt(u64::from(cursor.read_u32_le()?)),
		0xcf => Number::UInt(cursor.read_u64_le()?),
		0xd0 => Number::Int(i64::from(cursor.read_u8()? as i8)),
		0xd1 => Number::Int(i64::from(cursor.read_i16_le()?)),
		0xd2 => Number::Int(i64::from(cursor.read_i32_le()?)),
		0xd3 => Number::Int(cursor.read_i64_le()?),
		_ => return Err(DecodeError::UnknownPrimitiveMarker { marker, at }),
	})
}

fn read_string_body(cursor: &mut Cursor<'_>, marker: u8) -> Result<String> {
	let len = match marker {
		0xd9 => usize::from(cursor.read_u8()?),
		0xda => usize::from(cursor.read_u16_le()?),
		0xdb => cursor.read_u32_le()? as usize,
		_ => usize::from(marker & FIXSTR_MASK),
	};
	let raw = cursor.read_exact(len)?;
	Ok(String::from_utf8_lossy(raw).into_owned())
}
