use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::error::{CliError, Result};

/// Largest buffer accepted from disk or after decompression.
pub(crate) const MAX_BUFFER_BYTES: usize = 64 * 1024 * 1024;
/// zstd frame magic.
pub(crate) const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];

/// Container the buffer was stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Compression {
	/// Raw state bytes.
	None,
	/// zstd-compressed state bytes.
	Zstd,
}

impl Compression {
	/// Render compression mode as a stable lowercase label.
	pub(crate) fn as_str(self) -> &'static str {
		match self {
			Self::None => "none",
			Self::Zstd => "zstd",
		}
	}
}

/// Read a state buffer from `path`, decoding hex text and zstd framing.
pub(crate) fn read_buffer(path: &Path, hex: bool) -> Result<(Compression, Vec<u8>)> {
	let raw = std::fs::read(path)?;
	if raw.len() > MAX_BUFFER_BYTES {
		return Err(CliError::BufferTooLarge { limit: MAX_BUFFER_BYTES });
	}
	let raw = if hex { parse_hex(&String::from_utf8_lossy(&raw))? } else { raw };
	decode_bytes(raw)
}

/// Detect zstd framing, returning `(mode, state_bytes)`.
pub(crate) fn decode_bytes(raw: Vec<u8>) -> Result<(Compression, Vec<u8>)> {
	if !raw.starts_with(&ZSTD_MAGIC) {
		return Ok((Compression::None, raw));
	}
	let out = decode_zstd(&raw)?;
	debug!(compressed = raw.len(), decompressed = out.len(), "inflated zstd buffer");
	Ok((Compression::Zstd, out))
}

fn decode_zstd(raw: &[u8]) -> Result<Vec<u8>> {
	let mut decoder = zstd::stream::read::Decoder::new(raw)?;
	let mut out = Vec::new();
	let mut buf = [0_u8; 8192];

	loop {
		let read = decoder.read(&mut buf)?;
		if read == 0 {
			break;
		}
		if out.len() + read > MAX_BUFFER_BYTES {
			return Err(CliError::BufferTooLarge { limit: MAX_BUFFER_BYTES });
		}
		out.extend_from_slice(&buf[..read]);
	}

	Ok(out)
}

/// Parse hex digit pairs, ignoring ASCII whitespace and `0x` prefixes.
pub(crate) fn parse_hex(text: &str) -> Result<Vec<u8>> {
	let digits: String = text
		.split_ascii_whitespace()
		.map(|word| word.strip_prefix("0x").or_else(|| word.strip_prefix("0X")).unwrap_or(word))
		.collect();
	Ok(hex::decode(digits)?)
}

#[cfg(test)]
mod tests {
	use super::{Compression, decode_bytes, parse_hex};
	use crate::error::CliError;

	#[test]
	fn hex_accepts_whitespace_and_prefixes() {
		let bytes = parse_hex("0x00 ab\n48 65\t0xCC").expect("valid hex");
		assert_eq!(bytes, [0x00, 0xab, 0x48, 0x65, 0xcc]);
	}

	#[test]
	fn hex_rejects_bad_digits_and_odd_length() {
		assert!(matches!(
			parse_hex("0g"),
			Err(CliError::InvalidHex(hex::FromHexError::InvalidHexCharacter { c: 'g', index: 1 }))
		));
		assert!(matches!(parse_hex("0xab c"), Err(CliError::InvalidHex(hex::FromHexError::OddLength))));
	}

	#[test]
	fn zstd_frames_are_inflated() {
		let state = vec![0, 0xa1, b'a', 1, 0x05];
		let packed = zstd::stream::encode_all(state.as_slice(), 3).expect("zstd encodes");

		let (mode, out) = decode_bytes(packed).expect("zstd decodes");
		assert_eq!(mode, Compression::Zstd);
		assert_eq!(out, state);

		let (mode, out) = decode_bytes(state.clone()).expect("raw passes through");
		assert_eq!(mode, Compression::None);
		assert_eq!(out, state);
	}
}
