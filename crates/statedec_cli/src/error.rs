use statedec::schema::DecodeError;
use thiserror::Error;

/// CLI result type.
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors surfaced by `statedec` subcommands.
#[derive(Debug, Error)]
pub enum CliError {
	/// Schema registration or decoding failed.
	#[error(transparent)]
	Decode(#[from] DecodeError),
	/// Filesystem or stream IO failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// Schema file is not valid JSON of the expected shape.
	#[error("schema json: {0}")]
	Json(#[from] serde_json::Error),
	/// Schema file names a field tag outside the supported set.
	#[error("unknown field tag {tag:?} on {type_name}")]
	UnknownTag {
		/// Type declaring the field.
		type_name: String,
		/// Tag text as written.
		tag: String,
	},
	/// Requested type is not declared by the schema file.
	#[error("type {name} not found in schema")]
	UnknownType {
		/// Requested type name.
		name: String,
	},
	/// Hex buffer text contained a non-hex digit or an odd digit count.
	#[error("invalid hex buffer: {0}")]
	InvalidHex(#[from] hex::FromHexError),
	/// Buffer input exceeded the size cap.
	#[error("buffer exceeds {limit} bytes")]
	BufferTooLarge {
		/// Maximum accepted size.
		limit: usize,
	},
}
