use std::fmt;

use crate::schema::FieldTag;

/// Numeric value as decoded from the wire, keeping the encoded signedness.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
	/// Signed integer (negative fixint or `int*` markers).
	Int(i64),
	/// Unsigned integer (positive fixint or `uint*` markers).
	UInt(u64),
	/// Floating point (`float32`/`float64` markers).
	Float(f64),
}

impl Number {
	/// Widen to `f64`. Large 64-bit integers may lose precision.
	pub fn as_f64(self) -> f64 {
		match self {
			Self::Int(v) => v as f64,
			Self::UInt(v) => v as f64,
			Self::Float(v) => v,
		}
	}

	/// Return the value as `i64` when it is integral and in range.
	pub fn as_i64(self) -> Option<i64> {
		match self {
			Self::Int(v) => Some(v),
			Self::UInt(v) => i64::try_from(v).ok(),
			Self::Float(_) => None,
		}
	}

	/// Return the value as `u64` when it is integral and non-negative.
	pub fn as_u64(self) -> Option<u64> {
		match self {
			Self::Int(v) => u64::try_from(v).ok(),
			Self::UInt(v) => Some(v),
			Self::Float(_) => None,
		}
	}
}

impl fmt::Display for Number {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Int(v) => write!(f, "{v}"),
			Self::UInt(v) => write!(f, "{v}"),
			Self::Float(v) => write!(f, "{v}"),
		}
	}
}

/// One decoded scalar field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
	/// Length-prefixed text.
	String(String),
	/// Any numeric encoding.
	Number(Number),
	/// Boolean.
	Boolean(bool),
}

impl Primitive {
	/// Field tag this value satisfies.
	pub fn tag(&self) -> FieldTag {
		match self {
			Self::String(_) => FieldTag::String,
			Self::Number(_) => FieldTag::Number,
			Self::Boolean(_) => FieldTag::Boolean,
		}
	}

	/// Stable lowercase label for error messages.
	pub fn kind(&self) -> &'static str {
		self.tag().as_str()
	}
}

impl From<&str> for Primitive {
	fn from(value: &str) -> Self {
		Self::String(value.to_owned())
	}
}

impl From<String> for Primitive {
	fn from(value: String) -> Self {
		Self::String(value)
	}
}

impl From<bool> for Primitive {
	fn from(value: bool) -> Self {
		Self::Boolean(value)
	}
}

impl From<f64> for Primitive {
	fn from(value: f64) -> Self {
		Self::Number(Number::Float(value))
	}
}

impl From<i64> for Primitive {
	fn from(value: i64) -> Self {
		Self::Number(Number::Int(value))
	}
}

impl From<u64> for Primitive {
	fn from(value: u64) -> Self {
		Self::Number(Number::UInt(value))
	}
}
