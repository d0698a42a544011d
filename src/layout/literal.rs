use crate::layout::bits::unpack_bits;
use crate::layout::{DEFAULT_POINTER_BITS, LayoutError, Result, Value};

/// Untyped input converted to a value by [`Literal::to_value`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
	/// Integer; becomes a signed 32-bit value.
	Integer(i128),
	/// Text; becomes a zero-terminated string.
	String(String),
	/// Absence; becomes [`Value::Null`].
	Null,
	/// Sequence; becomes an array over the converted elements.
	Sequence(Vec<Literal>),
}

impl Literal {
	/// Convert to a value: int32, string, null, or a unified array.
	pub fn to_value(&self) -> Result<Value> {
		self.to_value_with(DEFAULT_POINTER_BITS)
	}

	/// [`Literal::to_value`] with `pointer_bits` wide pointers in any reference array it builds.
	pub fn to_value_with(&self, pointer_bits: u32) -> Result<Value> {
		match self {
			Literal::Integer(value) => Value::int32(*value),
			Literal::String(text) => Value::string(text),
			Literal::Null => Ok(Value::Null),
			Literal::Sequence(items) => {
				let values = items.iter().map(|item| item.to_value_with(pointer_bits)).collect::<Result<Vec<_>>>()?;
				Value::array_with(values, None, pointer_bits)
			}
		}
	}

	/// Integer payload.
	pub fn as_integer(&self) -> Result<i128> {
		match self {
			Literal::Integer(value) => Ok(*value),
			_ => Err(LayoutError::InvalidOperation {
				reason: "expected an integer literal",
			}),
		}
	}

	/// Text payload; `None` for [`Literal::Null`].
	pub fn as_optional_str(&self) -> Result<Option<&str>> {
		match self {
			Literal::String(text) => Ok(Some(text)),
			Literal::Null => Ok(None),
			_ => Err(LayoutError::InvalidOperation {
				reason: "expected a string or null literal",
			}),
		}
	}

	/// Bits of a sequence of 0/1 integers, or of the bytes of a string.
	pub fn to_bits(&self) -> Result<Vec<bool>> {
		match self {
			Literal::String(text) => Ok(unpack_bits(text.as_bytes())),
			Literal::Sequence(items) => items
				.iter()
				.map(|item| match item.as_integer()? {
					0 => Ok(false),
					1 => Ok(true),
					value => Err(LayoutError::ValueOutOfRange {
						value,
						ty: "bit".to_owned(),
					}),
				})
				.collect(),
			_ => Err(LayoutError::InvalidOperation {
				reason: "expected a bit sequence or string literal",
			}),
		}
	}
}

impl From<i64> for Literal {
	fn from(value: i64) -> Self {
		Literal::Integer(i128::from(value))
	}
}

impl From<&str> for Literal {
	fn from(value: &str) -> Self {
		Literal::String(value.to_owned())
	}
}

impl From<String> for Literal {
	fn from(value: String) -> Self {
		Literal::String(value)
	}
}

impl<T: Into<Literal>> From<Option<T>> for Literal {
	fn from(value: Option<T>) -> Self {
		value.map_or(Literal::Null, Into::into)
	}
}

impl<T: Into<Literal>> From<Vec<T>> for Literal {
	fn from(value: Vec<T>) -> Self {
		Literal::Sequence(value.into_iter().map(Into::into).collect())
	}
}

/// Named literals that struct members can be looked up from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
	fields: Vec<(Box<str>, Literal)>,
}

impl Record {
	/// Empty record.
	pub fn new() -> Self {
		Self::default()
	}

	/// Insert or replace `name`.
	pub fn set(&mut self, name: &str, literal: impl Into<Literal>) -> &mut Self {
		let literal = literal.into();
		match self.fields.iter_mut().find(|(key, _)| key.as_ref() == name) {
			Some((_, slot)) => *slot = literal,
			None => self.fields.push((name.into(), literal)),
		}
		self
	}

	/// Literal stored under `name`.
	pub fn get(&self, name: &str) -> Result<&Literal> {
		self.fields
			.iter()
			.find(|(key, _)| key.as_ref() == name)
			.map(|(_, literal)| literal)
			.ok_or_else(|| LayoutError::MissingRecordField { name: name.to_owned() })
	}
}
