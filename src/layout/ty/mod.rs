use std::fmt;

use crate::layout::{LayoutError, Result};

mod structure;

pub use structure::{Member, StructType};

/// Fixed-width integer description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntType {
	unsigned: bool,
	bits: u32,
}

impl IntType {
	/// Signed 8-bit integer.
	pub const INT8: IntType = IntType { unsigned: false, bits: 8 };
	/// Signed 16-bit integer.
	pub const INT16: IntType = IntType { unsigned: false, bits: 16 };
	/// Signed 32-bit integer.
	pub const INT32: IntType = IntType { unsigned: false, bits: 32 };
	/// Signed 64-bit integer.
	pub const INT64: IntType = IntType { unsigned: false, bits: 64 };
	/// Unsigned 8-bit integer.
	pub const UINT8: IntType = IntType { unsigned: true, bits: 8 };
	/// Unsigned 16-bit integer.
	pub const UINT16: IntType = IntType { unsigned: true, bits: 16 };
	/// Unsigned 32-bit integer.
	pub const UINT32: IntType = IntType { unsigned: true, bits: 32 };
	/// Unsigned 64-bit integer.
	pub const UINT64: IntType = IntType { unsigned: true, bits: 64 };

	/// Build an integer type, validating the bit width.
	pub fn new(unsigned: bool, bits: u32) -> Result<Self> {
		check_width(bits)?;
		Ok(Self { unsigned, bits })
	}

	/// Unsigned integer type used to encode pointers of `bits` width.
	pub fn pointer(bits: u32) -> Result<Self> {
		Self::new(true, bits)
	}

	/// Whether the type is unsigned.
	pub fn unsigned(self) -> bool {
		self.unsigned
	}

	/// Width in bits.
	pub fn bits(self) -> u32 {
		self.bits
	}

	/// Width in bytes.
	pub fn width(self) -> usize {
		(self.bits / 8) as usize
	}

	/// Smallest representable value.
	pub fn min_value(self) -> i128 {
		if self.unsigned { 0 } else { -(1_i128 << (self.bits - 1)) }
	}

	/// Largest representable value.
	pub fn max_value(self) -> i128 {
		if self.unsigned {
			(1_i128 << self.bits) - 1
		} else {
			(1_i128 << (self.bits - 1)) - 1
		}
	}

	/// Fail with `ValueOutOfRange` unless `value` fits this type.
	pub fn check(self, value: i128) -> Result<()> {
		if value < self.min_value() || value > self.max_value() {
			return Err(LayoutError::ValueOutOfRange {
				value,
				ty: self.to_string(),
			});
		}
		Ok(())
	}

	/// Append `value` little-endian at this type's width.
	///
	/// The value must already have passed [`IntType::check`].
	pub fn encode(self, value: i128, out: &mut Vec<u8>) {
		let raw = (value as u128).to_le_bytes();
		out.extend_from_slice(&raw[..self.width()]);
	}
}

impl fmt::Display for IntType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let prefix = if self.unsigned { "uint" } else { "int" };
		write!(f, "{prefix}{}_t", self.bits)
	}
}

/// Fixed-width integer subdivided into named bit ranges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitFieldType {
	name: Box<str>,
	bits: u32,
	fields: Vec<(Box<str>, u32)>,
}

impl BitFieldType {
	/// Create an empty bit field with a container of `bits` width.
	pub fn new(name: &str, bits: u32) -> Result<Self> {
		check_width(bits)?;
		Ok(Self {
			name: name.into(),
			bits,
			fields: Vec::new(),
		})
	}

	/// Append a field of `bits` width after the existing fields.
	pub fn add_field(&mut self, name: &str, bits: u32) -> Result<()> {
		if self.field_index(name).is_some() {
			return Err(LayoutError::NameCollision {
				owner: self.name.to_string(),
				name: name.to_owned(),
			});
		}
		let used = self.used_bits();
		if used + bits > self.bits {
			return Err(LayoutError::BitFieldOverflow {
				name: self.name.to_string(),
				used,
				requested: bits,
				capacity: self.bits,
			});
		}
		self.fields.push((name.into(), bits));
		Ok(())
	}

	/// Type name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Container width in bits.
	pub fn bits(&self) -> u32 {
		self.bits
	}

	/// Ordered `(field name, bit width)` pairs.
	pub fn fields(&self) -> &[(Box<str>, u32)] {
		&self.fields
	}

	/// Sum of all declared field widths.
	pub fn used_bits(&self) -> u32 {
		self.fields.iter().map(|(_, bits)| bits).sum()
	}

	/// Position of `name` in declaration order.
	pub fn field_index(&self, name: &str) -> Option<usize> {
		self.fields.iter().position(|(field, _)| field.as_ref() == name)
	}

	/// Container as an unsigned integer type.
	pub fn container(&self) -> IntType {
		IntType {
			unsigned: true,
			bits: self.bits,
		}
	}
}

/// C-style array of immediate elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleArrayType {
	/// Element type; always immediate.
	pub element: Box<Type>,
	/// Declared element count, if the array is fixed-length.
	pub fixed_len: Option<usize>,
	/// Alignment override in bytes.
	pub alignment: Option<usize>,
}

impl SimpleArrayType {
	/// Alignment override, or the element alignment; at least 1.
	pub fn byte_alignment(&self) -> usize {
		self.alignment.unwrap_or_else(|| self.element.alignment()).max(1)
	}
}

/// Array of pointers, each addressing one element stored indirectly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceArrayType {
	/// Merged type of the pointed-to elements.
	pub element: Box<Type>,
	/// Declared slot count, if the array is fixed-length.
	pub fixed_len: Option<usize>,
	/// Width of each pointer in bits.
	pub pointer_bits: u32,
}

/// Pointer-like absolute offset to indirectly stored data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceType {
	/// Pointed-to type, `Type::Null` for untyped null references.
	pub target: Box<Type>,
	/// Width of the pointer in bits.
	pub pointer_bits: u32,
}

/// Columnar bit-packed array of tuples with data-derived field widths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitFieldArrayType {
	/// Type name.
	pub name: Box<str>,
	/// Ordered field names.
	pub fields: Vec<Box<str>>,
}

/// Shape of a value: width, alignment, and inline-vs-indirect storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
	/// Absent value; target of untyped null references.
	Null,
	/// Fixed-width integer.
	Int(IntType),
	/// Single byte character.
	Char,
	/// Packed bit-field integer.
	BitField(BitFieldType),
	/// Record with laid-out members.
	Struct(StructType),
	/// Array of immediate elements.
	SimpleArray(SimpleArrayType),
	/// Array of pointers to elements.
	ReferenceArray(ReferenceArrayType),
	/// Pointer to a single value.
	Reference(ReferenceType),
	/// Self-describing bit-field array.
	BitFieldArray(BitFieldArrayType),
}

impl Type {
	/// Plain `char` array, the type behind strings and blobs.
	pub fn char_array(fixed_len: Option<usize>, alignment: Option<usize>) -> Self {
		Type::SimpleArray(SimpleArrayType {
			element: Box::new(Type::Char),
			fixed_len,
			alignment,
		})
	}

	/// Reference to `target` with a pointer of `pointer_bits` width.
	pub fn reference(target: Type, pointer_bits: u32) -> Result<Self> {
		check_width(pointer_bits)?;
		Ok(Type::Reference(ReferenceType {
			target: Box::new(target),
			pointer_bits,
		}))
	}

	/// Byte width, or `None` for kinds whose size depends on the data.
	pub fn width(&self) -> Option<usize> {
		match self {
			Type::Null => Some(0),
			Type::Int(ty) => Some(ty.width()),
			Type::Char => Some(1),
			Type::BitField(ty) => Some((ty.bits / 8) as usize),
			Type::Struct(ty) => Some(ty.size()),
			Type::SimpleArray(ty) => {
				let len = ty.fixed_len?;
				Some(len * ty.element.width()?)
			}
			Type::ReferenceArray(ty) => ty.fixed_len.map(|len| len * pointer_bytes(ty.pointer_bits)),
			Type::Reference(ty) => Some(pointer_bytes(ty.pointer_bits)),
			Type::BitFieldArray(_) => None,
		}
	}

	/// Required byte alignment of the value's start.
	pub fn alignment(&self) -> usize {
		match self {
			Type::Null | Type::Char => 1,
			Type::Int(ty) => ty.width(),
			Type::BitField(ty) => (ty.bits / 8) as usize,
			Type::Struct(ty) => ty.alignment(),
			Type::SimpleArray(ty) => ty.byte_alignment(),
			Type::ReferenceArray(ty) => pointer_bytes(ty.pointer_bits),
			Type::Reference(ty) => pointer_bytes(ty.pointer_bits),
			Type::BitFieldArray(_) => 2,
		}
	}

	/// Whether values of this type are stored inline by default.
	pub fn is_immediate(&self) -> bool {
		match self {
			Type::Null | Type::Struct(_) | Type::BitFieldArray(_) => false,
			Type::Int(_) | Type::Char | Type::BitField(_) | Type::Reference(_) => true,
			Type::SimpleArray(ty) => ty.fixed_len.is_some(),
			Type::ReferenceArray(ty) => ty.fixed_len.is_some(),
		}
	}

	/// Name of a nominal type (struct, bit field, bit-field array).
	pub fn type_name(&self) -> Option<&str> {
		match self {
			Type::Struct(ty) => Some(ty.name()),
			Type::BitField(ty) => Some(ty.name()),
			Type::BitFieldArray(ty) => Some(&ty.name),
			_ => None,
		}
	}

	/// Unify two types into a common element type.
	pub fn merge(&self, other: &Type) -> Result<Type> {
		merge(self, other)
	}
}

impl fmt::Display for Type {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Type::Null => write!(f, "void"),
			Type::Int(ty) => write!(f, "{ty}"),
			Type::Char => write!(f, "char"),
			Type::BitField(ty) => write!(f, "{}", ty.name),
			Type::Struct(ty) => write!(f, "struct {}", ty.name()),
			Type::SimpleArray(ty) => match ty.fixed_len {
				Some(len) => write!(f, "{}[{len}]", ty.element),
				None => write!(f, "{}[]", ty.element),
			},
			Type::ReferenceArray(ty) => match ty.fixed_len {
				Some(len) => write!(f, "ref{}<{}>[{len}]", ty.pointer_bits, ty.element),
				None => write!(f, "ref{}<{}>[]", ty.pointer_bits, ty.element),
			},
			Type::Reference(ty) => write!(f, "ref{}<{}>", ty.pointer_bits, ty.target),
			Type::BitFieldArray(ty) => write!(f, "{}", ty.name),
		}
	}
}

/// Unify two types for a heterogeneous collection.
pub fn merge(left: &Type, right: &Type) -> Result<Type> {
	match (left, right) {
		(Type::Reference(_), _) | (_, Type::Reference(_)) => Err(mismatch(left, right)),
		(Type::Null, other) | (other, Type::Null) => Ok(other.clone()),
		(Type::Int(a), Type::Int(b)) => Ok(Type::Int(IntType {
			unsigned: a.unsigned && b.unsigned,
			bits: a.bits.max(b.bits),
		})),
		(Type::Char, Type::Char) => Ok(Type::Char),
		(Type::Struct(a), Type::Struct(b)) => {
			let same_members = a.field_names().eq(b.field_names());
			if a.name() == b.name() && same_members {
				Ok(left.clone())
			} else {
				Err(mismatch(left, right))
			}
		}
		(Type::BitField(a), Type::BitField(b)) => {
			if a == b {
				Ok(left.clone())
			} else {
				Err(mismatch(left, right))
			}
		}
		(Type::SimpleArray(a), Type::SimpleArray(b)) => Ok(Type::SimpleArray(SimpleArrayType {
			element: Box::new(merge(&a.element, &b.element)?),
			fixed_len: if a.fixed_len == b.fixed_len { a.fixed_len } else { None },
			alignment: a.alignment.max(b.alignment),
		})),
		(Type::ReferenceArray(a), Type::ReferenceArray(b)) => {
			if a.pointer_bits != b.pointer_bits {
				return Err(mismatch(left, right));
			}
			Ok(Type::ReferenceArray(ReferenceArrayType {
				element: Box::new(merge(&a.element, &b.element)?),
				fixed_len: if a.fixed_len == b.fixed_len { a.fixed_len } else { None },
				pointer_bits: a.pointer_bits,
			}))
		}
		(Type::BitFieldArray(a), Type::BitFieldArray(b)) => {
			if a == b {
				Ok(left.clone())
			} else {
				Err(mismatch(left, right))
			}
		}
		_ => Err(mismatch(left, right)),
	}
}

/// Round `pos` up to the next multiple of `alignment` (treating 0 as 1).
pub(crate) fn align_up(pos: usize, alignment: usize) -> usize {
	pos.next_multiple_of(alignment.max(1))
}

pub(crate) fn pointer_bytes(bits: u32) -> usize {
	(bits / 8) as usize
}

pub(crate) fn check_width(bits: u32) -> Result<()> {
	match bits {
		8 | 16 | 32 | 64 => Ok(()),
		_ => Err(LayoutError::UnsupportedWidth { bits }),
	}
}

fn mismatch(left: &Type, right: &Type) -> LayoutError {
	LayoutError::TypeMismatch {
		left: left.to_string(),
		right: right.to_string(),
	}
}
