//! Two-part packing of value trees into one contiguous buffer.
//!
//! Every value packs to inline bytes (stored where the value sits) and
//! indirect bytes (stored after all inline bytes of the enclosing top-level
//! value). A write cursor holding the absolute buffer position of the next
//! free indirect byte is threaded through siblings and nested values, so
//! pointers are absolute and no relocation pass is needed.

use crate::layout::ty::IntType;
use crate::layout::value::{ReferenceArrayValue, ReferenceValue, SimpleArrayValue, StructValue};
use crate::layout::{LayoutError, Result, Value};

/// Inline and indirect bytes produced by packing one value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Packed {
	/// Bytes stored at the value's own position.
	pub inline: Vec<u8>,
	/// Bytes placed at the write cursor passed to the pack call.
	pub indirect: Vec<u8>,
}

impl Packed {
	fn inline(bytes: Vec<u8>) -> Self {
		Self {
			inline: bytes,
			indirect: Vec::new(),
		}
	}

	/// Concatenate inline and indirect bytes.
	pub fn into_bytes(self) -> Vec<u8> {
		let Packed { mut inline, indirect } = self;
		inline.extend_from_slice(&indirect);
		inline
	}

	fn append(&mut self, other: Packed) {
		self.inline.extend_from_slice(&other.inline);
		self.indirect.extend_from_slice(&other.indirect);
	}

	fn zero_fill_inline(&mut self, size: usize) {
		if self.inline.len() < size {
			self.inline.resize(size, 0);
		}
	}
}

/// Pack `value` as the root of a buffer.
///
/// Indirect data starts right after the root's inline bytes. A bare reference
/// has no containing value to supply a cursor and fails with
/// `InvalidOperation`.
pub fn pack(value: &Value) -> Result<Vec<u8>> {
	if let Value::Reference(_) = value {
		return Err(LayoutError::InvalidOperation {
			reason: "cannot pack a reference outside a containing struct or array",
		});
	}
	let bytes = value.pack_at(value.immediate_size())?.into_bytes();
	tracing::debug!(len = bytes.len(), ty = %value.ty(), "packed value");
	Ok(bytes)
}

impl Value {
	/// Pack with indirect data placed at absolute buffer position `cursor`.
	pub fn pack_at(&self, cursor: usize) -> Result<Packed> {
		match self {
			Value::Null => Ok(Packed::default()),
			Value::Int(value) => Ok(Packed::inline(value.to_le_bytes())),
			Value::Char(byte) => Ok(Packed::inline(vec![*byte])),
			Value::Padding => Ok(Packed::inline(vec![0])),
			Value::Reference(value) => value.pack_at(cursor),
			Value::SimpleArray(value) => value.pack_at(cursor),
			Value::String(value) => value.array().pack_at(cursor),
			Value::Blob(value) => value.array().pack_at(cursor),
			Value::ReferenceArray(value) => value.pack_at(cursor),
			Value::Struct(value) => value.pack_at(cursor),
			Value::BitField(value) => Ok(Packed::inline(value.to_le_bytes())),
			Value::BitFieldArray(value) => Ok(Packed::inline(value.encode()?)),
		}
	}
}

impl ReferenceValue {
	/// Pack the pointer inline and the aligned target as indirect bytes.
	pub fn pack_at(&self, cursor: usize) -> Result<Packed> {
		let pointer = IntType::pointer(self.pointer_bits())?;
		let mut inline = Vec::with_capacity(pointer.width());
		if self.is_null() {
			pointer.encode(0, &mut inline);
			return Ok(Packed::inline(inline));
		}

		let alignment = self.target_alignment().max(1);
		let padding = (alignment - cursor % alignment) % alignment;
		let start = cursor + padding;
		pointer.check(start as i128)?;
		pointer.encode(start as i128, &mut inline);

		let target = self.target();
		let packed = target.pack_at(start + target.immediate_size())?;
		let mut indirect = vec![0_u8; padding];
		indirect.extend_from_slice(&packed.inline);
		indirect.extend_from_slice(&packed.indirect);
		tracing::trace!(start, padding, len = indirect.len(), "reference materialized");

		Ok(Packed { inline, indirect })
	}
}

impl SimpleArrayValue {
	/// Pack elements back to back and zero-fill unused fixed slots.
	pub fn pack_at(&self, cursor: usize) -> Result<Packed> {
		let mut out = pack_sequence(self.elements(), cursor, Value::pack_at)?;
		out.zero_fill_inline(self.immediate_size());
		Ok(out)
	}
}

impl ReferenceArrayValue {
	/// Pack pointers back to back; unused fixed slots become null pointers.
	pub fn pack_at(&self, cursor: usize) -> Result<Packed> {
		let mut out = pack_sequence(self.elements(), cursor, ReferenceValue::pack_at)?;
		out.zero_fill_inline(self.immediate_size());
		Ok(out)
	}
}

impl StructValue {
	/// Pack members in layout order.
	///
	/// Member `n`'s indirect data lands after all indirect data of the members
	/// before it.
	pub fn pack_at(&self, cursor: usize) -> Result<Packed> {
		let members = self.ty().members();
		let values = self.values();
		assert_eq!(members.len(), values.len(), "struct {} value list out of lock-step with its type", self.ty().name());

		let mut cursor = cursor;
		let mut out = Packed::default();
		for (member, value) in members.iter().zip(values) {
			debug_assert_eq!(out.inline.len(), member.offset, "member {} packed at wrong offset", member.name);
			let packed = value.pack_at(cursor)?;
			cursor += packed.indirect.len();
			out.append(packed);
		}
		out.zero_fill_inline(self.ty().size());
		Ok(out)
	}
}

fn pack_sequence<T>(items: &[T], cursor: usize, pack_item: impl Fn(&T, usize) -> Result<Packed>) -> Result<Packed> {
	let mut cursor = cursor;
	let mut out = Packed::default();
	for item in items {
		let packed = pack_item(item, cursor)?;
		cursor += packed.indirect.len();
		out.append(packed);
	}
	Ok(out)
}
