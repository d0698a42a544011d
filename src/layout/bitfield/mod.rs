//! Fixed bit fields and the self-describing bit-field-array codec.
//!
//! A bit-field array of `F` fields and `N` entries encodes as `F + 2`
//! little-endian `u16` header words followed directly by the entry bits:
//!
//! - word 0: bits per entry (`Σw`),
//! - word `1 + i` for `i in 0..=F`: `headerBits + Σ_{j<i} w_j`, the bit
//!   position of field `i` of the first entry measured from the header start
//!   (the last word marks the end of that entry).
//!
//! Each field width `w` is the largest bit length seen for that field across
//! all entries. Entries are stored back to back, fields in declaration order,
//! each packed least-significant bit first.

use crate::layout::bits::{pack_bits, push_bits_lsb, required_bits};
use crate::layout::ty::{BitFieldArrayType, BitFieldType};
use crate::layout::{LayoutError, Result};

/// Exclusive upper bound of integer values stored in a bit-field array.
pub const MAX_ARRAY_FIELD_VALUE: u64 = 1 << 31;

/// Integer subdivided into named fields, packed LSB-first in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitFieldValue {
	ty: BitFieldType,
	values: Vec<u64>,
}

impl BitFieldValue {
	/// Empty bit field with a container of `bits` width (8, 16, 32 or 64).
	pub fn new(name: &str, bits: u32) -> Result<Self> {
		Ok(Self {
			ty: BitFieldType::new(name, bits)?,
			values: Vec::new(),
		})
	}

	/// Append field `name` of `bits` width holding `value`.
	pub fn add(&mut self, name: &str, value: u64, bits: u32) -> Result<&mut Self> {
		let fits = bits >= u64::BITS || value < (1_u64 << bits);
		if !fits {
			return Err(LayoutError::ValueOutOfRange {
				value: i128::from(value),
				ty: format!("{bits}-bit field {name}"),
			});
		}
		self.ty.add_field(name, bits)?;
		self.values.push(value);
		Ok(self)
	}

	/// Append a one-bit flag.
	pub fn add_flag(&mut self, name: &str, set: bool) -> Result<&mut Self> {
		self.add(name, u64::from(set), 1)
	}

	/// Bit-field type.
	pub fn ty(&self) -> &BitFieldType {
		&self.ty
	}

	/// Field values in declaration order.
	pub fn values(&self) -> &[u64] {
		&self.values
	}

	/// Value of field `name`.
	pub fn get(&self, name: &str) -> Option<u64> {
		self.ty.field_index(name).map(|idx| self.values[idx])
	}

	/// Container value `Σ value_i << shift_i`.
	pub fn packed_value(&self) -> u64 {
		let mut shift = 0_u32;
		let mut out = 0_u64;
		for ((_, bits), value) in self.ty.fields().iter().zip(&self.values) {
			if shift < u64::BITS {
				out |= value << shift;
			}
			shift += bits;
		}
		out
	}

	/// Container value as little-endian bytes.
	pub fn to_le_bytes(&self) -> Vec<u8> {
		let width = self.ty.container().width();
		self.packed_value().to_le_bytes()[..width].to_vec()
	}
}

/// One field of a bit-field-array entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BitFieldArrayItem {
	/// Integer in `[0, 2^31)`, stored in its field's width.
	Int(u32),
	/// Bits copied verbatim and zero-padded to the field width.
	Bits(Vec<bool>),
}

impl BitFieldArrayItem {
	/// Integer item, range-checked.
	pub fn int(value: i128) -> Result<Self> {
		if value < 0 || value >= i128::from(MAX_ARRAY_FIELD_VALUE) {
			return Err(LayoutError::ValueOutOfRange {
				value,
				ty: "bit field array entry".to_owned(),
			});
		}
		Ok(BitFieldArrayItem::Int(value as u32))
	}

	/// Number of bits this item needs.
	pub fn bit_len(&self) -> u32 {
		match self {
			BitFieldArrayItem::Int(value) => required_bits(u64::from(*value)),
			BitFieldArrayItem::Bits(bits) => bits.len() as u32,
		}
	}

	fn check(&self) -> Result<()> {
		match self {
			BitFieldArrayItem::Int(value) if u64::from(*value) >= MAX_ARRAY_FIELD_VALUE => Err(LayoutError::ValueOutOfRange {
				value: i128::from(*value),
				ty: "bit field array entry".to_owned(),
			}),
			_ => Ok(()),
		}
	}
}

/// Repeated tuples whose per-field widths are derived from the data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitFieldArrayValue {
	ty: BitFieldArrayType,
	entries: Vec<Vec<BitFieldArrayItem>>,
}

impl BitFieldArrayValue {
	/// Empty array over the given field names.
	pub fn new(name: &str, fields: &[&str]) -> Result<Self> {
		let mut names: Vec<Box<str>> = Vec::with_capacity(fields.len());
		for field in fields {
			if names.iter().any(|existing| existing.as_ref() == *field) {
				return Err(LayoutError::NameCollision {
					owner: name.to_owned(),
					name: (*field).to_owned(),
				});
			}
			names.push((*field).into());
		}
		Ok(Self {
			ty: BitFieldArrayType {
				name: name.into(),
				fields: names,
			},
			entries: Vec::new(),
		})
	}

	/// Append one entry with items in field declaration order.
	pub fn add_entry(&mut self, items: Vec<BitFieldArrayItem>) -> Result<&mut Self> {
		if items.len() != self.ty.fields.len() {
			return Err(LayoutError::FieldCountMismatch {
				name: self.ty.name.to_string(),
				expected: self.ty.fields.len(),
				got: items.len(),
			});
		}
		for item in &items {
			item.check()?;
		}
		self.entries.push(items);
		Ok(self)
	}

	/// Append one entry given as `(field name, item)` pairs in any order.
	pub fn add_record(&mut self, record: &[(&str, BitFieldArrayItem)]) -> Result<&mut Self> {
		if record.len() != self.ty.fields.len() {
			return Err(LayoutError::FieldCountMismatch {
				name: self.ty.name.to_string(),
				expected: self.ty.fields.len(),
				got: record.len(),
			});
		}
		let items = self
			.ty
			.fields
			.iter()
			.map(|field| {
				record
					.iter()
					.find(|(name, _)| *name == field.as_ref())
					.map(|(_, item)| item.clone())
					.ok_or_else(|| LayoutError::MissingRecordField { name: field.to_string() })
			})
			.collect::<Result<Vec<_>>>()?;
		self.add_entry(items)
	}

	/// Append every entry of `entries`.
	pub fn extend(&mut self, entries: impl IntoIterator<Item = Vec<BitFieldArrayItem>>) -> Result<&mut Self> {
		for entry in entries {
			self.add_entry(entry)?;
		}
		Ok(self)
	}

	/// Bit-field-array type.
	pub fn ty(&self) -> &BitFieldArrayType {
		&self.ty
	}

	/// Entries in insertion order.
	pub fn entries(&self) -> &[Vec<BitFieldArrayItem>] {
		&self.entries
	}

	/// Number of entries.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Whether no entries were added.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Item of `field` in entry `index`.
	pub fn get(&self, field: &str, index: usize) -> Option<&BitFieldArrayItem> {
		let column = self.ty.fields.iter().position(|name| name.as_ref() == field)?;
		self.entries.get(index).map(|entry| &entry[column])
	}

	/// Width of each field: the largest bit length across all entries.
	pub fn field_widths(&self) -> Vec<u32> {
		(0..self.ty.fields.len())
			.map(|column| self.entries.iter().map(|entry| entry[column].bit_len()).max().unwrap_or(0))
			.collect()
	}

	/// Header words: bits per entry, then each field's start bit and the end bit.
	pub fn header(&self) -> Result<Vec<u16>> {
		let widths = self.field_widths();
		let header_bits = (widths.len() + 2) * 16;
		let total: usize = widths.iter().map(|width| *width as usize).sum();

		let mut words = Vec::with_capacity(widths.len() + 2);
		words.push(self.header_word(total)?);
		let mut offset = header_bits;
		words.push(self.header_word(offset)?);
		for width in &widths {
			offset += *width as usize;
			words.push(self.header_word(offset)?);
		}
		Ok(words)
	}

	/// Inline byte size: header plus the entry bits rounded up to a byte.
	pub fn immediate_size(&self) -> usize {
		let widths = self.field_widths();
		let total: usize = widths.iter().map(|width| *width as usize).sum();
		(widths.len() + 2) * 2 + (total * self.entries.len()).div_ceil(8)
	}

	/// Encode header and entry bits.
	pub fn encode(&self) -> Result<Vec<u8>> {
		let widths = self.field_widths();
		let mut out = Vec::with_capacity(self.immediate_size());
		for word in self.header()? {
			out.extend_from_slice(&word.to_le_bytes());
		}

		let entry_bits: usize = widths.iter().map(|width| *width as usize).sum();
		let mut bits = Vec::with_capacity(entry_bits * self.entries.len());
		for entry in &self.entries {
			for (item, width) in entry.iter().zip(&widths) {
				match item {
					BitFieldArrayItem::Int(value) => push_bits_lsb(u64::from(*value), *width, &mut bits),
					BitFieldArrayItem::Bits(blob) => {
						bits.extend_from_slice(blob);
						bits.resize(bits.len() + (*width as usize - blob.len()), false);
					}
				}
			}
		}
		debug_assert_eq!(bits.len(), entry_bits * self.entries.len());
		out.extend_from_slice(&pack_bits(&bits));
		Ok(out)
	}

	fn header_word(&self, word: usize) -> Result<u16> {
		u16::try_from(word).map_err(|_| LayoutError::HeaderOverflow {
			name: self.ty.name.to_string(),
			word,
		})
	}
}

#[cfg(test)]
mod tests;
