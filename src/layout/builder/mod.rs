use crate::layout::constant::Constant;
use crate::layout::ty::{IntType, StructType, Type};
use crate::layout::value::{BlobValue, ReferenceArrayValue, StringValue, StructValue};
use crate::layout::{BuilderOptions, LayoutError, Literal, Record, Result, Value};

/// Storage options for [`StructBuilder::add_string`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StringOptions {
	/// Store the string in a fixed number of bytes, zero-padded.
	pub fixed_width: Option<usize>,
	/// Drop the zero terminator.
	pub omit_terminator: bool,
	/// Pointer width override; builder default when `None`.
	pub pointer_bits: Option<u32>,
}

/// Storage options for [`StructBuilder::add_blob`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlobOptions {
	/// Byte alignment override; builder default when `None`.
	pub alignment: Option<usize>,
	/// Pointer width override; builder default when `None`.
	pub pointer_bits: Option<u32>,
}

/// Incremental builder of a struct type and its paired member values.
///
/// Every member added through the builder keeps the type's slot list and the
/// value list in lock-step, inserting padding values wherever the type
/// inserts pad bytes.
#[derive(Debug, Clone)]
pub struct StructBuilder {
	ty: StructType,
	values: Vec<Value>,
	options: BuilderOptions,
}

impl StructBuilder {
	/// Builder for struct `name` with default options.
	pub fn new(name: &str) -> Self {
		Self::with_options(name, BuilderOptions::default())
	}

	/// Builder for struct `name` with explicit options.
	pub fn with_options(name: &str, options: BuilderOptions) -> Self {
		Self {
			ty: StructType::new(name),
			values: Vec::new(),
			options,
		}
	}

	/// Add `value` inline if its type is immediate, behind a reference otherwise.
	pub fn add(&mut self, name: &str, value: Value) -> Result<&mut Self> {
		if value.is_immediate() {
			self.add_immediate(name, value)
		} else {
			self.add_reference(name, value, self.options.pointer_bits)
		}
	}

	/// Add `value` inline regardless of its default storage.
	pub fn add_immediate(&mut self, name: &str, value: Value) -> Result<&mut Self> {
		let pad = self.ty.add_member(name, value.ty(), value.immediate_size())?;
		self.values.extend(std::iter::repeat_n(Value::Padding, pad));
		self.values.push(value);
		Ok(self)
	}

	/// Add a reference to `value`; [`Value::Null`] adds a null reference.
	pub fn add_reference(&mut self, name: &str, value: Value, pointer_bits: u32) -> Result<&mut Self> {
		let reference = Value::reference(value, pointer_bits)?;
		self.add_immediate(name, reference)
	}

	/// Add a reference with an 8-bit pointer.
	pub fn add_ref8(&mut self, name: &str, value: Value) -> Result<&mut Self> {
		self.add_reference(name, value, 8)
	}

	/// Add a reference with a 16-bit pointer.
	pub fn add_ref16(&mut self, name: &str, value: Value) -> Result<&mut Self> {
		self.add_reference(name, value, 16)
	}

	/// Add a reference with a 32-bit pointer.
	pub fn add_ref32(&mut self, name: &str, value: Value) -> Result<&mut Self> {
		self.add_reference(name, value, 32)
	}

	/// Add a null reference declared as pointing to `target_type`.
	pub fn add_null_reference(&mut self, name: &str, target_type: Type, pointer_bits: u32) -> Result<&mut Self> {
		let reference = Value::null_reference(target_type, pointer_bits)?;
		self.add_immediate(name, reference)
	}

	/// Convert `literal` with [`Literal::to_value`] and [`StructBuilder::add`] it.
	pub fn add_literal(&mut self, name: &str, literal: &Literal) -> Result<&mut Self> {
		let value = literal.to_value_with(self.options.pointer_bits)?;
		self.add(name, value)
	}

	/// Add the literal stored under `name` in `record`.
	pub fn add_from_record(&mut self, name: &str, record: &Record) -> Result<&mut Self> {
		let literal = record.get(name)?;
		self.add_literal(name, literal)
	}

	/// Add an integer of type `ty`.
	pub fn add_int(&mut self, name: &str, ty: IntType, value: i128) -> Result<&mut Self> {
		let value = Value::int(ty, value)?;
		self.add(name, value)
	}

	/// Add the integer stored under `name` in `record` as type `ty`.
	pub fn add_int_from_record(&mut self, name: &str, ty: IntType, record: &Record) -> Result<&mut Self> {
		let value = record.get(name)?.as_integer()?;
		self.add_int(name, ty, value)
	}

	/// Add a signed 8-bit integer.
	pub fn add_int8(&mut self, name: &str, value: impl Into<i128>) -> Result<&mut Self> {
		self.add_int(name, IntType::INT8, value.into())
	}

	/// Add a signed 16-bit integer.
	pub fn add_int16(&mut self, name: &str, value: impl Into<i128>) -> Result<&mut Self> {
		self.add_int(name, IntType::INT16, value.into())
	}

	/// Add a signed 32-bit integer.
	pub fn add_int32(&mut self, name: &str, value: impl Into<i128>) -> Result<&mut Self> {
		self.add_int(name, IntType::INT32, value.into())
	}

	/// Add a signed 64-bit integer.
	pub fn add_int64(&mut self, name: &str, value: impl Into<i128>) -> Result<&mut Self> {
		self.add_int(name, IntType::INT64, value.into())
	}

	/// Add an unsigned 8-bit integer.
	pub fn add_uint8(&mut self, name: &str, value: impl Into<i128>) -> Result<&mut Self> {
		self.add_int(name, IntType::UINT8, value.into())
	}

	/// Add an unsigned 16-bit integer.
	pub fn add_uint16(&mut self, name: &str, value: impl Into<i128>) -> Result<&mut Self> {
		self.add_int(name, IntType::UINT16, value.into())
	}

	/// Add an unsigned 32-bit integer.
	pub fn add_uint32(&mut self, name: &str, value: impl Into<i128>) -> Result<&mut Self> {
		self.add_int(name, IntType::UINT32, value.into())
	}

	/// Add an unsigned 64-bit integer.
	pub fn add_uint64(&mut self, name: &str, value: impl Into<i128>) -> Result<&mut Self> {
		self.add_int(name, IntType::UINT64, value.into())
	}

	/// Add an ASCII character.
	pub fn add_char(&mut self, name: &str, ch: char) -> Result<&mut Self> {
		let value = Value::char(ch)?;
		self.add(name, value)
	}

	/// Add a reference to a string, or a typed null reference for `None`.
	pub fn add_string(&mut self, name: &str, text: Option<&str>, options: StringOptions) -> Result<&mut Self> {
		let pointer_bits = options.pointer_bits.unwrap_or(self.options.pointer_bits);
		let Some(text) = text else {
			if options.fixed_width.is_some() {
				return Err(LayoutError::InvalidOperation {
					reason: "cannot add a fixed width string as a null reference",
				});
			}
			return self.add_null_reference(name, Type::char_array(None, None), pointer_bits);
		};
		let value = StringValue::new(text, options.fixed_width, options.omit_terminator)?;
		self.add_reference(name, value.into(), pointer_bits)
	}

	/// Add the string (or null) stored under `name` in `record`.
	pub fn add_string_from_record(&mut self, name: &str, options: StringOptions, record: &Record) -> Result<&mut Self> {
		let text = record.get(name)?.as_optional_str()?;
		self.add_string(name, text, options)
	}

	/// Add a reference to a blob packed from `bits`.
	pub fn add_blob(&mut self, name: &str, bits: Vec<bool>, options: BlobOptions) -> Result<&mut Self> {
		let alignment = options.alignment.unwrap_or(self.options.blob_alignment);
		let pointer_bits = options.pointer_bits.unwrap_or(self.options.pointer_bits);
		let value = BlobValue::new(bits, None, alignment)?;
		self.add_reference(name, value.into(), pointer_bits)
	}

	/// Add the blob stored under `name` in `record` (0/1 sequence or string).
	pub fn add_blob_from_record(&mut self, name: &str, options: BlobOptions, record: &Record) -> Result<&mut Self> {
		let bits = record.get(name)?.to_bits()?;
		self.add_blob(name, bits, options)
	}

	/// Add an array with a unified element type, see [`Value::array`].
	///
	/// A reference array gets the builder's pointer width.
	pub fn add_array(&mut self, name: &str, values: Vec<Value>, fixed_len: Option<usize>) -> Result<&mut Self> {
		self.add_array_with(name, values, fixed_len, self.options.pointer_bits)
	}

	/// [`StructBuilder::add_array`] with an explicit element pointer width.
	pub fn add_array_with(&mut self, name: &str, values: Vec<Value>, fixed_len: Option<usize>, pointer_bits: u32) -> Result<&mut Self> {
		let value = Value::array_with(values, fixed_len, pointer_bits)?;
		self.add(name, value)
	}

	/// Add an array of references, one per element.
	pub fn add_reference_array(&mut self, name: &str, values: Vec<Value>, fixed_len: Option<usize>, pointer_bits: u32) -> Result<&mut Self> {
		let value = Value::ReferenceArray(ReferenceArrayValue::new(values, fixed_len, pointer_bits)?);
		self.add(name, value)
	}

	/// Attach a named constant to the struct type.
	pub fn add_constant(&mut self, name: &str, constant: Constant) -> Result<&mut Self> {
		self.ty.add_constant(name, constant)?;
		Ok(self)
	}

	/// Attach a signed 32-bit integer constant.
	pub fn add_int32_constant(&mut self, name: &str, value: impl Into<i128>) -> Result<&mut Self> {
		self.add_constant(name, Constant::int(IntType::INT32, value.into())?)
	}

	/// Attach a character constant.
	pub fn add_char_constant(&mut self, name: &str, ch: char) -> Result<&mut Self> {
		self.add_constant(name, Constant::char(ch)?)
	}

	/// Attach a string constant.
	pub fn add_string_constant(&mut self, name: &str, text: &str) -> Result<&mut Self> {
		self.add_constant(name, Constant::String(text.into()))
	}

	/// Finalize with the configured default alignment.
	pub fn finalize(&mut self) -> Result<&mut Self> {
		self.finalize_to(self.options.finalize_alignment)
	}

	/// Pad the struct to a multiple of `byte_alignment` and freeze its layout.
	pub fn finalize_to(&mut self, byte_alignment: usize) -> Result<&mut Self> {
		let pad = self.ty.finalize(byte_alignment)?;
		self.values.extend(std::iter::repeat_n(Value::Padding, pad));
		Ok(self)
	}

	/// Struct type built so far.
	pub fn struct_type(&self) -> &StructType {
		&self.ty
	}

	/// Current inline size in bytes.
	pub fn immediate_size(&self) -> usize {
		self.ty.size()
	}

	/// Options this builder applies.
	pub fn options(&self) -> &BuilderOptions {
		&self.options
	}

	/// Freeze into a struct value.
	pub fn build(self) -> StructValue {
		StructValue::from_parts(self.ty, self.values)
	}

	/// Freeze into a [`Value::Struct`].
	pub fn into_value(self) -> Value {
		Value::Struct(self.build())
	}
}

#[cfg(test)]
mod tests;
