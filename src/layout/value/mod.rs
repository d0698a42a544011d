use crate::layout::bits::{pack_bits, unpack_bits};
use crate::layout::ty::{IntType, ReferenceArrayType, ReferenceType, SimpleArrayType, StructType, Type, check_width, merge, pointer_bytes};
use crate::layout::{BitFieldArrayValue, BitFieldValue, LayoutError, Result};

/// Default alignment of blob data in bytes.
pub const DEFAULT_BLOB_ALIGNMENT: usize = 4;

/// Default pointer width of references created from literals.
pub const DEFAULT_POINTER_BITS: u32 = 32;

/// Immutable node of a value tree, bound to exactly one [`Type`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
	/// Absent value; packs to nothing.
	Null,
	/// Integer of a declared width and signedness.
	Int(IntValue),
	/// Single byte character.
	Char(u8),
	/// Zero byte inserted for alignment.
	Padding,
	/// Pointer to another value.
	Reference(ReferenceValue),
	/// Array of immediate elements.
	SimpleArray(SimpleArrayValue),
	/// Character array built from text.
	String(StringValue),
	/// Character array built from a bit sequence.
	Blob(BlobValue),
	/// Array of pointers to individually placed elements.
	ReferenceArray(ReferenceArrayValue),
	/// Record built by [`crate::layout::StructBuilder`].
	Struct(StructValue),
	/// Fixed-width packed bit field.
	BitField(BitFieldValue),
	/// Self-describing variable-width bit-field array.
	BitFieldArray(BitFieldArrayValue),
}

/// Range-checked integer value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntValue {
	ty: IntType,
	value: i128,
}

impl IntValue {
	/// Build an integer, failing with `ValueOutOfRange` if it does not fit `ty`.
	pub fn new(ty: IntType, value: i128) -> Result<Self> {
		ty.check(value)?;
		Ok(Self { ty, value })
	}

	/// Integer type.
	pub fn ty(&self) -> IntType {
		self.ty
	}

	/// Integer value.
	pub fn value(&self) -> i128 {
		self.value
	}

	/// Little-endian encoding at the type's width.
	pub fn to_le_bytes(&self) -> Vec<u8> {
		let mut out = Vec::with_capacity(self.ty.width());
		self.ty.encode(self.value, &mut out);
		out
	}
}

/// Pointer to a target value, or a null pointer when the target is [`Value::Null`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceValue {
	target: Box<Value>,
	// Declared type of a null reference; non-null references type from `target`.
	null_type: Option<Type>,
	pointer_bits: u32,
}

impl ReferenceValue {
	/// Build a reference.
	///
	/// `target_type` may only be given when `target` is absent; it types a
	/// null reference for declaration output.
	pub fn new(target: Option<Value>, pointer_bits: u32, target_type: Option<Type>) -> Result<Self> {
		check_width(pointer_bits)?;
		let (target, null_type) = match (target, target_type) {
			(Some(_), Some(_)) => {
				return Err(LayoutError::InvalidOperation {
					reason: "cannot set a target type for a non-null reference",
				});
			}
			(Some(value), None) => (value, None),
			(None, ty) => (Value::Null, ty),
		};
		Ok(Self {
			target: Box::new(target),
			null_type,
			pointer_bits,
		})
	}

	/// Referenced value, [`Value::Null`] for null references.
	pub fn target(&self) -> &Value {
		&self.target
	}

	/// Declared target type: the target's type, or the null reference's declared type.
	pub fn target_type(&self) -> Type {
		match &self.null_type {
			Some(ty) => ty.clone(),
			None => self.target.ty(),
		}
	}

	/// Byte alignment of the target's indirect data.
	pub fn target_alignment(&self) -> usize {
		match &self.null_type {
			Some(ty) => ty.alignment(),
			None => self.target.alignment(),
		}
	}

	/// Pointer width in bits.
	pub fn pointer_bits(&self) -> u32 {
		self.pointer_bits
	}

	/// Whether this reference packs as a null pointer.
	pub fn is_null(&self) -> bool {
		matches!(*self.target, Value::Null)
	}

	/// Reference type of this value.
	pub fn ty(&self) -> ReferenceType {
		ReferenceType {
			target: Box::new(self.target_type()),
			pointer_bits: self.pointer_bits,
		}
	}
}

/// Array of immediate elements, each stored at the element type's width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleArrayValue {
	ty: SimpleArrayType,
	elements: Vec<Value>,
}

impl SimpleArrayValue {
	/// Build an array of `element` typed values.
	///
	/// Integer elements are re-encoded at the element width; other elements
	/// must merge with `element` and share its width.
	pub fn new(element: Type, values: Vec<Value>, fixed_len: Option<usize>, alignment: Option<usize>) -> Result<Self> {
		if matches!(element, Type::Reference(_)) {
			return Err(LayoutError::InvalidOperation {
				reason: "simple arrays cannot store references",
			});
		}
		let Some(width) = element.width() else {
			return Err(LayoutError::InvalidOperation {
				reason: "simple array elements need a fixed width",
			});
		};
		check_fixed_len(values.len(), fixed_len)?;

		let elements = values
			.into_iter()
			.map(|value| coerce_element(&element, width, value))
			.collect::<Result<Vec<_>>>()?;

		Ok(Self {
			ty: SimpleArrayType {
				element: Box::new(element),
				fixed_len,
				alignment,
			},
			elements,
		})
	}

	/// Array type.
	pub fn ty(&self) -> &SimpleArrayType {
		&self.ty
	}

	/// Elements in declaration order, excluding zero-filled trailing slots.
	pub fn elements(&self) -> &[Value] {
		&self.elements
	}

	/// Inline byte size, counting zero-filled slots of fixed arrays.
	pub fn immediate_size(&self) -> usize {
		let width = self.ty.element.width().unwrap_or(0);
		width * self.ty.fixed_len.unwrap_or(self.elements.len())
	}
}

/// Text stored as a `char` array, terminator included unless omitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringValue {
	text: Box<str>,
	array: SimpleArrayValue,
}

impl StringValue {
	/// Encode `text` as UTF-8 bytes plus an optional zero terminator.
	pub fn new(text: &str, fixed_len: Option<usize>, omit_terminator: bool) -> Result<Self> {
		let mut bytes = text.as_bytes().to_vec();
		if !omit_terminator {
			bytes.push(0);
		}
		let chars = bytes.into_iter().map(Value::Char).collect();
		Ok(Self {
			text: text.into(),
			array: SimpleArrayValue::new(Type::Char, chars, fixed_len, None)?,
		})
	}

	/// Source text.
	pub fn text(&self) -> &str {
		&self.text
	}

	/// Underlying character array.
	pub fn array(&self) -> &SimpleArrayValue {
		&self.array
	}
}

/// Bit sequence packed least-significant-bit first into a `char` array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobValue {
	bits: Vec<bool>,
	array: SimpleArrayValue,
}

impl BlobValue {
	/// Pack `bits`; bit `i` of byte `n` is `bits[8 * n + i]`.
	pub fn new(bits: Vec<bool>, fixed_len: Option<usize>, alignment: usize) -> Result<Self> {
		let chars = pack_bits(&bits).into_iter().map(Value::Char).collect();
		Ok(Self {
			array: SimpleArrayValue::new(Type::Char, chars, fixed_len, Some(alignment))?,
			bits,
		})
	}

	/// Blob over the bits of `bytes`, each byte expanded least-significant first.
	pub fn from_bytes(bytes: &[u8], fixed_len: Option<usize>, alignment: usize) -> Result<Self> {
		Self::new(unpack_bits(bytes), fixed_len, alignment)
	}

	/// Source bits.
	pub fn bits(&self) -> &[bool] {
		&self.bits
	}

	/// Underlying character array.
	pub fn array(&self) -> &SimpleArrayValue {
		&self.array
	}
}

/// Array of pointers, one per element; unused fixed slots are null pointers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceArrayValue {
	ty: ReferenceArrayType,
	elements: Vec<ReferenceValue>,
}

impl ReferenceArrayValue {
	/// Wrap each value in a reference; requires at least one value.
	pub fn new(values: Vec<Value>, fixed_len: Option<usize>, pointer_bits: u32) -> Result<Self> {
		check_width(pointer_bits)?;
		let Some(first) = values.first() else {
			return Err(LayoutError::EmptyCollection { kind: "reference array" });
		};
		check_fixed_len(values.len(), fixed_len)?;

		let mut element = first.ty();
		for value in &values {
			if matches!(value, Value::Reference(_)) {
				return Err(LayoutError::InvalidOperation {
					reason: "cannot store references in a reference array",
				});
			}
			element = merge(&element, &value.ty())?;
		}

		let elements = values
			.into_iter()
			.map(|value| {
				let target = if matches!(value, Value::Null) { None } else { Some(value) };
				ReferenceValue::new(target, pointer_bits, None)
			})
			.collect::<Result<Vec<_>>>()?;

		Ok(Self {
			ty: ReferenceArrayType {
				element: Box::new(element),
				fixed_len,
				pointer_bits,
			},
			elements,
		})
	}

	/// Array type.
	pub fn ty(&self) -> &ReferenceArrayType {
		&self.ty
	}

	/// Per-element references in declaration order.
	pub fn elements(&self) -> &[ReferenceValue] {
		&self.elements
	}

	/// Inline byte size: one pointer per slot.
	pub fn immediate_size(&self) -> usize {
		pointer_bytes(self.ty.pointer_bits) * self.ty.fixed_len.unwrap_or(self.elements.len())
	}
}

/// Struct value whose member list walks in lock-step with its type's slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructValue {
	ty: StructType,
	values: Vec<Value>,
}

impl StructValue {
	pub(crate) fn from_parts(ty: StructType, values: Vec<Value>) -> Self {
		assert_eq!(ty.members().len(), values.len(), "struct {} value list out of lock-step with its type", ty.name());
		Self { ty, values }
	}

	/// Struct type.
	pub fn ty(&self) -> &StructType {
		&self.ty
	}

	/// Member values, padding included, parallel to [`StructType::members`].
	pub fn values(&self) -> &[Value] {
		&self.values
	}

	/// Value of a named member.
	pub fn get(&self, name: &str) -> Option<&Value> {
		self.ty.member_index(name).map(|idx| &self.values[idx])
	}
}

impl Value {
	/// Range-checked integer.
	pub fn int(ty: IntType, value: i128) -> Result<Value> {
		Ok(Value::Int(IntValue::new(ty, value)?))
	}

	/// Signed 32-bit integer, the type integer literals default to.
	pub fn int32(value: i128) -> Result<Value> {
		Value::int(IntType::INT32, value)
	}

	/// ASCII character.
	pub fn char(ch: char) -> Result<Value> {
		if !ch.is_ascii() {
			return Err(LayoutError::InvalidCharacter { ch });
		}
		Ok(Value::Char(ch as u8))
	}

	/// Reference to `target`.
	pub fn reference(target: Value, pointer_bits: u32) -> Result<Value> {
		let target = if matches!(target, Value::Null) { None } else { Some(target) };
		Ok(Value::Reference(ReferenceValue::new(target, pointer_bits, None)?))
	}

	/// Null reference typed as pointing to `target_type`.
	pub fn null_reference(target_type: Type, pointer_bits: u32) -> Result<Value> {
		Ok(Value::Reference(ReferenceValue::new(None, pointer_bits, Some(target_type))?))
	}

	/// Zero-terminated string.
	pub fn string(text: &str) -> Result<Value> {
		Ok(Value::String(StringValue::new(text, None, false)?))
	}

	/// Blob with the default 4-byte alignment.
	pub fn blob(bits: Vec<bool>) -> Result<Value> {
		Ok(Value::Blob(BlobValue::new(bits, None, DEFAULT_BLOB_ALIGNMENT)?))
	}

	/// Array of values with a unified element type.
	///
	/// Builds a simple array if the merged element type is immediate and a
	/// reference array with 32-bit pointers otherwise.
	pub fn array(values: Vec<Value>, fixed_len: Option<usize>) -> Result<Value> {
		Value::array_with(values, fixed_len, DEFAULT_POINTER_BITS)
	}

	/// [`Value::array`] with `pointer_bits` wide element pointers when the
	/// result is a reference array.
	pub fn array_with(values: Vec<Value>, fixed_len: Option<usize>, pointer_bits: u32) -> Result<Value> {
		let Some(first) = values.first() else {
			return Err(LayoutError::EmptyCollection { kind: "array" });
		};
		let mut element = first.ty();
		for value in &values[1..] {
			element = merge(&element, &value.ty())?;
		}
		if let Type::Reference(_) = element {
			return Err(LayoutError::InvalidOperation {
				reason: "cannot build arrays out of references",
			});
		}
		if element.is_immediate() {
			Ok(Value::SimpleArray(SimpleArrayValue::new(element, values, fixed_len, None)?))
		} else {
			Ok(Value::ReferenceArray(ReferenceArrayValue::new(values, fixed_len, pointer_bits)?))
		}
	}

	/// Type of this value.
	pub fn ty(&self) -> Type {
		match self {
			Value::Null => Type::Null,
			Value::Int(value) => Type::Int(value.ty),
			Value::Char(_) => Type::Char,
			Value::Padding => Type::Int(IntType::UINT8),
			Value::Reference(value) => Type::Reference(value.ty()),
			Value::SimpleArray(value) => Type::SimpleArray(value.ty.clone()),
			Value::String(value) => Type::SimpleArray(value.array.ty.clone()),
			Value::Blob(value) => Type::SimpleArray(value.array.ty.clone()),
			Value::ReferenceArray(value) => Type::ReferenceArray(value.ty.clone()),
			Value::Struct(value) => Type::Struct(value.ty.clone()),
			Value::BitField(value) => Type::BitField(value.ty().clone()),
			Value::BitFieldArray(value) => Type::BitFieldArray(value.ty().clone()),
		}
	}

	/// Alignment of this value's type, computed without building the type.
	pub fn alignment(&self) -> usize {
		match self {
			Value::Null | Value::Char(_) | Value::Padding => 1,
			Value::Int(value) => value.ty.width(),
			Value::Reference(value) => pointer_bytes(value.pointer_bits),
			Value::SimpleArray(value) => value.ty.byte_alignment(),
			Value::String(value) => value.array.ty.byte_alignment(),
			Value::Blob(value) => value.array.ty.byte_alignment(),
			Value::ReferenceArray(value) => pointer_bytes(value.ty.pointer_bits),
			Value::Struct(value) => value.ty.alignment(),
			Value::BitField(value) => value.ty().container().width(),
			Value::BitFieldArray(_) => 2,
		}
	}

	/// Whether this value is stored inline by default, without building its type.
	pub fn is_immediate(&self) -> bool {
		match self {
			Value::Null | Value::Struct(_) | Value::BitFieldArray(_) => false,
			Value::Int(_) | Value::Char(_) | Value::Padding | Value::BitField(_) | Value::Reference(_) => true,
			Value::SimpleArray(value) => value.ty.fixed_len.is_some(),
			Value::String(value) => value.array.ty.fixed_len.is_some(),
			Value::Blob(value) => value.array.ty.fixed_len.is_some(),
			Value::ReferenceArray(value) => value.ty.fixed_len.is_some(),
		}
	}

	/// Number of bytes this value occupies inline.
	pub fn immediate_size(&self) -> usize {
		match self {
			Value::Null => 0,
			Value::Int(value) => value.ty.width(),
			Value::Char(_) | Value::Padding => 1,
			Value::Reference(value) => pointer_bytes(value.pointer_bits),
			Value::SimpleArray(value) => value.immediate_size(),
			Value::String(value) => value.array.immediate_size(),
			Value::Blob(value) => value.array.immediate_size(),
			Value::ReferenceArray(value) => value.immediate_size(),
			Value::Struct(value) => value.ty.size(),
			Value::BitField(value) => value.ty().container().width(),
			Value::BitFieldArray(value) => value.immediate_size(),
		}
	}
}

impl From<StructValue> for Value {
	fn from(value: StructValue) -> Self {
		Value::Struct(value)
	}
}

impl From<BitFieldValue> for Value {
	fn from(value: BitFieldValue) -> Self {
		Value::BitField(value)
	}
}

impl From<BitFieldArrayValue> for Value {
	fn from(value: BitFieldArrayValue) -> Self {
		Value::BitFieldArray(value)
	}
}

impl From<StringValue> for Value {
	fn from(value: StringValue) -> Self {
		Value::String(value)
	}
}

impl From<BlobValue> for Value {
	fn from(value: BlobValue) -> Self {
		Value::Blob(value)
	}
}

fn check_fixed_len(len: usize, fixed_len: Option<usize>) -> Result<()> {
	match fixed_len {
		Some(fixed) if len > fixed => Err(LayoutError::FixedLengthExceeded { len, fixed }),
		_ => Ok(()),
	}
}

fn coerce_element(element: &Type, width: usize, value: Value) -> Result<Value> {
	match (element, value) {
		(Type::Int(ty), Value::Int(int)) => Value::int(*ty, int.value),
		(Type::Int(ty), Value::Padding) => Value::int(*ty, 0),
		(_, value) => {
			let ty = value.ty();
			merge(element, &ty)?;
			if value.immediate_size() != width {
				return Err(LayoutError::TypeMismatch {
					left: element.to_string(),
					right: ty.to_string(),
				});
			}
			Ok(value)
		}
	}
}
