use thiserror::Error;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, LayoutError>;

/// Errors produced while describing types, building values, and packing them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LayoutError {
	/// Two types could not be unified into a common element type.
	#[error("type mismatch: cannot merge {left} with {right}")]
	TypeMismatch {
		/// Rendered left operand.
		left: String,
		/// Rendered right operand.
		right: String,
	},
	/// Integer or bit-field value does not fit its declared width/signedness.
	#[error("value {value} out of range for {ty}")]
	ValueOutOfRange {
		/// Offending value.
		value: i128,
		/// Rendered target type.
		ty: String,
	},
	/// Member, field, or constant name already present.
	#[error("name collision in {owner}: {name} already defined")]
	NameCollision {
		/// Struct or bit-field type name.
		owner: String,
		/// Duplicate name.
		name: String,
	},
	/// Member addition or finalize attempted on a frozen struct.
	#[error("struct {name} is already finalized")]
	StructAlreadyFinalized {
		/// Struct type name.
		name: String,
	},
	/// Operation is not valid in the current context.
	#[error("invalid operation: {reason}")]
	InvalidOperation {
		/// Short description of what was attempted.
		reason: &'static str,
	},
	/// Collection constructed from zero elements where at least one is required.
	#[error("{kind} cannot be built from zero elements")]
	EmptyCollection {
		/// Collection kind label.
		kind: &'static str,
	},
	/// Array or string has more initial elements than its fixed length.
	#[error("{len} elements exceed fixed length {fixed}")]
	FixedLengthExceeded {
		/// Supplied element count.
		len: usize,
		/// Declared fixed length.
		fixed: usize,
	},
	/// Integer, pointer, or container bit width is not supported.
	#[error("unsupported bit width {bits} (expected 8, 16, 32 or 64)")]
	UnsupportedWidth {
		/// Requested width in bits.
		bits: u32,
	},
	/// Bit-field fields would exceed the container width.
	#[error("bit field {name}: {used}+{requested} bits exceed container of {capacity}")]
	BitFieldOverflow {
		/// Bit-field type name.
		name: String,
		/// Bits already assigned.
		used: u32,
		/// Bits requested by the new field.
		requested: u32,
		/// Container width.
		capacity: u32,
	},
	/// Character cannot be represented as a single byte.
	#[error("character {ch:?} is not a single-byte character")]
	InvalidCharacter {
		/// Offending character.
		ch: char,
	},
	/// Record lookup for add-from-record failed.
	#[error("record has no field {name}")]
	MissingRecordField {
		/// Requested key.
		name: String,
	},
	/// Bit-field-array entry arity does not match the declared field list.
	#[error("bit field array {name}: expected {expected} fields, got {got}")]
	FieldCountMismatch {
		/// Bit-field-array type name.
		name: String,
		/// Declared field count.
		expected: usize,
		/// Supplied field count.
		got: usize,
	},
	/// Bit-field-array header word does not fit 16 bits.
	#[error("bit field array {name}: header word {word} exceeds 16 bits")]
	HeaderOverflow {
		/// Bit-field-array type name.
		name: String,
		/// Offending header value.
		word: usize,
	},
}
