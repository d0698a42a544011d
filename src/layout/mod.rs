mod bitfield;
mod bits;
mod builder;
mod constant;
mod error;
mod literal;
mod options;
mod pack;
mod pretty;
mod ty;
mod value;
mod view;

/// Bit-field and bit-field-array values.
pub use bitfield::{BitFieldArrayItem, BitFieldArrayValue, BitFieldValue, MAX_ARRAY_FIELD_VALUE};
/// Bit helpers shared by blobs and bit-field arrays.
pub use bits::{pack_bits, required_bits, unpack_bits};
/// Incremental struct construction.
pub use builder::{BlobOptions, StringOptions, StructBuilder};
/// Named constants attached to struct types.
pub use constant::{Constant, ConstantSet};
/// Error and result aliases.
pub use error::{LayoutError, Result};
/// Closed literal input and records for add-from-record.
pub use literal::{Literal, Record};
/// Builder and pretty-printer configuration.
pub use options::{BuilderOptions, PrettyOptions};
/// Packing entry points.
pub use pack::{Packed, pack};
/// Size report rows.
pub use pretty::SizeRow;
/// Type system.
pub use ty::{BitFieldArrayType, BitFieldType, IntType, Member, ReferenceArrayType, ReferenceType, SimpleArrayType, StructType, Type, merge};
/// Value model.
pub use value::{
	BlobValue, DEFAULT_BLOB_ALIGNMENT, DEFAULT_POINTER_BITS, IntValue, ReferenceArrayValue, ReferenceValue, SimpleArrayValue, StringValue, StructValue, Value,
};
/// Read-only layout view.
pub use view::{MemberLayout, StructLayout};
