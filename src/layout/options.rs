/// Defaults applied by [`crate::layout::StructBuilder`] when a call does not override them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuilderOptions {
	/// Pointer width in bits for references and reference arrays.
	pub pointer_bits: u32,
	/// Byte multiple the struct size is rounded up to on finalize.
	pub finalize_alignment: usize,
	/// Byte alignment of blob data.
	pub blob_alignment: usize,
}

impl Default for BuilderOptions {
	fn default() -> Self {
		Self {
			pointer_bits: 32,
			finalize_alignment: 4,
			blob_alignment: 4,
		}
	}
}

/// Output truncation limits for [`crate::layout::Value::pretty_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrettyOptions {
	/// Array rendering stops once this many characters were emitted.
	pub max_chars: usize,
	/// Minimum number of array items always rendered.
	pub min_items: usize,
	/// Maximum rendered length of a string literal.
	pub max_string_len: usize,
	/// Maximum number of blob bits rendered.
	pub max_blob_bits: usize,
}

impl Default for PrettyOptions {
	fn default() -> Self {
		Self {
			max_chars: 500,
			min_items: 2,
			max_string_len: 80,
			max_blob_bits: 200,
		}
	}
}

impl PrettyOptions {
	/// Preset for short single-screen output.
	pub fn compact() -> Self {
		Self {
			max_chars: 120,
			min_items: 2,
			max_string_len: 32,
			max_blob_bits: 32,
		}
	}
}
