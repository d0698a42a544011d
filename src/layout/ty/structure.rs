use crate::layout::constant::{Constant, ConstantSet};
use crate::layout::ty::{IntType, Type, align_up};
use crate::layout::{LayoutError, Result};

/// One laid-out slot of a struct: a named member or an inserted pad byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
	/// Member name; pad bytes are named `_pad<offset>`.
	pub name: Box<str>,
	/// Byte offset from the start of the struct.
	pub offset: usize,
	/// Inline byte size.
	pub size: usize,
	/// Member type.
	pub ty: Type,
	/// Whether this slot is alignment padding inserted by the layout.
	pub padding: bool,
}

/// Record type built incrementally by appending members.
///
/// The member list includes one padding slot per inserted pad byte so it can be
/// walked in lock-step with the value list of a struct value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructType {
	name: Box<str>,
	members: Vec<Member>,
	size: usize,
	alignment: usize,
	constants: ConstantSet,
	finalized: bool,
}

impl StructType {
	/// Create an empty, unfinalized struct type.
	pub fn new(name: &str) -> Self {
		Self {
			name: name.into(),
			members: Vec::new(),
			size: 0,
			alignment: 1,
			constants: ConstantSet::default(),
			finalized: false,
		}
	}

	/// Append a member occupying `size` inline bytes.
	///
	/// The member is placed at its type's alignment rounded up from the current
	/// size. Returns the number of pad bytes inserted before it; the caller
	/// must insert as many padding values into its value list.
	pub fn add_member(&mut self, name: &str, ty: Type, size: usize) -> Result<usize> {
		if self.finalized {
			return Err(LayoutError::StructAlreadyFinalized { name: self.name.to_string() });
		}
		if self.member(name).is_some() {
			return Err(LayoutError::NameCollision {
				owner: self.name.to_string(),
				name: name.to_owned(),
			});
		}

		let alignment = ty.alignment();
		let offset = align_up(self.size, alignment);
		let pad = self.push_padding(offset);
		tracing::trace!(struct_name = %self.name, member = name, offset, size, pad, "struct member added");

		self.members.push(Member {
			name: name.into(),
			offset,
			size,
			ty,
			padding: false,
		});
		self.size = offset + size;
		self.alignment = self.alignment.max(alignment);
		Ok(pad)
	}

	/// Round the total size up to `byte_alignment` and freeze the layout.
	///
	/// Returns the number of trailing pad bytes appended.
	pub fn finalize(&mut self, byte_alignment: usize) -> Result<usize> {
		if self.finalized {
			return Err(LayoutError::StructAlreadyFinalized { name: self.name.to_string() });
		}
		let target = align_up(self.size, byte_alignment);
		let pad = self.push_padding(target);
		self.size = target;
		self.finalized = true;
		tracing::debug!(struct_name = %self.name, size = self.size, trailing_pad = pad, "struct finalized");
		Ok(pad)
	}

	/// Attach a named constant. Constants never occupy bytes in the buffer.
	pub fn add_constant(&mut self, name: &str, constant: Constant) -> Result<()> {
		self.constants.insert(&self.name, name, constant)
	}

	/// Struct type name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// All slots in layout order, padding included.
	pub fn members(&self) -> &[Member] {
		&self.members
	}

	/// Look up a named (non-padding) member.
	pub fn member(&self, name: &str) -> Option<&Member> {
		self.members.iter().find(|member| !member.padding && member.name.as_ref() == name)
	}

	/// Index of a named member within [`StructType::members`].
	pub fn member_index(&self, name: &str) -> Option<usize> {
		self.members.iter().position(|member| !member.padding && member.name.as_ref() == name)
	}

	/// Names of the non-padding members in order.
	pub fn field_names(&self) -> impl Iterator<Item = &str> + '_ {
		self.members.iter().filter(|member| !member.padding).map(|member| member.name.as_ref())
	}

	/// Current immediate size in bytes.
	pub fn size(&self) -> usize {
		self.size
	}

	/// Largest member alignment, 1 for an empty struct.
	pub fn alignment(&self) -> usize {
		self.alignment
	}

	/// Named constants attached to this type.
	pub fn constants(&self) -> &ConstantSet {
		&self.constants
	}

	/// Look up a named constant.
	pub fn constant(&self, name: &str) -> Option<&Constant> {
		self.constants.get(name)
	}

	/// Whether [`StructType::finalize`] has been called.
	pub fn is_finalized(&self) -> bool {
		self.finalized
	}

	fn push_padding(&mut self, target: usize) -> usize {
		let start = self.size;
		for offset in start..target {
			self.members.push(Member {
				name: format!("_pad{offset}").into_boxed_str(),
				offset,
				size: 1,
				ty: Type::Int(IntType::UINT8),
				padding: true,
			});
		}
		target - start
	}
}
