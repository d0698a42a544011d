//! Read-only layout view consumed by declaration emitters.

use crate::layout::constant::ConstantSet;
use crate::layout::ty::{StructType, Type};

/// One slot of a struct layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberLayout<'a> {
	/// Byte offset from the struct start.
	pub offset: usize,
	/// Inline byte size.
	pub size: usize,
	/// Member type.
	pub ty: &'a Type,
	/// Member name.
	pub name: &'a str,
	/// Whether the slot is an inserted pad byte.
	pub padding: bool,
}

/// Borrowed view of a struct type sufficient to render its declaration.
#[derive(Debug, Clone, Copy)]
pub struct StructLayout<'a> {
	ty: &'a StructType,
}

impl StructType {
	/// Read-only layout view.
	pub fn layout(&self) -> StructLayout<'_> {
		StructLayout { ty: self }
	}
}

impl<'a> StructLayout<'a> {
	/// Struct type name.
	pub fn name(&self) -> &'a str {
		self.ty.name()
	}

	/// Total byte size.
	pub fn size(&self) -> usize {
		self.ty.size()
	}

	/// Struct alignment.
	pub fn alignment(&self) -> usize {
		self.ty.alignment()
	}

	/// Whether the layout is frozen.
	pub fn is_finalized(&self) -> bool {
		self.ty.is_finalized()
	}

	/// Every slot in offset order, padding included.
	pub fn members(self) -> impl Iterator<Item = MemberLayout<'a>> + 'a {
		self.ty.members().iter().map(|member| MemberLayout {
			offset: member.offset,
			size: member.size,
			ty: &member.ty,
			name: &member.name,
			padding: member.padding,
		})
	}

	/// Named members as `(offset, type, name)` triples.
	pub fn fields(self) -> impl Iterator<Item = (usize, &'a Type, &'a str)> + 'a {
		self.members().filter(|member| !member.padding).map(|member| (member.offset, member.ty, member.name))
	}

	/// Named constants.
	pub fn constants(&self) -> &'a ConstantSet {
		self.ty.constants()
	}

	/// Struct, bit-field and bit-field-array types reachable from the members.
	///
	/// Dependencies come before the types that use them; each name appears
	/// once and this struct itself is excluded.
	pub fn referenced_types(&self) -> Vec<&'a Type> {
		let mut out = Vec::new();
		for member in self.ty.members() {
			collect_nominal(&member.ty, &mut out);
		}
		out.retain(|ty| ty.type_name() != Some(self.ty.name()));
		out
	}

	/// Names of [`StructLayout::referenced_types`].
	pub fn referenced_type_names(&self) -> Vec<&'a str> {
		self.referenced_types().into_iter().filter_map(Type::type_name).collect()
	}
}

fn collect_nominal<'a>(ty: &'a Type, out: &mut Vec<&'a Type>) {
	match ty {
		Type::Struct(item) => {
			for member in item.members() {
				collect_nominal(&member.ty, out);
			}
		}
		Type::SimpleArray(item) => collect_nominal(&item.element, out),
		Type::ReferenceArray(item) => collect_nominal(&item.element, out),
		Type::Reference(item) => collect_nominal(&item.target, out),
		Type::Null | Type::Int(_) | Type::Char | Type::BitField(_) | Type::BitFieldArray(_) => {}
	}
	let Some(name) = ty.type_name() else {
		return;
	};
	if !out.iter().any(|seen| seen.type_name() == Some(name)) {
		out.push(ty);
	}
}

#[cfg(test)]
mod tests {
	use crate::layout::{BitFieldValue, StructBuilder, Type, Value};

	#[test]
	fn fields_expose_offsets_types_and_names() {
		let mut item = StructBuilder::new("testStruct7");
		item.add_int8("anInt8", 8).expect("int8");
		item.add_int32("anInt32", -32).expect("int32");
		item.add_string("aString", Some("hello world"), Default::default()).expect("string");
		item.finalize().expect("finalize");
		let value = item.build();

		let layout = value.ty().layout();
		let fields: Vec<_> = layout.fields().map(|(offset, ty, name)| (offset, ty.to_string(), name)).collect();
		assert_eq!(
			fields,
			vec![
				(0, "int8_t".to_owned(), "anInt8"),
				(4, "int32_t".to_owned(), "anInt32"),
				(8, "ref32<char[]>".to_owned(), "aString"),
			]
		);
		assert_eq!(layout.size(), 12);
		assert_eq!(layout.members().filter(|member| member.padding).count(), 3);
	}

	#[test]
	fn referenced_types_are_dependency_first_and_unique() {
		let mut inner = StructBuilder::new("inner");
		let mut flags = BitFieldValue::new("flags8", 8).expect("bitfield");
		flags.add("a", 1, 1).expect("field");
		inner.add("flags", flags.into()).expect("flags");
		let inner = inner.into_value();

		let mut outer = StructBuilder::new("outer");
		outer.add("first", inner.clone()).expect("first");
		outer.add_immediate("second", inner).expect("second");
		let outer = outer.build();

		let layout = outer.ty().layout();
		assert_eq!(layout.referenced_type_names(), vec!["flags8", "inner"]);
	}

	#[test]
	fn self_named_struct_is_not_its_own_dependency() {
		let mut tail = StructBuilder::new("node");
		tail.add_int32("value", 2).expect("value");
		tail.add("next", Value::Null).expect("next");
		let mut head = StructBuilder::new("node");
		head.add_int32("value", 1).expect("value");
		head.add("next", tail.into_value()).expect("next");
		let head = head.build();

		assert!(head.ty().layout().referenced_type_names().is_empty());
		assert!(matches!(head.ty().member("next").map(|member| &member.ty), Some(Type::Reference(_))));
	}
}
