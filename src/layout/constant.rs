use std::fmt;

use crate::layout::ty::IntType;
use crate::layout::{LayoutError, Result};

/// Named constant attached to a struct type for declaration output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constant {
	/// Integer constant with its declared type.
	Int {
		/// Declared integer type.
		ty: IntType,
		/// Constant value.
		value: i128,
	},
	/// Single byte character constant.
	Char(u8),
	/// String constant.
	String(Box<str>),
}

impl Constant {
	/// Integer constant, range-checked against `ty`.
	pub fn int(ty: IntType, value: i128) -> Result<Self> {
		ty.check(value)?;
		Ok(Constant::Int { ty, value })
	}

	/// Character constant; only ASCII characters are representable.
	pub fn char(ch: char) -> Result<Self> {
		if !ch.is_ascii() {
			return Err(LayoutError::InvalidCharacter { ch });
		}
		Ok(Constant::Char(ch as u8))
	}
}

impl fmt::Display for Constant {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Constant::Int { value, .. } => write!(f, "{value}"),
			Constant::Char(byte) => write!(f, "{:?}", char::from(*byte)),
			Constant::String(text) => write!(f, "{text:?}"),
		}
	}
}

/// Ordered set of uniquely named constants.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstantSet {
	entries: Vec<(Box<str>, Constant)>,
}

impl ConstantSet {
	/// Insert a constant; `owner` names the struct for collision errors.
	pub fn insert(&mut self, owner: &str, name: &str, constant: Constant) -> Result<()> {
		if self.get(name).is_some() {
			return Err(LayoutError::NameCollision {
				owner: owner.to_owned(),
				name: name.to_owned(),
			});
		}
		self.entries.push((name.into(), constant));
		Ok(())
	}

	/// Look up a constant by name.
	pub fn get(&self, name: &str) -> Option<&Constant> {
		self.entries.iter().find(|(key, _)| key.as_ref() == name).map(|(_, constant)| constant)
	}

	/// Iterate constants in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &Constant)> + '_ {
		self.entries.iter().map(|(name, constant)| (name.as_ref(), constant))
	}

	/// Number of constants.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Whether the set is empty.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}
