use std::fs;
use std::path::Path;

use namedstruct::layout::{
	BitFieldArrayItem, BitFieldArrayValue, BitFieldValue, BlobOptions, BuilderOptions, IntType, Literal, Record,
	StringOptions, StructBuilder, StructValue, Type, Value,
};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value as JsonValue};

use crate::cmd::{CliError, Result};

/// One struct: its members, constants and the record members may be read from.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StructDoc {
	/// Struct type name.
	pub name: String,
	/// Finalize alignment override in bytes.
	#[serde(default)]
	pub finalize: Option<usize>,
	/// Default pointer width for members of this struct.
	#[serde(default)]
	pub pointer_bits: Option<u32>,
	/// Values looked up by member name when a member has no `value`.
	#[serde(default)]
	pub record: Map<String, JsonValue>,
	/// Named constants attached to the type.
	#[serde(default)]
	pub constants: Vec<ConstantDoc>,
	/// Members in layout order.
	#[serde(default)]
	pub members: Vec<MemberDoc>,
}

/// Member without extra storage options: integers, chars and literals.
#[derive(Debug, Clone, Deserialize)]
pub struct ValueMember {
	name: String,
	#[serde(default, deserialize_with = "present")]
	value: Option<JsonValue>,
}

/// String member.
#[derive(Debug, Clone, Deserialize)]
pub struct StringMember {
	name: String,
	#[serde(default, deserialize_with = "present")]
	value: Option<JsonValue>,
	#[serde(default)]
	fixed_width: Option<usize>,
	#[serde(default)]
	omit_terminator: bool,
	#[serde(default)]
	pointer_bits: Option<u32>,
}

/// Blob member: a 0/1 sequence or a string whose bytes become the bits.
#[derive(Debug, Clone, Deserialize)]
pub struct BlobMember {
	name: String,
	#[serde(default, deserialize_with = "present")]
	value: Option<JsonValue>,
	#[serde(default)]
	alignment: Option<usize>,
	#[serde(default)]
	pointer_bits: Option<u32>,
}

/// Array member.
#[derive(Debug, Clone, Deserialize)]
pub struct ArrayMember {
	name: String,
	#[serde(default, deserialize_with = "present")]
	value: Option<JsonValue>,
	#[serde(default)]
	fixed_len: Option<usize>,
	#[serde(default)]
	pointer_bits: Option<u32>,
}

/// Nested struct member.
#[derive(Debug, Clone, Deserialize)]
pub struct StructMember {
	name: String,
	#[serde(rename = "struct")]
	body: Box<StructDoc>,
	#[serde(default)]
	immediate: bool,
}

/// Bit field member.
#[derive(Debug, Clone, Deserialize)]
pub struct BitFieldMember {
	name: String,
	#[serde(rename = "type")]
	type_name: String,
	bits: u32,
	fields: Vec<BitFieldEntry>,
}

/// One named field of a bit field.
#[derive(Debug, Clone, Deserialize)]
pub struct BitFieldEntry {
	name: String,
	bits: u32,
	value: u64,
}

/// Bit-field array member; each entry maps field names to integers or bit sequences.
#[derive(Debug, Clone, Deserialize)]
pub struct BitFieldArrayMember {
	name: String,
	#[serde(rename = "type")]
	type_name: String,
	fields: Vec<String>,
	#[serde(default)]
	entries: Vec<Map<String, JsonValue>>,
}

/// Null reference member.
#[derive(Debug, Clone, Deserialize)]
pub struct NullReferenceMember {
	name: String,
	#[serde(default)]
	pointer_bits: Option<u32>,
}

/// Struct member, tagged by `kind`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MemberDoc {
	/// Signed 8-bit integer.
	Int8(ValueMember),
	/// Signed 16-bit integer.
	Int16(ValueMember),
	/// Signed 32-bit integer.
	Int32(ValueMember),
	/// Signed 64-bit integer.
	Int64(ValueMember),
	/// Unsigned 8-bit integer.
	Uint8(ValueMember),
	/// Unsigned 16-bit integer.
	Uint16(ValueMember),
	/// Unsigned 32-bit integer.
	Uint32(ValueMember),
	/// Unsigned 64-bit integer.
	Uint64(ValueMember),
	/// Single ASCII character.
	Char(ValueMember),
	/// Referenced string.
	String(StringMember),
	/// Referenced blob.
	Blob(BlobMember),
	/// Untyped literal with default storage.
	Literal(ValueMember),
	/// Array with a unified element type.
	Array(ArrayMember),
	/// Array of references.
	ReferenceArray(ArrayMember),
	/// Nested struct.
	Struct(StructMember),
	/// Packed bit field.
	BitField(BitFieldMember),
	/// Self-describing bit-field array.
	BitFieldArray(BitFieldArrayMember),
	/// Untyped null reference.
	NullReference(NullReferenceMember),
}

/// Named constant, tagged by `kind`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConstantDoc {
	/// Signed 32-bit integer constant.
	Int32 {
		/// Constant name.
		name: String,
		/// Constant value.
		value: i64,
	},
	/// Character constant.
	Char {
		/// Constant name.
		name: String,
		/// Single-character string.
		value: String,
	},
	/// String constant.
	String {
		/// Constant name.
		name: String,
		/// Constant text.
		value: String,
	},
}

/// Read and parse a struct document.
pub fn load(path: &Path) -> Result<StructDoc> {
	let bytes = fs::read(path).map_err(|source| CliError::Io {
		path: path.to_owned(),
		source,
	})?;
	serde_json::from_slice(&bytes).map_err(|source| CliError::Json {
		path: path.to_owned(),
		source,
	})
}

impl StructDoc {
	/// Build and finalize the described struct.
	pub fn build(&self) -> Result<StructValue> {
		let mut options = BuilderOptions::default();
		if let Some(bits) = self.pointer_bits {
			options.pointer_bits = bits;
		}
		let record = self.record()?;

		let mut builder = StructBuilder::with_options(&self.name, options);
		for member in &self.members {
			member.add_to(&mut builder, &record)?;
		}
		for constant in &self.constants {
			constant.add_to(&mut builder)?;
		}
		match self.finalize {
			Some(alignment) => builder.finalize_to(alignment)?,
			None => builder.finalize()?,
		};
		tracing::debug!(name = %self.name, size = builder.immediate_size(), "document struct built");
		Ok(builder.build())
	}

	fn record(&self) -> Result<Record> {
		let mut record = Record::new();
		for (name, value) in &self.record {
			record.set(name, literal(name, value)?);
		}
		Ok(record)
	}
}

impl MemberDoc {
	fn add_to(&self, builder: &mut StructBuilder, record: &Record) -> Result<()> {
		match self {
			MemberDoc::Int8(member) => member.add_to(builder, IntType::INT8, record),
			MemberDoc::Int16(member) => member.add_to(builder, IntType::INT16, record),
			MemberDoc::Int32(member) => member.add_to(builder, IntType::INT32, record),
			MemberDoc::Int64(member) => member.add_to(builder, IntType::INT64, record),
			MemberDoc::Uint8(member) => member.add_to(builder, IntType::UINT8, record),
			MemberDoc::Uint16(member) => member.add_to(builder, IntType::UINT16, record),
			MemberDoc::Uint32(member) => member.add_to(builder, IntType::UINT32, record),
			MemberDoc::Uint64(member) => member.add_to(builder, IntType::UINT64, record),
			MemberDoc::Char(member) => {
				let resolved = resolve(&member.name, member.value.as_ref(), record)?;
				let ch = single_char(&member.name, resolved.as_optional_str()?)?;
				builder.add_char(&member.name, ch)?;
				Ok(())
			}
			MemberDoc::String(member) => {
				let options = StringOptions {
					fixed_width: member.fixed_width,
					omit_terminator: member.omit_terminator,
					pointer_bits: member.pointer_bits,
				};
				match &member.value {
					Some(value) => {
						let text = literal(&member.name, value)?;
						builder.add_string(&member.name, text.as_optional_str()?, options)?
					}
					None => builder.add_string_from_record(&member.name, options, record)?,
				};
				Ok(())
			}
			MemberDoc::Blob(member) => {
				let options = BlobOptions {
					alignment: member.alignment,
					pointer_bits: member.pointer_bits,
				};
				match &member.value {
					Some(value) => builder.add_blob(&member.name, literal(&member.name, value)?.to_bits()?, options)?,
					None => builder.add_blob_from_record(&member.name, options, record)?,
				};
				Ok(())
			}
			MemberDoc::Literal(member) => {
				match &member.value {
					Some(value) => builder.add_literal(&member.name, &literal(&member.name, value)?)?,
					None => builder.add_from_record(&member.name, record)?,
				};
				Ok(())
			}
			MemberDoc::Array(member) => {
				let pointer_bits = member.pointer_bits.unwrap_or(builder.options().pointer_bits);
				let values = member.values(record, pointer_bits)?;
				builder.add_array_with(&member.name, values, member.fixed_len, pointer_bits)?;
				Ok(())
			}
			MemberDoc::ReferenceArray(member) => {
				let pointer_bits = member.pointer_bits.unwrap_or(builder.options().pointer_bits);
				let values = member.values(record, pointer_bits)?;
				builder.add_reference_array(&member.name, values, member.fixed_len, pointer_bits)?;
				Ok(())
			}
			MemberDoc::Struct(member) => {
				let value = Value::Struct(member.body.build()?);
				if member.immediate {
					builder.add_immediate(&member.name, value)?;
				} else {
					builder.add(&member.name, value)?;
				}
				Ok(())
			}
			MemberDoc::BitField(member) => {
				let mut value = BitFieldValue::new(&member.type_name, member.bits)?;
				for field in &member.fields {
					value.add(&field.name, field.value, field.bits)?;
				}
				builder.add(&member.name, value.into())?;
				Ok(())
			}
			MemberDoc::BitFieldArray(member) => {
				let fields: Vec<&str> = member.fields.iter().map(String::as_str).collect();
				let mut value = BitFieldArrayValue::new(&member.type_name, &fields)?;
				for entry in &member.entries {
					let items = entry
						.iter()
						.map(|(field, item)| Ok((field.as_str(), array_item(field, item)?)))
						.collect::<Result<Vec<_>>>()?;
					value.add_record(&items)?;
				}
				builder.add(&member.name, value.into())?;
				Ok(())
			}
			MemberDoc::NullReference(member) => {
				let pointer_bits = member.pointer_bits.unwrap_or(builder.options().pointer_bits);
				builder.add_null_reference(&member.name, Type::Null, pointer_bits)?;
				Ok(())
			}
		}
	}
}

impl ValueMember {
	fn add_to(&self, builder: &mut StructBuilder, ty: IntType, record: &Record) -> Result<()> {
		match &self.value {
			Some(value) => builder.add_int(&self.name, ty, literal(&self.name, value)?.as_integer()?)?,
			None => builder.add_int_from_record(&self.name, ty, record)?,
		};
		Ok(())
	}
}

impl ArrayMember {
	fn values(&self, record: &Record, pointer_bits: u32) -> Result<Vec<Value>> {
		let Literal::Sequence(items) = resolve(&self.name, self.value.as_ref(), record)? else {
			return Err(CliError::Schema {
				name: self.name.clone(),
				reason: "array value must be a JSON array".to_owned(),
			});
		};
		Ok(items
			.iter()
			.map(|item| item.to_value_with(pointer_bits))
			.collect::<namedstruct::layout::Result<Vec<_>>>()?)
	}
}

impl ConstantDoc {
	fn add_to(&self, builder: &mut StructBuilder) -> Result<()> {
		match self {
			ConstantDoc::Int32 { name, value } => builder.add_int32_constant(name, *value)?,
			ConstantDoc::Char { name, value } => builder.add_char_constant(name, single_char(name, Some(value.as_str()))?)?,
			ConstantDoc::String { name, value } => builder.add_string_constant(name, value)?,
		};
		Ok(())
	}
}

/// Convert a JSON value to a literal; booleans become 0/1.
pub fn literal(name: &str, value: &JsonValue) -> Result<Literal> {
	match value {
		JsonValue::Null => Ok(Literal::Null),
		JsonValue::Bool(flag) => Ok(Literal::Integer(i128::from(*flag))),
		JsonValue::Number(number) => number
			.as_i64()
			.map(i128::from)
			.or_else(|| number.as_u64().map(i128::from))
			.map(Literal::Integer)
			.ok_or_else(|| schema(name, format!("{number} is not an integer"))),
		JsonValue::String(text) => Ok(Literal::String(text.clone())),
		JsonValue::Array(items) => Ok(Literal::Sequence(items.iter().map(|item| literal(name, item)).collect::<Result<_>>()?)),
		JsonValue::Object(_) => Err(schema(name, "objects are not literals".to_owned())),
	}
}

fn resolve(name: &str, value: Option<&JsonValue>, record: &Record) -> Result<Literal> {
	match value {
		Some(value) => literal(name, value),
		None => Ok(record.get(name)?.clone()),
	}
}

fn array_item(field: &str, value: &JsonValue) -> Result<BitFieldArrayItem> {
	let parsed = literal(field, value)?;
	match parsed {
		Literal::Integer(value) => Ok(BitFieldArrayItem::int(value)?),
		Literal::Sequence(_) | Literal::String(_) => Ok(BitFieldArrayItem::Bits(parsed.to_bits()?)),
		Literal::Null => Err(schema(field, "bit-field array items cannot be null".to_owned())),
	}
}

fn single_char(name: &str, text: Option<&str>) -> Result<char> {
	let mut chars = text.unwrap_or_default().chars();
	match (chars.next(), chars.next()) {
		(Some(ch), None) => Ok(ch),
		_ => Err(schema(name, "expected a single character".to_owned())),
	}
}

fn schema(name: &str, reason: String) -> CliError {
	CliError::Schema {
		name: name.to_owned(),
		reason,
	}
}

// Distinguishes an explicit `null` from an absent field.
fn present<'de, D>(deserializer: D) -> std::result::Result<Option<JsonValue>, D::Error>
where
	D: Deserializer<'de>,
{
	JsonValue::deserialize(deserializer).map(Some)
}
