//! Human-readable rendering of value trees for debugging.

use crate::layout::bitfield::BitFieldArrayItem;
use crate::layout::value::StructValue;
use crate::layout::{BitFieldArrayValue, BitFieldValue, PrettyOptions, Result, Value};

const INDENT: &str = "  ";

/// Packed byte count contributed by one struct slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeRow {
	/// Member name (pad bytes appear as `_pad<offset>`).
	pub name: String,
	/// Inline plus indirect bytes.
	pub bytes: usize,
}

impl Value {
	/// Render with default truncation limits.
	pub fn pretty(&self) -> String {
		self.pretty_with(&PrettyOptions::default())
	}

	/// Render with explicit truncation limits.
	pub fn pretty_with(&self, options: &PrettyOptions) -> String {
		match self {
			Value::Null => "<NULL>".to_owned(),
			Value::Int(value) => value.value().to_string(),
			Value::Char(byte) => format!("{:?}", char::from(*byte)),
			Value::Padding => "0".to_owned(),
			Value::Reference(value) => format!("->{}", value.target().pretty_with(options).replace('\n', &format!("\n{INDENT}"))),
			Value::SimpleArray(value) => render_items(value.elements().iter().map(|item| item.pretty_with(options)), options),
			Value::String(value) => truncate(&format!("{:?}", value.text()), options.max_string_len),
			Value::Blob(value) => render_blob(value.bits(), options),
			Value::ReferenceArray(value) => render_items(value.elements().iter().map(|item| item.target().pretty_with(options)), options),
			Value::Struct(value) => render_struct(value, options),
			Value::BitField(value) => render_bit_field(value),
			Value::BitFieldArray(value) => render_bit_field_array(value, options),
		}
	}
}

impl StructValue {
	/// Packed size of every slot, as laid out when this struct is the root.
	///
	/// Rows sum to the length of the packed buffer.
	pub fn size_report(&self) -> Result<Vec<SizeRow>> {
		let mut cursor = self.ty().size();
		let mut rows = Vec::with_capacity(self.values().len());
		for (member, value) in self.ty().members().iter().zip(self.values()) {
			let packed = value.pack_at(cursor)?;
			cursor += packed.indirect.len();
			rows.push(SizeRow {
				name: member.name.to_string(),
				bytes: packed.inline.len() + packed.indirect.len(),
			});
		}
		Ok(rows)
	}
}

fn render_items(items: impl Iterator<Item = String>, options: &PrettyOptions) -> String {
	let items: Vec<String> = items.collect();
	let mut chars = 0;
	let mut shown = 0;
	while shown < items.len() && (chars <= options.max_chars || shown < options.min_items) {
		chars += items[shown].len();
		shown += 1;
	}
	let tail = if shown < items.len() { ",..." } else { "" };
	format!("[{}{tail}]", items[..shown].join(", "))
}

fn render_blob(bits: &[bool], options: &PrettyOptions) -> String {
	let shown: String = bits.iter().take(options.max_blob_bits).map(|bit| if *bit { '1' } else { '0' }).collect();
	if bits.len() > options.max_blob_bits {
		format!("[{shown}..({} bits)]", bits.len())
	} else {
		format!("[{shown}]")
	}
}

fn render_struct(value: &StructValue, options: &PrettyOptions) -> String {
	let ty = value.ty();
	let type_width = ty.members().iter().map(|member| member.ty.to_string().len()).max().unwrap_or(0);
	let mut out = format!("struct {} {{", ty.name());
	for (member, item) in ty.members().iter().zip(value.values()) {
		let type_name = member.ty.to_string();
		let line = format!("\n{:02}: {type_name:<type_width$} {}={}", member.offset, member.name, item.pretty_with(options));
		out.push_str(&line.replace('\n', &format!("\n{INDENT}")));
	}
	out.push_str("\n}");
	out
}

fn render_bit_field(value: &BitFieldValue) -> String {
	let ty = value.ty();
	let name_width = ty.fields().iter().map(|(name, _)| name.len()).max().unwrap_or(0);
	let mut out = format!("bitField{}{{", ty.bits());
	for ((name, bits), field) in ty.fields().iter().zip(value.values()) {
		out.push_str(&format!("\n{INDENT}{name:<name_width$}:{bits:2} = {field}"));
	}
	out.push_str("\n}");
	out
}

fn render_bit_field_array(value: &BitFieldArrayValue, options: &PrettyOptions) -> String {
	let widths = value.field_widths();
	let total: u32 = widths.iter().sum();
	let name_width = value.ty().fields.iter().map(|name| name.len()).max().unwrap_or(0);
	let mut out = format!("bitFieldArray[{}x{total}]{{", value.len());
	for (column, (name, width)) in value.ty().fields.iter().zip(&widths).enumerate() {
		let cells = value.entries().iter().map(|entry| match &entry[column] {
			BitFieldArrayItem::Int(item) => item.to_string(),
			BitFieldArrayItem::Bits(bits) => render_blob(bits, options),
		});
		out.push_str(&format!("\n{INDENT}{name:<name_width$}:{width:2} = {}", render_items(cells, options)));
	}
	out.push_str("\n}");
	out
}

fn truncate(input: &str, max_len: usize) -> String {
	if input.chars().count() <= max_len {
		return input.to_owned();
	}
	let out: String = input.chars().take(max_len).collect();
	format!("{out}...")
}
