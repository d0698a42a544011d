use std::path::PathBuf;

use namedstruct::layout::StructLayout;
use serde::Serialize;

use crate::cmd::util::emit_json;
use crate::cmd::{Result, schema};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long)]
	pub json: bool,
}

#[derive(Serialize)]
struct LayoutJson {
	name: String,
	size: usize,
	alignment: usize,
	padding: usize,
	members: Vec<MemberJson>,
	constants: Vec<ConstantJson>,
	referenced_types: Vec<String>,
}

#[derive(Serialize)]
struct MemberJson {
	offset: usize,
	size: usize,
	#[serde(rename = "type")]
	ty: String,
	name: String,
}

#[derive(Serialize)]
struct ConstantJson {
	name: String,
	value: String,
}

/// Print member offsets, constants and referenced types of the document struct.
pub fn run(args: Args) -> Result<()> {
	let Args { path, json } = args;

	let value = schema::load(&path)?.build()?;
	let layout = value.ty().layout();

	if json {
		return emit_json(&layout_json(layout));
	}

	println!("struct: {}", layout.name());
	println!("size: {}", layout.size());
	println!("alignment: {}", layout.alignment());
	println!("padding: {}", padding_bytes(layout));
	println!("members:");
	for member in layout.members().filter(|member| !member.padding) {
		println!("  {:04} {:>3} {} {}", member.offset, member.size, member.ty, member.name);
	}
	if !layout.constants().is_empty() {
		println!("constants:");
		for (name, constant) in layout.constants().iter() {
			println!("  {name} = {constant}");
		}
	}
	let referenced = layout.referenced_type_names();
	if !referenced.is_empty() {
		println!("referenced_types: {}", referenced.join(", "));
	}

	Ok(())
}

fn layout_json(layout: StructLayout<'_>) -> LayoutJson {
	LayoutJson {
		name: layout.name().to_owned(),
		size: layout.size(),
		alignment: layout.alignment(),
		padding: padding_bytes(layout),
		members: layout
			.fields()
			.zip(layout.members().filter(|member| !member.padding))
			.map(|((offset, ty, name), member)| MemberJson {
				offset,
				size: member.size,
				ty: ty.to_string(),
				name: name.to_owned(),
			})
			.collect(),
		constants: layout
			.constants()
			.iter()
			.map(|(name, constant)| ConstantJson {
				name: name.to_owned(),
				value: constant.to_string(),
			})
			.collect(),
		referenced_types: layout.referenced_type_names().into_iter().map(str::to_owned).collect(),
	}
}

fn padding_bytes(layout: StructLayout<'_>) -> usize {
	layout.members().filter(|member| member.padding).count()
}
