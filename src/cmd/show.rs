use std::path::PathBuf;

use namedstruct::layout::{PrettyOptions, Value};

use crate::cmd::{Result, schema};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	/// Use tighter truncation limits.
	#[arg(long)]
	pub compact: bool,
}

/// Pretty print the document struct followed by its packed size per member.
pub fn run(args: Args) -> Result<()> {
	let Args { path, compact } = args;

	let value = schema::load(&path)?.build()?;
	let options = if compact { PrettyOptions::compact() } else { PrettyOptions::default() };
	let rows = value.size_report()?;

	let mut padding = 0;
	let mut total = 0;
	let named: Vec<_> = value
		.ty()
		.members()
		.iter()
		.zip(&rows)
		.filter_map(|(member, row)| {
			total += row.bytes;
			if member.padding {
				padding += row.bytes;
				None
			} else {
				Some(row)
			}
		})
		.collect();

	println!("{}", Value::Struct(value).pretty_with(&options));
	println!("sizes:");
	let name_width = named.iter().map(|row| row.name.len()).max().unwrap_or(0);
	for row in named {
		println!("  {:<name_width$} {}", row.name, row.bytes);
	}
	println!("  {:<name_width$} {padding}", "(padding)");
	println!("total: {total}");

	Ok(())
}
