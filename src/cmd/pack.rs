use std::fs;
use std::path::PathBuf;

use namedstruct::layout::{Value, pack};

use crate::cmd::util::hex;
use crate::cmd::{CliError, Result, schema};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	/// Write the raw buffer to this file.
	#[arg(long)]
	pub out: Option<PathBuf>,
	/// Print the buffer as hex even when writing a file.
	#[arg(long)]
	pub hex: bool,
}

/// Build the document struct and pack it into one buffer.
pub fn run(args: Args) -> Result<()> {
	let Args { path, out, hex: print_hex } = args;

	let doc = schema::load(&path)?;
	let value = Value::Struct(doc.build()?);
	let bytes = pack(&value)?;

	if let Some(out) = &out {
		fs::write(out, &bytes).map_err(|source| CliError::Io {
			path: out.clone(),
			source,
		})?;
		eprintln!("wrote {} bytes to {}", bytes.len(), out.display());
	}
	if print_hex || out.is_none() {
		println!("{}", hex(&bytes));
	}

	Ok(())
}
