#![allow(missing_docs)]

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cmd;

#[derive(Parser)]
#[command(name = "namedstruct", about = "Pack declarative struct documents into flat little-endian buffers")]
struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	Pack(cmd::pack::Args),
	Layout(cmd::layout::Args),
	Show(cmd::show::Args),
}

fn main() {
	tracing_subscriber::fmt()
		.with_writer(std::io::stderr)
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
		.init();

	if let Err(err) = run() {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn run() -> cmd::Result<()> {
	let cli = Cli::parse();

	match cli.command {
		Commands::Pack(args) => cmd::pack::run(args),
		Commands::Layout(args) => cmd::layout::run(args),
		Commands::Show(args) => cmd::show::run(args),
	}
}
