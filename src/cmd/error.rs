use std::path::PathBuf;

use namedstruct::layout::LayoutError;
use thiserror::Error;

/// Command result type.
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors produced while loading documents and running commands.
#[derive(Debug, Error)]
pub enum CliError {
	/// Building or packing the described struct failed.
	#[error(transparent)]
	Layout(#[from] LayoutError),
	/// Reading the document or writing output failed.
	#[error("io: {}: {source}", path.display())]
	Io {
		/// File being read or written.
		path: PathBuf,
		/// Underlying failure.
		source: std::io::Error,
	},
	/// Document is not valid JSON or does not match the schema shape.
	#[error("invalid document {}: {source}", path.display())]
	Json {
		/// Document path.
		path: PathBuf,
		/// Parser failure.
		source: serde_json::Error,
	},
	/// JSON output could not be rendered.
	#[error("json output: {0}")]
	Output(#[from] serde_json::Error),
	/// A member's JSON value cannot be used for its kind.
	#[error("member {name}: {reason}")]
	Schema {
		/// Member or constant name.
		name: String,
		/// What was wrong with the value.
		reason: String,
	},
}
