/// Layout inspection command.
pub mod layout;
/// Build-and-pack command.
pub mod pack;
/// JSON struct document model.
pub mod schema;
/// Pretty print and size report command.
pub mod show;

mod error;
mod util;

pub use error::{CliError, Result};
