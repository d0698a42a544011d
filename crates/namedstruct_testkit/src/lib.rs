//! Shared test helpers for workspace crates.

use std::path::{Path, PathBuf};

/// Resolve the workspace root path.
pub fn workspace_root() -> PathBuf {
	let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
	manifest_dir
		.join("..")
		.join("..")
		.canonicalize()
		.unwrap_or_else(|_| manifest_dir.join("..").join(".."))
}

/// Resolve a fixture path under `<workspace>/fixtures`.
pub fn fixture_path(name: &str) -> PathBuf {
	workspace_root().join("fixtures").join(name)
}

/// Load and parse a JSON fixture document.
pub fn fixture_json(name: &str) -> serde_json::Value {
	let path = fixture_path(name);
	let raw = std::fs::read(&path).unwrap_or_else(|err| panic!("fixture {} readable: {err}", path.display()));
	serde_json::from_slice(&raw).unwrap_or_else(|err| panic!("fixture {} is valid json: {err}", path.display()))
}

/// Parse whitespace-separated hex byte pairs such as `"EA 00 00 00"`.
///
/// Panics on malformed input; intended for test literals only.
pub fn parse_hex(text: &str) -> Vec<u8> {
	let digits: String = text.chars().filter(|c| !c.is_whitespace()).collect();
	assert!(digits.len() % 2 == 0, "hex literal must have an even digit count: {text:?}");
	(0..digits.len())
		.step_by(2)
		.map(|idx| u8::from_str_radix(&digits[idx..idx + 2], 16).unwrap_or_else(|_| panic!("bad hex pair in {text:?}")))
		.collect()
}

/// Render bytes as uppercase space-separated hex pairs.
pub fn to_hex(bytes: &[u8]) -> String {
	bytes.iter().map(|byte| format!("{byte:02X}")).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
	use super::{parse_hex, to_hex};

	#[test]
	fn hex_helpers_agree() {
		let bytes = parse_hex("EA 00 0f\n3b");
		assert_eq!(bytes, vec![0xEA, 0x00, 0x0F, 0x3B]);
		assert_eq!(to_hex(&bytes), "EA 00 0F 3B");
	}
}
