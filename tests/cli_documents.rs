#![allow(missing_docs)]

use std::process::{Command, Output};

use namedstruct_testkit::{fixture_path, parse_hex};
use serde_json::Value;

#[test]
fn pack_prints_hex_by_default() {
	let output = run(&["pack", &fixture_arg("simple.json")]);
	assert!(output.status.success(), "pack failed: {}", String::from_utf8_lossy(&output.stderr));
	assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "EA 00 00 00");
}

#[test]
fn pack_matches_hand_laid_buffer() {
	let output = run(&["pack", &fixture_arg("test_struct7.json")]);
	assert!(output.status.success(), "pack failed: {}", String::from_utf8_lossy(&output.stderr));
	let bytes = parse_hex(&String::from_utf8_lossy(&output.stdout));
	let expected = parse_hex(
		"08 00 00 00 E0 FF FF FF 14 00 00 00 2A 00 00 00 1C 00 00 00
		 68 65 6C 6C 6F 00 00 00 24 00 00 00 00 00 00 00 61 62 00",
	);
	assert_eq!(bytes, expected);
}

#[test]
fn pack_writes_raw_buffer_to_file() {
	let out = std::env::temp_dir().join(format!("namedstruct-bitfields-{}.bin", std::process::id()));
	let output = run(&["pack", &fixture_arg("bitfields.json"), "--out", &out.display().to_string()]);
	assert!(output.status.success(), "pack failed: {}", String::from_utf8_lossy(&output.stderr));
	assert!(output.stdout.is_empty(), "raw output should not also print hex");

	let bytes = std::fs::read(&out).expect("output file written");
	std::fs::remove_file(&out).ok();
	let expected = parse_hex(
		"03 1D 00 00 0C 00 00 00 18 00 00 00
		 06 00 40 00 44 00 46 00 95 C0 03 00
		 1C 00 00 00 78 00",
	);
	assert_eq!(bytes, expected);
}

#[test]
fn layout_json_lists_members_constants_and_types() {
	let json = run_json(&["layout", &fixture_arg("test_struct7.json"), "--json"]);
	assert_eq!(json["name"], "testStruct7");
	assert_eq!(json["size"], 20);
	assert_eq!(json["padding"], 5);

	let members = json["members"].as_array().expect("members array");
	let names: Vec<&str> = members.iter().filter_map(|member| member["name"].as_str()).collect();
	assert_eq!(names, vec!["anInt8", "anInt32", "aString", "aUint16", "names"]);
	assert_eq!(members[1]["offset"], 4);
	assert_eq!(members[2]["type"], "ref32<char[]>");
	assert_eq!(members[4]["type"], "ref32<ref32<char[]>[]>");

	let constants = json["constants"].as_array().expect("constants array");
	assert_eq!(constants[0]["name"], "MAGIC");
	assert_eq!(constants[0]["value"], "4660");
	assert_eq!(constants[1]["value"], "';'");
}

#[test]
fn layout_json_names_nested_types() {
	let json = run_json(&["layout", &fixture_arg("bitfields.json"), "--json"]);
	let types: Vec<&str> = json["referenced_types"]
		.as_array()
		.expect("referenced types")
		.iter()
		.filter_map(Value::as_str)
		.collect();
	assert_eq!(types, vec!["bitField8", "entryTable", "innerStruct"]);
}

#[test]
fn show_prints_struct_and_size_report() {
	let output = run(&["show", &fixture_arg("test_struct7.json")]);
	assert!(output.status.success(), "show failed: {}", String::from_utf8_lossy(&output.stderr));
	let stdout = String::from_utf8_lossy(&output.stdout);
	assert!(stdout.starts_with("struct testStruct7 {"), "got {stdout}");
	assert!(stdout.contains("anInt32=-32"));
	assert!(stdout.contains("\"hello\""));
	assert!(stdout.trim_end().ends_with("total: 39"), "got {stdout}");
}

#[test]
fn build_errors_exit_nonzero_with_message() {
	let output = run(&["pack", &fixture_arg("duplicate_member.json")]);
	assert!(!output.status.success());
	let stderr = String::from_utf8_lossy(&output.stderr);
	assert!(stderr.contains("error: name collision in broken: x already defined"), "got {stderr}");
}

#[test]
fn missing_document_reports_io_error() {
	let output = run(&["layout", &fixture_arg("does_not_exist.json")]);
	assert!(!output.status.success());
	assert!(String::from_utf8_lossy(&output.stderr).contains("error: io:"));
}

fn run(args: &[&str]) -> Output {
	Command::new(env!("CARGO_BIN_EXE_namedstruct")).args(args).output().expect("command executes")
}

fn run_json(args: &[&str]) -> Value {
	let output = run(args);
	assert!(output.status.success(), "command failed: {}", String::from_utf8_lossy(&output.stderr));
	serde_json::from_slice(&output.stdout).expect("stdout should be valid json")
}

fn fixture_arg(name: &str) -> String {
	fixture_path(name).display().to_string()
}
